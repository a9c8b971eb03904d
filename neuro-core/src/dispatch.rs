//! EventDispatcher - synchronous fan-out of events to listener bindings
//!
//! Every pass runs on the calling thread under one process-wide re-entrant
//! lock. At most one pass is in flight at a time; a second caller blocks
//! until the first finishes. Listeners may dispatch again from inside a
//! handler on the same thread.
//!
//! A slow listener blocks the whole bus, and a listener that never returns
//! stalls it forever. Listeners should hand long work off to their own
//! threads.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::sync::Arc;

use neuro_plugin_api::NeuroEvent;

use crate::error::DispatchError;
use crate::plugins::ListenerRegistry;

pub struct EventDispatcher {
    listeners: Arc<ListenerRegistry>,
    lock: ReentrantMutex<()>,
}

impl EventDispatcher {
    pub fn new(listeners: Arc<ListenerRegistry>) -> Self {
        Self {
            listeners,
            lock: ReentrantMutex::new(()),
        }
    }

    /// Take the dispatch lock. Held by anything that must not overlap a pass.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Deliver `event` to every binding for its kind.
    ///
    /// The first listener error aborts the pass and is returned; bindings
    /// after it do not see the event.
    pub fn dispatch(&self, event: &NeuroEvent) -> Result<(), DispatchError> {
        let _guard = self.lock();
        let bindings = self.listeners.bindings_for(event.kind());
        tracing::trace!(kind = ?event.kind(), listeners = bindings.len(), "Dispatching event");

        for binding in bindings.iter() {
            binding
                .invoke(event)
                .map_err(|source| DispatchError::Listener {
                    plugin: binding.plugin_name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Deliver `event` to every binding for its kind, continuing past failures.
    ///
    /// Used for best-effort delivery where no listener may hold up the rest.
    pub fn dispatch_all(&self, event: &NeuroEvent) -> Vec<DispatchError> {
        let _guard = self.lock();
        let bindings = self.listeners.bindings_for(event.kind());

        bindings
            .iter()
            .filter_map(|binding| {
                binding
                    .invoke(event)
                    .err()
                    .map(|source| DispatchError::Listener {
                        plugin: binding.plugin_name().to_string(),
                        source,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::Probe;
    use crate::plugins::{PluginHandle, PluginState};
    use neuro_plugin_api::EventKind;

    fn bound(listeners: &ListenerRegistry, probe: Probe, kind: EventKind) {
        let handle = PluginHandle::new(Box::new(probe));
        handle.transition(PluginState::Running);
        listeners.bind(&handle, kind).unwrap();
    }

    #[test]
    fn test_dispatch_without_listeners_is_ok() {
        let dispatcher = EventDispatcher::new(Arc::new(ListenerRegistry::new()));
        assert!(dispatcher.dispatch(&NeuroEvent::debug("core", "hi")).is_ok());
    }

    #[test]
    fn test_dispatch_reaches_only_matching_kind() {
        let listeners = Arc::new(ListenerRegistry::new());
        let a = Probe::new("a").handling(&[EventKind::Debug]);
        let b = Probe::new("b").handling(&[EventKind::Quit]);
        let (a_log, b_log) = (a.log(), b.log());
        bound(&listeners, a, EventKind::Debug);
        bound(&listeners, b, EventKind::Quit);

        let dispatcher = EventDispatcher::new(listeners);
        dispatcher.dispatch(&NeuroEvent::debug("core", "hi")).unwrap();

        assert_eq!(*a_log.lock(), vec!["DEBUG:hi"]);
        assert!(b_log.lock().is_empty());
    }

    #[test]
    fn test_first_listener_error_aborts_pass() {
        let listeners = Arc::new(ListenerRegistry::new());
        let failing = Probe::new("failing")
            .handling(&[EventKind::Debug])
            .failing_debug();
        let after = Probe::new("after").handling(&[EventKind::Debug]);
        let after_log = after.log();
        bound(&listeners, failing, EventKind::Debug);
        bound(&listeners, after, EventKind::Debug);

        let dispatcher = EventDispatcher::new(listeners);
        let err = dispatcher
            .dispatch(&NeuroEvent::debug("core", "hi"))
            .unwrap_err();

        assert_eq!(err.plugin(), "failing");
        assert!(after_log.lock().is_empty());
    }

    #[test]
    fn test_dispatch_all_continues_past_failures() {
        let listeners = Arc::new(ListenerRegistry::new());
        let failing = Probe::new("failing")
            .handling(&[EventKind::Debug])
            .failing_debug();
        let after = Probe::new("after").handling(&[EventKind::Debug]);
        let after_log = after.log();
        bound(&listeners, failing, EventKind::Debug);
        bound(&listeners, after, EventKind::Debug);

        let dispatcher = EventDispatcher::new(listeners);
        let errors = dispatcher.dispatch_all(&NeuroEvent::debug("core", "hi"));

        assert_eq!(errors.len(), 1);
        assert_eq!(*after_log.lock(), vec!["DEBUG:hi"]);
    }

    #[test]
    fn test_lock_is_reentrant() {
        let dispatcher = EventDispatcher::new(Arc::new(ListenerRegistry::new()));
        let _outer = dispatcher.lock();
        // Would deadlock with a plain mutex
        assert!(dispatcher.dispatch(&NeuroEvent::Quit).is_ok());
    }
}
