//! Listener bindings and the per-kind dispatch table
//!
//! Binding sets are copy-on-write: every mutation builds a new set and swaps
//! it in, so a dispatch pass iterating an older snapshot never sees it change.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use neuro_plugin_api::{EventKind, NeuroEvent, PluginError};

use super::registry::PluginHandle;
use crate::error::BindingError;

/// Binds one plugin to one event kind
#[derive(Clone)]
pub struct ListenerBinding {
    plugin: Arc<PluginHandle>,
    kind: EventKind,
}

impl ListenerBinding {
    /// Adapt the plugin's handler for `kind`, or `None` if it has none
    pub fn create(plugin: &Arc<PluginHandle>, kind: EventKind) -> Option<Self> {
        plugin.plugin().handles(kind).then(|| Self {
            plugin: Arc::clone(plugin),
            kind,
        })
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn plugin_name(&self) -> &str {
        self.plugin.name()
    }

    /// Whether this binding belongs to the named plugin
    pub fn is_for(&self, plugin: &str) -> bool {
        self.plugin.name() == plugin
    }

    /// Deliver `event` to the plugin.
    ///
    /// Does nothing if the plugin is no longer running (it may have been
    /// stopped earlier in the same pass) or if the event is of another kind.
    pub fn invoke(&self, event: &NeuroEvent) -> Result<(), PluginError> {
        if !self.plugin.is_running() {
            tracing::trace!(plugin = %self.plugin.name(), "Skipping stopped listener");
            return Ok(());
        }

        let plugin = self.plugin.plugin();
        match (self.kind, event) {
            (EventKind::Debug, NeuroEvent::Debug(debug)) => plugin.on_debug(debug),
            (EventKind::Quit, NeuroEvent::Quit) => plugin.on_quit(),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for ListenerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerBinding")
            .field("plugin", &self.plugin.name())
            .field("kind", &self.kind)
            .finish()
    }
}

type BindingSet = Arc<Vec<ListenerBinding>>;

/// Event kind -> set of listener bindings
#[derive(Default)]
pub struct ListenerRegistry {
    table: RwLock<HashMap<EventKind, BindingSet>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `plugin` to `kind`, replacing any existing binding for the pair
    pub fn bind(
        &self,
        plugin: &Arc<PluginHandle>,
        kind: EventKind,
    ) -> Result<ListenerBinding, BindingError> {
        let binding =
            ListenerBinding::create(plugin, kind).ok_or_else(|| BindingError::Unsupported {
                plugin: plugin.name().to_string(),
                kind,
            })?;

        let mut table = self.table.write();
        let mut next: Vec<ListenerBinding> = table
            .get(&kind)
            .map(|set| {
                set.iter()
                    .filter(|b| !b.is_for(plugin.name()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        next.push(binding.clone());
        table.insert(kind, Arc::new(next));

        Ok(binding)
    }

    /// Remove every binding of `plugin`; returns the kinds it was bound to
    pub fn unbind_all(&self, plugin: &str) -> Vec<EventKind> {
        let mut table = self.table.write();
        let mut removed = Vec::new();

        for (kind, set) in table.iter_mut() {
            if !set.iter().any(|b| b.is_for(plugin)) {
                continue;
            }
            let next: Vec<ListenerBinding> =
                set.iter().filter(|b| !b.is_for(plugin)).cloned().collect();
            *set = Arc::new(next);
            removed.push(*kind);
        }
        table.retain(|_, set| !set.is_empty());

        removed.sort();
        removed
    }

    /// Immutable snapshot of the bindings for `kind`
    pub fn bindings_for(&self, kind: EventKind) -> BindingSet {
        self.table.read().get(&kind).cloned().unwrap_or_default()
    }

    /// Kinds `plugin` is currently bound to
    pub fn kinds_for(&self, plugin: &str) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = self
            .table
            .read()
            .iter()
            .filter(|(_, set)| set.iter().any(|b| b.is_for(plugin)))
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort();
        kinds
    }

    /// Total number of bindings across all kinds
    pub fn len(&self) -> usize {
        self.table.read().values().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::registry::PluginState;
    use crate::plugins::testing::Probe;

    fn running(probe: Probe) -> Arc<PluginHandle> {
        let handle = PluginHandle::new(Box::new(probe));
        handle.transition(PluginState::Running);
        handle
    }

    #[test]
    fn test_create_requires_handler() {
        let plugin = running(Probe::new("a").handling(&[EventKind::Debug]));
        assert!(ListenerBinding::create(&plugin, EventKind::Debug).is_some());
        assert!(ListenerBinding::create(&plugin, EventKind::Quit).is_none());
    }

    #[test]
    fn test_bind_unsupported_adds_nothing() {
        let registry = ListenerRegistry::new();
        let plugin = running(Probe::new("a").handling(&[EventKind::Debug]));

        let result = registry.bind(&plugin, EventKind::Quit);

        assert!(matches!(result, Err(BindingError::Unsupported { .. })));
        assert!(registry.bindings_for(EventKind::Quit).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bind_replaces_existing_pair() {
        let registry = ListenerRegistry::new();
        let plugin = running(Probe::new("a").handling(&[EventKind::Debug]));

        registry.bind(&plugin, EventKind::Debug).unwrap();
        registry.bind(&plugin, EventKind::Debug).unwrap();

        assert_eq!(registry.bindings_for(EventKind::Debug).len(), 1);
    }

    #[test]
    fn test_unbind_all_removes_every_kind() {
        let registry = ListenerRegistry::new();
        let a = running(Probe::new("a").handling(&EventKind::ALL));
        let b = running(Probe::new("b").handling(&[EventKind::Debug]));
        registry.bind(&a, EventKind::Debug).unwrap();
        registry.bind(&a, EventKind::Quit).unwrap();
        registry.bind(&b, EventKind::Debug).unwrap();

        let removed = registry.unbind_all("a");

        assert_eq!(removed, vec![EventKind::Debug, EventKind::Quit]);
        assert!(registry.kinds_for("a").is_empty());
        assert_eq!(registry.kinds_for("b"), vec![EventKind::Debug]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_unbind() {
        let registry = ListenerRegistry::new();
        let a = running(Probe::new("a").handling(&[EventKind::Debug]));
        registry.bind(&a, EventKind::Debug).unwrap();

        let snapshot = registry.bindings_for(EventKind::Debug);
        registry.unbind_all("a");

        assert_eq!(snapshot.len(), 1);
        assert!(registry.bindings_for(EventKind::Debug).is_empty());
    }

    #[test]
    fn test_invoke_delivers_payload_unchanged() {
        let probe = Probe::new("a").handling(&[EventKind::Debug]);
        let log = probe.log();
        let plugin = running(probe);
        let binding = ListenerBinding::create(&plugin, EventKind::Debug).unwrap();

        binding.invoke(&NeuroEvent::debug("core", "hi")).unwrap();

        assert_eq!(*log.lock(), vec!["DEBUG:hi"]);
    }

    #[test]
    fn test_invoke_skips_stopped_plugin() {
        let probe = Probe::new("a").handling(&[EventKind::Debug]);
        let log = probe.log();
        let plugin = running(probe);
        let binding = ListenerBinding::create(&plugin, EventKind::Debug).unwrap();

        plugin.transition(PluginState::Stopped);
        binding.invoke(&NeuroEvent::debug("core", "hi")).unwrap();

        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_invoke_ignores_other_kinds() {
        let probe = Probe::new("a").handling(&EventKind::ALL);
        let log = probe.log();
        let plugin = running(probe);
        let binding = ListenerBinding::create(&plugin, EventKind::Debug).unwrap();

        binding.invoke(&NeuroEvent::Quit).unwrap();

        assert!(log.lock().is_empty());
    }
}
