//! PluginHost - manages plugin lifecycle and event dispatch

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use neuro_plugin_api::{
    CoreHandle, DebugEvent, EventKind, NeuroEvent, Plugin, PluginConfig, PluginContext,
    PluginError, PluginManifest,
};

use super::error::PluginInitializationError;
use super::listeners::{ListenerBinding, ListenerRegistry};
use super::loader::PluginLoader;
use super::registry::{PluginHandle, PluginRegistry, PluginState};
use crate::dispatch::EventDispatcher;
use crate::error::{BindingError, DispatchError};
use crate::host::HostEnvironment;

/// Source name used for diagnostics the core emits itself
pub const CORE_SOURCE: &str = "core";

/// Information about a plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,
    /// Plugin manifest
    pub manifest: PluginManifest,
    /// Current state
    pub state: PluginState,
    /// Kinds the plugin is bound to
    pub kinds: Vec<EventKind>,
}

/// A plugin whose `stop` returned an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopFailure {
    pub plugin: String,
    pub error: String,
}

/// Outcome of [`PluginHost::stop_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Plugins that stopped cleanly, in stop order
    pub stopped: Vec<String>,
    /// Plugins whose `stop` failed; they are no longer registered either
    pub failures: Vec<StopFailure>,
}

impl StopReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of plugins that left the active set
    pub fn total(&self) -> usize {
        self.stopped.len() + self.failures.len()
    }
}

impl std::fmt::Display for StopReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} plugin(s) stopped, {} failed",
            self.stopped.len(),
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.plugin, failure.error)?;
        }
        Ok(())
    }
}

/// The plugin host loads, stops and dispatches events to plugins.
///
/// Every operation that changes which listeners exist runs under the
/// dispatcher's lock, so it never overlaps a dispatch pass on another
/// thread. The lock is re-entrant: all of these may be called from inside
/// a listener. Plugin `stop` callbacks run after the lock is released.
pub struct PluginHost {
    registry: PluginRegistry,
    listeners: Arc<ListenerRegistry>,
    dispatcher: EventDispatcher,
    loader: Box<dyn PluginLoader>,
    environment: Arc<dyn HostEnvironment>,
    /// Handed to plugins in their context
    core: CoreHandle,
    /// Plugins whose `init` failed; never registered
    failed: Mutex<Vec<PluginInfo>>,
    quitting: AtomicBool,
}

impl PluginHost {
    pub fn new(
        loader: Box<dyn PluginLoader>,
        environment: Arc<dyn HostEnvironment>,
        core: CoreHandle,
    ) -> Self {
        let listeners = Arc::new(ListenerRegistry::new());
        Self {
            registry: PluginRegistry::new(),
            dispatcher: EventDispatcher::new(Arc::clone(&listeners)),
            listeners,
            loader,
            environment,
            core,
            failed: Mutex::new(Vec::new()),
            quitting: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn plugin_count(&self) -> usize {
        self.registry.len()
    }

    /// Registered plugins in registration order
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.registry
            .snapshot()
            .into_iter()
            .map(|handle| PluginInfo {
                name: handle.name().to_string(),
                manifest: handle.manifest().clone(),
                state: handle.state(),
                kinds: self.listeners.kinds_for(handle.name()),
            })
            .collect()
    }

    /// Plugins that were resolved but failed to initialize
    pub fn failed_plugins(&self) -> Vec<PluginInfo> {
        self.failed.lock().clone()
    }

    // ─── Loading ─────────────────────────────────────────────────────

    /// Resolve, initialize and register a plugin, then bind the kinds it
    /// subscribed to during `init`.
    ///
    /// On failure nothing is registered; the error is returned and also
    /// reported as an error diagnostic.
    pub fn load(&self, id: &str) -> Result<Arc<PluginHandle>, PluginInitializationError> {
        match self.try_load(id) {
            Ok(handle) => {
                tracing::info!(
                    plugin = %handle.name(),
                    version = %handle.manifest().version,
                    "Plugin loaded"
                );
                Ok(handle)
            }
            Err(e) => {
                tracing::error!(plugin = %id, error = %e, "Failed to load plugin");
                self.report(DebugEvent::error(
                    CORE_SOURCE,
                    format!("Failed to load plugin '{}': {}", id, e),
                ));
                Err(e)
            }
        }
    }

    fn try_load(&self, id: &str) -> Result<Arc<PluginHandle>, PluginInitializationError> {
        let mut instance = self.loader.resolve(id)?;
        let name = instance.manifest().name;

        if self.registry.contains(&name) {
            return Err(PluginInitializationError::AlreadyLoaded { name });
        }

        let mut context = PluginContext::new(name.clone(), self.core.clone());
        if let Some(dir) = self.loader.plugin_dir(id) {
            let config = PluginConfig::load(&dir.join("config.toml")).unwrap_or_else(|e| {
                tracing::warn!(plugin = %name, error = %e, "Ignoring unreadable plugin config");
                PluginConfig::default()
            });
            context = context.with_dir(dir, config);
        }

        if let Err(source) = instance.init(&mut context) {
            let handle = PluginHandle::new(instance);
            handle.transition(PluginState::Failed {
                error: source.to_string(),
            });
            self.failed.lock().push(PluginInfo {
                name: name.clone(),
                manifest: handle.manifest().clone(),
                state: handle.state(),
                kinds: Vec::new(),
            });
            return Err(PluginInitializationError::InitFailed {
                plugin: name,
                source,
            });
        }

        // Persist values the plugin wrote during init
        if let Some(dir) = context.plugin_dir().map(|d| d.to_path_buf())
            && context.config_is_dirty()
            && let Err(e) = context.config_mut().save(&dir.join("config.toml"))
        {
            tracing::warn!(plugin = %name, error = %e, "Failed to save plugin config");
        }

        let handle = PluginHandle::new(instance);
        let rejected = {
            let _guard = self.dispatcher.lock();
            if self.quitting.load(Ordering::SeqCst) {
                Some(PluginInitializationError::ShuttingDown { name: name.clone() })
            } else if !self.registry.register(&handle) {
                // Lost a race with another load of the same plugin
                Some(PluginInitializationError::AlreadyLoaded { name: name.clone() })
            } else {
                handle.transition(PluginState::Running);
                for kind in context.take_pending_subscriptions() {
                    // Failures are reported as diagnostics and do not fail the load
                    let _ = self.add_listener(&handle, kind);
                }
                None
            }
        };

        if let Some(e) = rejected {
            // Initialized but never registered; stopped outside the lock
            handle.transition(PluginState::Stopped);
            if let Err(stop_err) = handle.plugin().stop() {
                tracing::warn!(plugin = %name, error = %stop_err, "Rejected plugin failed to stop");
            }
            return Err(e);
        }

        Ok(handle)
    }

    /// Register a plugin the host constructed and initialized itself.
    ///
    /// Returns the already-registered handle if a plugin with the same name
    /// is present. During shutdown the handle is returned unregistered.
    pub fn add_plugin(&self, plugin: Box<dyn Plugin>) -> Arc<PluginHandle> {
        let handle = PluginHandle::new(plugin);
        let _guard = self.dispatcher.lock();

        if let Some(existing) = self.registry.get(handle.name()) {
            tracing::debug!(plugin = %handle.name(), "Plugin already registered");
            return existing;
        }
        if self.quitting.load(Ordering::SeqCst) {
            tracing::warn!(plugin = %handle.name(), "Shutdown in progress, plugin not added");
            return handle;
        }

        self.registry.register(&handle);
        handle.transition(PluginState::Running);
        tracing::info!(plugin = %handle.name(), "Plugin added");
        handle
    }

    /// Bind a registered plugin to `kind`.
    ///
    /// Both outcomes are reported as diagnostics: success at debug
    /// severity, failure at error severity.
    pub fn add_listener(
        &self,
        plugin: &Arc<PluginHandle>,
        kind: EventKind,
    ) -> Result<ListenerBinding, BindingError> {
        let _guard = self.dispatcher.lock();

        // Only the registered instance, and only while it runs; a stale handle
        // with the same name must not replace the live plugin's binding
        let current = self
            .registry
            .get(plugin.name())
            .is_some_and(|registered| Arc::ptr_eq(&registered, plugin));
        let result = if current && plugin.is_running() {
            self.listeners.bind(plugin, kind)
        } else {
            Err(BindingError::NotRegistered {
                plugin: plugin.name().to_string(),
            })
        };

        match &result {
            Ok(_) => {
                tracing::debug!(plugin = %plugin.name(), kind = ?kind, "Listener bound");
                self.report(DebugEvent::debug(
                    CORE_SOURCE,
                    format!("Plugin '{}' listening for {} events", plugin.name(), kind),
                ));
            }
            Err(e) => {
                tracing::warn!(plugin = %plugin.name(), kind = ?kind, error = %e, "Listener bind failed");
                self.report(DebugEvent::error(CORE_SOURCE, e.to_string()));
            }
        }
        result
    }

    // ─── Stopping ────────────────────────────────────────────────────

    /// Unregister a plugin, remove all of its bindings, then call its `stop`.
    ///
    /// No-op if the plugin is not registered. The plugin is `Stopped` and
    /// unreachable from dispatch even when its `stop` returns an error.
    ///
    /// Only the detach step holds the dispatch lock. The plugin's own `stop`
    /// runs after it is released, so a plugin may join a worker thread that
    /// is waiting to dispatch.
    pub fn stop(&self, name: &str) -> Result<(), PluginError> {
        let Some(handle) = self.detach(name) else {
            tracing::debug!(plugin = %name, "Plugin not registered, nothing to stop");
            return Ok(());
        };
        Self::finish_stop(&handle)
    }

    fn finish_stop(handle: &PluginHandle) -> Result<(), PluginError> {
        let result = handle.plugin().stop();
        match &result {
            Ok(()) => tracing::info!(plugin = %handle.name(), "Plugin stopped"),
            Err(e) => {
                tracing::warn!(plugin = %handle.name(), error = %e, "Plugin stop returned error")
            }
        }
        result
    }

    /// Unregister and unbind `name` under the dispatch lock
    fn detach(&self, name: &str) -> Option<Arc<PluginHandle>> {
        let _guard = self.dispatcher.lock();

        let handle = self.registry.unregister(name)?;
        let kinds = self.listeners.unbind_all(name);
        handle.transition(PluginState::Stopped);
        tracing::debug!(plugin = %name, kinds = ?kinds, "Plugin unbound");
        Some(handle)
    }

    /// Stop every registered plugin, most recently registered first.
    ///
    /// A failing `stop` is reported as an error diagnostic and does not halt
    /// the loop.
    pub fn stop_all(&self) -> StopReport {
        let mut report = StopReport::default();

        for handle in self.registry.snapshot().iter().rev() {
            let name = handle.name().to_string();
            // Stopped by someone else since the snapshot
            let Some(handle) = self.detach(&name) else {
                continue;
            };
            match Self::finish_stop(&handle) {
                Ok(()) => report.stopped.push(name),
                Err(e) => {
                    self.report(DebugEvent::error(
                        CORE_SOURCE,
                        format!("Plugin '{}' failed to stop: {}", name, e),
                    ));
                    report.failures.push(StopFailure {
                        plugin: name,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    // ─── Dispatch & Shutdown ─────────────────────────────────────────

    /// Deliver an event to every listener of its kind.
    ///
    /// `Quit` is delivered best-effort to its listeners (failures become
    /// error diagnostics) and then starts [`quit`](Self::quit).
    pub fn dispatch(&self, event: &NeuroEvent) -> Result<(), DispatchError> {
        if !event.kind().is_terminal() {
            return self.dispatcher.dispatch(event);
        }

        {
            let _guard = self.dispatcher.lock();
            if self.quitting.swap(true, Ordering::SeqCst) {
                tracing::debug!("Shutdown already in progress, ignoring quit");
                return Ok(());
            }

            for error in self.dispatcher.dispatch_all(event) {
                self.report(DebugEvent::error(CORE_SOURCE, error.to_string()));
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Stop every plugin, report the outcome, then terminate the host.
    ///
    /// Termination happens even if reporting fails.
    pub fn quit(&self) {
        {
            let _guard = self.dispatcher.lock();
            if self.quitting.swap(true, Ordering::SeqCst) {
                tracing::debug!("Shutdown already in progress");
                return;
            }
        }
        self.shutdown();
    }

    fn shutdown(&self) {
        tracing::info!(plugins = self.registry.len(), "Shutting down");
        let report = self.stop_all();

        let summary = format!("Shutdown: {}", report);
        let event = if report.is_clean() {
            DebugEvent::debug(CORE_SOURCE, summary)
        } else {
            DebugEvent::error(CORE_SOURCE, summary)
        };
        self.report(event);
        tracing::info!(
            stopped = report.stopped.len(),
            failed = report.failures.len(),
            "Shutdown complete"
        );

        self.environment.exit();
    }

    /// Dispatch a diagnostic; a failure to deliver it is only logged
    pub fn report(&self, event: DebugEvent) {
        if let Err(e) = self.dispatcher.dispatch(&NeuroEvent::Debug(event)) {
            tracing::warn!(error = %e, "Failed to deliver diagnostic");
        }
    }
}
