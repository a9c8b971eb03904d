//! Plugin registry - the set of active plugins

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use neuro_plugin_api::{Plugin, PluginManifest};

/// Lifecycle state of a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginState {
    /// Resolved and initialized, not yet registered
    Loaded,
    /// Registered and receiving events
    Running,
    /// Stopped; never runs again
    Stopped,
    /// `init` failed; never registered
    Failed { error: String },
}

/// A plugin instance shared between the registry and its listener bindings.
///
/// Identity is the manifest name.
pub struct PluginHandle {
    name: String,
    manifest: PluginManifest,
    plugin: Arc<dyn Plugin>,
    state: Mutex<PluginState>,
}

impl PluginHandle {
    /// Wrap an initialized plugin. The handle starts out `Loaded`.
    pub fn new(plugin: Box<dyn Plugin>) -> Arc<Self> {
        let manifest = plugin.manifest();
        Arc::new(Self {
            name: manifest.name.clone(),
            manifest,
            plugin: Arc::from(plugin),
            state: Mutex::new(PluginState::Loaded),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    pub fn plugin(&self) -> &Arc<dyn Plugin> {
        &self.plugin
    }

    pub fn state(&self) -> PluginState {
        self.state.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        *self.state.lock() == PluginState::Running
    }

    /// Move to `next`. `Stopped` is terminal: once there, the state never changes.
    pub(crate) fn transition(&self, next: PluginState) -> bool {
        let mut state = self.state.lock();
        if *state == PluginState::Stopped {
            return false;
        }
        *state = next;
        true
    }
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("name", &self.name)
            .field("version", &self.manifest.version)
            .field("state", &self.state())
            .finish()
    }
}

/// Registry of active plugins, in registration order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<Vec<Arc<PluginHandle>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin to the active set.
    ///
    /// Returns `false` (and changes nothing) if a plugin with the same name
    /// is already registered.
    pub fn register(&self, plugin: &Arc<PluginHandle>) -> bool {
        let mut plugins = self.plugins.write();
        if plugins.iter().any(|p| p.name() == plugin.name()) {
            return false;
        }
        plugins.push(Arc::clone(plugin));
        true
    }

    /// Remove a plugin from the active set; no-op if absent
    pub fn unregister(&self, name: &str) -> Option<Arc<PluginHandle>> {
        let mut plugins = self.plugins.write();
        let index = plugins.iter().position(|p| p.name() == name)?;
        Some(plugins.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.read().iter().any(|p| p.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<PluginHandle>> {
        self.plugins.read().iter().find(|p| p.name() == name).cloned()
    }

    /// Registered plugins in registration order
    pub fn snapshot(&self) -> Vec<Arc<PluginHandle>> {
        self.plugins.read().clone()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::Probe;

    #[test]
    fn test_registry_default_is_empty() {
        let registry = PluginRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_twice_keeps_one_entry() {
        let registry = PluginRegistry::new();
        let plugin = PluginHandle::new(Box::new(Probe::new("a")));

        assert!(registry.register(&plugin));
        assert!(!registry.register(&plugin));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a"));
    }

    #[test]
    fn test_register_same_name_different_instance() {
        let registry = PluginRegistry::new();
        let first = PluginHandle::new(Box::new(Probe::new("a")));
        let second = PluginHandle::new(Box::new(Probe::new("a")));

        registry.register(&first);
        assert!(!registry.register(&second));

        let stored = registry.get("a").unwrap();
        assert!(Arc::ptr_eq(&stored, &first));
    }

    #[test]
    fn test_unregister() {
        let registry = PluginRegistry::new();
        let plugin = PluginHandle::new(Box::new(Probe::new("a")));
        registry.register(&plugin);

        assert!(registry.unregister("a").is_some());
        assert!(!registry.contains("a"));

        // Removing again is a no-op
        assert!(registry.unregister("a").is_none());
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let registry = PluginRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(&PluginHandle::new(Box::new(Probe::new(name))));
        }

        let names: Vec<_> = registry
            .snapshot()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let plugin = PluginHandle::new(Box::new(Probe::new("a")));
        assert_eq!(plugin.state(), PluginState::Loaded);

        assert!(plugin.transition(PluginState::Running));
        assert!(plugin.is_running());

        assert!(plugin.transition(PluginState::Stopped));
        assert!(!plugin.transition(PluginState::Running));
        assert_eq!(plugin.state(), PluginState::Stopped);
    }
}
