//! PluginContext - a plugin's interface to the core

use crate::error::PluginError;
use crate::event::{EventKind, NeuroEvent};
use crate::network::{NetworkMessage, NetworkRequest, NetworkResponse};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

// ─── Core Trait ──────────────────────────────────────────────────────

/// What the core offers to plugins at runtime.
///
/// Implemented by the core crate. Plugins never hold it directly; they get a
/// [`CoreHandle`] from their context.
pub trait Core: Send + Sync {
    /// Dispatch an event synchronously to every listener of its kind
    fn dispatch(&self, event: NeuroEvent) -> Result<(), PluginError>;

    /// Forward a request to the network transport and wait for the response
    fn send_request(&self, request: NetworkRequest) -> Result<NetworkResponse, PluginError>;

    /// Forward a fire-and-forget message to the network transport
    fn send_message(&self, message: NetworkMessage) -> Result<(), PluginError>;
}

/// Cloneable, non-owning handle to the core.
///
/// The core owns its plugins, so plugins only get a weak reference back.
/// Every call fails with [`PluginError::CoreUnavailable`] once the core has
/// been dropped.
#[derive(Clone)]
pub struct CoreHandle {
    inner: Weak<dyn Core>,
}

impl CoreHandle {
    pub fn new(core: &Arc<dyn Core>) -> Self {
        Self {
            inner: Arc::downgrade(core),
        }
    }

    /// Build a handle from an existing weak reference, e.g. one obtained in
    /// `Arc::new_cyclic` before the core finishes constructing.
    pub fn from_weak(inner: Weak<dyn Core>) -> Self {
        Self { inner }
    }

    /// A handle that is not attached to any core
    pub fn detached() -> Self {
        let core: Arc<dyn Core> = Arc::new(Detached);
        Self {
            inner: Arc::downgrade(&core),
        }
    }

    fn upgrade(&self) -> Result<Arc<dyn Core>, PluginError> {
        self.inner.upgrade().ok_or(PluginError::CoreUnavailable)
    }

    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn dispatch(&self, event: NeuroEvent) -> Result<(), PluginError> {
        self.upgrade()?.dispatch(event)
    }

    pub fn send_request(&self, request: NetworkRequest) -> Result<NetworkResponse, PluginError> {
        self.upgrade()?.send_request(request)
    }

    pub fn send_message(&self, message: NetworkMessage) -> Result<(), PluginError> {
        self.upgrade()?.send_message(message)
    }
}

impl std::fmt::Debug for CoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Stand-in core for detached handles; dropped as soon as the handle exists.
struct Detached;

impl Core for Detached {
    fn dispatch(&self, _event: NeuroEvent) -> Result<(), PluginError> {
        Err(PluginError::CoreUnavailable)
    }

    fn send_request(&self, _request: NetworkRequest) -> Result<NetworkResponse, PluginError> {
        Err(PluginError::CoreUnavailable)
    }

    fn send_message(&self, _message: NetworkMessage) -> Result<(), PluginError> {
        Err(PluginError::CoreUnavailable)
    }
}

// ─── PluginContext ───────────────────────────────────────────────────

/// Passed to [`Plugin::init`](crate::Plugin::init).
///
/// Provides:
/// - event subscriptions (committed by the core once the plugin is registered)
/// - a [`CoreHandle`] for dispatching events and using the network later on
/// - plugin configuration (persistent key-value store)
/// - logging utilities
pub struct PluginContext {
    plugin_name: String,
    plugin_dir: Option<PathBuf>,
    config: PluginConfig,
    core: CoreHandle,
    /// Kinds requested during init, in request order
    pending_subscriptions: Vec<EventKind>,
}

/// Plugin configuration - persistent key-value store backed by TOML
pub struct PluginConfig {
    values: HashMap<String, toml::Value>,
    dirty: bool,
}

impl PluginContext {
    /// Create a new plugin context
    pub fn new(plugin_name: impl Into<String>, core: CoreHandle) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            plugin_dir: None,
            config: PluginConfig::new(),
            core,
            pending_subscriptions: Vec::new(),
        }
    }

    /// Builder: attach the plugin's directory and its pre-loaded config
    pub fn with_dir(mut self, plugin_dir: PathBuf, config: PluginConfig) -> Self {
        self.plugin_dir = Some(plugin_dir);
        self.config = config;
        self
    }

    /// Get the plugin's name
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Directory the plugin was loaded from, if it came from disk
    pub fn plugin_dir(&self) -> Option<&Path> {
        self.plugin_dir.as_deref()
    }

    /// Handle to the core, to keep for dispatching events after `init`
    pub fn core(&self) -> CoreHandle {
        self.core.clone()
    }

    // ─── Subscriptions ───────────────────────────────────────────────

    /// Ask the core to deliver events of `kind` to this plugin.
    ///
    /// The binding is created after `init` returns successfully. A kind the
    /// plugin does not handle is reported by the core as a bind failure.
    pub fn subscribe(&mut self, kind: EventKind) -> Result<(), PluginError> {
        if self.pending_subscriptions.contains(&kind) {
            return Err(PluginError::DuplicateSubscription(kind));
        }
        self.pending_subscriptions.push(kind);
        Ok(())
    }

    /// Get subscriptions pending registration (used by the core)
    pub fn pending_subscriptions(&self) -> &[EventKind] {
        &self.pending_subscriptions
    }

    /// Take pending subscriptions (used by the core once the plugin is registered)
    pub fn take_pending_subscriptions(&mut self) -> Vec<EventKind> {
        std::mem::take(&mut self.pending_subscriptions)
    }

    // ─── Configuration ───────────────────────────────────────────────

    /// Read a configuration value
    ///
    /// # Example
    /// ```ignore
    /// let threshold: Option<u32> = ctx.config_get("threshold");
    /// ```
    pub fn config_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config.get(key)
    }

    /// Write a configuration value
    pub fn config_set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), PluginError> {
        self.config.set(key, value)
    }

    /// Check if the configuration has unsaved changes
    pub fn config_is_dirty(&self) -> bool {
        self.config.is_dirty()
    }

    /// Get a mutable reference to the config (for internal use by the core)
    pub fn config_mut(&mut self) -> &mut PluginConfig {
        &mut self.config
    }

    // ─── Logging ─────────────────────────────────────────────────────

    /// Log an info message (automatically prefixed with plugin name)
    pub fn log_info(&self, message: &str) {
        tracing::info!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a warning message
    pub fn log_warn(&self, message: &str) {
        tracing::warn!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log an error message
    pub fn log_error(&self, message: &str) {
        tracing::error!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a debug message
    pub fn log_debug(&self, message: &str) {
        tracing::debug!(plugin = %self.plugin_name, "{}", message);
    }
}

impl PluginConfig {
    /// Create a new empty config
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            dirty: false,
        }
    }

    /// Load configuration from a TOML file; a missing file is an empty config
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let values: HashMap<String, toml::Value> =
            toml::from_str(&content).map_err(|e| PluginError::Config(e.to_string()))?;
        Ok(Self {
            values,
            dirty: false,
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&mut self, path: &Path) -> Result<(), PluginError> {
        let content = toml::to_string_pretty(&self.values)
            .map_err(|e| PluginError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        self.dirty = false;
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values.get(key).and_then(|v| v.clone().try_into().ok())
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), PluginError> {
        let toml_value =
            toml::Value::try_from(value).map_err(|e| PluginError::Serialization(e.to_string()))?;
        self.values.insert(key.to_string(), toml_value);
        self.dirty = true;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::new()
    }
}
