//! Error types for neuro-core

use neuro_plugin_api::{EventKind, PluginError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::plugins::PluginInitializationError;

/// Top-level error type for neuro-core
#[derive(Error, Debug)]
pub enum NeuroError {
    #[error("Plugin initialization error: {0}")]
    Init(#[from] PluginInitializationError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from attaching a plugin to an event kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The plugin has no handler for the requested kind
    #[error("Plugin '{plugin}' cannot handle {kind} events")]
    Unsupported { plugin: String, kind: EventKind },

    /// Only registered plugins may be bound
    #[error("Plugin '{plugin}' is not registered")]
    NotRegistered { plugin: String },
}

/// Errors surfaced to the caller of a dispatch
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A listener returned an error; the rest of the pass was skipped
    #[error("Listener '{plugin}' failed: {source}")]
    Listener {
        plugin: String,
        #[source]
        source: PluginError,
    },
}

impl DispatchError {
    /// Name of the plugin whose listener failed
    pub fn plugin(&self) -> &str {
        match self {
            DispatchError::Listener { plugin, .. } => plugin,
        }
    }
}

/// Errors from the network bridge
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("No network transport attached")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<NetworkError> for PluginError {
    fn from(err: NetworkError) -> Self {
        PluginError::Network(err.to_string())
    }
}

impl From<DispatchError> for PluginError {
    fn from(err: DispatchError) -> Self {
        PluginError::Dispatch(err.to_string())
    }
}
