//! Plugin loading error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving and initializing a plugin
#[derive(Error, Debug)]
pub enum PluginInitializationError {
    /// No loader knows the identifier
    #[error("Plugin '{id}' not found")]
    NotFound { id: String },

    /// Plugin directory exists but holds no loadable library
    #[error("Plugin library not found in {dir}")]
    LibraryNotFound { dir: PathBuf },

    /// API version mismatch between neuro and plugin
    #[error("API version mismatch: neuro expects {expected}, plugin has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// Failed to load dynamic library
    #[error("Failed to load plugin library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// The plugin's `init` returned an error
    #[error("Plugin '{plugin}' initialization failed: {source}")]
    InitFailed {
        plugin: String,
        #[source]
        source: neuro_plugin_api::PluginError,
    },

    /// A plugin with the same name is already registered
    #[error("Plugin '{name}' is already loaded")]
    AlreadyLoaded { name: String },

    /// The host is shutting down and accepts no new plugins
    #[error("Plugin '{name}' not loaded: shutdown in progress")]
    ShuttingDown { name: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginInitializationError {
    /// Whether a chained loader should try the next loader after this error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
