//! Layered configuration for hosts embedding the core

mod loader;
mod types;

pub use loader::{ConfigError, ConfigLoader, config_dir};
pub use types::{
    DEFAULT_LOG_FILTER, LoggingConfig, NeuroConfig, PluginsConfig, RawLoggingConfig,
    RawNeuroConfig, RawPluginsConfig,
};
