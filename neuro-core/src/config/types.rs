use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawNeuroConfig {
    #[serde(default)]
    pub plugins: RawPluginsConfig,

    #[serde(default)]
    pub logging: RawLoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPluginsConfig {
    /// Directories searched for dynamic-library plugins
    pub dirs: Option<Vec<PathBuf>>,

    /// Plugin identifiers loaded at startup, in order
    pub autoload: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NeuroConfig {
    #[serde(default)]
    pub plugins: PluginsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PluginsConfig {
    pub dirs: Vec<PathBuf>,
    pub autoload: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Log filter used when none is configured
pub const DEFAULT_LOG_FILTER: &str = "info";
