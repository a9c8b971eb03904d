use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{
    DEFAULT_LOG_FILTER, LoggingConfig, NeuroConfig, PluginsConfig, RawLoggingConfig,
    RawNeuroConfig, RawPluginsConfig,
};

/// Errors reading configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the neuro config directory.
///
/// Returns `$XDG_CONFIG_HOME/neuro` if set, otherwise `~/.config/neuro`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("neuro")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/neuro")
    } else {
        PathBuf::from(".config/neuro")
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + optional explicit file)
    pub fn load(explicit: Option<&Path>) -> Result<NeuroConfig, ConfigError> {
        let mut raw = RawNeuroConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Layer 3: Explicit file; must exist
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Load a single file with defaults applied; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<NeuroConfig, ConfigError> {
        if !path.exists() {
            return Ok(Self::finalize(RawNeuroConfig::default()));
        }
        Ok(Self::finalize(Self::read_raw(path)?))
    }

    pub fn user_config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with NEURO_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    fn project_dir() -> PathBuf {
        std::env::var("NEURO_PROJECT_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".neuro"))
    }

    /// Plugin directories used when none are configured: project, then user
    pub fn default_plugin_dirs() -> Vec<PathBuf> {
        vec![
            Self::project_dir().join("plugins"),
            config_dir().join("plugins"),
        ]
    }

    fn read_raw(path: &Path) -> Result<RawNeuroConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawNeuroConfig, overlay: RawNeuroConfig) -> RawNeuroConfig {
        RawNeuroConfig {
            plugins: RawPluginsConfig {
                dirs: overlay.plugins.dirs.or(base.plugins.dirs),
                autoload: overlay.plugins.autoload.or(base.plugins.autoload),
            },
            logging: RawLoggingConfig {
                filter: overlay.logging.filter.or(base.logging.filter),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawNeuroConfig) -> NeuroConfig {
        NeuroConfig {
            plugins: PluginsConfig {
                dirs: raw
                    .plugins
                    .dirs
                    .unwrap_or_else(Self::default_plugin_dirs),
                autoload: raw.plugins.autoload.unwrap_or_default(),
            },
            logging: LoggingConfig {
                filter: raw
                    .logging
                    .filter
                    .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            },
        }
    }
}
