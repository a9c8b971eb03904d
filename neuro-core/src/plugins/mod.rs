//! Plugin system for neuro
//!
//! This module provides the infrastructure for loading and managing plugins:
//!
//! - [`PluginHost`]: loads and stops plugins, dispatches events, drives shutdown
//! - [`PluginRegistry`]: the set of active plugins
//! - [`ListenerRegistry`]: which plugins listen to which event kinds
//! - [`PluginLoader`]: resolves identifiers ([`FactoryLoader`], [`DylibLoader`], [`ChainLoader`])
//! - [`LogPlugin`]: built-in plugin that forwards diagnostics to `tracing`
//!
//! # Plugin Discovery
//!
//! Dynamic-library plugins are searched for in the configured plugin
//! directories, project directory first:
//! 1. Project plugins: `.neuro/plugins/`
//! 2. User plugins: `~/.config/neuro/plugins/`
//!
//! # Plugin Structure
//!
//! Each plugin directory should contain:
//! - `<name>.so` (or `.dylib`/`.dll`, optionally `lib`-prefixed) - the binary
//! - `config.toml` (optional) - plugin configuration
//!
//! # Example
//!
//! ```ignore
//! use neuro_core::plugins::{ChainLoader, DylibLoader, FactoryLoader, PluginHost};
//!
//! let loader = ChainLoader::new()
//!     .with(FactoryLoader::with_builtins())
//!     .with(DylibLoader::new(plugin_dirs));
//! let host = PluginHost::new(Box::new(loader), Arc::new(ProcessHost::new()), core);
//!
//! host.load("log")?;
//! host.dispatch(&NeuroEvent::debug("app", "ready"))?;
//! host.stop("log")?;
//! ```

mod error;
mod lifecycle;
mod listeners;
mod loader;
mod logger;
mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use error::PluginInitializationError;
pub use lifecycle::{CORE_SOURCE, PluginHost, PluginInfo, StopFailure, StopReport};
pub use listeners::{ListenerBinding, ListenerRegistry};
pub use loader::{ChainLoader, DylibLoader, FactoryLoader, PluginLoader};
pub use logger::LogPlugin;
pub use registry::{PluginHandle, PluginRegistry, PluginState};
