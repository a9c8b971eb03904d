//! neuro-core: typed in-process event bus with plugin lifecycle
//!
//! This crate provides the core that independently loaded plugins plug into:
//!
//! - **Plugin management** - [`PluginHost`] loads, registers and stops plugins
//! - **Listener registry** - [`ListenerRegistry`] maps each [`EventKind`] to its bindings
//! - **Dispatch** - [`EventDispatcher`] fans events out synchronously under one re-entrant lock
//! - **Shutdown** - dispatching [`NeuroEvent::Quit`] stops every plugin and exits the host
//! - **Network** - [`NetworkBridge`] forwards requests and messages to a [`Transport`]
//! - **Configuration** - [`ConfigLoader`] merges user, project and explicit TOML files
//!
//! # Quick Start
//!
//! ```no_run
//! use neuro_core::{FactoryLoader, NeuroCore, NeuroEvent};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let core = NeuroCore::builder()
//!         .loader(FactoryLoader::with_builtins())
//!         .build();
//!
//!     // The built-in "log" plugin forwards diagnostics to tracing
//!     core.load("log")?;
//!     core.dispatch(&NeuroEvent::debug("app", "hello"))?;
//!
//!     // Stops every plugin, then exits the process
//!     core.dispatch(&NeuroEvent::Quit)?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      NeuroCore                        │
//! │  ┌────────────────────────────────┐ ┌──────────────┐ │
//! │  │           PluginHost           │ │ NetworkBridge│ │
//! │  │  PluginRegistry  PluginLoader  │ │  Transport   │ │
//! │  │  ListenerRegistry ◄─ Dispatcher│ └──────────────┘ │
//! │  └────────────────────────────────┘                  │
//! └──────────────────────────────────────────────────────┘
//!          ▲ CoreHandle (weak)          │ bindings
//!          │                            ▼
//!      ┌───────┐ ┌───────┐ ┌───────┐
//!      │plugin │ │plugin │ │plugin │
//!      └───────┘ └───────┘ └───────┘
//! ```

pub mod bus;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod network;
pub mod plugins;

// Re-export key types for convenience
pub use bus::{NeuroCore, NeuroCoreBuilder};
pub use config::{ConfigError, ConfigLoader, NeuroConfig};
pub use dispatch::EventDispatcher;
pub use error::{BindingError, DispatchError, NetworkError, NeuroError};
pub use host::{HostEnvironment, ProcessHost};
pub use network::{NetworkBridge, Transport};
pub use plugins::{
    CORE_SOURCE, ChainLoader, DylibLoader, FactoryLoader, ListenerBinding, ListenerRegistry,
    LogPlugin, PluginHandle, PluginHost, PluginInfo, PluginInitializationError, PluginLoader,
    PluginRegistry, PluginState, StopFailure, StopReport,
};

pub use neuro_plugin_api::{
    DebugEvent, DebugLevel, EventKind, NetworkMessage, NetworkRequest, NetworkResponse,
    NeuroEvent, Plugin, PluginContext, PluginError, PluginManifest,
};
