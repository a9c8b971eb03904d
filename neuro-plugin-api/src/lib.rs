//! neuro-plugin-api - Plugin API for the NEURO event bus
//!
//! This crate provides the traits and types needed to write plugins for the
//! NEURO core. A plugin is initialized once, subscribes to the event kinds it
//! handles, receives events synchronously on the dispatching thread, and is
//! stopped once.
//!
//! # Example
//!
//! ```ignore
//! use neuro_plugin_api::{
//!     DebugEvent, EventKind, Plugin, PluginContext, PluginError, PluginManifest, export_plugin,
//! };
//!
//! #[derive(Default)]
//! pub struct MyPlugin;
//!
//! impl Plugin for MyPlugin {
//!     fn manifest(&self) -> PluginManifest {
//!         PluginManifest {
//!             name: "my-plugin".to_string(),
//!             version: "0.1.0".to_string(),
//!             ..Default::default()
//!         }
//!     }
//!
//!     fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
//!         ctx.subscribe(EventKind::Debug)
//!     }
//!
//!     fn stop(&self) -> Result<(), PluginError> {
//!         Ok(())
//!     }
//!
//!     fn handles(&self, kind: EventKind) -> bool {
//!         kind == EventKind::Debug
//!     }
//!
//!     fn on_debug(&self, event: &DebugEvent) -> Result<(), PluginError> {
//!         println!("[{}] {}", event.level, event.message);
//!         Ok(())
//!     }
//! }
//!
//! export_plugin!(MyPlugin);
//! ```

pub mod context;
pub mod error;
pub mod event;
pub mod network;
pub mod types;

pub use context::{Core, CoreHandle, PluginConfig, PluginContext};
pub use error::PluginError;
pub use event::{DebugEvent, DebugLevel, EventKind, NeuroEvent};
pub use network::{NetworkMessage, NetworkRequest, NetworkResponse};
pub use types::PluginManifest;

/// Current plugin API version. Plugins must match this exactly.
/// This is checked when loading plugins from dynamic libraries.
pub const API_VERSION: u32 = 1;

/// The core plugin trait - implement this to create a NEURO plugin.
///
/// `init` runs once, before the plugin is shared with the bus; everything
/// after it takes `&self` because handlers may be invoked from any thread
/// that dispatches. Plugins keep mutable state behind their own locks.
///
/// Event handlers default to no-ops. A plugin advertises which kinds it can
/// receive through [`Plugin::handles`]; subscribing to any other kind is a
/// bind failure.
pub trait Plugin: Send + Sync {
    /// Return plugin metadata
    fn manifest(&self) -> PluginManifest;

    /// Called once when the plugin is loaded. Request subscriptions here.
    fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError>;

    /// Called once when the plugin is stopped, after all of its listener
    /// bindings have been removed.
    fn stop(&self) -> Result<(), PluginError>;

    /// Whether this plugin has a handler for `kind`
    fn handles(&self, _kind: EventKind) -> bool {
        false
    }

    // ─── Event Handlers (default no-ops) ─────────────────────────────

    /// Called for every diagnostic event while subscribed to [`EventKind::Debug`]
    fn on_debug(&self, _event: &DebugEvent) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called when shutdown begins while subscribed to [`EventKind::Quit`].
    /// Delivery is best-effort: the host terminates right after.
    fn on_quit(&self) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Export a plugin type for dynamic loading.
///
/// This macro generates the C ABI entry points that the core's dynamic
/// library loader looks up.
///
/// # Usage
///
/// ```ignore
/// neuro_plugin_api::export_plugin!(MyPlugin);
/// ```
///
/// # Generated Functions
///
/// - `_neuro_plugin_create()`: Creates a new plugin instance
/// - `_neuro_plugin_api_version()`: Returns the API version
/// - `_neuro_plugin_destroy()`: Destroys a plugin instance
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _neuro_plugin_create() -> *mut dyn $crate::Plugin {
            let plugin: Box<dyn $crate::Plugin> = Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _neuro_plugin_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _neuro_plugin_destroy(ptr: *mut dyn $crate::Plugin) {
            if !ptr.is_null() {
                unsafe {
                    drop(Box::from_raw(ptr));
                }
            }
        }
    };
}
