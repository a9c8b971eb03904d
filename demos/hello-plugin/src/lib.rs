//! Hello Plugin - A simple example plugin for neuro
//!
//! This plugin demonstrates:
//! - Basic plugin structure with the `export_plugin!` macro
//! - Subscribing to event kinds during `init`
//! - Reading per-plugin configuration
//! - Dispatching events back through the core handle
//! - Keeping state behind `&self` handlers
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Installing
//!
//! ```bash
//! mkdir -p ~/.config/neuro/plugins/hello
//! cp target/release/libhello_plugin.so ~/.config/neuro/plugins/hello/hello.so
//! neuro run --plugin hello
//! ```
//!
//! An optional `~/.config/neuro/plugins/hello/config.toml` may set
//! `greeting = "..."`.

use std::sync::atomic::{AtomicU32, Ordering};

use neuro_plugin_api::{
    CoreHandle, DebugEvent, DebugLevel, EventKind, NeuroEvent, Plugin, PluginContext,
    PluginError, PluginManifest, export_plugin,
};

/// Counts diagnostics by severity and answers "ping" with a greeting.
#[derive(Default)]
pub struct HelloPlugin {
    greeting: String,
    core: Option<CoreHandle>,
    debug_count: AtomicU32,
    error_count: AtomicU32,
}

impl Plugin for HelloPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest {
            name: "hello".to_string(),
            version: "0.1.0".to_string(),
            description: "A simple example plugin that counts diagnostics".to_string(),
            author: "neuro-team".to_string(),
            ..Default::default()
        }
    }

    fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        self.greeting = ctx
            .config_get::<String>("greeting")
            .unwrap_or_else(|| "Hello from the hello plugin!".to_string());
        self.core = Some(ctx.core());

        ctx.subscribe(EventKind::Debug)?;
        ctx.subscribe(EventKind::Quit)?;
        ctx.log_info("Hello plugin loaded!");
        Ok(())
    }

    fn stop(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn handles(&self, kind: EventKind) -> bool {
        matches!(kind, EventKind::Debug | EventKind::Quit)
    }

    fn on_debug(&self, event: &DebugEvent) -> Result<(), PluginError> {
        match event.level {
            DebugLevel::Debug => self.debug_count.fetch_add(1, Ordering::Relaxed),
            DebugLevel::Error => self.error_count.fetch_add(1, Ordering::Relaxed),
        };

        if event.source != "hello" && event.message == "ping" {
            let core = self.core.as_ref().ok_or(PluginError::CoreUnavailable)?;
            core.dispatch(NeuroEvent::debug("hello", self.greeting.clone()))?;
        }
        Ok(())
    }

    fn on_quit(&self) -> Result<(), PluginError> {
        eprintln!(
            "[hello] Saw {} debug and {} error diagnostics",
            self.debug_count.load(Ordering::Relaxed),
            self.error_count.load(Ordering::Relaxed)
        );
        Ok(())
    }
}

export_plugin!(HelloPlugin);
