//! Built-in `log` plugin: forwards diagnostic events to `tracing`

use neuro_plugin_api::{
    DebugEvent, DebugLevel, EventKind, Plugin, PluginContext, PluginError, PluginManifest,
};

#[derive(Debug, Default)]
pub struct LogPlugin;

impl LogPlugin {
    /// Identifier under which the plugin is registered with loaders
    pub const ID: &'static str = "log";
}

impl Plugin for LogPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest {
            name: Self::ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Writes diagnostic events to the tracing log".to_string(),
            ..Default::default()
        }
    }

    fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        ctx.subscribe(EventKind::Debug)
    }

    fn stop(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn handles(&self, kind: EventKind) -> bool {
        kind == EventKind::Debug
    }

    fn on_debug(&self, event: &DebugEvent) -> Result<(), PluginError> {
        match event.level {
            DebugLevel::Error => tracing::error!(source = %event.source, "{}", event.message),
            DebugLevel::Debug => tracing::debug!(source = %event.source, "{}", event.message),
        }
        Ok(())
    }
}
