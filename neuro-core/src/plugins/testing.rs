//! Test plugins shared by the unit tests in this crate

use parking_lot::Mutex;
use std::sync::Arc;

use neuro_plugin_api::{
    DebugEvent, EventKind, Plugin, PluginContext, PluginError, PluginManifest,
};

/// Configurable plugin that records every call it receives
#[derive(Clone)]
pub(crate) struct Probe {
    name: String,
    kinds: Vec<EventKind>,
    subscribe: bool,
    fail_init: bool,
    fail_stop: bool,
    fail_debug: bool,
    log: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kinds: Vec::new(),
            subscribe: false,
            fail_init: false,
            fail_stop: false,
            fail_debug: false,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advertise handlers for `kinds`
    pub(crate) fn handling(mut self, kinds: &[EventKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    /// Subscribe to every handled kind during `init`
    pub(crate) fn subscribing(mut self) -> Self {
        self.subscribe = true;
        self
    }

    pub(crate) fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub(crate) fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub(crate) fn failing_debug(mut self) -> Self {
        self.fail_debug = true;
        self
    }

    pub(crate) fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().push(entry.into());
    }
}

impl Plugin for Probe {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::named(self.name.clone())
    }

    fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        self.record("init");
        if self.fail_init {
            return Err(PluginError::custom("init refused"));
        }
        if self.subscribe {
            for kind in &self.kinds {
                ctx.subscribe(*kind)?;
            }
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), PluginError> {
        self.record("stop");
        if self.fail_stop {
            return Err(PluginError::custom("stop refused"));
        }
        Ok(())
    }

    fn handles(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn on_debug(&self, event: &DebugEvent) -> Result<(), PluginError> {
        self.record(format!("{}:{}", event.level, event.message));
        if self.fail_debug {
            return Err(PluginError::custom("listener refused"));
        }
        Ok(())
    }

    fn on_quit(&self) -> Result<(), PluginError> {
        self.record("quit");
        Ok(())
    }
}

/// Host environment that counts exit requests instead of exiting
#[derive(Default)]
pub(crate) struct RecordingHost {
    exits: std::sync::atomic::AtomicUsize,
}

impl RecordingHost {
    pub(crate) fn exits(&self) -> usize {
        self.exits.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl crate::host::HostEnvironment for RecordingHost {
    fn exit(&self) {
        self.exits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}
