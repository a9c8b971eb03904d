//! Shared test utilities for neuro-core integration tests

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use neuro_core::{FactoryLoader, HostEnvironment, NeuroCore};
use neuro_plugin_api::{
    DebugEvent, DebugLevel, EventKind, Plugin, PluginContext, PluginError, PluginManifest,
};

/// Something a [`Recorder`] was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init,
    Debug(DebugEvent),
    Quit,
    Stop,
}

/// Plugin that records every call and can be told to fail
#[derive(Clone)]
pub struct Recorder {
    name: String,
    kinds: Vec<EventKind>,
    fail_stop: bool,
    fail_debug: bool,
    fail_quit: bool,
    calls: Arc<Mutex<Vec<Call>>>,
}

#[allow(dead_code)]
impl Recorder {
    /// A recorder that handles and subscribes to `kinds`
    pub fn new(name: &str, kinds: &[EventKind]) -> Self {
        Self {
            name: name.to_string(),
            kinds: kinds.to_vec(),
            fail_stop: false,
            fail_debug: false,
            fail_quit: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn failing_debug(mut self) -> Self {
        self.fail_debug = true;
        self
    }

    pub fn failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Diagnostics received, in order
    pub fn diagnostics(&self) -> Vec<DebugEvent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Debug(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Error-severity diagnostics received, in order
    pub fn errors(&self) -> Vec<DebugEvent> {
        self.diagnostics()
            .into_iter()
            .filter(|event| event.level == DebugLevel::Error)
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Plugin for Recorder {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::named(self.name.clone())
    }

    fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        self.record(Call::Init);
        for kind in &self.kinds {
            ctx.subscribe(*kind)?;
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), PluginError> {
        self.record(Call::Stop);
        if self.fail_stop {
            return Err(PluginError::custom("stop refused"));
        }
        Ok(())
    }

    fn handles(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn on_debug(&self, event: &DebugEvent) -> Result<(), PluginError> {
        self.record(Call::Debug(event.clone()));
        if self.fail_debug {
            return Err(PluginError::custom("listener refused"));
        }
        Ok(())
    }

    fn on_quit(&self) -> Result<(), PluginError> {
        self.record(Call::Quit);
        if self.fail_quit {
            return Err(PluginError::custom("quit refused"));
        }
        Ok(())
    }
}

/// Host environment that counts exit requests instead of exiting
#[derive(Default)]
pub struct RecordingHost {
    exits: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingHost {
    pub fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }
}

impl HostEnvironment for RecordingHost {
    fn exit(&self) {
        self.exits.fetch_add(1, Ordering::SeqCst);
    }
}

/// Build a core whose loader knows each recorder under its plugin name
#[allow(dead_code)]
pub fn core_with(recorders: &[&Recorder]) -> (Arc<NeuroCore>, Arc<RecordingHost>) {
    let mut loader = FactoryLoader::with_builtins();
    for recorder in recorders {
        let recorder = (*recorder).clone();
        loader.register(recorder.name.clone(), move || Box::new(recorder.clone()));
    }
    let env = Arc::new(RecordingHost::default());
    let core = NeuroCore::builder()
        .loader(loader)
        .environment(env.clone())
        .build();
    (core, env)
}
