//! NeuroCore - the bus facade plugins and hosts talk to

use std::sync::{Arc, Weak};

use neuro_plugin_api::{
    Core, CoreHandle, EventKind, NetworkMessage, NetworkRequest, NetworkResponse, NeuroEvent,
    Plugin, PluginError,
};

use crate::error::{BindingError, DispatchError, NetworkError};
use crate::host::{HostEnvironment, ProcessHost};
use crate::network::{NetworkBridge, Transport};
use crate::plugins::{
    FactoryLoader, ListenerBinding, PluginHandle, PluginHost, PluginInitializationError,
    PluginLoader, StopReport,
};

/// Owns the plugin host and the network bridge.
///
/// Always lives in an `Arc`; plugins receive a weak [`CoreHandle`] to it.
pub struct NeuroCore {
    host: PluginHost,
    network: NetworkBridge,
}

impl NeuroCore {
    pub fn builder() -> NeuroCoreBuilder {
        NeuroCoreBuilder::default()
    }

    pub fn host(&self) -> &PluginHost {
        &self.host
    }

    pub fn network(&self) -> &NetworkBridge {
        &self.network
    }

    pub fn load(&self, id: &str) -> Result<Arc<PluginHandle>, PluginInitializationError> {
        self.host.load(id)
    }

    pub fn add_plugin(&self, plugin: Box<dyn Plugin>) -> Arc<PluginHandle> {
        self.host.add_plugin(plugin)
    }

    pub fn add_listener(
        &self,
        plugin: &Arc<PluginHandle>,
        kind: EventKind,
    ) -> Result<ListenerBinding, BindingError> {
        self.host.add_listener(plugin, kind)
    }

    pub fn stop(&self, name: &str) -> Result<(), PluginError> {
        self.host.stop(name)
    }

    pub fn stop_all(&self) -> StopReport {
        self.host.stop_all()
    }

    pub fn quit(&self) {
        self.host.quit()
    }

    /// Dispatch an event synchronously. See [`PluginHost::dispatch`].
    pub fn dispatch(&self, event: &NeuroEvent) -> Result<(), DispatchError> {
        self.host.dispatch(event)
    }

    pub fn send_request(&self, request: NetworkRequest) -> Result<NetworkResponse, NetworkError> {
        self.network.send_request(request)
    }

    pub fn send_message(&self, message: NetworkMessage) -> Result<(), NetworkError> {
        self.network.send_message(message)
    }
}

impl Core for NeuroCore {
    fn dispatch(&self, event: NeuroEvent) -> Result<(), PluginError> {
        Ok(self.host.dispatch(&event)?)
    }

    fn send_request(&self, request: NetworkRequest) -> Result<NetworkResponse, PluginError> {
        Ok(self.network.send_request(request)?)
    }

    fn send_message(&self, message: NetworkMessage) -> Result<(), PluginError> {
        Ok(self.network.send_message(message)?)
    }
}

/// Builder for [`NeuroCore`].
///
/// Defaults: built-in plugins only, process exit on quit, no transport.
#[derive(Default)]
pub struct NeuroCoreBuilder {
    loader: Option<Box<dyn PluginLoader>>,
    environment: Option<Arc<dyn HostEnvironment>>,
    transport: Option<Arc<dyn Transport>>,
}

impl NeuroCoreBuilder {
    #[must_use]
    pub fn loader(mut self, loader: impl PluginLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    #[must_use]
    pub fn environment(mut self, environment: Arc<dyn HostEnvironment>) -> Self {
        self.environment = Some(environment);
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Arc<NeuroCore> {
        let loader = self
            .loader
            .unwrap_or_else(|| Box::new(FactoryLoader::with_builtins()));
        let environment = self
            .environment
            .unwrap_or_else(|| Arc::new(ProcessHost::new()));
        let network = self
            .transport
            .map(NetworkBridge::new)
            .unwrap_or_default();

        Arc::new_cyclic(|weak: &Weak<NeuroCore>| {
            let weak: Weak<dyn Core> = weak.clone();
            NeuroCore {
                host: PluginHost::new(loader, environment, CoreHandle::from_weak(weak)),
                network,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::{Probe, RecordingHost};
    use neuro_plugin_api::PluginContext;

    /// Dispatches a diagnostic through its core handle while handling Quit
    #[derive(Default)]
    struct Relay {
        core: Option<CoreHandle>,
    }

    impl Plugin for Relay {
        fn manifest(&self) -> neuro_plugin_api::PluginManifest {
            neuro_plugin_api::PluginManifest::named("relay")
        }

        fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
            self.core = Some(ctx.core());
            ctx.subscribe(EventKind::Quit)
        }

        fn stop(&self) -> Result<(), PluginError> {
            Ok(())
        }

        fn handles(&self, kind: EventKind) -> bool {
            kind == EventKind::Quit
        }

        fn on_quit(&self) -> Result<(), PluginError> {
            let core = self.core.as_ref().ok_or(PluginError::CoreUnavailable)?;
            core.dispatch(NeuroEvent::debug("relay", "goodbye"))
        }
    }

    fn core_with(loader: FactoryLoader) -> (Arc<NeuroCore>, Arc<RecordingHost>) {
        let env = Arc::new(RecordingHost::default());
        let core = NeuroCore::builder()
            .loader(loader)
            .environment(env.clone())
            .build();
        (core, env)
    }

    #[test]
    fn test_default_builder_loads_log_plugin() {
        let (core, _) = core_with(FactoryLoader::with_builtins());
        let handle = core.load("log").unwrap();
        assert_eq!(handle.name(), "log");
        assert!(!core.network().is_connected());
    }

    #[test]
    fn test_plugin_dispatches_through_core_handle() {
        let observer = Probe::new("observer")
            .handling(&[EventKind::Debug])
            .subscribing();
        let log = observer.log();
        let mut loader = FactoryLoader::new();
        loader.register("observer", move || Box::new(observer.clone()));
        loader.register("relay", || Box::new(Relay::default()));
        let (core, env) = core_with(loader);
        core.load("observer").unwrap();
        core.load("relay").unwrap();

        Core::dispatch(core.as_ref(), NeuroEvent::Quit).unwrap();

        assert!(log.lock().iter().any(|e| e == "DEBUG:goodbye"));
        assert!(core.host().registry().is_empty());
        assert_eq!(env.exits(), 1);
    }

    #[test]
    fn test_core_handle_outlived_by_plugin() {
        let (core, _) = core_with(FactoryLoader::new());
        let weak: Weak<dyn Core> = {
            let as_core: Arc<dyn Core> = core.clone();
            Arc::downgrade(&as_core)
        };
        let handle = CoreHandle::from_weak(weak);
        assert!(handle.is_attached());

        drop(core);

        assert!(matches!(
            handle.dispatch(NeuroEvent::Quit),
            Err(PluginError::CoreUnavailable)
        ));
    }

    #[test]
    fn test_network_without_transport() {
        let (core, _) = core_with(FactoryLoader::new());
        let result = Core::send_message(core.as_ref(), NetworkMessage::new("t", vec![]));
        assert!(matches!(result, Err(PluginError::Network(_))));
    }
}
