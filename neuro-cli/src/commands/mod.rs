pub mod check;
pub mod run;

use std::sync::Arc;

use neuro_core::{ChainLoader, DylibLoader, FactoryLoader, NeuroConfig, NeuroCore, ProcessHost};

/// Core with the built-in plugins plus dynamic libraries from the configured dirs
pub fn build_core(config: &NeuroConfig) -> Arc<NeuroCore> {
    let loader = ChainLoader::new()
        .with(FactoryLoader::with_builtins())
        .with(DylibLoader::new(config.plugins.dirs.clone()));

    NeuroCore::builder()
        .loader(loader)
        .environment(Arc::new(ProcessHost::new()))
        .build()
}
