//! `neuro check` - smoke-test a single plugin

use anyhow::{Result, bail};
use clap::Args;

use neuro_core::NeuroConfig;

use super::build_core;

#[derive(Args)]
pub struct CheckArgs {
    /// Plugin identifier
    pub id: String,
}

pub fn run(args: CheckArgs, config: NeuroConfig) -> Result<()> {
    let core = build_core(&config);

    let handle = core.load(&args.id)?;
    let manifest = handle.manifest();
    println!("Plugin: {} v{}", manifest.name, manifest.version);
    if !manifest.description.is_empty() {
        println!("  {}", manifest.description);
    }
    if !manifest.author.is_empty() {
        println!("  Author: {}", manifest.author);
    }

    let kinds = core.host().listeners().kinds_for(handle.name());
    if kinds.is_empty() {
        println!("  Listens for: (nothing)");
    } else {
        let kinds: Vec<_> = kinds.iter().map(|k| k.as_str()).collect();
        println!("  Listens for: {}", kinds.join(", "));
    }

    if let Err(e) = core.stop(handle.name()) {
        bail!("Plugin '{}' failed to stop: {}", handle.name(), e);
    }
    println!("  Stopped cleanly");
    Ok(())
}
