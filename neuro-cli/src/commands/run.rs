//! `neuro run` - host plugins until Ctrl-C

use anyhow::Result;
use clap::Args;

use neuro_core::{NeuroConfig, NeuroEvent};

use super::build_core;

#[derive(Args)]
pub struct RunArgs {
    /// Additional plugin to load after the configured autoload list
    #[arg(short, long = "plugin", value_name = "ID")]
    pub plugins: Vec<String>,
}

pub async fn run(args: RunArgs, config: NeuroConfig) -> Result<()> {
    let core = build_core(&config);

    let mut loaded = 0;
    for id in startup_order(&config.plugins.autoload, &args.plugins) {
        // Failures are already logged and reported as diagnostics
        if core.load(&id).is_ok() {
            loaded += 1;
        }
    }
    tracing::info!(loaded, "neuro running, press Ctrl-C to quit");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupted, shutting down");

    // Stops every plugin, then exits the process
    core.dispatch(&NeuroEvent::Quit)?;
    Ok(())
}

/// Autoload entries first, then command-line plugins, without repeats
fn startup_order(autoload: &[String], extra: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for id in autoload.iter().chain(extra) {
        if !order.contains(id) {
            order.push(id.clone());
        }
    }
    order
}
