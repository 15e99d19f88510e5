use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sourced::commands::{self, Cli, Context};
use sourced::compose::Compose;
use sourced::config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

/// Logs go to stderr so they never interleave with the banner or spinner.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let home = config::home_dir()?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config::config_path(&home));
    let cfg = config::load(&config_path)?;

    let workdir = cli
        .workdir
        .clone()
        .or_else(|| cfg.workdir.as_ref().map(Into::into));
    let compose = Compose::new(&cfg.compose_command, home, workdir)?;

    let ctx = Context {
        config: cfg,
        orchestrator: Arc::new(compose),
    };
    commands::execute(&cli.command, &ctx)
}
