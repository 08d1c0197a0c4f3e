//! combatd - run a combat script and print one JSON line per step

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use combatd::script::{run_script, Script};
use combatd::Config;

/// Encounter combat engine
#[derive(Parser, Debug)]
#[command(name = "combatd", version, about = "Run a tabletop combat script")]
struct Args {
    /// JSON script with a roster seed and steps to run
    script: PathBuf,

    /// Config file (defaults to ./combatd.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for initiative rolls, overriding the config file
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if args.seed.is_some() {
        config.dice_seed = args.seed;
    }

    // Logs go to stderr so stdout stays one JSON line per step
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&source)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    info!("Running {} step(s) from {}", script.steps.len(), args.script.display());
    let reports = run_script(&script, config).await?;

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    info!("Script finished, {} of {} step(s) failed", failed, reports.len());

    Ok(())
}
