//! `byda-organiser` binary: argument parsing and runtime wiring.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use byda_runtime::{
    ConsoleNotifier, JsonMailboxSource, OrganiserConfig, OrganiserRuntime, PlainTextExtractor,
};

/// Organises BYDA dig-job referral mail into per-job workspaces and tracks
/// which jobs have received every expected provider plan.
#[derive(Debug, Parser)]
#[command(name = "byda-organiser", version)]
struct Cli {
    /// Mailbox export directory containing mailbox.json.
    #[arg(long, value_name = "DIR")]
    mailbox: PathBuf,

    /// Directory that receives per-job workspaces.
    #[arg(long, value_name = "DIR")]
    target_dir: PathBuf,

    /// Processed-job ledger file. Defaults to config.ini inside the target
    /// directory.
    #[arg(long, value_name = "FILE")]
    ledger: Option<PathBuf>,

    /// Seconds between sweeps.
    #[arg(long, default_value_t = 900)]
    sweep_interval_seconds: u64,

    /// How many days back to scan for referral messages.
    #[arg(long, default_value_t = 14)]
    lookback_days: i64,

    /// Run a single sweep and exit.
    #[arg(long)]
    once: bool,

    /// URL probed once at startup to confirm connectivity.
    #[arg(long, default_value = "http://www.google.com.au")]
    probe_url: String,

    /// Skip the startup connectivity probe.
    #[arg(long)]
    skip_probe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.lookback_days <= 0 {
        bail!("--lookback-days must be positive");
    }

    let source = JsonMailboxSource::open(&cli.mailbox)
        .with_context(|| format!("failed to open mailbox export {}", cli.mailbox.display()))?;
    std::fs::create_dir_all(&cli.target_dir)
        .with_context(|| format!("failed to create {}", cli.target_dir.display()))?;
    let ledger_path = cli
        .ledger
        .unwrap_or_else(|| cli.target_dir.join("config.ini"));

    let config = OrganiserConfig {
        target_dir: cli.target_dir,
        ledger_path,
        lookback_days: cli.lookback_days,
        sweep_interval: Duration::from_secs(cli.sweep_interval_seconds),
        sweep_once: cli.once,
        probe_url: (!cli.skip_probe).then_some(cli.probe_url),
        probe_timeout: Duration::from_secs(5),
    };

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("shutdown requested, finishing current sweep");
            let _ = cancel_tx.send(true);
        }
    });

    let mut runtime = OrganiserRuntime::new(
        config,
        Arc::new(source),
        Arc::new(PlainTextExtractor),
        Arc::new(ConsoleNotifier),
        cancel_rx,
    );
    runtime.run().await
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
