//! maya-monitor: fleet monitor for maya database proxies.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        MAYA MONITOR                          │
//!   │                                                              │
//!   │  config ──▶ discovery ──▶ per-endpoint workers (bounded)     │
//!   │                              │                               │
//!   │                              ├─ probe   (MySQL SELECT 1)     │
//!   │                              ├─ fetch   (GET :management)    │
//!   │                              ├─ evaluate (exclusions, codes) │
//!   │                              └─ dispatch (alert CGI, GBK)    │
//!   │                                                              │
//!   │  Cross-cutting: tracing, timeouts, tagged outcomes           │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! One terminal pass per invocation; an external scheduler (cron or
//! similar) re-invokes the binary for each pass.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maya_monitor::config::{load_config, MonitorConfig};
use maya_monitor::discovery::lookup::CommandLookup;
use maya_monitor::monitor::Monitor;

#[derive(Parser)]
#[command(name = "maya-monitor")]
#[command(about = "Fleet monitor for maya database proxies", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "monitor.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    tracing::info!(
        proxies = config.proxies.len(),
        excluded = config.excluded_hosts.len(),
        alert_group = %config.alerting.alert_group,
        "maya-monitor starting"
    );

    let lookup = Arc::new(CommandLookup::new(&config.discovery));
    let monitor = match Monitor::new(&config, lookup) {
        Ok(monitor) => monitor,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling outstanding checks");
            let _ = shutdown_tx.send(());
        }
    });

    let summary = monitor.run(shutdown_rx).await;
    tracing::info!(
        run_id = %summary.run_id,
        resolved = summary.resolved,
        alive = summary.alive,
        alerts = summary.alerts_dispatched,
        dispatch_failures = summary.dispatch_failures,
        "run finished"
    );

    ExitCode::SUCCESS
}

fn init_tracing(config: &MonitorConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.observability.log_level)
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
