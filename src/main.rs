//! Orchestrator binary
//!
//! Runs the DLQ manager and the orchestrator loop against the shared
//! data plane. Exit codes: 0 clean shutdown, 1 unrecoverable startup
//! failure, 130 interrupted by signal.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use swarmq::{Config, DlqManager, Orchestrator, RedisPool};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit code for signal-interrupted shutdown
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "orchestrator", version, about = "swarmq core orchestrator")]
struct Args {
    /// Configuration file; defaults are used when the file is absent
    #[arg(long, default_value = "config/orchestrator.yaml")]
    config: PathBuf,

    /// Log filter, e.g. `info` or `swarmq=debug`
    #[arg(long, env = "SWARMQ_LOG", default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(args).await {
        Ok(interrupted) => {
            if interrupted {
                ExitCode::from(EXIT_INTERRUPTED)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            // Startup failures abort the process
            error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> swarmq::Result<bool> {
    let config = if args.config.exists() {
        Config::from_file(&args.config).await?
    } else {
        info!("No config file at {:?}; using defaults", args.config);
        Config::from_env()?
    };
    let config = Arc::new(config);

    let redis = if config.redis.enabled {
        let pool = RedisPool::new(&config.redis).await?;
        pool.health_check().await?;
        pool
    } else {
        RedisPool::create_noop()
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let dlq = Arc::new(DlqManager::new(
        redis.clone(),
        config.dlq.clone(),
        config.models.active.clone(),
    ));
    let orchestrator = Arc::new(Orchestrator::new(redis.clone(), config.clone()));

    let dlq_task = {
        let dlq = dlq.clone();
        let rx = shutdown_rx.clone();
        tokio::spawn(async move { dlq.run(rx).await })
    };
    let orchestrator_task = {
        let orchestrator = orchestrator.clone();
        let rx = shutdown_rx;
        tokio::spawn(async move { orchestrator.run(rx).await })
    };

    info!("swarmq {} running; send SIGINT to stop", swarmq::VERSION);
    let interrupted = tokio::signal::ctrl_c().await.is_ok();

    let _ = shutdown_tx.send(true);
    let _ = dlq_task.await;
    let _ = orchestrator_task.await;
    redis.close().await?;

    info!("Shutdown complete");
    Ok(interrupted)
}
