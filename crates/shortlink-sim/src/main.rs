//! `shortlink-sim`: many writers racing for short tokens in one shared store.
//!
//! Spawns `WRITERS` tasks that each allocate `LINKS_PER_WRITER` links for
//! the same hint, then checks that no token was handed out twice and that
//! every token resolves to its own URL. Ctrl-C or SIGTERM cancels the
//! allocations still in flight and the partial run is reported.

mod sim;

use clap::Parser;
use futures::future::join_all;
use shortlink::{Allocator, MemoryStore, RandSource, Resolver, SeededRandom, SystemClock, ThreadRandom};
use sim::config::{CliArgs, SimConfig};
use sim::report::Report;
use sim::telemetry::init_telemetry;
use sim::writer::run_writer;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = SimConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let store = MemoryStore::new();
    let report = match config.seed {
        Some(seed) => simulate(&config, store.clone(), SeededRandom::new(seed), &shutdown).await?,
        None => simulate(&config, store.clone(), ThreadRandom, &shutdown).await?,
    };

    report.log_summary();
    report.verify(&Resolver::new(store.clone())).await?;
    tracing::info!(records = store.len(), "every allocated token is unique and resolves");
    Ok(())
}

async fn simulate<R>(
    config: &SimConfig,
    store: MemoryStore,
    rng: R,
    shutdown: &CancellationToken,
) -> anyhow::Result<Report>
where
    R: RandSource<u64> + Send + Sync + 'static,
{
    let allocator = Arc::new(Allocator::from_components(
        store,
        rng,
        SystemClock,
        config.allocator.clone(),
    ));
    let config = Arc::new(config.clone());

    let start = Instant::now();
    let writers = (0..config.writers).map(|id| {
        tokio::spawn(run_writer(
            id,
            Arc::clone(&allocator),
            Arc::clone(&config),
            shutdown.clone(),
        ))
    });

    let mut report = Report::default();
    for joined in join_all(writers).await {
        for outcome in joined? {
            report.record(outcome);
        }
    }
    report.elapsed = start.elapsed();
    Ok(report)
}

fn log_startup_info(config: &SimConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting simulation with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting simulation: {} writers x {} links ({} total) for hint `{}`",
            config.writers,
            config.links_per_writer,
            config.total_links(),
            config.hint
        );
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = shutdown.cancelled() => return,
    }

    tracing::info!("Shutdown signal received, cancelling in-flight allocations...");
    shutdown.cancel();
}
