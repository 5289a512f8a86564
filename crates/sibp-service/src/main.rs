// crates/sibp-service/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sibp_prover::{
    ArtifactLayout, ConfiguredMode, EzklCli, ProofExecutor, ProvingEngine, StageDelays,
};
use sibp_service::{
    router, AppState, ChannelBroker, InMemoryStore, ResultStore, ServiceConfig,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "sibp-server",
    about = "sib-prover: async zkML proof generation service",
    long_about = "sib-prover service.\n\nAccepts daily-returns series over HTTP, dispatches proof jobs to a worker pool, and serves job status and results.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// HTTP bind address (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Execution mode: real or simulated (overrides EZKL_MODE)
    #[arg(long)]
    mode: Option<String>,

    /// Model artifact directory (overrides MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Worker-pool size (overrides WORKER_CONCURRENCY)
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = ServiceConfig::from_env();
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(mode) = cli.mode {
        config.mode = ConfiguredMode::parse(&mode);
    }
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers.max(1);
    }

    // Probe the toolchain once; availability is injected, never re-checked.
    let (engine, ezkl_version): (Option<Arc<dyn ProvingEngine>>, Option<String>) =
        match EzklCli::probe(EzklCli::DEFAULT_BINARY) {
            Some((ezkl, version)) => {
                info!(%version, "ezkl toolchain available");
                (Some(Arc::new(ezkl)), Some(version))
            }
            None => {
                warn!("ezkl toolchain not found; simulated mode regardless of EZKL_MODE");
                (None, None)
            }
        };

    let executor = Arc::new(ProofExecutor::new(
        config.mode,
        engine.clone(),
        ArtifactLayout::new(&config.model_dir),
        StageDelays::standard(),
    ));
    let effective_mode = executor.effective_mode();

    let store: Arc<dyn ResultStore> = Arc::new(InMemoryStore::new(config.result_expires));
    let (broker, consumer) = ChannelBroker::new();
    let _workers = sibp_service::spawn_workers(
        config.workers,
        consumer,
        Arc::clone(&store),
        executor,
        config.soft_time_limit,
        config.hard_time_limit,
    );

    let app = router(AppState {
        store,
        broker: Arc::new(broker),
        broker_url: config.broker_url.clone(),
        ezkl_available: engine.is_some(),
        ezkl_version,
        effective_mode,
    });

    info!(
        bind = %config.bind_addr,
        mode = %effective_mode,
        workers = config.workers,
        model_dir = %config.model_dir.display(),
        "sib-prover listening"
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
