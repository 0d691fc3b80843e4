//! Command-line interface for mongo-workload
//!
//! # Usage Examples
//!
//! ```bash
//! # Built-in flights workload against a local cluster
//! mongo-workload run --uri mongodb://localhost:27017
//!
//! # Configuration file with environment overrides
//! PLGM_CONCURRENCY=32 PLGM_FIND_PERCENT=90 mongo-workload run --config config.yaml
//!
//! # Run every query template once
//! mongo-workload run --config config.yaml --duration 0
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use loadtest_mongodb::MongoDatabase;
use loadtest_runner::{run_workload, seed_collections, MemoryDatabase, WorkloadDatabase};
use mongo_workload::{banner, AppConfig, Catalog, RunOpts};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use workload_core::normalize;

#[derive(Parser)]
#[command(name = "mongo-workload")]
#[command(about = "A configurable workload generator for MongoDB clusters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the configured collections and run the workload
    Run {
        #[command(flatten)]
        opts: RunOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { opts } => {
            let mut config = AppConfig::load(opts.config.as_deref())?;
            config.apply_opts(&opts);
            config.apply_defaults();

            init_tracing(config.debug_mode);
            run_load(config, &opts).await?;
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_load(config: AppConfig, opts: &RunOpts) -> anyhow::Result<()> {
    let distribution = normalize(&config.ratios(opts), config.use_transactions);
    let run_config = config.run_config(distribution)?;

    let workload = Catalog::load(&config)
        .context("Failed to load workload definitions")?
        .into_workload()?;

    banner::log_configuration(&config, &run_config, &workload, opts.dry_run);

    let database: Arc<dyn WorkloadDatabase> = if opts.dry_run {
        Arc::new(MemoryDatabase::new())
    } else {
        Arc::new(
            MongoDatabase::connect(&config.uri, config.call_policy())
                .await
                .context("Failed to connect to MongoDB")?,
        )
    };

    if !config.skip_seed && config.documents_count > 0 {
        seed_collections(
            database.as_ref(),
            &workload,
            &run_config,
            config.documents_count,
            config.seed_batch_size,
        )
        .await
        .context("Seeding failed")?;
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping workers");
            interrupt.cancel();
        }
    });

    run_workload(database, workload, run_config, cancel).await?;
    Ok(())
}
