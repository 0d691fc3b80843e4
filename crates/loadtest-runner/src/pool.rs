//! The worker pool and its supporting tasks.
//!
//! A continuous run moves through `Idle -> Running -> Draining ->
//! Terminated`. Workers loop until the run token is cancelled, either by
//! the deadline task or by the caller. The reporter stops on a separate
//! token that is only cancelled once every worker has joined, so no
//! status line can follow the summary.

use crate::buffer::DocumentBuffer;
use crate::config::RunConfig;
use crate::database::WorkloadDatabase;
use crate::error::Result;
use crate::fixed::run_fixed;
use crate::materialize::Materializer;
use crate::selector::select_operation;
use crate::transaction::run_transaction;
use crate::workload::Workload;
use loadtest_stats::{format_status_header, format_status_line, format_summary, StatsCollector};
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use workload_core::OperationKind;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Draining,
    Terminated,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Draining => "draining",
            RunPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// State shared by every task of one run.
pub struct RunContext {
    pub workload: Workload,
    pub config: RunConfig,
    pub buffer: DocumentBuffer,
    pub stats: Arc<StatsCollector>,
    pub database: Arc<dyn WorkloadDatabase>,
    /// Cancelled when the run must stop
    pub cancel: CancellationToken,
}

impl RunContext {
    pub fn new(
        database: Arc<dyn WorkloadDatabase>,
        workload: Workload,
        config: RunConfig,
        cancel: CancellationToken,
    ) -> Self {
        let buffer = if config.is_fixed_mode() {
            DocumentBuffer::new(workload.targets().len(), 0)
        } else {
            DocumentBuffer::new(workload.targets().len(), config.insert_cache_size)
        };
        Self {
            workload,
            config,
            buffer,
            stats: Arc::new(StatsCollector::new()),
            database,
            cancel,
        }
    }

    pub fn materializer(&self) -> Materializer<'_> {
        Materializer::new(&self.workload, &self.config, &self.buffer)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: Arc<StatsCollector>,
    pub runtime: Duration,
}

/// Run the workload to completion and print the final summary.
///
/// With a zero duration every template runs once. Otherwise `concurrency`
/// workers run until the duration elapses or `cancel` fires.
pub async fn run_workload(
    database: Arc<dyn WorkloadDatabase>,
    workload: Workload,
    config: RunConfig,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    config.validate()?;

    let ctx = RunContext::new(database, workload, config, cancel.child_token());
    let summary = if ctx.config.is_fixed_mode() {
        run_fixed(&ctx).await?
    } else {
        run_continuous(Arc::new(ctx)).await?
    };

    println!("{}", format_summary(&summary.stats, summary.runtime));
    Ok(summary)
}

fn enter(phase: &mut RunPhase, next: RunPhase) {
    debug!("Run phase {phase} -> {next}");
    *phase = next;
}

async fn run_continuous(ctx: Arc<RunContext>) -> Result<RunSummary> {
    let mut phase = RunPhase::Idle;
    let started = Instant::now();
    let run_token = ctx.cancel.clone();
    let done = CancellationToken::new();

    let producers = ctx
        .buffer
        .spawn_producers(&ctx.workload, &ctx.config, &run_token);

    let reporter = ctx.config.report_status.then(|| {
        tokio::spawn(report_status(
            ctx.stats.clone(),
            ctx.config.status_interval,
            done.clone(),
        ))
    });

    let deadline = tokio::spawn({
        let token = run_token.clone();
        let duration = ctx.config.duration;
        async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => token.cancel(),
                _ = token.cancelled() => {}
            }
        }
    });

    enter(&mut phase, RunPhase::Running);
    info!(
        "Starting {} workers for {:?} across {} collections",
        ctx.config.concurrency,
        ctx.config.duration,
        ctx.workload.targets().len()
    );

    let workers: Vec<_> = (0..ctx.config.concurrency)
        .map(|worker_id| tokio::spawn(run_worker(ctx.clone(), worker_id)))
        .collect();

    run_token.cancelled().await;
    enter(&mut phase, RunPhase::Draining);

    let mut iterations = 0u64;
    for worker in workers {
        iterations += worker.await?;
    }
    done.cancel();

    for producer in producers {
        producer.await?;
    }
    if let Some(reporter) = reporter {
        reporter.await?;
    }
    deadline.await?;

    enter(&mut phase, RunPhase::Terminated);
    let runtime = started.elapsed();
    info!(
        "Workers finished {iterations} iterations in {:.2}s",
        runtime.as_secs_f64()
    );

    Ok(RunSummary {
        stats: ctx.stats.clone(),
        runtime,
    })
}

/// One worker loop. Returns the number of iterations it ran.
async fn run_worker(ctx: Arc<RunContext>, worker_id: usize) -> u64 {
    let mut rng = ctx.config.rng_for(worker_id as u64);
    let materializer = ctx.materializer();
    let mut iterations = 0u64;

    while !ctx.cancel.is_cancelled() {
        run_iteration(&ctx, &materializer, &mut rng).await;
        iterations += 1;
        tokio::task::yield_now().await;
    }

    debug!("Worker {worker_id} stopped after {iterations} iterations");
    iterations
}

async fn run_iteration(ctx: &RunContext, materializer: &Materializer<'_>, rng: &mut StdRng) {
    let (target, _) = ctx.workload.random_target(rng);
    let mut kind = select_operation(&ctx.config.distribution, rng);

    if kind == OperationKind::Transaction {
        if ctx.config.use_transactions {
            let result = run_transaction(
                ctx.database.as_ref(),
                &ctx.workload,
                &ctx.config,
                materializer,
                rng,
            )
            .await;
            match result {
                Ok(elapsed) => ctx.stats.record(OperationKind::Transaction, elapsed),
                Err(e) => {
                    debug!("Transaction failed: {e}");
                    ctx.stats.record_failure(OperationKind::Transaction);
                }
            }
            return;
        }
        kind = OperationKind::Find;
    }

    let Some(operation) = materializer.materialize(kind, target, rng) else {
        return;
    };

    let start = Instant::now();
    match ctx.database.execute(&operation).await {
        Ok(_) => ctx.stats.record(operation.kind(), start.elapsed()),
        Err(e) => {
            debug!(
                "{} on {} failed: {e}",
                operation.kind(),
                operation.namespace()
            );
            ctx.stats.record_failure(operation.kind());
        }
    }
}

/// Print one status line per interval until `done` fires.
async fn report_status(stats: Arc<StatsCollector>, interval: Duration, done: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    println!("{}", format_status_header());
    let mut previous = stats.counters();

    loop {
        tokio::select! {
            biased;
            _ = done.cancelled() => break,
            _ = ticker.tick() => {
                let current = stats.counters();
                println!("{}", format_status_line(&current.delta(&previous)));
                previous = current;
            }
        }
    }
}
