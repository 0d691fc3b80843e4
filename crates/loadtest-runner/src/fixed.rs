//! Fixed mode: every template once, in file order, on a single worker.

use crate::error::Result;
use crate::pool::{RunContext, RunSummary};
use std::time::Instant;
use tracing::{debug, info};
use workload_core::OperationKind;

pub(crate) async fn run_fixed(ctx: &RunContext) -> Result<RunSummary> {
    let started = Instant::now();
    let materializer = ctx.materializer();
    let mut rng = ctx.config.rng_for(0);
    let mut executed = 0usize;
    let mut skipped = 0usize;

    for template in ctx.workload.templates() {
        if ctx.cancel.is_cancelled() {
            break;
        }
        if template.operation.is_insert() || template.operation == OperationKind::Transaction {
            debug!("Skipping {} template in fixed mode", template.operation);
            skipped += 1;
            continue;
        }

        let operation = ctx
            .workload
            .target_for(template)
            .and_then(|target| materializer.from_template(template, target, &mut rng));
        let Some(operation) = operation else {
            skipped += 1;
            continue;
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
        executed += 1;
    }

    info!("Fixed run executed {executed} queries, skipped {skipped}");
    Ok(RunSummary {
        stats: ctx.stats.clone(),
        runtime: started.elapsed(),
    })
}
