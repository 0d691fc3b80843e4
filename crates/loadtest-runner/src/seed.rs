//! Initial data load before a run.

use crate::config::RunConfig;
use crate::database::{Operation, WorkloadDatabase};
use crate::error::{Result, RunnerError};
use crate::workload::Workload;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default number of documents per seeding `insertMany`.
pub const DEFAULT_SEED_BATCH_SIZE: usize = 1000;

/// Metrics from seeding one or more collections.
#[derive(Debug, Clone, Default)]
pub struct SeedMetrics {
    /// Number of documents inserted.
    pub documents_inserted: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent generating documents.
    pub generation_duration: Duration,
    /// Time spent inserting documents.
    pub insert_duration: Duration,
    /// Number of batches executed.
    pub batch_count: u64,
}

impl SeedMetrics {
    /// Calculate documents per second.
    pub fn documents_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.documents_inserted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Insert `count` generated documents into every collection of the
/// workload, `batch_size` at a time.
///
/// Any failed batch stops seeding with [`RunnerError::Seed`].
pub async fn seed_collections(
    database: &dyn WorkloadDatabase,
    workload: &Workload,
    config: &RunConfig,
    count: u64,
    batch_size: usize,
) -> Result<SeedMetrics> {
    let start_time = Instant::now();
    let mut metrics = SeedMetrics::default();
    let batch_size = if batch_size == 0 {
        DEFAULT_SEED_BATCH_SIZE
    } else {
        batch_size
    };
    let mut rng = config.rng_for(u64::MAX / 2);

    for target in workload.targets() {
        info!(
            "Seeding {} with {} documents (batch size: {})",
            target.namespace, count, batch_size
        );

        let mut remaining = count;
        while remaining > 0 {
            let batch_count = std::cmp::min(remaining, batch_size as u64);

            let gen_start = Instant::now();
            let documents = target.generator.generate_batch(&mut rng, batch_count as usize);
            metrics.generation_duration += gen_start.elapsed();

            let insert_start = Instant::now();
            database
                .execute(&Operation::InsertMany {
                    namespace: target.namespace.clone(),
                    documents,
                })
                .await
                .map_err(|source| RunnerError::Seed {
                    namespace: target.namespace.to_string(),
                    source,
                })?;
            metrics.insert_duration += insert_start.elapsed();

            metrics.documents_inserted += batch_count;
            metrics.batch_count += 1;
            remaining -= batch_count;

            debug!(
                "Batch {} complete: {} documents inserted, {} remaining",
                metrics.batch_count, batch_count, remaining
            );
        }
    }

    metrics.total_duration = start_time.elapsed();
    info!(
        "Seeded {} documents in {:.2}s ({:.0} docs/sec)",
        metrics.documents_inserted,
        metrics.total_duration.as_secs_f64(),
        metrics.documents_per_second()
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryDatabase;
    use crate::workload::CollectionTarget;
    use loadtest_generator::{DocumentGenerator, ProviderRegistry};
    use std::sync::Arc;
    use workload_core::{normalize, CollectionSpec, OperationKind, OperationRatios};

    fn workload() -> Workload {
        let providers = Arc::new(ProviderRegistry::builtin());
        let targets = ["users", "orders"]
            .into_iter()
            .map(|name| {
                CollectionTarget::new(DocumentGenerator::new(
                    CollectionSpec::new("app", name),
                    providers.clone(),
                ))
            })
            .collect();
        Workload::new(targets, Vec::new()).unwrap()
    }

    fn config() -> RunConfig {
        RunConfig::new(normalize(&OperationRatios::zero(), false)).with_seed(Some(42))
    }

    #[tokio::test]
    async fn test_seed_batches() {
        let db = MemoryDatabase::new();
        let workload = workload();

        let metrics = seed_collections(&db, &workload, &config(), 25, 10).await.unwrap();

        assert_eq!(metrics.documents_inserted, 50);
        assert_eq!(metrics.batch_count, 6);
        for target in workload.targets() {
            assert_eq!(db.count(&target.namespace), 25);
        }
    }

    #[tokio::test]
    async fn test_seed_failure_is_fatal() {
        let db = MemoryDatabase::new().failing_on(OperationKind::InsertMany);

        let result = seed_collections(&db, &workload(), &config(), 5, 10).await;
        assert!(matches!(result, Err(RunnerError::Seed { .. })));
    }
}
