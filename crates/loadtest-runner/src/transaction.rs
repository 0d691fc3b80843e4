//! Multi-operation transactions.
//!
//! A transaction block runs 1..=`max_transaction_ops` operations on one
//! session, each against a randomly chosen collection. Any failing
//! operation aborts the whole block.

use crate::config::RunConfig;
use crate::database::{Operation, WorkloadDatabase};
use crate::error::DatabaseError;
use crate::materialize::Materializer;
use crate::selector::select_transaction_operation;
use crate::workload::Workload;
use rand::rngs::StdRng;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::debug;

/// Draw the operations of one transaction block. Aggregate and nested
/// transaction draws become finds.
pub fn plan_transaction(
    workload: &Workload,
    config: &RunConfig,
    materializer: &Materializer<'_>,
    rng: &mut StdRng,
) -> Vec<Operation> {
    let count = rng.gen_range(1..=config.max_transaction_ops.max(1));
    (0..count)
        .filter_map(|_| {
            let (target, _) = workload.random_target(rng);
            let kind = select_transaction_operation(&config.distribution, rng);
            materializer.materialize(kind, target, rng)
        })
        .collect()
}

/// Execute `operations` in order inside one transaction.
///
/// Commits only when every operation succeeds. On the first failure the
/// transaction is aborted and that failure returned.
pub async fn execute_transaction(
    database: &dyn WorkloadDatabase,
    operations: &[Operation],
) -> Result<(), DatabaseError> {
    let mut session = database.start_transaction().await?;

    for operation in operations {
        if let Err(e) = session.execute(operation).await {
            debug!("Aborting transaction after failed {}: {e}", operation.kind());
            if let Err(abort_err) = session.abort().await {
                debug!("Abort failed: {abort_err}");
            }
            return Err(e);
        }
    }

    session.commit().await
}

/// Plan and execute one transaction block, returning the time from start
/// to commit.
pub async fn run_transaction(
    database: &dyn WorkloadDatabase,
    workload: &Workload,
    config: &RunConfig,
    materializer: &Materializer<'_>,
    rng: &mut StdRng,
) -> Result<Duration, DatabaseError> {
    let operations = plan_transaction(workload, config, materializer, rng);
    let start = Instant::now();
    execute_transaction(database, &operations).await?;
    Ok(start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DocumentBuffer;
    use crate::database::Namespace;
    use crate::testing::MemoryDatabase;
    use crate::workload::CollectionTarget;
    use loadtest_generator::{DocumentGenerator, ProviderRegistry};
    use rand::SeedableRng;
    use std::sync::Arc;
    use workload_core::{normalize, CollectionSpec, Document, OperationKind, OperationRatios, Ratio};

    fn namespace() -> Namespace {
        Namespace::new("app", "users")
    }

    fn insert(n: i32) -> Operation {
        Operation::InsertOne {
            namespace: namespace(),
            document: Document::new().with("n", n),
        }
    }

    #[test]
    fn test_commit_applies_all_writes() {
        let db = MemoryDatabase::new();
        tokio_test::block_on(execute_transaction(&db, &[insert(1), insert(2)])).unwrap();

        assert_eq!(db.count(&namespace()), 2);
        assert_eq!(db.committed_transactions(), 1);
        assert_eq!(db.aborted_transactions(), 0);
    }

    #[tokio::test]
    async fn test_failure_aborts_whole_block() {
        let db = MemoryDatabase::new().failing_on(OperationKind::DeleteOne);
        let ops = vec![
            insert(1),
            insert(2),
            Operation::DeleteOne {
                namespace: namespace(),
                filter: Document::new().with("n", 1),
            },
        ];

        let result = execute_transaction(&db, &ops).await;
        assert!(result.is_err());
        assert_eq!(db.count(&namespace()), 0);
        assert_eq!(db.committed_transactions(), 0);
        assert_eq!(db.aborted_transactions(), 1);
    }

    #[test]
    fn test_plan_respects_max_ops() {
        let generator = DocumentGenerator::new(
            CollectionSpec::new("app", "users"),
            Arc::new(ProviderRegistry::builtin()),
        );
        let workload = Workload::new(vec![CollectionTarget::new(generator)], Vec::new()).unwrap();
        let ratios = OperationRatios {
            insert: Ratio::Pinned(100),
            ..OperationRatios::zero()
        };
        let config = RunConfig::new(normalize(&ratios, true)).with_transactions(true, 3);
        let buffer = DocumentBuffer::new(1, 0);
        let materializer = Materializer::new(&workload, &config, &buffer);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let plan = plan_transaction(&workload, &config, &materializer, &mut rng);
            assert!((1..=3).contains(&plan.len()));
            assert!(plan.iter().all(|op| op.kind() == OperationKind::InsertOne));
        }
    }
}
