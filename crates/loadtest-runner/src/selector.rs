//! Weighted operation selection.

use rand::Rng;
use workload_core::{OperationBucket, OperationDistribution, OperationKind};

/// Share of update/delete draws that target a single document rather than
/// many. Shard-key-targeted single writes dominate real workloads.
pub const SINGLE_DOCUMENT_WRITE_PERCENT: u32 = 90;

/// Draw the next operation kind.
///
/// Draws `r` in `[0, 100)` and walks the buckets in order, picking the
/// first whose cumulative percentage exceeds `r`. Update and delete draws
/// then pick their single or bulk variant. Falls back to find when no
/// bucket matches.
pub fn select_operation<R: Rng + ?Sized>(
    distribution: &OperationDistribution,
    rng: &mut R,
) -> OperationKind {
    let r = rng.gen_range(0..100u32);
    let mut cumulative = 0;

    for (bucket, percent) in distribution.iter() {
        cumulative += percent;
        if r < cumulative {
            return resolve_bucket(bucket, rng);
        }
    }
    OperationKind::Find
}

fn resolve_bucket<R: Rng + ?Sized>(bucket: OperationBucket, rng: &mut R) -> OperationKind {
    match bucket {
        OperationBucket::Find => OperationKind::Find,
        OperationBucket::Update => {
            if single_document(rng) {
                OperationKind::UpdateOne
            } else {
                OperationKind::UpdateMany
            }
        }
        OperationBucket::Delete => {
            if single_document(rng) {
                OperationKind::DeleteOne
            } else {
                OperationKind::DeleteMany
            }
        }
        OperationBucket::Insert => OperationKind::InsertOne,
        OperationBucket::BulkInsert => OperationKind::InsertMany,
        OperationBucket::Aggregate => OperationKind::Aggregate,
        OperationBucket::Transaction => OperationKind::Transaction,
    }
}

fn single_document<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_range(0..100u32) < SINGLE_DOCUMENT_WRITE_PERCENT
}

/// Draw an operation for use inside a transaction: aggregate and nested
/// transactions become find.
pub fn select_transaction_operation<R: Rng + ?Sized>(
    distribution: &OperationDistribution,
    rng: &mut R,
) -> OperationKind {
    match select_operation(distribution, rng) {
        OperationKind::Aggregate | OperationKind::Transaction => OperationKind::Find,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use workload_core::{normalize, OperationRatios, Ratio};

    const DRAWS: usize = 100_000;

    fn frequencies(distribution: &OperationDistribution) -> HashMap<OperationKind, f64> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<OperationKind, usize> = HashMap::new();
        for _ in 0..DRAWS {
            *counts.entry(select_operation(distribution, &mut rng)).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(k, c)| (k, c as f64 * 100.0 / DRAWS as f64))
            .collect()
    }

    fn pct(freq: &HashMap<OperationKind, f64>, kinds: &[OperationKind]) -> f64 {
        kinds.iter().map(|k| freq.get(k).copied().unwrap_or(0.0)).sum()
    }

    #[test]
    fn test_mixed_workload_frequencies() {
        let ratios = OperationRatios {
            find: Ratio::Default(60),
            insert: Ratio::Default(10),
            update: Ratio::Default(20),
            delete: Ratio::Default(10),
            ..OperationRatios::zero()
        };
        let distribution = normalize(&ratios, false);
        assert_eq!(distribution.get(OperationBucket::Find), 60);
        assert_eq!(distribution.get(OperationBucket::Insert), 10);
        assert_eq!(distribution.get(OperationBucket::Update), 20);
        assert_eq!(distribution.get(OperationBucket::Delete), 10);

        let freq = frequencies(&distribution);
        let within = |actual: f64, expected: f64| (actual - expected).abs() <= 1.0;

        assert!(within(pct(&freq, &[OperationKind::Find]), 60.0));
        assert!(within(pct(&freq, &[OperationKind::InsertOne]), 10.0));
        assert!(within(
            pct(&freq, &[OperationKind::UpdateOne, OperationKind::UpdateMany]),
            20.0
        ));
        assert!(within(
            pct(&freq, &[OperationKind::DeleteOne, OperationKind::DeleteMany]),
            10.0
        ));
        assert_eq!(pct(&freq, &[OperationKind::Transaction]), 0.0);
        assert_eq!(pct(&freq, &[OperationKind::Aggregate]), 0.0);
    }

    #[test]
    fn test_single_vs_bulk_split() {
        let ratios = OperationRatios {
            update: Ratio::Pinned(100),
            ..OperationRatios::zero()
        };
        let freq = frequencies(&normalize(&ratios, false));
        let one = pct(&freq, &[OperationKind::UpdateOne]);
        assert!((one - 90.0).abs() <= 1.0, "updateOne share {one}");
    }

    #[test]
    fn test_every_bucket_reachable() {
        let ratios = OperationRatios {
            find: Ratio::Default(1),
            update: Ratio::Default(1),
            delete: Ratio::Default(1),
            insert: Ratio::Default(1),
            bulk_insert: Ratio::Default(1),
            aggregate: Ratio::Default(1),
            transaction: Ratio::Default(1),
        };
        let freq = frequencies(&normalize(&ratios, true));
        for kind in OperationKind::ALL {
            assert!(freq.contains_key(&kind), "{kind} never drawn");
        }
    }

    #[test]
    fn test_transaction_draws_exclude_aggregate() {
        let ratios = OperationRatios {
            aggregate: Ratio::Pinned(50),
            transaction: Ratio::Pinned(50),
            ..OperationRatios::zero()
        };
        let distribution = normalize(&ratios, true);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            assert_eq!(
                select_transaction_operation(&distribution, &mut rng),
                OperationKind::Find
            );
        }
    }
}
