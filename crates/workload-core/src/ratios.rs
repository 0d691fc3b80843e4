//! Operation ratio normalization.
//!
//! Users supply raw percentages for each operation bucket. A value the
//! user set explicitly (flag or environment) is *pinned* and kept as-is
//! when possible; values that only came from configuration defaults are
//! scaled to fill whatever share the pinned values leave over.

/// A raw ratio and whether the user pinned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    /// Value from configuration defaults or a config file
    Default(i64),
    /// Value explicitly set by the user
    Pinned(i64),
}

impl Ratio {
    /// Raw value with negatives clamped to zero.
    pub fn value(&self) -> i64 {
        match self {
            Ratio::Default(v) | Ratio::Pinned(v) => (*v).max(0),
        }
    }

    /// Value as supplied, negatives included.
    pub fn raw(&self) -> i64 {
        match self {
            Ratio::Default(v) | Ratio::Pinned(v) => *v,
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, Ratio::Pinned(_))
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::Default(0)
    }
}

/// Bucket the weighted selector draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationBucket {
    Find,
    Update,
    Delete,
    Insert,
    BulkInsert,
    Aggregate,
    Transaction,
}

impl OperationBucket {
    /// Selector walk order.
    pub const ALL: [OperationBucket; 7] = [
        OperationBucket::Find,
        OperationBucket::Update,
        OperationBucket::Delete,
        OperationBucket::Insert,
        OperationBucket::BulkInsert,
        OperationBucket::Aggregate,
        OperationBucket::Transaction,
    ];

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Raw user ratios, one per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationRatios {
    pub find: Ratio,
    pub update: Ratio,
    pub delete: Ratio,
    pub insert: Ratio,
    pub bulk_insert: Ratio,
    pub aggregate: Ratio,
    pub transaction: Ratio,
}

impl OperationRatios {
    pub fn zero() -> Self {
        Self::default()
    }

    fn as_array(&self) -> [Ratio; 7] {
        [
            self.find,
            self.update,
            self.delete,
            self.insert,
            self.bulk_insert,
            self.aggregate,
            self.transaction,
        ]
    }
}

/// Normalized integer percentages summing to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDistribution {
    percentages: [u32; 7],
}

impl OperationDistribution {
    pub fn get(&self, bucket: OperationBucket) -> u32 {
        self.percentages[bucket.index()]
    }

    pub fn total(&self) -> u32 {
        self.percentages.iter().sum()
    }

    /// Buckets paired with their percentage, in selector walk order.
    pub fn iter(&self) -> impl Iterator<Item = (OperationBucket, u32)> + '_ {
        OperationBucket::ALL.iter().map(|b| (*b, self.get(*b)))
    }
}

/// Normalize raw ratios into a distribution that sums to 100.
///
/// Pinned values are kept unless they alone exceed 100, in which case they
/// are scaled down proportionally and every default value becomes zero.
/// Otherwise default values are scaled into the remainder; when there are
/// none the remainder goes to find. Integer truncation error is added to
/// find. Transactions are forced to zero when disabled. When the raw
/// inputs sum to zero or less the whole distribution goes to find.
pub fn normalize(ratios: &OperationRatios, transactions_enabled: bool) -> OperationDistribution {
    let mut raw = ratios.as_array();
    if !transactions_enabled {
        raw[OperationBucket::Transaction.index()] = Ratio::Default(0);
    }

    let raw_total: i64 = raw.iter().map(Ratio::raw).sum();
    if raw_total <= 0 {
        let mut percentages = [0u32; 7];
        percentages[OperationBucket::Find.index()] = 100;
        return OperationDistribution { percentages };
    }

    let mut values: [i64; 7] = [0; 7];
    for (slot, ratio) in values.iter_mut().zip(raw.iter()) {
        *slot = ratio.value();
    }

    let pinned_total: i64 = raw
        .iter()
        .zip(values.iter())
        .filter(|(r, _)| r.is_pinned())
        .map(|(_, v)| *v)
        .sum();

    if pinned_total >= 100 {
        for (ratio, value) in raw.iter().zip(values.iter_mut()) {
            if !ratio.is_pinned() {
                *value = 0;
            } else if pinned_total > 100 {
                *value = *value * 100 / pinned_total;
            }
        }
    } else {
        let remaining = 100 - pinned_total;
        let default_total: i64 = raw
            .iter()
            .zip(values.iter())
            .filter(|(r, _)| !r.is_pinned())
            .map(|(_, v)| *v)
            .sum();

        if default_total > 0 {
            for (ratio, value) in raw.iter().zip(values.iter_mut()) {
                if !ratio.is_pinned() {
                    *value = *value * remaining / default_total;
                }
            }
        } else {
            values[OperationBucket::Find.index()] += remaining;
        }
    }

    let sum: i64 = values.iter().sum();
    values[OperationBucket::Find.index()] += 100 - sum;

    let mut percentages = [0u32; 7];
    for (out, v) in percentages.iter_mut().zip(values.iter()) {
        *out = (*v).clamp(0, 100) as u32;
    }
    OperationDistribution { percentages }
}
