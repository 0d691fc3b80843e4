//! Date and timestamp value generators.

use chrono::{Duration, Utc};
use rand::Rng;
use workload_core::Value;

const HOURS_PER_YEAR: i64 = 365 * 24;

/// Generate a date within the past year, at hour resolution.
///
/// This is NOT deterministic - dates are relative to the current time.
pub fn generate_recent_date<R: Rng + ?Sized>(rng: &mut R) -> Value {
    let hours_ago = rng.gen_range(0..HOURS_PER_YEAR);
    Value::DateTime(Utc::now() - Duration::hours(hours_ago))
}

/// Generate an internal timestamp for the current second with a small
/// random increment. Only the increment comes from the RNG.
pub fn generate_timestamp<R: Rng + ?Sized>(rng: &mut R) -> Value {
    let time = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
    Value::Timestamp {
        time,
        increment: rng.gen_range(0..100),
    }
}
