//! Numeric value generators.

use rand::Rng;
use workload_core::Value;

/// Default upper bound for doubles and decimals (exclusive).
pub const DEFAULT_FLOAT_MAX: f64 = 1000.0;

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Generate a random 32-bit integer in `[min, max]`.
///
/// Bounds default to `0..=i32::MAX` and are clamped to the 32-bit range.
pub fn generate_int32<R: Rng + ?Sized>(rng: &mut R, min: Option<f64>, max: Option<f64>) -> Value {
    let lo = min.map_or(0, |v| v.clamp(i32::MIN as f64, i32::MAX as f64) as i32);
    let hi = max.map_or(i32::MAX, |v| v.clamp(i32::MIN as f64, i32::MAX as f64) as i32);
    let (lo, hi) = ordered(lo, hi);
    Value::Int32(rng.gen_range(lo..=hi))
}

/// Generate a random 64-bit integer in `[min, max]`, defaulting to `0..=i64::MAX`.
pub fn generate_int64<R: Rng + ?Sized>(rng: &mut R, min: Option<f64>, max: Option<f64>) -> Value {
    let lo = min.map_or(0, |v| v as i64);
    let hi = max.map_or(i64::MAX, |v| v as i64);
    let (lo, hi) = ordered(lo, hi);
    Value::Int64(rng.gen_range(lo..=hi))
}

/// Generate a random double in `[min, max)`, defaulting to `[0, 1000)`.
pub fn generate_double<R: Rng + ?Sized>(rng: &mut R, min: Option<f64>, max: Option<f64>) -> Value {
    let (lo, hi) = ordered(min.unwrap_or(0.0), max.unwrap_or(DEFAULT_FLOAT_MAX));
    Value::Double(lo + rng.gen::<f64>() * (hi - lo))
}

/// Generate a random decimal with 2 fractional digits.
///
/// The decimal is kept as a string so no precision is lost on the way
/// to the database.
pub fn generate_decimal<R: Rng + ?Sized>(rng: &mut R, min: Option<f64>, max: Option<f64>) -> Value {
    let (lo, hi) = ordered(min.unwrap_or(0.0), max.unwrap_or(DEFAULT_FLOAT_MAX));
    let value = lo + rng.gen::<f64>() * (hi - lo);
    Value::Decimal(format!("{value:.2}"))
}
