//! Array value generator.

use super::generate_value;
use crate::providers::ProviderRegistry;
use rand::Rng;
use workload_core::{FieldSpec, Value};

/// Element count used when no size hint is given: `[1, 5]`.
pub const DEFAULT_ARRAY_SIZE: (usize, usize) = (1, 5);

/// Pick the length of an array field.
///
/// A declared `arraySize` wins, then `minLength`/`maxLength`, then the
/// default range.
pub fn array_len<R: Rng + ?Sized>(spec: &FieldSpec, rng: &mut R) -> usize {
    if let Some(size) = spec.array_size.filter(|s| *s > 0) {
        return size;
    }
    let lo = spec.min_length.unwrap_or(DEFAULT_ARRAY_SIZE.0);
    let hi = spec.max_length.unwrap_or(DEFAULT_ARRAY_SIZE.1.max(lo));
    if lo >= hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

/// Generate an array, filling every slot from `items` or with a small
/// integer when no element spec is declared.
pub fn generate_array<R: Rng>(spec: &FieldSpec, rng: &mut R, providers: &ProviderRegistry) -> Value {
    let len = array_len(spec, rng);
    let items = (0..len)
        .map(|_| match &spec.items {
            Some(item_spec) => generate_value(item_spec, rng, providers),
            None => Value::Int32(rng.gen_range(0..1000)),
        })
        .collect();
    Value::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use workload_core::FieldKind;

    #[test]
    fn test_declared_size() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = FieldSpec::new(FieldKind::Array)
            .with_items(FieldSpec::new(FieldKind::Bool))
            .with_array_size(4);

        if let Value::Array(items) = generate_array(&spec, &mut rng, &ProviderRegistry::builtin()) {
            assert_eq!(items.len(), 4);
            assert!(items.iter().all(|v| matches!(v, Value::Bool(_))));
        } else {
            panic!("Expected Array value");
        }
    }

    #[test]
    fn test_default_size_and_filler() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = FieldSpec::new(FieldKind::Array);
        let providers = ProviderRegistry::builtin();

        for _ in 0..50 {
            if let Value::Array(items) = generate_array(&spec, &mut rng, &providers) {
                assert!((1..=5).contains(&items.len()));
                for item in items {
                    if let Value::Int32(v) = item {
                        assert!((0..1000).contains(&v));
                    } else {
                        panic!("Expected Int32 filler");
                    }
                }
            } else {
                panic!("Expected Array value");
            }
        }
    }

    #[test]
    fn test_length_hints() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut spec = FieldSpec::new(FieldKind::Array);
        spec.min_length = Some(7);
        spec.max_length = Some(9);

        for _ in 0..20 {
            assert!((7..=9).contains(&array_len(&spec, &mut rng)));
        }
    }
}
