//! String, binary and regex generators.

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use workload_core::{FieldSpec, Value};

/// Generate a string for a field without a provider.
///
/// Picks from `enum` when declared, otherwise produces `str-<n>`.
/// `minLength` pads with random alphanumerics and `maxLength` truncates.
pub fn generate_string<R: Rng + ?Sized>(spec: &FieldSpec, rng: &mut R) -> Value {
    if let Some(choice) = spec.enum_values.choose(rng) {
        return Value::String(choice.clone());
    }

    let mut text = format!("str-{}", rng.gen_range(0..100_000));
    if let Some(min) = spec.min_length {
        while text.len() < min {
            text.push(char::from(rng.sample(Alphanumeric)));
        }
    }
    if let Some(max) = spec.max_length {
        text.truncate(max);
    }
    Value::String(text)
}

/// Generate random bytes, `maxLength` long or 16 by default.
pub fn generate_binary<R: Rng + ?Sized>(spec: &FieldSpec, rng: &mut R) -> Value {
    let len = spec.max_length.unwrap_or(16);
    let bytes = (0..len).map(|_| rng.gen::<u8>()).collect();
    Value::Binary(bytes)
}

/// Generate a case-insensitive prefix regex.
pub fn generate_regex<R: Rng + ?Sized>(rng: &mut R) -> Value {
    Value::Regex {
        pattern: format!("^str-{}", rng.gen_range(0..100)),
        options: "i".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use workload_core::FieldKind;

    #[test]
    fn test_generate_plain_string() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_string(&FieldSpec::new(FieldKind::String), &mut rng);
        if let Value::String(s) = value {
            assert!(s.starts_with("str-"));
        } else {
            panic!("Expected String value");
        }
    }

    #[test]
    fn test_enum_choice() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut spec = FieldSpec::new(FieldKind::String);
        spec.enum_values = vec!["on-time".into(), "delayed".into()];

        for _ in 0..20 {
            let value = generate_string(&spec, &mut rng);
            let s = value.as_str().unwrap().to_string();
            assert!(s == "on-time" || s == "delayed");
        }
    }

    #[test]
    fn test_length_hints() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut spec = FieldSpec::new(FieldKind::String);
        spec.min_length = Some(20);
        spec.max_length = Some(24);

        let value = generate_string(&spec, &mut rng);
        let len = value.as_str().unwrap().len();
        assert!((20..=24).contains(&len));
    }

    #[test]
    fn test_generate_binary_len() {
        let mut rng = StdRng::seed_from_u64(42);
        if let Value::Binary(bytes) = generate_binary(&FieldSpec::new(FieldKind::Binary), &mut rng) {
            assert_eq!(bytes.len(), 16);
        } else {
            panic!("Expected Binary value");
        }
    }
}
