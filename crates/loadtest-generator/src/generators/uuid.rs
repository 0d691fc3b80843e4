//! UUID and ObjectId generators.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;
use workload_core::{ObjectId, Value};

/// Generate a random UUID v4 using the provided RNG.
pub fn generate_uuid_v4<R: Rng + ?Sized>(rng: &mut R) -> Value {
    // Generate 16 random bytes
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40; // Version 4
    bytes[8] = (bytes[8] & 0x3f) | 0x80; // Variant RFC 4122

    Value::Uuid(Uuid::from_bytes(bytes))
}

/// Generate an ObjectId: a 4-byte big-endian timestamp of the current
/// second followed by 8 random bytes.
pub fn generate_object_id<R: Rng + ?Sized>(rng: &mut R) -> Value {
    let mut bytes = [0u8; 12];
    let seconds = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    rng.fill(&mut bytes[4..]);
    Value::ObjectId(ObjectId::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_uuid_v4() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_uuid_v4(&mut rng);
        if let Value::Uuid(uuid) = value {
            assert_eq!(uuid.get_version_num(), 4);
        } else {
            panic!("Expected Uuid value");
        }
    }

    #[test]
    fn test_deterministic_uuid() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(generate_uuid_v4(&mut rng1), generate_uuid_v4(&mut rng2));
    }

    #[test]
    fn test_object_ids_differ() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = generate_object_id(&mut rng);
        let b = generate_object_id(&mut rng);
        assert_ne!(a, b);
    }
}
