//! Per-collection document generator.

use crate::flights::{generate_flight_document, generate_flight_update};
use crate::generators::generate_value;
use crate::generators::uuid::generate_object_id;
use crate::providers::ProviderRegistry;
use rand::Rng;
use std::sync::Arc;
use workload_core::{CollectionSpec, Document, FieldSpec, Value};

/// Which document builder a collection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentShape {
    /// Every declared field generated independently
    #[default]
    Generic,
    /// Flight reference documents with cross-field consistency
    Flights,
}

/// Generates documents, fallback updates and key values for one collection.
///
/// The generator holds no RNG: callers pass their own so each worker
/// keeps an independent, seedable stream. It is cheap to clone and safe
/// to share across tasks.
#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    /// Collection schema
    collection: Arc<CollectionSpec>,
    shape: DocumentShape,
    /// Named providers consulted before type-based generation
    providers: Arc<ProviderRegistry>,
}

impl DocumentGenerator {
    /// Create a generic generator for the collection.
    pub fn new(collection: CollectionSpec, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            collection: Arc::new(collection),
            shape: DocumentShape::Generic,
            providers,
        }
    }

    pub fn with_shape(mut self, shape: DocumentShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn collection(&self) -> &CollectionSpec {
        &self.collection
    }

    pub fn shape(&self) -> DocumentShape {
        self.shape
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Generate one document covering every declared field.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Document {
        match self.shape {
            DocumentShape::Flights => generate_flight_document(&self.collection, rng, &self.providers),
            DocumentShape::Generic => self
                .collection
                .fields
                .iter()
                .map(|(name, spec)| (name.clone(), generate_value(spec, rng, &self.providers)))
                .collect(),
        }
    }

    /// Generate `count` documents.
    pub fn generate_batch<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<Document> {
        (0..count).map(|_| self.generate(rng)).collect()
    }

    /// Update document used when no template exists for the collection.
    ///
    /// Generic collections `$set` one randomly chosen field to a fresh
    /// value, or `updated_at` when there are no fields.
    pub fn fallback_update<R: Rng>(&self, rng: &mut R) -> Document {
        if self.shape == DocumentShape::Flights {
            return generate_flight_update(rng);
        }

        let fields = &self.collection.fields;
        let idx = rng.gen_range(0..fields.len().max(1));
        let set = match fields.iter().nth(idx) {
            Some((name, spec)) => {
                Document::new().with(name.clone(), generate_value(spec, rng, &self.providers))
            }
            None => Document::new().with("updated_at", rng.gen_range(0..=i64::MAX)),
        };
        Document::new().with("$set", set)
    }

    /// Look up a field spec by dotted path (`equipment.plane_type`).
    pub fn field_spec(&self, path: &str) -> Option<&FieldSpec> {
        let mut parts = path.split('.');
        let mut spec = self.collection.fields.get(parts.next()?)?;
        for part in parts {
            spec = spec.fields.get(part)?;
        }
        Some(spec)
    }

    /// A value for the primary filter field, or a fresh ObjectId when the
    /// field is not part of the schema.
    pub fn primary_key_value<R: Rng>(&self, rng: &mut R) -> Value {
        match self.field_spec(self.collection.primary_filter_field()) {
            Some(spec) => generate_value(spec, rng, &self.providers),
            None => generate_object_id(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use workload_core::FieldKind;

    fn users() -> CollectionSpec {
        CollectionSpec::new("app", "users")
            .with_field("user_id", FieldSpec::new(FieldKind::Int64).with_range(1.0, 500.0))
            .with_field("email", FieldSpec::new(FieldKind::String).with_provider("email"))
            .with_field(
                "address",
                FieldSpec::new(FieldKind::Object)
                    .with_field("city", FieldSpec::new(FieldKind::String).with_provider("city")),
            )
            .with_shard_key("user_id")
    }

    #[test]
    fn test_generate_covers_every_field() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = DocumentGenerator::new(users(), Arc::new(ProviderRegistry::builtin()));

        let doc = generator.generate(&mut rng);
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["address", "email", "user_id"]);
        assert!(doc.get("email").and_then(Value::as_str).unwrap().contains('@'));
    }

    #[test]
    fn test_deterministic_generation() {
        let generator = DocumentGenerator::new(users(), Arc::new(ProviderRegistry::builtin()));
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(
            generator.generate_batch(&mut rng1, 5),
            generator.generate_batch(&mut rng2, 5)
        );
    }

    #[test]
    fn test_seeded_generation_with_clock_fields() {
        let events = CollectionSpec::new("app", "events")
            .with_field("created_at", FieldSpec::new(FieldKind::Date))
            .with_field("ref", FieldSpec::new(FieldKind::ObjectId))
            .with_field("seq", FieldSpec::new(FieldKind::Int64).with_range(1.0, 1e9))
            .with_field("tag", FieldSpec::new(FieldKind::String).with_provider("word"));
        let generator = DocumentGenerator::new(events, Arc::new(ProviderRegistry::builtin()));
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        for _ in 0..10 {
            let mut a = generator.generate(&mut rng1);
            let mut b = generator.generate(&mut rng2);
            assert!(matches!(a.remove("created_at"), Some(Value::DateTime(_))));
            assert!(matches!(b.remove("created_at"), Some(Value::DateTime(_))));

            if let (Some(Value::ObjectId(x)), Some(Value::ObjectId(y))) =
                (a.remove("ref"), b.remove("ref"))
            {
                assert_eq!(x.bytes()[4..], y.bytes()[4..]);
            } else {
                panic!("Expected ObjectId values");
            }
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_fallback_update_sets_known_field() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = DocumentGenerator::new(users(), Arc::new(ProviderRegistry::builtin()));

        for _ in 0..20 {
            let update = generator.fallback_update(&mut rng);
            let set = update.get("$set").and_then(Value::as_document).unwrap();
            assert_eq!(set.len(), 1);
            let field = set.first_key().unwrap();
            assert!(generator.collection().fields.contains_key(field));
        }
    }

    #[test]
    fn test_fallback_update_without_fields() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = DocumentGenerator::new(
            CollectionSpec::new("app", "empty"),
            Arc::new(ProviderRegistry::builtin()),
        );
        let update = generator.fallback_update(&mut rng);
        let set = update.get("$set").and_then(Value::as_document).unwrap();
        assert!(matches!(set.get("updated_at"), Some(Value::Int64(_))));
    }

    #[test]
    fn test_primary_key_value() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = DocumentGenerator::new(users(), Arc::new(ProviderRegistry::builtin()));
        if let Value::Int64(id) = generator.primary_key_value(&mut rng) {
            assert!((1..=500).contains(&id));
        } else {
            panic!("Expected Int64 key");
        }

        let no_schema_key = DocumentGenerator::new(
            CollectionSpec::new("app", "events"),
            Arc::new(ProviderRegistry::builtin()),
        );
        assert!(matches!(
            no_schema_key.primary_key_value(&mut rng),
            Value::ObjectId(_)
        ));
    }

    #[test]
    fn test_nested_field_lookup() {
        let generator = DocumentGenerator::new(users(), Arc::new(ProviderRegistry::builtin()));
        assert!(generator.field_spec("address.city").is_some());
        assert!(generator.field_spec("address.zip").is_none());
    }
}
