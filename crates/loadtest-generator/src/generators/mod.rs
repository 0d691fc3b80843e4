//! Individual value generators for different field kinds.
//!
//! [`generate_value`] is the single entry point: it resolves a provider
//! through the registry when one is named, and otherwise dispatches on
//! the declared [`FieldKind`].

pub mod array;
pub mod numeric;
pub mod text;
pub mod timestamp;
pub mod uuid;

use crate::providers::ProviderRegistry;
use rand::Rng;
use workload_core::{Document, FieldKind, FieldSpec, Value};

/// Generate a value for a field spec.
///
/// Unknown provider names fall through to type-based generation.
pub fn generate_value<R: Rng>(spec: &FieldSpec, rng: &mut R, providers: &ProviderRegistry) -> Value {
    if let Some(provider) = spec.provider.as_deref().and_then(|name| providers.get(name)) {
        return provider(rng);
    }
    generate_typed(spec, rng, providers)
}

/// Generate a value purely from the declared kind.
pub fn generate_typed<R: Rng>(spec: &FieldSpec, rng: &mut R, providers: &ProviderRegistry) -> Value {
    match spec.kind {
        FieldKind::Int32 => numeric::generate_int32(rng, spec.min, spec.max),

        FieldKind::Int64 => numeric::generate_int64(rng, spec.min, spec.max),

        FieldKind::Double => numeric::generate_double(rng, spec.min, spec.max),

        FieldKind::Decimal128 => numeric::generate_decimal(rng, spec.min, spec.max),

        FieldKind::Bool => Value::Bool(rng.gen_bool(0.5)),

        FieldKind::String => text::generate_string(spec, rng),

        FieldKind::Date => timestamp::generate_recent_date(rng),

        FieldKind::Timestamp => timestamp::generate_timestamp(rng),

        FieldKind::ObjectId => uuid::generate_object_id(rng),

        FieldKind::Binary => text::generate_binary(spec, rng),

        FieldKind::Uuid => uuid::generate_uuid_v4(rng),

        FieldKind::Regex => text::generate_regex(rng),

        FieldKind::Array => array::generate_array(spec, rng, providers),

        FieldKind::Object => {
            if spec.fields.is_empty() {
                Value::Document(Document::new().with("nested_random", rng.gen_range(0..100i32)))
            } else {
                Value::Document(
                    spec.fields
                        .iter()
                        .map(|(name, child)| (name.clone(), generate_value(child, rng, providers)))
                        .collect(),
                )
            }
        }
    }
}
