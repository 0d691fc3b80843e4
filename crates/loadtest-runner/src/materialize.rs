//! Turning templates and fallbacks into concrete operations.
//!
//! Templates are shared by every worker and never modified. Each
//! execution clones the template's documents and substitutes placeholder
//! tokens in the clone.

use crate::buffer::DocumentBuffer;
use crate::config::RunConfig;
use crate::database::Operation;
use crate::workload::{CollectionTarget, Workload};
use loadtest_generator::{generate_value, DocumentGenerator};
use rand::rngs::StdRng;
use rand::Rng;
use workload_core::{Document, FieldKind, FieldSpec, OperationKind, Placeholder, QueryTemplate, Value};

/// Exclusive upper bound for `<int>` values with no matching schema field.
pub const DEFAULT_INT_PLACEHOLDER_MAX: i32 = 1000;

/// Replace every placeholder token in `doc`, recursing into nested
/// documents and arrays.
///
/// A typed token under a key that names a schema field of the same kind is
/// generated from that field's spec, so `{"age": {"$gt": "<int>"}}` honors
/// the bounds of `age`. Operator keys (`$gt`, `$set`) do not extend the
/// field path.
pub fn substitute_placeholders(doc: &mut Document, generator: &DocumentGenerator, rng: &mut StdRng) {
    substitute_document(doc, "", generator, rng);
}

fn substitute_document(
    doc: &mut Document,
    path: &str,
    generator: &DocumentGenerator,
    rng: &mut StdRng,
) {
    for (key, value) in doc.iter_mut() {
        let child = if key.starts_with('$') {
            path.to_string()
        } else if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}.{key}")
        };
        substitute_value(value, &child, generator, rng);
    }
}

fn substitute_value(value: &mut Value, path: &str, generator: &DocumentGenerator, rng: &mut StdRng) {
    match value {
        Value::String(token) => {
            if let Some(placeholder) = Placeholder::parse(token) {
                *value = placeholder_value(placeholder, path, generator, rng);
            }
        }
        Value::Document(doc) => substitute_document(doc, path, generator, rng),
        Value::Array(items) => {
            for item in items.iter_mut() {
                substitute_value(item, path, generator, rng);
            }
        }
        _ => {}
    }
}

fn placeholder_value(
    placeholder: Placeholder,
    path: &str,
    generator: &DocumentGenerator,
    rng: &mut StdRng,
) -> Value {
    let Some(kind) = placeholder.field_kind() else {
        return generator.primary_key_value(rng);
    };

    if let Some(spec) = generator.field_spec(path).filter(|spec| spec.kind == kind) {
        return generate_value(spec, rng, generator.providers());
    }

    match kind {
        FieldKind::Int32 => Value::Int32(rng.gen_range(0..DEFAULT_INT_PLACEHOLDER_MAX)),
        _ => generate_value(&FieldSpec::new(kind), rng, generator.providers()),
    }
}

/// Filter used when a collection has no template for the drawn kind.
pub fn fallback_filter(generator: &DocumentGenerator) -> Document {
    let field = generator.collection().primary_filter_field();
    Document::new().with(field, Placeholder::PrimaryKey.token())
}

/// Builds operations for workers.
pub struct Materializer<'a> {
    workload: &'a Workload,
    config: &'a RunConfig,
    buffer: &'a DocumentBuffer,
}

impl<'a> Materializer<'a> {
    pub fn new(workload: &'a Workload, config: &'a RunConfig, buffer: &'a DocumentBuffer) -> Self {
        Self {
            workload,
            config,
            buffer,
        }
    }

    /// Build an operation of `kind` against the target at index `target`.
    ///
    /// Returns `None` for aggregate draws with no template and for
    /// transaction draws, which the caller runs separately.
    pub fn materialize(
        &self,
        kind: OperationKind,
        target: usize,
        rng: &mut StdRng,
    ) -> Option<Operation> {
        let collection = self.workload.targets().get(target)?;

        match kind {
            OperationKind::InsertOne => Some(Operation::InsertOne {
                namespace: collection.namespace.clone(),
                document: self.next_document(target, collection, rng),
            }),
            OperationKind::InsertMany => {
                let documents = (0..self.config.insert_batch_size.max(1))
                    .map(|_| self.next_document(target, collection, rng))
                    .collect();
                Some(Operation::InsertMany {
                    namespace: collection.namespace.clone(),
                    documents,
                })
            }
            OperationKind::Transaction => None,
            _ => match self.workload.random_template(target, kind, rng) {
                Some(template) => self.from_template(template, collection, rng),
                None => self.fallback(kind, collection, rng),
            },
        }
    }

    /// Build the operation an authored template describes. Insert and
    /// transaction templates produce nothing: inserts use generated
    /// documents.
    pub fn from_template(
        &self,
        template: &QueryTemplate,
        collection: &CollectionTarget,
        rng: &mut StdRng,
    ) -> Option<Operation> {
        let generator = &collection.generator;
        let namespace = collection.namespace.clone();

        let mut filter = template.filter.clone();
        substitute_placeholders(&mut filter, generator, rng);

        let operation = match template.operation {
            OperationKind::Find => {
                let limit = match template.limit {
                    Some(limit) if limit > 0 => limit,
                    _ => self.config.find_limit,
                };
                Operation::Find {
                    namespace,
                    filter,
                    projection: template.projection.clone(),
                    limit,
                    batch_size: self.config.find_batch_size,
                    single: self.config.use_find_one_for_limit_one && limit == 1,
                }
            }
            OperationKind::UpdateOne | OperationKind::UpdateMany => {
                let update = match &template.update {
                    Some(update) => {
                        let mut update = update.clone();
                        substitute_placeholders(&mut update, generator, rng);
                        update
                    }
                    None => generator.fallback_update(rng),
                };
                if template.operation == OperationKind::UpdateOne {
                    Operation::UpdateOne {
                        namespace,
                        filter,
                        update,
                        upsert: template.upsert,
                    }
                } else {
                    Operation::UpdateMany {
                        namespace,
                        filter,
                        update,
                        upsert: template.upsert,
                    }
                }
            }
            OperationKind::DeleteOne => Operation::DeleteOne { namespace, filter },
            OperationKind::DeleteMany => Operation::DeleteMany { namespace, filter },
            OperationKind::Aggregate => {
                let pipeline = template
                    .pipeline
                    .iter()
                    .map(|stage| {
                        let mut stage = stage.clone();
                        substitute_placeholders(&mut stage, generator, rng);
                        stage
                    })
                    .collect();
                Operation::Aggregate {
                    namespace,
                    pipeline,
                }
            }
            OperationKind::InsertOne | OperationKind::InsertMany | OperationKind::Transaction => {
                return None
            }
        };
        Some(operation)
    }

    fn fallback(
        &self,
        kind: OperationKind,
        collection: &CollectionTarget,
        rng: &mut StdRng,
    ) -> Option<Operation> {
        if kind == OperationKind::Aggregate {
            return None;
        }
        let mut template = QueryTemplate::new(collection.namespace.collection.clone(), kind)
            .with_filter(fallback_filter(&collection.generator));
        if matches!(kind, OperationKind::UpdateOne | OperationKind::UpdateMany) {
            template = template.with_update(collection.generator.fallback_update(rng));
        }
        self.from_template(&template, collection, rng)
    }

    fn next_document(&self, target: usize, collection: &CollectionTarget, rng: &mut StdRng) -> Document {
        self.buffer
            .try_take(target)
            .unwrap_or_else(|| collection.generator.generate(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadtest_generator::ProviderRegistry;
    use rand::SeedableRng;
    use std::sync::Arc;
    use workload_core::{normalize, CollectionSpec, OperationRatios};

    fn generator() -> DocumentGenerator {
        let spec = CollectionSpec::new("airline", "flights")
            .with_field("flight_id", FieldSpec::new(FieldKind::Int32).with_range(1.0, 100.0))
            .with_field("status", FieldSpec::new(FieldKind::String))
            .with_shard_key("flight_id");
        DocumentGenerator::new(spec, Arc::new(ProviderRegistry::builtin()))
    }

    fn workload(templates: Vec<QueryTemplate>) -> Workload {
        Workload::new(vec![CollectionTarget::new(generator())], templates).unwrap()
    }

    fn config() -> RunConfig {
        RunConfig::new(normalize(&OperationRatios::zero(), false))
    }

    #[test]
    fn test_placeholder_uses_field_bounds() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let mut filter = Document::new()
                .with("flight_id", Document::new().with("$gte", "<int>"));
            substitute_placeholders(&mut filter, &generator, &mut rng);

            let Some(Value::Document(range)) = filter.get("flight_id") else {
                panic!("expected range document");
            };
            if let Some(Value::Int32(n)) = range.get("$gte") {
                assert!((1..=100).contains(n), "out of bounds: {n}");
            } else {
                panic!("expected Int32");
            }
        }
    }

    #[test]
    fn test_placeholder_in_arrays_and_unknown_fields() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(42);
        let mut filter = Document::new().with(
            "tags",
            Document::new().with("$in", vec![Value::from("<string>"), Value::from("literal")]),
        );
        filter.insert("score", "<int>");
        substitute_placeholders(&mut filter, &generator, &mut rng);

        let tags = filter
            .get("tags")
            .and_then(|v| v.as_document())
            .and_then(|d| d.get("$in"))
            .and_then(|v| v.as_array())
            .unwrap();
        assert_ne!(tags[0].as_str(), Some("<string>"));
        assert_eq!(tags[1].as_str(), Some("literal"));

        if let Some(Value::Int32(n)) = filter.get("score") {
            assert!((0..DEFAULT_INT_PLACEHOLDER_MAX).contains(n));
        } else {
            panic!("expected Int32");
        }
    }

    #[test]
    fn test_pk_placeholder_uses_shard_key() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(42);
        let mut filter = fallback_filter(&generator);
        assert_eq!(filter.first_key(), Some("flight_id"));

        substitute_placeholders(&mut filter, &generator, &mut rng);
        assert!(matches!(filter.get("flight_id"), Some(Value::Int32(_))));
    }

    #[test]
    fn test_template_not_mutated() {
        let template = QueryTemplate::new("flights", OperationKind::Find)
            .with_filter(Document::new().with("flight_id", "<int>"));
        let workload = workload(vec![template.clone()]);
        let config = config();
        let buffer = DocumentBuffer::new(1, 0);
        let materializer = Materializer::new(&workload, &config, &buffer);
        let mut rng = StdRng::seed_from_u64(42);

        let op = materializer.materialize(OperationKind::Find, 0, &mut rng).unwrap();
        assert_eq!(workload.templates()[0].filter, template.filter);

        if let Operation::Find { filter, limit, single, .. } = op {
            assert!(matches!(filter.get("flight_id"), Some(Value::Int32(_))));
            assert_eq!(limit, config.find_limit);
            assert!(!single);
        } else {
            panic!("expected find");
        }
    }

    #[test]
    fn test_find_one_for_limit_one() {
        let mut template = QueryTemplate::new("flights", OperationKind::Find);
        template.limit = Some(1);
        let workload = workload(vec![template]);
        let config = config().with_find_options(5, 10, true);
        let buffer = DocumentBuffer::new(1, 0);
        let materializer = Materializer::new(&workload, &config, &buffer);
        let mut rng = StdRng::seed_from_u64(42);

        let op = materializer.materialize(OperationKind::Find, 0, &mut rng);
        assert!(matches!(op, Some(Operation::Find { limit: 1, single: true, .. })));
    }

    #[test]
    fn test_fallbacks_without_templates() {
        let workload = workload(Vec::new());
        let config = config().with_insert_batch_size(3);
        let buffer = DocumentBuffer::new(1, 0);
        let materializer = Materializer::new(&workload, &config, &buffer);
        let mut rng = StdRng::seed_from_u64(42);

        let update = materializer.materialize(OperationKind::UpdateOne, 0, &mut rng);
        if let Some(Operation::UpdateOne { filter, update, .. }) = update {
            assert!(filter.contains_key("flight_id"));
            assert!(update.contains_key("$set"));
        } else {
            panic!("expected updateOne");
        }

        let bulk = materializer.materialize(OperationKind::InsertMany, 0, &mut rng);
        if let Some(Operation::InsertMany { documents, .. }) = bulk {
            assert_eq!(documents.len(), 3);
        } else {
            panic!("expected insertMany");
        }

        assert!(materializer
            .materialize(OperationKind::Aggregate, 0, &mut rng)
            .is_none());
        assert!(materializer
            .materialize(OperationKind::Transaction, 0, &mut rng)
            .is_none());
    }
}
