//! Schema-driven document generator for mongo-workload.
//!
//! This crate turns [`CollectionSpec`](workload_core::CollectionSpec)s into
//! documents. Values come from the schema and a caller-supplied RNG,
//! except dates, timestamps and ObjectId prefixes, which are anchored to
//! the current time. Seeded runs reproduce the same data apart from those
//! clock-derived values; the RNG draws they make do not depend on the clock.
//!
//! # Architecture
//!
//! ```text
//! CollectionSpec (JSON)
//!        │
//!        ▼
//! ┌────────────────────┐      ┌──────────────────┐
//! │ DocumentGenerator  │─────▶│ ProviderRegistry │  "email", "city", "gate", ...
//! │                    │      └──────────────────┘
//! │  - collection      │
//! │  - shape           │──── Flights ──▶ flights::generate_flight_document
//! └─────────┬──────────┘
//!           │ Generic
//!           ▼
//!   generators::generate_value  (dispatch on FieldKind)
//! ```
//!
//! # Example
//!
//! ```rust
//! use loadtest_generator::{DocumentGenerator, ProviderRegistry};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::sync::Arc;
//! use workload_core::{CollectionSpec, FieldKind, FieldSpec};
//!
//! let users = CollectionSpec::new("app", "users")
//!     .with_field("email", FieldSpec::new(FieldKind::String).with_provider("email"));
//!
//! let generator = DocumentGenerator::new(users, Arc::new(ProviderRegistry::builtin()));
//! let mut rng = StdRng::seed_from_u64(42);
//! let doc = generator.generate(&mut rng);
//! assert!(doc.contains_key("email"));
//! ```

pub mod flights;
pub mod generator;
pub mod generators;
pub mod providers;

// Re-exports for convenience
pub use generator::{DocumentGenerator, DocumentShape};
pub use generators::generate_value;
pub use providers::{ProviderFn, ProviderRegistry};
