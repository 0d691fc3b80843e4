//! Core types for the mongo-workload execution engine.
//!
//! This crate provides the foundational types shared by every other
//! crate in the workspace:
//!
//! - [`Value`] / [`Document`] - Ordered, database-neutral document values
//! - [`CollectionSpec`] / [`FieldSpec`] - Collection schemas used for generation
//! - [`QueryTemplate`] / [`OperationKind`] - Query templates loaded from JSON
//! - [`OperationRatios`] / [`OperationDistribution`] - Ratio normalization
//! - [`Placeholder`] - Placeholder tokens embedded in templates
//!
//! # Architecture
//!
//! ```text
//! workload-core (this crate)
//!    │
//!    ├─── loadtest-generator  (generates Values from FieldSpecs)
//!    ├─── loadtest-stats      (latency histograms keyed by OperationKind)
//!    ├─── loadtest-runner     (selector, materializer, worker pool)
//!    └─── loadtest-mongodb    (converts Values to BSON)
//! ```
//!
//! # Example
//!
//! ```rust
//! use workload_core::ratios::{normalize, OperationRatios, Ratio};
//!
//! let ratios = OperationRatios {
//!     find: Ratio::Default(60),
//!     update: Ratio::Default(20),
//!     delete: Ratio::Default(10),
//!     insert: Ratio::Default(10),
//!     ..OperationRatios::zero()
//! };
//! let distribution = normalize(&ratios, false);
//! assert_eq!(distribution.total(), 100);
//! ```

pub mod placeholder;
pub mod query;
pub mod ratios;
pub mod schema;
pub mod value;

// Re-exports for convenience
pub use placeholder::Placeholder;
pub use query::{OperationKind, QueryTemplate};
pub use ratios::{normalize, OperationBucket, OperationDistribution, OperationRatios, Ratio};
pub use schema::{CollectionSpec, FieldKind, FieldSpec, IndexSpec, SchemaError, ShardConfig};
pub use value::{Document, ObjectId, Value};
