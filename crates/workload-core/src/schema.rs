//! Collection schemas used for document generation.
//!
//! Collection definition files are JSON, either a bare array of
//! definitions or an object wrapping them under `"collections"`.

use crate::value::Document;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema and template loading.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading a definition file
    #[error("Failed to read definition file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field type name is not recognised
    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    /// Collection not found among loaded definitions
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Definitions parsed but contained nothing usable
    #[error("No collection definitions found")]
    Empty,
}

// ============================================================================
// Field Types
// ============================================================================

/// Declared type of a generated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum FieldKind {
    Int32,
    Int64,
    Double,
    Decimal128,
    Bool,
    String,
    Date,
    Timestamp,
    ObjectId,
    Binary,
    Uuid,
    Regex,
    Array,
    Object,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Double => "double",
            FieldKind::Decimal128 => "decimal128",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Date => "date",
            FieldKind::Timestamp => "timestamp",
            FieldKind::ObjectId => "objectId",
            FieldKind::Binary => "binary",
            FieldKind::Uuid => "uuid",
            FieldKind::Regex => "regex",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        }
    }
}

impl FromStr for FieldKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "int" | "int32" | "integer" => FieldKind::Int32,
            "int64" | "long" => FieldKind::Int64,
            "double" | "float" => FieldKind::Double,
            "decimal" | "decimal128" => FieldKind::Decimal128,
            "bool" | "boolean" => FieldKind::Bool,
            "string" => FieldKind::String,
            "date" | "datetime" => FieldKind::Date,
            "timestamp" => FieldKind::Timestamp,
            "objectid" => FieldKind::ObjectId,
            "binary" | "bindata" => FieldKind::Binary,
            "uuid" => FieldKind::Uuid,
            "regex" => FieldKind::Regex,
            "array" => FieldKind::Array,
            "object" | "document" => FieldKind::Object,
            _ => return Err(SchemaError::UnknownFieldType(s.to_string())),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for FieldKind {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation rules for a single field.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Declared type
    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Named value provider, tried before type-based generation
    #[serde(default)]
    pub provider: Option<String>,

    /// Inclusive lower bound for numeric kinds
    #[serde(default)]
    pub min: Option<f64>,

    /// Upper bound for numeric kinds (inclusive for integers)
    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default, rename = "minLength")]
    pub min_length: Option<usize>,

    #[serde(default, rename = "maxLength")]
    pub max_length: Option<usize>,

    /// Fixed set of string values to pick from
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<String>,

    /// Element spec for arrays
    #[serde(default)]
    pub items: Option<Box<FieldSpec>>,

    /// Child fields for objects
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,

    /// Fixed array length
    #[serde(default, rename = "arraySize")]
    pub array_size: Option<usize>,
}

impl FieldSpec {
    /// Create a bare spec of the given kind.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            provider: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            enum_values: Vec::new(),
            items: None,
            fields: BTreeMap::new(),
            array_size: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_items(mut self, items: FieldSpec) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn with_array_size(mut self, size: usize) -> Self {
        self.array_size = Some(size);
        self
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Shard key declaration. Key order is significant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ShardConfig {
    pub key: Document,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IndexSpec {
    pub keys: Document,
}

/// A collection the workload targets.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CollectionSpec {
    pub database: String,

    #[serde(rename = "collection")]
    pub name: String,

    /// Field specs, iterated in name order
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,

    #[serde(default, rename = "shardConfig")]
    pub shard_config: Option<ShardConfig>,

    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionFile {
    Wrapped { collections: Vec<CollectionSpec> },
    Bare(Vec<CollectionSpec>),
    Single(CollectionSpec),
}

impl CollectionSpec {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            fields: BTreeMap::new(),
            shard_config: None,
            indexes: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn with_shard_key(mut self, field: impl Into<String>) -> Self {
        let key = Document::new().with(field, 1);
        self.shard_config = Some(ShardConfig { key, unique: false });
        self
    }

    /// `database.collection`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    /// Field used to build fallback filters: the first shard key field,
    /// otherwise `_id`.
    pub fn primary_filter_field(&self) -> &str {
        self.shard_config
            .as_ref()
            .and_then(|s| s.key.first_key())
            .unwrap_or("_id")
    }

    /// Parse a collection definition file.
    pub fn list_from_json_str(content: &str) -> Result<Vec<CollectionSpec>, SchemaError> {
        let parsed: CollectionFile = serde_json::from_str(content)?;
        Ok(match parsed {
            CollectionFile::Wrapped { collections } => collections,
            CollectionFile::Bare(list) => list,
            CollectionFile::Single(one) => vec![one],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLIGHTS: &str = r#"{
        "collections": [{
            "database": "airline",
            "collection": "flights",
            "fields": {
                "flight_id": {"type": "int", "min": 1, "max": 100},
                "tags": {"type": "array", "items": {"type": "string"}, "arraySize": 3},
                "crew": {"type": "object", "fields": {"pilot": {"type": "string", "provider": "name"}}}
            },
            "shardConfig": {"key": {"flight_id": 1, "_id": 1}}
        }]
    }"#;

    #[test]
    fn test_parse_wrapped_collections() {
        let specs = CollectionSpec::list_from_json_str(FLIGHTS).unwrap();
        assert_eq!(specs.len(), 1);
        let flights = &specs[0];
        assert_eq!(flights.namespace(), "airline.flights");
        assert_eq!(flights.primary_filter_field(), "flight_id");
        assert_eq!(flights.fields["flight_id"].kind, FieldKind::Int32);
        assert_eq!(flights.fields["tags"].array_size, Some(3));
        assert_eq!(
            flights.fields["crew"].fields["pilot"].provider.as_deref(),
            Some("name")
        );
    }

    #[test]
    fn test_parse_bare_array() {
        let specs = CollectionSpec::list_from_json_str(
            r#"[{"database": "d", "collection": "c", "fields": {}}]"#,
        )
        .unwrap();
        assert_eq!(specs[0].primary_filter_field(), "_id");
    }

    #[test]
    fn test_field_kind_aliases() {
        assert_eq!("long".parse::<FieldKind>().unwrap(), FieldKind::Int64);
        assert_eq!("ObjectId".parse::<FieldKind>().unwrap(), FieldKind::ObjectId);
        assert_eq!("boolean".parse::<FieldKind>().unwrap(), FieldKind::Bool);
        assert!("geometry".parse::<FieldKind>().is_err());
    }
}
