//! Query templates and operation kinds.

use crate::schema::SchemaError;
use crate::value::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of database operation the workload issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "find")]
    Find,
    #[serde(rename = "insertOne", alias = "insert")]
    InsertOne,
    #[serde(rename = "insertMany")]
    InsertMany,
    #[serde(rename = "updateOne", alias = "update")]
    UpdateOne,
    #[serde(rename = "updateMany")]
    UpdateMany,
    #[serde(rename = "deleteOne", alias = "delete")]
    DeleteOne,
    #[serde(rename = "deleteMany")]
    DeleteMany,
    #[serde(rename = "aggregate")]
    Aggregate,
    #[serde(rename = "transaction")]
    Transaction,
}

impl OperationKind {
    /// All kinds, in report order.
    pub const ALL: [OperationKind; 9] = [
        OperationKind::Find,
        OperationKind::InsertOne,
        OperationKind::InsertMany,
        OperationKind::UpdateOne,
        OperationKind::UpdateMany,
        OperationKind::DeleteOne,
        OperationKind::DeleteMany,
        OperationKind::Aggregate,
        OperationKind::Transaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Find => "find",
            OperationKind::InsertOne => "insertOne",
            OperationKind::InsertMany => "insertMany",
            OperationKind::UpdateOne => "updateOne",
            OperationKind::UpdateMany => "updateMany",
            OperationKind::DeleteOne => "deleteOne",
            OperationKind::DeleteMany => "deleteMany",
            OperationKind::Aggregate => "aggregate",
            OperationKind::Transaction => "transaction",
        }
    }

    /// Position in [`OperationKind::ALL`], for array-indexed counters.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, OperationKind::InsertOne | OperationKind::InsertMany)
    }

    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            OperationKind::Find | OperationKind::Aggregate | OperationKind::Transaction
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query template as loaded from a queries file.
///
/// Filters, updates and pipelines may contain placeholder strings such
/// as `"<int>"` which are replaced with fresh values on every execution.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct QueryTemplate {
    /// Database name; defaults to the collection's database when absent
    #[serde(default)]
    pub database: Option<String>,

    pub collection: String,

    pub operation: OperationKind,

    #[serde(default)]
    pub filter: Document,

    #[serde(default)]
    pub update: Option<Document>,

    #[serde(default)]
    pub pipeline: Vec<Document>,

    #[serde(default)]
    pub projection: Option<Document>,

    #[serde(default)]
    pub limit: Option<i64>,

    #[serde(default)]
    pub upsert: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateFile {
    Wrapped { queries: Vec<QueryTemplate> },
    Bare(Vec<QueryTemplate>),
    Single(QueryTemplate),
}

impl QueryTemplate {
    pub fn new(collection: impl Into<String>, operation: OperationKind) -> Self {
        Self {
            database: None,
            collection: collection.into(),
            operation,
            filter: Document::new(),
            update: None,
            pipeline: Vec::new(),
            projection: None,
            limit: None,
            upsert: false,
        }
    }

    pub fn with_filter(mut self, filter: Document) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_update(mut self, update: Document) -> Self {
        self.update = Some(update);
        self
    }

    /// Parse a queries file.
    pub fn list_from_json_str(content: &str) -> Result<Vec<QueryTemplate>, SchemaError> {
        let parsed: TemplateFile = serde_json::from_str(content)?;
        Ok(match parsed {
            TemplateFile::Wrapped { queries } => queries,
            TemplateFile::Bare(list) => list,
            TemplateFile::Single(one) => vec![one],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_operation_aliases() {
        let kinds: Vec<OperationKind> =
            serde_json::from_str(r#"["insert", "insertMany", "updateOne", "find"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                OperationKind::InsertOne,
                OperationKind::InsertMany,
                OperationKind::UpdateOne,
                OperationKind::Find
            ]
        );
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in OperationKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_parse_templates() {
        let templates = QueryTemplate::list_from_json_str(
            r#"[
                {"collection": "flights", "operation": "find",
                 "filter": {"flight_id": "<int>"}, "limit": 5},
                {"database": "airline", "collection": "flights", "operation": "updateOne",
                 "filter": {"_id": "<pk>"}, "update": {"$inc": {"seats_available": 1}},
                 "upsert": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].database, None);
        assert_eq!(templates[0].limit, Some(5));
        assert_eq!(
            templates[0].filter.get("flight_id"),
            Some(&Value::String("<int>".to_string()))
        );
        assert!(templates[1].upsert);
        assert!(templates[1].update.is_some());
    }
}
