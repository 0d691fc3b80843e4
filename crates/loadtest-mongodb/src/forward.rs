//! Forward conversion: workload value tree → BSON.

use bson::spec::BinarySubtype;
use bson::{Bson, DateTime as BsonDateTime, Decimal128};
use workload_core::{Document, Value};

/// Wrapper for BSON values that can be sent to MongoDB.
#[derive(Debug, Clone)]
pub struct BsonValue(pub Bson);

impl BsonValue {
    /// Get the inner BSON value.
    pub fn into_inner(self) -> Bson {
        self.0
    }

    /// Get a reference to the inner BSON value.
    pub fn as_inner(&self) -> &Bson {
        &self.0
    }
}

impl From<&Value> for BsonValue {
    fn from(value: &Value) -> Self {
        let bson = match value {
            Value::Null => Bson::Null,
            Value::Bool(b) => Bson::Boolean(*b),
            Value::Int32(i) => Bson::Int32(*i),
            Value::Int64(i) => Bson::Int64(*i),
            Value::Double(f) => Bson::Double(*f),

            // Unparseable decimals are kept as strings
            Value::Decimal(s) => match s.parse::<Decimal128>() {
                Ok(d) => Bson::Decimal128(d),
                Err(_) => Bson::String(s.clone()),
            },

            Value::String(s) => Bson::String(s.clone()),
            Value::DateTime(dt) => Bson::DateTime(BsonDateTime::from_chrono(*dt)),
            Value::Timestamp { time, increment } => Bson::Timestamp(bson::Timestamp {
                time: *time,
                increment: *increment,
            }),
            Value::ObjectId(oid) => Bson::ObjectId(bson::oid::ObjectId::from_bytes(oid.bytes())),
            Value::Binary(bytes) => Bson::Binary(bson::Binary {
                subtype: BinarySubtype::Generic,
                bytes: bytes.clone(),
            }),

            // UUID - MongoDB has native UUID binary subtype
            Value::Uuid(u) => Bson::Binary(bson::Binary {
                subtype: BinarySubtype::Uuid,
                bytes: u.as_bytes().to_vec(),
            }),

            Value::Regex { pattern, options } => Bson::RegularExpression(bson::Regex {
                pattern: pattern.clone(),
                options: options.clone(),
            }),
            Value::Array(items) => {
                Bson::Array(items.iter().map(|v| BsonValue::from(v).into_inner()).collect())
            }
            Value::Document(doc) => Bson::Document(to_bson_document(doc)),
        };
        BsonValue(bson)
    }
}

impl From<Value> for BsonValue {
    fn from(value: Value) -> Self {
        BsonValue::from(&value)
    }
}

/// Convert a document, keeping field order.
pub fn to_bson_document(doc: &Document) -> bson::Document {
    let mut out = bson::Document::new();
    for (key, value) in doc.iter() {
        out.insert(key, BsonValue::from(value).into_inner());
    }
    out
}
