//! Placeholder tokens embedded in query templates.
//!
//! A placeholder is a string value consisting of exactly one token such
//! as `"<int>"`. Matching is case-insensitive and ignores surrounding
//! whitespace. Any other string is a literal.

use crate::schema::FieldKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `<int>` / `<int32>`
    Int,
    /// `<int64>` / `<long>`
    Int64,
    Double,
    Decimal,
    String,
    Bool,
    Date,
    ObjectId,
    Uuid,
    /// `<pk>`: a value for the collection's primary filter field
    PrimaryKey,
}

impl Placeholder {
    /// Recognise a placeholder token.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let inner = token.strip_prefix('<')?.strip_suffix('>')?;
        let placeholder = match inner.to_ascii_lowercase().as_str() {
            "int" | "int32" => Placeholder::Int,
            "int64" | "long" => Placeholder::Int64,
            "double" => Placeholder::Double,
            "decimal" => Placeholder::Decimal,
            "string" => Placeholder::String,
            "bool" => Placeholder::Bool,
            "date" => Placeholder::Date,
            "objectid" => Placeholder::ObjectId,
            "uuid" => Placeholder::Uuid,
            "pk" => Placeholder::PrimaryKey,
            _ => return None,
        };
        Some(placeholder)
    }

    /// Field kind whose generator fills this placeholder, if any.
    pub fn field_kind(&self) -> Option<FieldKind> {
        match self {
            Placeholder::Int => Some(FieldKind::Int32),
            Placeholder::Int64 => Some(FieldKind::Int64),
            Placeholder::Double => Some(FieldKind::Double),
            Placeholder::Decimal => Some(FieldKind::Decimal128),
            Placeholder::String => Some(FieldKind::String),
            Placeholder::Bool => Some(FieldKind::Bool),
            Placeholder::Date => Some(FieldKind::Date),
            Placeholder::ObjectId => Some(FieldKind::ObjectId),
            Placeholder::Uuid => Some(FieldKind::Uuid),
            Placeholder::PrimaryKey => None,
        }
    }

    /// The canonical token text.
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Int => "<int>",
            Placeholder::Int64 => "<int64>",
            Placeholder::Double => "<double>",
            Placeholder::Decimal => "<decimal>",
            Placeholder::String => "<string>",
            Placeholder::Bool => "<bool>",
            Placeholder::Date => "<date>",
            Placeholder::ObjectId => "<objectId>",
            Placeholder::Uuid => "<uuid>",
            Placeholder::PrimaryKey => "<pk>",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(Placeholder::parse("<int>"), Some(Placeholder::Int));
        assert_eq!(Placeholder::parse(" <LONG> "), Some(Placeholder::Int64));
        assert_eq!(Placeholder::parse("<objectId>"), Some(Placeholder::ObjectId));
        assert_eq!(Placeholder::parse("<pk>"), Some(Placeholder::PrimaryKey));
    }

    #[test]
    fn test_literals_are_not_placeholders() {
        assert_eq!(Placeholder::parse("int"), None);
        assert_eq!(Placeholder::parse("<int> extra"), None);
        assert_eq!(Placeholder::parse("<unknown>"), None);
        assert_eq!(Placeholder::parse(""), None);
    }

    #[test]
    fn test_token_round_trip() {
        for p in [
            Placeholder::Int,
            Placeholder::Int64,
            Placeholder::Double,
            Placeholder::Decimal,
            Placeholder::String,
            Placeholder::Bool,
            Placeholder::Date,
            Placeholder::ObjectId,
            Placeholder::Uuid,
            Placeholder::PrimaryKey,
        ] {
            assert_eq!(Placeholder::parse(p.token()), Some(p));
        }
    }
}
