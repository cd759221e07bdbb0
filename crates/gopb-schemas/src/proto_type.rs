//! Schema-side type of a field.
//!
//! A [`ProtoType`] is the small tree the type mapping produces from a Go
//! type expression. Its `Display` form is the raw schema type token
//! (`repeated User`, `map<string, int>`); scalar aliasing (`int` to `int64`
//! and so on) is applied later by the schema emitter.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Resolved schema type of a field.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProtoType {
    /// A non-composite identifier, kept as its Go spelling (`int32`,
    /// `string`, `byte`).
    Scalar { name: String },

    /// A reference to a message, by the referenced declaration's name.
    Message { name: String },

    /// `time.Time`, carried as Unix seconds.
    Timestamp,

    Repeated { elem: Box<ProtoType> },

    Map {
        key: Box<ProtoType>,
        value: Box<ProtoType>,
    },

    /// A Go type with no schema counterpart (channels, functions,
    /// interfaces, generic instantiations, anonymous structs).
    Unknown,
}

/// Coarse classification of a field's type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    Plain,
    Repeated,
    Map,
    Time,
    Composite,
}

impl ProtoType {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::Scalar { name: name.into() }
    }

    pub fn message(name: impl Into<String>) -> Self {
        Self::Message { name: name.into() }
    }

    pub fn repeated(elem: ProtoType) -> Self {
        Self::Repeated {
            elem: Box::new(elem),
        }
    }

    pub fn map(key: ProtoType, value: ProtoType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Returns the type-class tag of this type.
    pub fn class(&self) -> TypeClass {
        match self {
            Self::Scalar { .. } | Self::Unknown => TypeClass::Plain,
            Self::Message { .. } => TypeClass::Composite,
            Self::Timestamp => TypeClass::Time,
            Self::Repeated { .. } => TypeClass::Repeated,
            Self::Map { .. } => TypeClass::Map,
        }
    }

    /// Names of all messages referenced by this type, directly or as
    /// element, key or value, in left-to-right order.
    pub fn referenced_messages(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_messages(&mut names);
        names
    }

    fn collect_messages<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Message { name } => names.push(name),
            Self::Repeated { elem } => elem.collect_messages(names),
            Self::Map { key, value } => {
                key.collect_messages(names);
                value.collect_messages(names);
            }
            Self::Scalar { .. } | Self::Timestamp | Self::Unknown => {}
        }
    }
}

impl fmt::Display for ProtoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { name } | Self::Message { name } => f.write_str(name),
            Self::Timestamp => f.write_str("int64"),
            Self::Repeated { elem } => write!(f, "repeated {elem}"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tokens() {
        assert_eq!(ProtoType::scalar("int32").to_string(), "int32");
        assert_eq!(ProtoType::Timestamp.to_string(), "int64");
        assert_eq!(
            ProtoType::repeated(ProtoType::message("User")).to_string(),
            "repeated User"
        );
        assert_eq!(
            ProtoType::map(ProtoType::scalar("string"), ProtoType::Unknown)
                .to_string(),
            "map<string, unknown>"
        );
    }

    #[test]
    fn test_class_follows_outer_shape() {
        assert_eq!(ProtoType::scalar("int").class(), TypeClass::Plain);
        assert_eq!(ProtoType::Unknown.class(), TypeClass::Plain);
        assert_eq!(ProtoType::message("Ext").class(), TypeClass::Composite);
        assert_eq!(ProtoType::Timestamp.class(), TypeClass::Time);
        assert_eq!(
            ProtoType::repeated(ProtoType::message("Ext")).class(),
            TypeClass::Repeated
        );
        assert_eq!(
            ProtoType::map(ProtoType::scalar("string"), ProtoType::Timestamp)
                .class(),
            TypeClass::Map
        );
    }

    #[test]
    fn test_referenced_messages_walks_nested_types() {
        let ty = ProtoType::map(
            ProtoType::message("Key"),
            ProtoType::repeated(ProtoType::message("Value")),
        );
        assert_eq!(ty.referenced_messages(), vec!["Key", "Value"]);
        assert!(ProtoType::Timestamp.referenced_messages().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let json =
            serde_json::to_string(&ProtoType::repeated(ProtoType::Timestamp))
                .unwrap();
        assert_eq!(
            json,
            r#"{"kind":"repeated","elem":{"kind":"timestamp"}}"#
        );
    }
}
