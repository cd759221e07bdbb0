//! The resolved model: everything the emitters need from one Go file.
//!
//! Functions appear in extraction order and types in closure order, which
//! is breadth-first from the function fields (then the explicit root).
//! Both orders are deterministic for identical input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ProtoType, TypeClass};

/// Root of the model for one generation run.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
pub struct ResolvedModel {
    /// Name from the Go `package` clause.
    pub package: String,

    /// Exported functions selected for the service, in source order.
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,

    /// Struct declarations reachable from the functions (or requested
    /// explicitly), one per name, in emission order.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

/// One exported function, minus its context parameter and error results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FunctionDescriptor {
    pub name: String,

    /// Doc comment text, possibly spanning several lines.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    pub inputs: Vec<Field>,
    pub outputs: Vec<Field>,
}

/// One struct declaration that became a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    /// Fields in declaration order. Position determines the field number.
    pub fields: Vec<Field>,
}

/// A parameter, result or struct field after type mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    /// Name as written in Go (or synthesized for anonymous parameters).
    pub name: String,

    #[serde(rename = "type")]
    pub ty: ProtoType,

    pub class: TypeClass,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,

    /// The Go type as written, e.g. `*time.Time` or `[]Ext`.
    pub native: String,
}

impl Field {
    /// Creates a field, deriving its class from `ty`.
    pub fn new(
        name: impl Into<String>,
        ty: ProtoType,
        native: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class: ty.class(),
            ty,
            doc: String::new(),
            native: native.into(),
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Whether the Go field is a pointer.
    pub fn is_pointer(&self) -> bool {
        self.native.starts_with('*')
    }
}
