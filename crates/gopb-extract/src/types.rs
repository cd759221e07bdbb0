//! Mapping of Go type expressions to schema types.

use gopb_schemas::ProtoType;
use gopb_syntax::TypeExpr;

/// Go's predeclared scalar type names.
pub const GO_SCALARS: &[&str] = &[
    "bool",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "byte",
    "rune",
    "float32",
    "float64",
    "complex64",
    "complex128",
];

/// Maps a Go type expression to its schema type.
///
/// Pointers are transparent, slices and arrays become repeated, maps keep
/// their key and value, and `time.Time` becomes a Unix-seconds timestamp.
/// Package qualifiers are dropped. Anything without a schema counterpart
/// maps to [`ProtoType::Unknown`].
pub fn map_type(ty: &TypeExpr) -> ProtoType {
    map_scoped(ty, &[])
}

/// [`map_type`] inside a generic declaration: uses of its type parameters
/// have no schema type and map to [`ProtoType::Unknown`].
pub(crate) fn map_scoped(ty: &TypeExpr, type_params: &[String]) -> ProtoType {
    let map = |inner: &TypeExpr| map_scoped(inner, type_params);
    match ty {
        TypeExpr::Named(name) if type_params.contains(name) => {
            ProtoType::Unknown
        }
        TypeExpr::Named(name) => classify_ident(name),
        TypeExpr::Qualified { package, name }
            if package == "time" && name == "Time" =>
        {
            ProtoType::Timestamp
        }
        TypeExpr::Qualified { name, .. } => classify_ident(name),
        TypeExpr::Pointer(inner) => map(inner),
        TypeExpr::Slice(elem) | TypeExpr::Array { elem, .. } => {
            ProtoType::repeated(map(elem))
        }
        TypeExpr::Map { key, value } => ProtoType::map(map(key), map(value)),
        TypeExpr::Chan(_)
        | TypeExpr::Func { .. }
        | TypeExpr::Interface
        | TypeExpr::Struct(_)
        | TypeExpr::Generic { .. }
        | TypeExpr::Variadic(_) => ProtoType::Unknown,
    }
}

/// Classifies a bare identifier. Predeclared scalars stay scalar, a
/// capitalized name is taken to reference a message, and any other
/// lowercase name is passed through as a scalar.
fn classify_ident(name: &str) -> ProtoType {
    if GO_SCALARS.contains(&name) {
        return ProtoType::scalar(name);
    }
    // `any` is the predeclared alias of `interface{}`.
    if name == "any" {
        return ProtoType::Unknown;
    }
    if is_exported(name) {
        ProtoType::message(name)
    } else {
        ProtoType::scalar(name)
    }
}

/// Whether a Go identifier is exported (starts with an uppercase letter).
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
