//! Scalar type tables.

use gopb_schemas::ProtoType;

/// Schema scalar for a Go scalar whose name differs in proto3.
fn proto_alias(go: &str) -> Option<&'static str> {
    let alias = match go {
        "float32" => "float",
        "float64" => "double",
        "int" => "int64",
        "uint" | "uintptr" => "uint64",
        "int8" | "int16" | "rune" => "int32",
        "uint8" | "uint16" | "byte" => "uint32",
        _ => return None,
    };
    Some(alias)
}

/// Renders a schema type with scalar aliases applied, including inside
/// repeated and map types. A repeated byte is `bytes`.
pub(crate) fn schema_type(ty: &ProtoType) -> String {
    match ty {
        ProtoType::Scalar { name } => {
            proto_alias(name).map_or_else(|| name.clone(), str::to_owned)
        }
        ProtoType::Repeated { elem } if is_byte(elem) => "bytes".to_owned(),
        ProtoType::Repeated { elem } => {
            format!("repeated {}", schema_type(elem))
        }
        ProtoType::Map { key, value } => {
            format!("map<{}, {}>", schema_type(key), schema_type(value))
        }
        ProtoType::Message { .. }
        | ProtoType::Timestamp
        | ProtoType::Unknown => ty.to_string(),
    }
}

pub(crate) fn is_byte(ty: &ProtoType) -> bool {
    matches!(
        ty,
        ProtoType::Scalar { name } if name == "byte" || name == "uint8"
    )
}

/// The Go type protoc-gen-go generates for the schema counterpart of a Go
/// scalar. `None` for types with no proto3 scalar.
pub(crate) fn generated_go_type(go: &str) -> Option<&'static str> {
    let ty = match go {
        "bool" => "bool",
        "string" => "string",
        "int8" | "int16" | "int32" | "rune" => "int32",
        "int" | "int64" => "int64",
        "uint8" | "uint16" | "uint32" | "byte" => "uint32",
        "uint" | "uint64" | "uintptr" => "uint64",
        "float32" => "float32",
        "float64" => "float64",
        _ => return None,
    };
    Some(ty)
}
