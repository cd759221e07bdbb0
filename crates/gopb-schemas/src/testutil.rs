//! Shared proptest strategies for model tests.

use proptest::prelude::*;

use crate::{Field, ProtoType};

/// Strategy for generating exported Go-style identifiers.
pub fn arb_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,11}"
}

/// Strategy for generating schema types up to a small nesting depth.
pub fn arb_proto_type() -> impl Strategy<Value = ProtoType> {
    let leaf = prop_oneof![
        "[a-z][a-z0-9]{0,7}".prop_map(ProtoType::scalar),
        arb_name().prop_map(ProtoType::message),
        Just(ProtoType::Timestamp),
        Just(ProtoType::Unknown),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(ProtoType::repeated),
            (inner.clone(), inner).prop_map(|(k, v)| ProtoType::map(k, v)),
        ]
    })
}

prop_compose! {
    /// Strategy for generating fields; the class is derived from the type.
    pub fn arb_field()
        (name in arb_name(), ty in arb_proto_type(), doc in "[a-z ]{0,12}")
    -> Field {
        let native = ty.to_string();
        Field::new(name, ty, native).with_doc(doc)
    }
}
