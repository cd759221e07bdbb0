//! Text emitters over a [`ResolvedModel`](gopb_schemas::ResolvedModel).
//!
//! [`render_schema`] produces a proto3 schema with one service, a request
//! and response message per function, and a message per resolved type.
//! [`render_mapping`] produces Go functions converting each resolved type
//! to and from its generated message. Both render through askama templates
//! under `templates/`.

mod error;
mod mapping;
mod naming;
mod scalars;
mod schema;

#[doc(inline)]
pub use crate::error::EmitError;
#[doc(inline)]
pub use crate::mapping::{
    MappingOptions, PB_IMPORT_PLACEHOLDER, render_mapping,
};
#[doc(inline)]
pub use crate::naming::{service_name, to_exported_case, to_schema_case};
#[doc(inline)]
pub use crate::schema::{
    PACKAGE_PLACEHOLDER, ResponseShape, SchemaOptions, render_schema,
};
