//! Data structures shared by the gopb pipeline.
//!
//! The extractor produces a [`ResolvedModel`]; the schema and mapping
//! emitters consume it, and `gopb model` serializes it as JSON. The types
//! derive `JsonSchema` so the dump format can be published alongside it.

mod model;
mod proto_type;
#[cfg(test)]
mod testutil;

#[doc(inline)]
pub use model::*;
#[doc(inline)]
pub use proto_type::*;
