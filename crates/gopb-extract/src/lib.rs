//! Resolution of a Go source file into a [`ResolvedModel`].
//!
//! Resolution parses the file, extracts the exported functions a
//! [`Selector`] asks for, maps every parameter, result and field type to
//! its schema type, and walks the struct declarations those types reference
//! until no new names turn up.
//!
//! ```
//! use gopb_extract::{Selector, resolve};
//!
//! let source = "package users\n\ntype User struct {\n\tID int64\n}\n\nfunc Get(id int64) (*User, error) { return nil, nil }\n";
//! let model = resolve(source, &Selector::default()).unwrap();
//! assert_eq!(model.functions[0].outputs[0].name, "res0");
//! assert_eq!(model.types[0].name, "User");
//! ```
//!
//! ## Re-exports
//!
//! The model types from [`gopb_schemas`] are re-exported for convenience.

mod closure;
mod error;
mod extract;
mod types;

use std::fs;
use std::path::Path;

#[doc(inline)]
pub use gopb_schemas::{
    Field, FunctionDescriptor, ProtoType, ResolvedModel, TypeClass,
    TypeDescriptor,
};
use gopb_syntax::{SourceFile, parse_file};
use tracing::{debug, instrument};

use crate::closure::Resolver;
#[doc(inline)]
pub use crate::error::ExtractError;
#[doc(inline)]
pub use crate::extract::Selector;
use crate::extract::{extract_functions, index_structs};
#[doc(inline)]
pub use crate::types::{GO_SCALARS, is_exported, map_type};

/// Reads and resolves the Go file at `path`.
///
/// # Errors
///
/// Returns [`ExtractError`] if:
/// - The file cannot be read ([`ExtractError::is_input_unreadable`])
/// - The file is not valid Go ([`ExtractError::is_parse`])
#[instrument(skip(selector), fields(path = %path.display()))]
pub fn resolve_path(
    path: &Path,
    selector: &Selector,
) -> Result<ResolvedModel, ExtractError> {
    let source = fs::read_to_string(path)
        .map_err(|err| ExtractError::input_unreadable(path, err))?;
    resolve(&source, selector).map_err(|err| err.in_file(path))
}

/// Parses and resolves Go source text.
///
/// # Errors
///
/// Returns [`ExtractError`] if the source is not valid Go
/// ([`ExtractError::is_parse`]).
pub fn resolve(
    source: &str,
    selector: &Selector,
) -> Result<ResolvedModel, ExtractError> {
    let file = parse_file(source)?;
    Ok(resolve_file(&file, selector))
}

/// Resolves an already parsed file. Never fails: selectors that match
/// nothing yield an empty model and unknown type references are logged.
#[instrument(skip_all, fields(package = %file.package))]
pub fn resolve_file(file: &SourceFile, selector: &Selector) -> ResolvedModel {
    let functions = extract_functions(file, selector);
    let structs = index_structs(file);

    let mut resolver = Resolver::new(&structs);
    for function in &functions {
        resolver.seed_fields(function.inputs.iter().chain(&function.outputs));
    }
    if let Some(root) = &selector.root {
        if is_exported(root) {
            resolver.seed_root(root, &selector.fields);
        } else {
            debug!(root = %root, "struct selector names an unexported type");
        }
    }
    let types = resolver.resolve();

    debug!(
        functions = functions.len(),
        types = types.len(),
        "resolved model"
    );
    ResolvedModel {
        package: file.package.clone(),
        functions,
        types,
    }
}
