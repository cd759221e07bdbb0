//! Declaration-level parsing of Go source files.
//!
//! This crate reads a single Go file and produces a [`SourceFile`] holding
//! its package name, function signatures and type declarations, with doc
//! and trailing comments attached. It understands enough of Go's grammar to
//! skip everything else (function bodies, imports, variables, constants)
//! without misreading it.
//!
//! ```
//! use gopb_syntax::{Decl, parse_file};
//!
//! let file = parse_file("package users\n\n// Ping checks liveness.\nfunc Ping() error { return nil }\n").unwrap();
//! assert_eq!(file.package, "users");
//! let Decl::Func(func) = &file.decls[0] else { unreachable!() };
//! assert_eq!(func.doc, "Ping checks liveness.\n");
//! ```

mod ast;
mod comments;
mod error;
mod lexer;
mod parser;
mod token;

#[doc(inline)]
pub use crate::ast::{
    Decl, FuncDecl, Param, SourceFile, StructField, TypeExpr, TypeSpec,
};
#[doc(inline)]
pub use crate::error::{ParseError, ParseResult};
#[doc(inline)]
pub use crate::parser::parse_file;
