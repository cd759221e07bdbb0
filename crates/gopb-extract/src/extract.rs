//! Declaration extraction: exported functions and the struct index.

use std::collections::HashSet;

use gopb_schemas::{Field, FunctionDescriptor};
use gopb_syntax::{
    Decl, FuncDecl, Param, SourceFile, StructField, TypeExpr, TypeSpec,
};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::types::{is_exported, map_scoped};

/// Chooses what to extract from a file.
///
/// The default selects every exported top-level function and no explicit
/// root struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Restricts functions to the one with exactly this name.
    pub function: Option<String>,

    /// Seeds the closure with this struct. Given without
    /// [`function`](Self::function), no functions are extracted.
    pub root: Option<String>,

    /// Restricts the root struct to these Go field names, keeping
    /// declaration order. Empty keeps every field.
    pub fields: Vec<String>,

    /// Also extract methods. The first declaration of a name wins.
    pub include_methods: bool,
}

impl Selector {
    /// Whether only the root struct was asked for.
    pub fn struct_only(&self) -> bool {
        self.root.is_some() && self.function.is_none()
    }
}

/// A struct declaration found in the file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StructDecl<'a> {
    pub doc: &'a str,
    pub type_params: &'a [String],
    pub fields: &'a [StructField],
}

/// Struct declarations by name, in source order.
pub(crate) type StructIndex<'a> = IndexMap<&'a str, StructDecl<'a>>;

/// Indexes every struct type declaration of the file by name.
pub(crate) fn index_structs(file: &SourceFile) -> StructIndex<'_> {
    let mut index = StructIndex::new();
    for decl in &file.decls {
        let Decl::Type(TypeSpec {
            name,
            doc,
            type_params,
            ty: TypeExpr::Struct(fields),
        }) = decl
        else {
            continue;
        };
        index.entry(name.as_str()).or_insert(StructDecl {
            doc,
            type_params,
            fields,
        });
    }
    index
}

/// Extracts the functions the selector asks for, in source order.
pub(crate) fn extract_functions(
    file: &SourceFile,
    selector: &Selector,
) -> Vec<FunctionDescriptor> {
    if selector.struct_only() {
        debug!("struct selector without function selector, skipping functions");
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut functions = Vec::new();
    for decl in &file.decls {
        let Decl::Func(func) = decl else {
            continue;
        };
        if !is_exported(&func.name) {
            debug!(function = %func.name, "skipping unexported function");
            continue;
        }
        if func.receiver.is_some() && !selector.include_methods {
            debug!(function = %func.name, "skipping method");
            continue;
        }
        if selector
            .function
            .as_ref()
            .is_some_and(|wanted| *wanted != func.name)
        {
            continue;
        }
        if !seen.insert(func.name.as_str()) {
            warn!(
                function = %func.name,
                line = func.line,
                "duplicate function name, keeping the first declaration"
            );
            continue;
        }
        functions.push(describe_function(func));
    }

    if let (Some(wanted), true) = (&selector.function, functions.is_empty()) {
        debug!(function = %wanted, "function selector matched nothing");
    }
    functions
}

fn describe_function(func: &FuncDecl) -> FunctionDescriptor {
    let type_params = scope(func);
    let inputs = func
        .params
        .iter()
        .enumerate()
        .filter(|(_, param)| !is_context(param))
        .map(|(i, param)| param_field(param, "arg", i, &type_params))
        .collect();
    let outputs = func
        .results
        .iter()
        .enumerate()
        .filter(|(_, result)| !is_error(&result.ty))
        .map(|(i, result)| param_field(result, "res", i, &type_params))
        .collect();

    FunctionDescriptor {
        name: func.name.clone(),
        doc: func.doc.clone(),
        inputs,
        outputs,
    }
}

/// Type parameters visible in a function's signature: its own, plus those
/// a method's receiver names (`func (p *Page[T]) ...`).
fn scope(func: &FuncDecl) -> Vec<String> {
    let mut names = func.type_params.clone();
    let mut receiver = func.receiver.as_ref().map(|param| &param.ty);
    while let Some(ty) = receiver {
        receiver = match ty {
            TypeExpr::Pointer(inner) => Some(inner),
            TypeExpr::Generic { args, .. } => {
                names.extend(args.iter().filter_map(|arg| match arg {
                    TypeExpr::Named(name) => Some(name.clone()),
                    _ => None,
                }));
                None
            }
            _ => None,
        };
    }
    names
}

/// Anonymous and blank (`_`) parameters are named `<prefix><position>`.
fn param_field(
    param: &Param,
    prefix: &str,
    position: usize,
    type_params: &[String],
) -> Field {
    let name = param
        .name
        .as_deref()
        .filter(|name| !is_blank(name))
        .map_or_else(|| format!("{prefix}{position}"), str::to_owned);
    let ty = map_scoped(&param.ty, type_params);
    Field::new(name, ty, param.ty.to_string())
}

fn is_context(param: &Param) -> bool {
    param.name.as_deref() == Some("ctx")
        || matches!(
            &param.ty,
            TypeExpr::Qualified { package, name }
                if package == "context" && name == "Context"
        )
}

fn is_error(ty: &TypeExpr) -> bool {
    matches!(ty, TypeExpr::Named(name) if name == "error")
}

/// The blank identifier names padding, not data.
fn is_blank(name: &str) -> bool {
    name == "_"
}

/// Maps the fields of a struct declaration, one [`Field`] per name.
///
/// A field's trailing comment is its doc when present, otherwise the
/// comment above it. Embedded fields are named after the embedded type.
/// Blank (`_`) fields are dropped.
pub(crate) fn describe_struct(decl: &StructDecl<'_>) -> Vec<Field> {
    let mut fields = Vec::new();
    for field in decl.fields {
        let doc = if field.comment.is_empty() {
            &field.doc
        } else {
            &field.comment
        };
        let ty = map_scoped(&field.ty, decl.type_params);
        let native = field.ty.to_string();

        if field.is_embedded() {
            if let Some(name) = field.ty.embedded_name() {
                fields.push(
                    Field::new(name, ty, native).with_doc(doc.as_str()),
                );
            }
            continue;
        }
        for name in field.names.iter().filter(|name| !is_blank(name)) {
            fields.push(
                Field::new(name.as_str(), ty.clone(), native.as_str())
                    .with_doc(doc.as_str()),
            );
        }
    }
    fields
}
