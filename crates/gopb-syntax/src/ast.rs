//! Declaration-level syntax tree for one Go source file.
//!
//! Only what schema generation needs is represented: functions with their
//! signatures, type declarations and struct fields, each with the comments
//! attached to them. Function bodies and `import`/`var`/`const`
//! declarations are consumed by the parser but not retained.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the `package` clause.
    pub package: String,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeSpec),
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// Doc comment text with comment markers removed.
    pub doc: String,
    /// Receiver parameter, present for methods.
    pub receiver: Option<Param>,
    /// Names of the declared type parameters, empty for plain functions.
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub line: usize,
}

/// One parameter or result. Grouped declarations (`a, b int`) are expanded
/// into one `Param` per name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

/// One `Name [TypeParams] Type` or `Name = Type` specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    /// The spec's own doc comment, or the enclosing group's when it has none.
    pub doc: String,
    /// Names of the declared type parameters.
    pub type_params: Vec<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// Declared names; empty for an embedded field.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Comment group directly above the field.
    pub doc: String,
    /// Comment trailing the field on its last line.
    pub comment: String,
}

impl StructField {
    /// Returns true for an embedded (anonymous) field.
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// A Go type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`
    Named(String),
    /// `pkg.T`
    Qualified { package: String, name: String },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`, the length kept as written.
    Array { len: String, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `chan T`, `<-chan T` or `chan<- T`
    Chan(Box<TypeExpr>),
    /// `func(params) results`
    Func {
        params: Vec<Param>,
        results: Vec<Param>,
    },
    /// `interface{ ... }`; the method set is not retained.
    Interface,
    /// `struct{ ... }`
    Struct(Vec<StructField>),
    /// `T[A, B]`
    Generic {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    /// `...T` in the final parameter position.
    Variadic(Box<TypeExpr>),
}

impl TypeExpr {
    /// Name of the type an embedded field of this type is known by: the
    /// base identifier with pointers, packages and type arguments removed.
    pub fn embedded_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) | Self::Qualified { name, .. } => Some(name),
            Self::Pointer(inner) => inner.embedded_name(),
            Self::Generic { base, .. } => base.embedded_name(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Qualified { package, name } => write!(f, "{package}.{name}"),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Slice(elem) => write!(f, "[]{elem}"),
            Self::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Chan(elem) => write!(f, "chan {elem}"),
            Self::Func { params, results } => {
                f.write_str("func(")?;
                write_types(f, params)?;
                f.write_str(")")?;
                match results.as_slice() {
                    [] => Ok(()),
                    [single] if single.name.is_none() => {
                        write!(f, " {}", single.ty)
                    }
                    _ => {
                        f.write_str(" (")?;
                        write_types(f, results)?;
                        f.write_str(")")
                    }
                }
            }
            Self::Interface => f.write_str("interface{}"),
            Self::Struct(fields) => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    if !field.is_embedded() {
                        write!(f, "{} ", field.names.join(", "))?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                f.write_str("}")
            }
            Self::Generic { base, args } => {
                write!(f, "{base}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            Self::Variadic(elem) => write!(f, "...{elem}"),
        }
    }
}

fn write_types(f: &mut fmt::Formatter<'_>, params: &[Param]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if let Some(name) = &param.name {
            write!(f, "{name} ")?;
        }
        write!(f, "{}", param.ty)?;
    }
    Ok(())
}
