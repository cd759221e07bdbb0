//! Go conversion code between native structs and generated messages.
//!
//! For every resolved type `X` this emits `XToPB(in *X) *pb.X` and
//! `XFromPB(in *pb.X) *X`. Each field becomes a few statements chosen from
//! its schema type and its native Go spelling; fields that cannot be
//! converted mechanically get a `// TODO` line instead.

use std::collections::HashSet;

use askama::Template;
use gopb_schemas::{Field, ProtoType, ResolvedModel, TypeDescriptor};
use tracing::{debug, instrument};

use crate::error::EmitError;
use crate::naming::{to_exported_case, to_schema_case};
use crate::scalars::{generated_go_type, is_byte};

/// Import path written when none is configured. Marked with a TODO line.
pub const PB_IMPORT_PLACEHOLDER: &str = "xxx/pb";

/// Options for [`render_mapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingOptions {
    /// The Go package of the generated file. The source package when unset.
    pub package: Option<String>,
    /// Import path of the generated protobuf package, imported as `pb`.
    pub pb_import: Option<String>,
}

#[derive(Template)]
#[template(path = "mapping.go.txt", escape = "none")]
struct MappingTemplate<'a> {
    package: &'a str,
    pb_import: &'a str,
    placeholder_import: bool,
    uses_time: bool,
    types: Vec<TypeView<'a>>,
}

struct TypeView<'a> {
    name: &'a str,
    to_pb: Vec<String>,
    from_pb: Vec<String>,
}

/// Statements converting one field in each direction.
#[derive(Debug, Default, PartialEq, Eq)]
struct Conversion {
    to_pb: Vec<String>,
    from_pb: Vec<String>,
    /// Whether the statements call into the `time` package.
    uses_time: bool,
}

impl Conversion {
    fn new(to_pb: Vec<String>, from_pb: Vec<String>) -> Self {
        Self {
            to_pb,
            from_pb,
            uses_time: false,
        }
    }

    fn todo(field: &Field) -> Self {
        let line = format!("// TODO convert {} ({})", field.name, field.native);
        Self::new(vec![line.clone()], vec![line])
    }
}

/// Names used on each side of one field conversion.
struct Names<'a> {
    /// The native Go field.
    go: &'a str,
    /// The generated message field.
    pb: String,
}

/// Renders Go conversion functions for every resolved type.
///
/// # Errors
///
/// Returns [`EmitError`] if the template fails to render.
#[instrument(skip_all, fields(package = %model.package))]
pub fn render_mapping(
    model: &ResolvedModel,
    options: &MappingOptions,
) -> Result<String, EmitError> {
    let resolved: HashSet<&str> =
        model.types.iter().map(|ty| ty.name.as_str()).collect();

    let mut uses_time = false;
    let mut types = Vec::with_capacity(model.types.len());
    for ty in &model.types {
        let (view, needs_time) = type_view(ty, &resolved);
        uses_time |= needs_time;
        types.push(view);
    }

    let template = MappingTemplate {
        package: options.package.as_deref().unwrap_or(&model.package),
        pb_import: options
            .pb_import
            .as_deref()
            .unwrap_or(PB_IMPORT_PLACEHOLDER),
        placeholder_import: options.pb_import.is_none(),
        uses_time,
        types,
    };
    let rendered = template.render().map_err(EmitError::render)?;

    let mut code = rendered.trim_end().to_owned();
    code.push('\n');
    Ok(code)
}

fn type_view<'a>(
    ty: &'a TypeDescriptor,
    resolved: &HashSet<&str>,
) -> (TypeView<'a>, bool) {
    let mut view = TypeView {
        name: &ty.name,
        to_pb: Vec::new(),
        from_pb: Vec::new(),
    };
    let mut uses_time = false;
    for field in &ty.fields {
        let conversion = convert_field(field, resolved);
        if conversion.to_pb.iter().any(|line| line.starts_with("// TODO")) {
            debug!(
                type_name = %ty.name,
                field = %field.name,
                native = %field.native,
                "no mechanical conversion"
            );
        }
        uses_time |= conversion.uses_time;
        view.to_pb.extend(conversion.to_pb);
        view.from_pb.extend(conversion.from_pb);
    }
    (view, uses_time)
}

fn convert_field(field: &Field, resolved: &HashSet<&str>) -> Conversion {
    let names = Names {
        go: &field.name,
        pb: to_exported_case(&to_schema_case(&field.name)),
    };
    let pointer = field.is_pointer();
    let bare = field.native.trim_start_matches('*');

    let conversion = match &field.ty {
        ProtoType::Timestamp if bare == "time.Time" => {
            Some(time_field(&names, pointer))
        }
        ProtoType::Message { name }
            if bare == name && resolved.contains(name.as_str()) =>
        {
            Some(message_field(&names, name, pointer))
        }
        ProtoType::Scalar { name } if bare == name => {
            scalar_field(&names, name, pointer)
        }
        ProtoType::Repeated { elem } if !pointer => field
            .native
            .strip_prefix("[]")
            .and_then(|native_elem| {
                repeated_field(&names, elem, native_elem, resolved)
            }),
        ProtoType::Map { key, value } if !pointer => {
            map_field(&names, key, value, &field.native, resolved)
        }
        _ => None,
    };
    conversion.unwrap_or_else(|| Conversion::todo(field))
}

fn assign(names: &Names<'_>) -> Conversion {
    let Names { go, pb } = names;
    Conversion::new(
        vec![format!("out.{pb} = in.{go}")],
        vec![format!("out.{go} = in.{pb}")],
    )
}

fn time_field(names: &Names<'_>, pointer: bool) -> Conversion {
    let Names { go, pb } = names;
    let mut conversion = if pointer {
        Conversion::new(
            vec![
                format!("if in.{go} != nil {{"),
                format!("\tout.{pb} = in.{go}.Unix()"),
                "}".to_owned(),
            ],
            vec![
                format!("if in.{pb} != 0 {{"),
                format!("\tt := time.Unix(in.{pb}, 0)"),
                format!("\tout.{go} = &t"),
                "}".to_owned(),
            ],
        )
    } else {
        Conversion::new(
            vec![format!("out.{pb} = in.{go}.Unix()")],
            vec![format!("out.{go} = time.Unix(in.{pb}, 0)")],
        )
    };
    conversion.uses_time = true;
    conversion
}

fn message_field(
    names: &Names<'_>,
    message: &str,
    pointer: bool,
) -> Conversion {
    let Names { go, pb } = names;
    if pointer {
        Conversion::new(
            vec![format!("out.{pb} = {message}ToPB(in.{go})")],
            vec![format!("out.{go} = {message}FromPB(in.{pb})")],
        )
    } else {
        Conversion::new(
            vec![format!("out.{pb} = {message}ToPB(&in.{go})")],
            vec![
                format!("if v := {message}FromPB(in.{pb}); v != nil {{"),
                format!("\tout.{go} = *v"),
                "}".to_owned(),
            ],
        )
    }
}

/// Converts between a Go scalar and the type protoc-gen-go generates for
/// it, casting where the two differ.
fn scalar_field(
    names: &Names<'_>,
    native: &str,
    pointer: bool,
) -> Option<Conversion> {
    let generated = generated_go_type(native)?;
    let Names { go, pb } = names;
    let conversion = if pointer {
        Conversion::new(
            vec![
                format!("if in.{go} != nil {{"),
                format!(
                    "\tout.{pb} = {}",
                    cast(generated, native, &format!("*in.{go}"))
                ),
                "}".to_owned(),
            ],
            vec![
                format!("out.{go} = new({native})"),
                format!(
                    "*out.{go} = {}",
                    cast(native, generated, &format!("in.{pb}"))
                ),
            ],
        )
    } else if generated == native {
        assign(names)
    } else {
        Conversion::new(
            vec![format!("out.{pb} = {generated}(in.{go})")],
            vec![format!("out.{go} = {native}(in.{pb})")],
        )
    };
    Some(conversion)
}

/// `expr` converted to `to`, or unchanged when it already is of that type.
fn cast(to: &str, from: &str, expr: &str) -> String {
    if to == from {
        expr.to_owned()
    } else {
        format!("{to}({expr})")
    }
}

fn repeated_field(
    names: &Names<'_>,
    elem: &ProtoType,
    native_elem: &str,
    resolved: &HashSet<&str>,
) -> Option<Conversion> {
    let Names { go, pb } = names;
    let elem_pointer = native_elem.starts_with('*');
    let bare_elem = native_elem.trim_start_matches('*');

    match elem {
        // `[]byte` is `bytes` on both sides.
        _ if is_byte(elem) && !elem_pointer => Some(assign(names)),
        ProtoType::Scalar { name } if !elem_pointer && bare_elem == name => {
            let generated = generated_go_type(name)?;
            if generated == name {
                return Some(assign(names));
            }
            Some(Conversion::new(
                append_loop(pb, generated, go, &format!("{generated}(v)")),
                append_loop(go, name, pb, &format!("{name}(v)")),
            ))
        }
        ProtoType::Message { name }
            if bare_elem == name && resolved.contains(name.as_str()) =>
        {
            let to_pb = vec![
                format!("out.{pb} = make([]*pb.{name}, 0, len(in.{go}))"),
                format!("for i := range in.{go} {{"),
                format!(
                    "\tout.{pb} = append(out.{pb}, {name}ToPB({}in.{go}[i]))",
                    if elem_pointer { "" } else { "&" }
                ),
                "}".to_owned(),
            ];
            let from_pb = if elem_pointer {
                append_loop(go, native_elem, pb, &format!("{name}FromPB(v)"))
            } else {
                vec![
                    format!("out.{go} = make([]{name}, 0, len(in.{pb}))"),
                    format!("for _, v := range in.{pb} {{"),
                    format!("\tif e := {name}FromPB(v); e != nil {{"),
                    format!("\t\tout.{go} = append(out.{go}, *e)"),
                    "\t}".to_owned(),
                    "}".to_owned(),
                ]
            };
            Some(Conversion::new(to_pb, from_pb))
        }
        ProtoType::Timestamp if native_elem == "time.Time" => {
            let mut conversion = Conversion::new(
                append_loop(pb, "int64", go, "v.Unix()"),
                append_loop(go, "time.Time", pb, "time.Unix(v, 0)"),
            );
            conversion.uses_time = true;
            Some(conversion)
        }
        _ => None,
    }
}

/// `out.<dst> = make([]<elem>, ...)` followed by a loop appending `value`
/// for each `v` in `in.<src>`.
fn append_loop(dst: &str, elem: &str, src: &str, value: &str) -> Vec<String> {
    vec![
        format!("out.{dst} = make([]{elem}, 0, len(in.{src}))"),
        format!("for _, v := range in.{src} {{"),
        format!("\tout.{dst} = append(out.{dst}, {value})"),
        "}".to_owned(),
    ]
}

/// Maps with scalar keys that need no cast: scalar values are assigned
/// directly, resolved message values are converted per entry.
fn map_field(
    names: &Names<'_>,
    key: &ProtoType,
    value: &ProtoType,
    native: &str,
    resolved: &HashSet<&str>,
) -> Option<Conversion> {
    let ProtoType::Scalar { name: key } = key else {
        return None;
    };
    if generated_go_type(key) != Some(key.as_str()) {
        return None;
    }
    let native_value = native.strip_prefix(&format!("map[{key}]"))?;
    let value_pointer = native_value.starts_with('*');
    let bare_value = native_value.trim_start_matches('*');

    match value {
        ProtoType::Scalar { name }
            if !value_pointer
                && bare_value == name
                && generated_go_type(name) == Some(name.as_str()) =>
        {
            Some(assign(names))
        }
        ProtoType::Message { name }
            if bare_value == name && resolved.contains(name.as_str()) =>
        {
            let Names { go, pb } = names;
            let to_pb = vec![
                format!("out.{pb} = make(map[{key}]*pb.{name}, len(in.{go}))"),
                format!("for k, v := range in.{go} {{"),
                format!(
                    "\tout.{pb}[k] = {name}ToPB({}v)",
                    if value_pointer { "" } else { "&" }
                ),
                "}".to_owned(),
            ];
            let from_pb = if value_pointer {
                vec![
                    format!("out.{go} = make(map[{key}]*{name}, len(in.{pb}))"),
                    format!("for k, v := range in.{pb} {{"),
                    format!("\tout.{go}[k] = {name}FromPB(v)"),
                    "}".to_owned(),
                ]
            } else {
                vec![
                    format!("out.{go} = make(map[{key}]{name}, len(in.{pb}))"),
                    format!("for k, v := range in.{pb} {{"),
                    format!("\tif e := {name}FromPB(v); e != nil {{"),
                    format!("\t\tout.{go}[k] = *e"),
                    "\t}".to_owned(),
                    "}".to_owned(),
                ]
            };
            Some(Conversion::new(to_pb, from_pb))
        }
        _ => None,
    }
}
