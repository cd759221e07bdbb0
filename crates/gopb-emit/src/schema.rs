//! proto3 schema emission.
//!
//! The model is flattened into view structs (names cased, numbers assigned,
//! types aliased, docs folded onto one line) and rendered through the
//! `schema.proto` template.

use askama::Template;
use gopb_schemas::{Field, ResolvedModel};
use itertools::Itertools;
use tracing::instrument;

use crate::error::EmitError;
use crate::naming::{service_name, to_schema_case};
use crate::scalars::schema_type;

/// Package written when none is configured. Marked with a TODO line.
pub const PACKAGE_PLACEHOLDER: &str = "xxx";

/// How function results are wrapped in the `<F>Resp` message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseShape {
    /// `<F>Resp { int32 code; string msg; <F>Data data; }` with the results
    /// in `<F>Data`.
    #[default]
    Enveloped,
    /// The results directly in `<F>Resp`.
    Flat,
}

/// Options for [`render_schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaOptions {
    /// The `package` of the schema. [`PACKAGE_PLACEHOLDER`] when unset.
    pub package: Option<String>,
    /// The service name. Derived from the Go package name when unset.
    pub service: Option<String>,
    pub shape: ResponseShape,
}

#[derive(Template)]
#[template(path = "schema.proto", escape = "none")]
struct SchemaTemplate<'a> {
    package: &'a str,
    placeholder_package: bool,
    service: String,
    rpcs: Vec<RpcView<'a>>,
    messages: Vec<MessageView>,
}

struct RpcView<'a> {
    name: &'a str,
    doc: String,
}

struct MessageView {
    name: String,
    doc: String,
    fields: Vec<FieldView>,
}

struct FieldView {
    ty: String,
    name: String,
    number: usize,
    doc: String,
}

impl MessageView {
    fn new(name: String, doc: &str, fields: &[Field]) -> Self {
        let fields = fields
            .iter()
            .enumerate()
            .map(|(i, field)| FieldView {
                ty: schema_type(&field.ty),
                name: to_schema_case(&field.name),
                number: i + 1,
                doc: one_line(&field.doc),
            })
            .collect();
        Self {
            name,
            doc: one_line(doc),
            fields,
        }
    }

    fn envelope(function: &str) -> Self {
        let field = |ty: String, name: &str, number| FieldView {
            ty,
            name: name.to_owned(),
            number,
            doc: String::new(),
        };
        Self {
            name: format!("{function}Resp"),
            doc: String::new(),
            fields: vec![
                field("int32".to_owned(), "code", 1),
                field("string".to_owned(), "msg", 2),
                field(format!("{function}Data"), "data", 3),
            ],
        }
    }
}

/// Folds a multi-line doc comment onto one line: lines are trimmed, blank
/// lines dropped, and the rest joined with single spaces.
pub(crate) fn one_line(doc: &str) -> String {
    doc.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .join(" ")
}

/// Renders the proto3 schema for a resolved model.
///
/// The service comes first, then the request/response messages of each
/// function in extraction order, then one message per resolved type in
/// closure order.
///
/// # Errors
///
/// Returns [`EmitError`] if the template fails to render.
#[instrument(skip_all, fields(package = %model.package))]
pub fn render_schema(
    model: &ResolvedModel,
    options: &SchemaOptions,
) -> Result<String, EmitError> {
    let mut messages = Vec::new();
    for function in &model.functions {
        let name = &function.name;
        messages.push(MessageView::new(
            format!("{name}Req"),
            "",
            &function.inputs,
        ));
        match options.shape {
            ResponseShape::Enveloped => {
                messages.push(MessageView::envelope(name));
                messages.push(MessageView::new(
                    format!("{name}Data"),
                    "",
                    &function.outputs,
                ));
            }
            ResponseShape::Flat => messages.push(MessageView::new(
                format!("{name}Resp"),
                "",
                &function.outputs,
            )),
        }
    }
    messages.extend(
        model
            .types
            .iter()
            .map(|ty| MessageView::new(ty.name.clone(), &ty.doc, &ty.fields)),
    );

    let template = SchemaTemplate {
        package: options.package.as_deref().unwrap_or(PACKAGE_PLACEHOLDER),
        placeholder_package: options.package.is_none(),
        service: options
            .service
            .clone()
            .unwrap_or_else(|| service_name(&model.package)),
        rpcs: model
            .functions
            .iter()
            .map(|f| RpcView {
                name: &f.name,
                doc: one_line(&f.doc),
            })
            .collect(),
        messages,
    };
    let rendered = template.render().map_err(EmitError::render)?;

    let mut schema = rendered.trim_end().to_owned();
    schema.push('\n');
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use gopb_schemas::{FunctionDescriptor, ProtoType, TypeDescriptor};

    use super::*;

    fn field(name: &str, ty: ProtoType) -> Field {
        let native = ty.to_string();
        Field::new(name, ty, native)
    }

    fn model() -> ResolvedModel {
        ResolvedModel {
            package: "shop".into(),
            functions: vec![FunctionDescriptor {
                name: "Buy".into(),
                doc: "Buy places an order.\n  Idempotent.\n".into(),
                inputs: vec![field("itemID", ProtoType::scalar("int"))],
                outputs: vec![field("res0", ProtoType::message("Order"))],
            }],
            types: vec![TypeDescriptor {
                name: "Order".into(),
                doc: String::new(),
                fields: vec![
                    field("Total", ProtoType::scalar("float64"))
                        .with_doc("in cents\n"),
                    field(
                        "Raw",
                        ProtoType::repeated(ProtoType::scalar("byte")),
                    ),
                ],
            }],
        }
    }

    #[test]
    fn test_enveloped_schema() {
        let schema =
            render_schema(&model(), &SchemaOptions::default()).unwrap();
        assert_eq!(
            schema,
            r#"syntax = "proto3";

// TODO fill it
package xxx;

service Shop {
  // Buy places an order. Idempotent.
  rpc Buy(BuyReq) returns (BuyResp);
}

message BuyReq {
  int64 item_id = 1;
}

message BuyResp {
  int32 code = 1;
  string msg = 2;
  BuyData data = 3;
}

message BuyData {
  Order res0 = 1;
}

message Order {
  // in cents
  double total = 1;
  bytes raw = 2;
}
"#
        );
    }

    #[test]
    fn test_flat_schema_with_names() {
        let options = SchemaOptions {
            package: Some("shop.v1".into()),
            service: Some("Store".into()),
            shape: ResponseShape::Flat,
        };
        let schema = render_schema(&model(), &options).unwrap();
        assert!(!schema.contains("TODO"));
        assert!(schema.contains("package shop.v1;\n"));
        assert!(schema.contains("service Store {\n"));
        assert!(schema.contains("message BuyResp {\n  Order res0 = 1;\n}\n"));
        assert!(!schema.contains("BuyData"));
    }

    #[test]
    fn test_empty_model() {
        let model = ResolvedModel {
            package: "empty".into(),
            ..ResolvedModel::default()
        };
        let schema = render_schema(&model, &SchemaOptions::default()).unwrap();
        assert!(schema.ends_with("service Empty {\n}\n"), "{schema}");
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("a\n\n  b  \nc\n"), "a b c");
        assert_eq!(one_line(""), "");
        assert_eq!(one_line("\n \n"), "");
    }
}
