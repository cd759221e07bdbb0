//! End-to-end rendering of resolved Go fixtures.

use std::path::Path;

use gopb_emit::{
    MappingOptions, ResponseShape, SchemaOptions, render_mapping,
    render_schema,
};
use gopb_extract::{ResolvedModel, Selector, resolve, resolve_path};

fn user_model() -> ResolvedModel {
    resolve_path(Path::new("tests/fixtures/user.go"), &Selector::default())
        .expect("fixture should resolve")
}

fn users_service() -> SchemaOptions {
    SchemaOptions {
        service: Some("Users".into()),
        ..SchemaOptions::default()
    }
}

#[test]
fn test_user_schema_golden() {
    let schema = render_schema(&user_model(), &users_service()).unwrap();
    assert_eq!(schema, include_str!("fixtures/user.proto"));
}

#[test]
fn test_user_mapping_golden() {
    let code =
        render_mapping(&user_model(), &MappingOptions::default()).unwrap();
    assert_eq!(code, include_str!("fixtures/user_mapping.go.golden"));
}

#[test]
fn test_rendering_is_deterministic() {
    let first = render_schema(&user_model(), &users_service()).unwrap();
    let second = render_schema(&user_model(), &users_service()).unwrap();
    assert_eq!(first, second);
}

/// Field numbers restart at 1 in every message and have no gaps.
#[test]
fn test_field_numbers_contiguous() {
    let schema = render_schema(&user_model(), &users_service()).unwrap();
    let mut expected = 1;
    for line in schema.lines() {
        if line.starts_with("message ") {
            expected = 1;
            continue;
        }
        if !line.starts_with("  ") || line.trim_start().starts_with("//") {
            continue;
        }
        if let Some((_, number)) =
            line.trim_end_matches(';').rsplit_once(" = ")
        {
            assert_eq!(number.parse::<usize>().unwrap(), expected, "{line}");
            expected += 1;
        }
    }
}

#[test]
fn test_time_fields_render_as_int64() {
    let source = "package p\n\ntype Event struct {\n\tAt *time.Time\n\tLog []time.Time\n}\n";
    let model = resolve(
        source,
        &Selector {
            root: Some("Event".into()),
            ..Selector::default()
        },
    )
    .unwrap();
    let schema = render_schema(&model, &SchemaOptions::default()).unwrap();
    assert!(schema.contains("  int64 at = 1;\n"), "{schema}");
    assert!(schema.contains("  repeated int64 log = 2;\n"), "{schema}");
}

#[test]
fn test_empty_selection_renders_empty_service() {
    let model = resolve_path(
        Path::new("tests/fixtures/user.go"),
        &Selector {
            function: Some("Remove".into()),
            ..Selector::default()
        },
    )
    .unwrap();
    let schema = render_schema(
        &model,
        &SchemaOptions {
            shape: ResponseShape::Flat,
            ..SchemaOptions::default()
        },
    )
    .unwrap();
    assert!(schema.ends_with("service User {\n}\n"), "{schema}");
}

#[test]
fn test_mapping_with_import_and_package() {
    let model = resolve(
        "package api\n\ntype Tag struct {\n\tName string\n}\n",
        &Selector {
            root: Some("Tag".into()),
            ..Selector::default()
        },
    )
    .unwrap();
    let code = render_mapping(
        &model,
        &MappingOptions {
            package: Some("convert".into()),
            pb_import: Some("example.com/api/pb".into()),
        },
    )
    .unwrap();
    assert!(code.starts_with(
        "package convert\n\nimport (\n\tpb \"example.com/api/pb\"\n)\n"
    ));
    assert!(!code.contains("TODO"));
    assert!(!code.contains("\"time\""));
    assert!(code.contains("\tout.Name = in.Name\n"));
}
