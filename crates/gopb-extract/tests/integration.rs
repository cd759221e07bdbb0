//! Integration tests for gopb-extract.
//!
//! These tests resolve Go fixtures through the public API.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use gopb_extract::{
    ProtoType, ResolvedModel, Selector, TypeClass, resolve, resolve_path,
};
use proptest::prelude::*;

fn fixture(name: &str) -> ResolvedModel {
    fixture_with(name, &Selector::default())
}

fn fixture_with(name: &str, selector: &Selector) -> ResolvedModel {
    let path = Path::new("tests/fixtures").join(name);
    resolve_path(&path, selector).expect("fixture should resolve")
}

fn field_names(fields: &[gopb_extract::Field]) -> Vec<&str> {
    fields.iter().map(|f| f.name.as_str()).collect()
}

fn type_names(model: &ResolvedModel) -> Vec<&str> {
    model.types.iter().map(|t| t.name.as_str()).collect()
}

/// The list/add service resolves to two functions and two messages.
#[test]
fn test_user_service() {
    let model = fixture("user.go");
    assert_eq!(model.package, "user");

    let names: Vec<&str> =
        model.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["List", "Add"]);

    let list = &model.functions[0];
    assert_eq!(list.doc, "List returns a page of users.\n");
    assert_eq!(field_names(&list.inputs), vec!["limit", "offset"]);
    assert_eq!(field_names(&list.outputs), vec!["res0"]);
    assert_eq!(
        list.outputs[0].ty,
        ProtoType::repeated(ProtoType::message("User"))
    );

    let add = &model.functions[1];
    assert_eq!(field_names(&add.inputs), vec!["u"]);
    assert!(add.outputs.is_empty());

    assert_eq!(type_names(&model), vec!["User", "Ext"]);
    let user = &model.types[0];
    assert_eq!(user.doc, "User is a registered account.\n");
    assert_eq!(field_names(&user.fields), vec!["ID", "Name", "Ext", "Created"]);
    assert_eq!(user.fields[0].doc, "id\n");
    assert_eq!(user.fields[2].class, TypeClass::Composite);
    assert_eq!(user.fields[3].class, TypeClass::Time);
    assert_eq!(user.fields[3].ty.to_string(), "int64");
    assert_eq!(field_names(&model.types[1].fields), vec!["A", "B", "C"]);
}

/// Context parameters and error results never reach the model.
#[test]
fn test_no_context_or_error_fields() {
    let model = fixture("user.go");
    for function in &model.functions {
        for field in function.inputs.iter().chain(&function.outputs) {
            assert_ne!(field.native, "context.Context");
            assert_ne!(field.native, "error");
        }
    }
}

#[test]
fn test_cyclic_graph_closure() {
    let model = fixture("graph.go");
    assert_eq!(type_names(&model), vec!["Graph", "Node", "Edge", "Label"]);
    assert_eq!(
        model.types[0].fields[1].ty.to_string(),
        "map<string, Node>"
    );
}

#[test]
fn test_unsupported_types_are_unknown_and_unresolved_kept() {
    let model = fixture_with(
        "graph.go",
        &Selector {
            function: Some("Ping".into()),
            ..Selector::default()
        },
    );
    let ping = &model.functions[0];
    let types: Vec<ProtoType> =
        ping.inputs.iter().map(|f| f.ty.clone()).collect();
    assert_eq!(types, vec![ProtoType::Unknown; 3]);
    assert_eq!(ping.outputs[0].ty, ProtoType::message("Remote"));
    assert!(model.types.is_empty());
}

#[test]
fn test_function_selector_without_match_is_empty() {
    let model = fixture_with(
        "user.go",
        &Selector {
            function: Some("Remove".into()),
            ..Selector::default()
        },
    );
    assert!(model.functions.is_empty());
    assert!(model.types.is_empty());
}

#[test]
fn test_struct_only_with_field_filter() {
    let model = fixture_with(
        "user.go",
        &Selector {
            root: Some("User".into()),
            fields: vec!["Name".into(), "ID".into()],
            ..Selector::default()
        },
    );
    assert!(model.functions.is_empty());
    assert_eq!(type_names(&model), vec!["User"]);
    assert_eq!(field_names(&model.types[0].fields), vec!["ID", "Name"]);
}

/// Blank fields are padding: they get no field and schedule nothing.
#[test]
fn test_blank_fields_skipped() {
    let source = "package p\n\ntype A struct {\n\tB *B\n\t_ int\n\t_ Pad\n}\n\ntype B struct {\n\tX int32\n}\n\ntype Pad struct {\n\tY int32\n}\n\nfunc Get(_ int32) A { return A{} }\n";
    let model = resolve(source, &Selector::default()).unwrap();

    assert_eq!(field_names(&model.functions[0].inputs), vec!["arg0"]);
    assert_eq!(type_names(&model), vec!["A", "B"]);
    assert_eq!(field_names(&model.types[0].fields), vec!["B"]);
}

#[test]
fn test_function_and_struct_selectors_combined() {
    let model = fixture_with(
        "graph.go",
        &Selector {
            function: Some("Walk".into()),
            root: Some("Label".into()),
            ..Selector::default()
        },
    );
    assert_eq!(model.functions.len(), 1);
    // Seeds from the function come first, the root after them.
    assert_eq!(type_names(&model), vec!["Graph", "Node", "Label", "Edge"]);
}

#[test]
fn test_unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = resolve_path(&dir.path().join("missing.go"), &Selector::default())
        .unwrap_err();
    assert!(err.is_input_unreadable());
}

#[test]
fn test_parse_failure_names_file_and_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.go");
    std::fs::write(&path, "package broken\n\nfunc F( {\n").unwrap();

    let err = resolve_path(&path, &Selector::default()).unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.parse_error().map(|e| e.line), Some(3));
    assert!(err.to_string().contains("broken.go:3:"), "{err}");
}

#[test]
fn test_identical_input_identical_model() {
    let a = serde_json::to_string(&fixture("graph.go")).unwrap();
    let b = serde_json::to_string(&fixture("graph.go")).unwrap();
    assert_eq!(a, b);
}

/// Renders a Go file with one struct per node; each edge becomes a
/// pointer field, so arbitrary cycles appear.
fn graph_source(edges: &[Vec<usize>]) -> String {
    let mut source = String::from("package g\n\nfunc Root(t T0) {}\n");
    for (i, targets) in edges.iter().enumerate() {
        writeln!(source, "\ntype T{i} struct {{").unwrap();
        for (j, target) in targets.iter().enumerate() {
            writeln!(source, "\tF{j} *T{target}").unwrap();
        }
        source.push_str("}\n");
    }
    source
}

/// Nodes reachable from T0.
fn reachable(edges: &[Vec<usize>]) -> HashSet<usize> {
    let mut seen = HashSet::from([0]);
    let mut stack = vec![0];
    while let Some(node) = stack.pop() {
        for &next in &edges[node] {
            if seen.insert(next) {
                stack.push(next);
            }
        }
    }
    seen
}

fn arb_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..8).prop_flat_map(|n| {
        proptest::collection::vec(proptest::collection::vec(0..n, 0..4), n)
    })
}

proptest! {
    /// Closure terminates on any graph and emits each reachable struct
    /// exactly once.
    #[test]
    fn test_closure_emits_each_reachable_type_once(edges in arb_graph()) {
        let model =
            resolve(&graph_source(&edges), &Selector::default()).unwrap();

        let names: Vec<&str> = type_names(&model);
        let unique: HashSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(names.len(), unique.len());

        let expected: HashSet<String> =
            reachable(&edges).into_iter().map(|i| format!("T{i}")).collect();
        let got: HashSet<String> =
            names.iter().map(|n| (*n).to_owned()).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(names[0], "T0");
    }
}
