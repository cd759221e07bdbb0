//! End-to-end tests for the `gopb` binary.
//!
//! Each test runs the built binary against `tests/fixtures/user.go` (or a
//! file written into a temp directory) and checks its outputs and exit
//! status.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn gopb(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gopb"))
        .args(args)
        .output()
        .expect("failed to run gopb")
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/user.go")
}

fn fixture_arg() -> String {
    fixture().display().to_string()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "gopb failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_proto_to_file_names_service_after_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("users.proto");

    let output = gopb(&["proto", &fixture_arg(), "-o", out.to_str().unwrap()]);
    assert!(stdout(&output).is_empty());

    let schema = fs::read_to_string(&out).unwrap();
    assert!(schema.starts_with("syntax = \"proto3\";\n"));
    assert!(schema.contains("service Users {\n"));
    assert!(
        schema.contains("  rpc List(ListReq) returns (ListResp);\n"),
        "{schema}"
    );
    assert!(
        schema.contains("message ListData {\n  repeated User res0 = 1;\n}\n")
    );
    assert!(schema.contains("message AddData {\n}\n"));
    assert!(schema.contains("  int64 created = 5;\n"));
}

#[test]
fn test_proto_to_stdout() {
    let schema = stdout(&gopb(&["proto", &fixture_arg()]));
    // Without an output file the service is named after the Go package.
    assert!(schema.contains("service User {\n"));
    assert!(schema.contains("// TODO fill it\npackage xxx;\n"));
    assert!(!schema.contains("ctx"));
}

#[test]
fn test_proto_options() {
    let schema = stdout(&gopb(&[
        "proto",
        &fixture_arg(),
        "--service",
        "Accounts",
        "--package",
        "accounts.v1",
        "--flat",
    ]));
    assert!(schema.contains("package accounts.v1;\n"));
    assert!(!schema.contains("TODO"));
    assert!(schema.contains("service Accounts {\n"));
    assert!(
        schema.contains("message ListResp {\n  repeated User res0 = 1;\n}\n")
    );
    assert!(!schema.contains("ListData"));
}

#[test]
fn test_mapping_to_file() {
    let dir = TempDir::new().unwrap();
    let proto = dir.path().join("users.proto");
    let mapping = dir.path().join("users_pb.go");

    let output = gopb(&[
        "proto",
        &fixture_arg(),
        "-o",
        proto.to_str().unwrap(),
        "--mapping",
        mapping.to_str().unwrap(),
        "--pb-import",
        "example.com/users/pb",
    ]);
    assert!(stdout(&output).is_empty());

    let code = fs::read_to_string(&mapping).unwrap();
    assert!(code.starts_with("package user\n"));
    assert!(code.contains("\tpb \"example.com/users/pb\"\n"));
    assert!(code.contains("func UserToPB(in *User) *pb.User {\n"));
    assert!(code.contains("func ExtFromPB(in *pb.Ext) *Ext {\n"));
    assert!(proto.exists());
}

#[test]
fn test_mapping_to_stdout() {
    let text = stdout(&gopb(&[
        "proto",
        &fixture_arg(),
        "--mapping",
        "-",
        "--mapping-package",
        "convert",
    ]));
    // Schema first, then the conversion code.
    let schema_at = text.find("syntax = \"proto3\";").unwrap();
    let mapping_at = text.find("package convert\n").unwrap();
    assert!(schema_at < mapping_at);
}

#[test]
fn test_function_selector() {
    let schema = stdout(&gopb(&["proto", &fixture_arg(), "--function", "Add"]));
    assert!(schema.contains("rpc Add(AddReq)"));
    assert!(!schema.contains("rpc List"));
    assert!(schema.contains("message User {\n"));
}

#[test]
fn test_function_selector_without_match_succeeds() {
    let schema =
        stdout(&gopb(&["proto", &fixture_arg(), "--function", "Missing"]));
    assert!(schema.contains("service User {\n}\n"));
    assert!(!schema.contains("message"));
}

#[test]
fn test_struct_selector_with_fields() {
    let json = stdout(&gopb(&[
        "model",
        &fixture_arg(),
        "--struct",
        "User",
        "--fields",
        "ID,Ext",
    ]));
    let model: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(model["functions"].as_array().unwrap().len(), 0);

    let types = model["types"].as_array().unwrap();
    let names: Vec<_> =
        types.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["User", "Ext"]);
    let fields: Vec<_> = types[0]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["ID", "Ext"]);
}

#[test]
fn test_fields_require_struct() {
    let output = gopb(&["proto", &fixture_arg(), "--fields", "ID"]);
    assert!(!output.status.success());
}

#[test]
fn test_model_json() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("model.json");

    let output = gopb(&["model", &fixture_arg(), "-o", out.to_str().unwrap()]);
    assert!(output.status.success());

    let json = fs::read_to_string(&out).unwrap();
    let model: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(model["package"], "user");
    assert_eq!(model["functions"][0]["name"], "List");
    assert_eq!(model["functions"][0]["inputs"][0]["name"], "limit");
}

#[test]
fn test_json_schema() {
    let json = stdout(&gopb(&["json-schema"]));
    let schema: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(schema["title"], "ResolvedModel");
    assert!(schema["properties"]["functions"].is_object());
}

#[test]
fn test_parse_error_creates_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.go");
    fs::write(&input, "package broken\n\nfunc Bad(x int {\n}\n").unwrap();
    let out = dir.path().join("broken.proto");

    let output = gopb(&[
        "proto",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.go:3:"), "{stderr}");
    assert!(!out.exists());
}

#[test]
fn test_missing_input_creates_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("absent.go");
    let out = dir.path().join("absent.proto");

    let output = gopb(&[
        "proto",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.go"), "{stderr}");
    assert!(!out.exists());
}
