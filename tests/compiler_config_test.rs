// SPDX-License-Identifier: MIT OR Apache-2.0

// Compiler configuration loading - TOML file layered under command line overrides

use std::io::Write;

use queryform_rust::core::config::compiler_config::KEY_PARALLEL_EDGES;
use queryform_rust::core::config::{CompilerConfig, FlatConfig, ParallelEdgePolicy, PropertySource};
use queryform_rust::form_compiler::compile_query_application;
use queryform_rust::QueryFormError;
use serde_json::json;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_toml_file() {
    let file = write_config(
        r#"
        [compiler]
        validate-operators = false

        [compiler.join]
        parallel-edges = "merge"
        require-connected = false
        "#,
    );

    let config = CompilerConfig::load(Some(file.path()), &FlatConfig::new()).unwrap();
    assert!(!config.validate_operators);
    assert_eq!(config.parallel_edges, ParallelEdgePolicy::Merge);
    assert!(!config.require_connected);
}

#[test]
fn test_command_line_beats_file() {
    let file = write_config("[compiler.join]\nparallel-edges = \"merge\"\n");
    let mut overrides = FlatConfig::new();
    overrides.set(KEY_PARALLEL_EDGES, "reject", PropertySource::CommandLine);

    let config = CompilerConfig::load(Some(file.path()), &overrides).unwrap();
    assert_eq!(config.parallel_edges, ParallelEdgePolicy::Reject);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CompilerConfig::load(Some(&dir.path().join("absent.toml")), &FlatConfig::new())
        .unwrap_err();
    assert!(matches!(err, QueryFormError::IoError(_)));
}

#[test]
fn test_file_config_drives_pipeline() {
    let file = write_config("[compiler.join]\nparallel-edges = \"merge\"\n");
    let config = CompilerConfig::load(Some(file.path()), &FlatConfig::new()).unwrap();

    let form = json!({
        "queryConcatType": "multi",
        "queryConditions": [],
        "jointConditions": [
            {"pos1": "0", "pos2": "1", "field1": "id", "field2": "id",
             "type": "int", "compare": "eq", "jointType": "INNER"},
            {"pos1": "0", "pos2": "1", "field1": "day", "field2": "day",
             "type": "int", "compare": "le", "jointType": "INNER"}
        ],
        "filePos": [["a"], ["b"]],
        "returnField": ["a_*", "b_id"]
    });

    let compiled = compile_query_application(&form.to_string(), &config).unwrap();
    assert_eq!(compiled.join_order, vec![0, 1]);
}
