// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rebuild the raw form a canonical spec was compiled from.
//!
//! Lets the editor reopen a stored spec for editing. Return columns are
//! rebuilt from each source's first shard address; a source without shards
//! has no addressable columns and contributes none.

use super::return_field::{return_field_entry, WILDCARD_COLUMN};
use crate::query_api::definition::{
    CanonicalQuerySpec, JoinEdge, RawCondition, RawQueryForm, ShowColumnRange,
};

pub fn decompose(spec: &CanonicalQuerySpec) -> RawQueryForm {
    let query_conditions = spec
        .query_condition_groups
        .iter()
        .map(|group| {
            group
                .query_conditions
                .iter()
                .map(|clause| RawCondition {
                    pos: clause.query_file.clone(),
                    field: clause.query_column.clone(),
                    val: clause.base_value.clone(),
                    value_type: clause.value_type().to_string(),
                    compare: clause.compare().to_string(),
                })
                .collect()
        })
        .collect();

    let joint_conditions = spec
        .joint_conditions
        .iter()
        .map(|join| JoinEdge {
            pos1: join.pos1.clone(),
            pos2: join.pos2.clone(),
            field1: join.field1.clone(),
            field2: join.field2.clone(),
            value_type: join.value_type().to_string(),
            compare: join.compare().to_string(),
            joint_type: join.joint_type.clone(),
        })
        .collect();

    let mut return_field = Vec::new();
    for source in &spec.sources {
        let Some(first_shard) = source.first_shard() else {
            continue;
        };
        match source.query_show_column_range {
            ShowColumnRange::Non => {}
            ShowColumnRange::All => return_field.push(return_field_entry(first_shard, WILDCARD_COLUMN)),
            ShowColumnRange::Select => return_field.extend(
                source
                    .query_show_column
                    .iter()
                    .map(|column| return_field_entry(first_shard, column)),
            ),
        }
    }

    RawQueryForm {
        query_concat_type: Some(spec.query_concat_type.as_str().to_string()),
        query_conditions,
        joint_conditions,
        file_pos: spec.sources.iter().map(|s| s.ipfs_address.clone()).collect(),
        return_field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_compiler::normalizer::{compile, compile_form};
    use serde_json::json;

    #[test]
    fn test_decompose_then_compile_reproduces_spec() {
        let form = json!({
            "queryConcatType": "multi",
            "queryConditions": [[
                {"pos": 0, "field": "age", "val": 40, "type": "int", "compare": "le"}
            ]],
            "jointConditions": [
                {"pos1": 0, "pos2": 1, "field1": "id", "field2": "id",
                 "type": "int", "compare": "eq", "jointType": "INNER"}
            ],
            "filePos": [["a1", "a2"], ["b1"], ["c1"]],
            "returnField": ["a1_id", "a1_age", "b1_*"]
        });
        let spec = compile(&form.to_string()).unwrap();

        let raw = decompose(&spec);
        assert_eq!(raw.return_field, vec!["a1_id", "a1_age", "b1_*"]);
        assert_eq!(raw.file_pos.len(), 3);
        assert_eq!(compile_form(&raw).unwrap(), spec);
    }

    #[test]
    fn test_decompose_single() {
        let form = json!({
            "queryConcatType": "single",
            "queryConditions": [],
            "filePos": [["a1"]],
            "returnField": []
        });
        let raw = decompose(&compile(&form.to_string()).unwrap());
        assert_eq!(raw.query_concat_type.as_deref(), Some("single"));
        assert!(raw.joint_conditions.is_empty());
        assert!(raw.return_field.is_empty());
    }
}
