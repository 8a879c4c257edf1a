// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form Normalizer - compile a raw query form into a canonical spec
//!
//! The compiled spec keeps the order of condition groups, clauses and join
//! conditions exactly as authored; the backend evaluates them in that order.

use super::error::CompileError;
use super::return_field::attribute_columns;
use crate::query_api::definition::{
    CanonicalQuerySpec, JoinEdge, JointCondition, QueryConcatType, QueryCondition,
    QueryConditionGroup, RawCondition, RawQueryForm, SourceColumns,
};

/// Compile a raw form given as JSON.
pub fn compile(form_json: &str) -> Result<CanonicalQuerySpec, CompileError> {
    let form = RawQueryForm::from_json(form_json)?;
    compile_form(&form)
}

/// Compile an already decoded raw form.
pub fn compile_form(form: &RawQueryForm) -> Result<CanonicalQuerySpec, CompileError> {
    let query_concat_type = QueryConcatType::from_raw(form.query_concat_type.as_deref());

    let query_condition_groups = form
        .query_conditions
        .iter()
        .enumerate()
        .map(|(tab_index, group)| QueryConditionGroup {
            tab_index,
            query_conditions: group.iter().map(convert_condition).collect(),
        })
        .collect();

    let joint_conditions = match query_concat_type {
        QueryConcatType::Multi => form.joint_conditions.iter().map(convert_join).collect(),
        QueryConcatType::Single => Vec::new(),
    };

    let mut sources = Vec::with_capacity(form.file_pos.len());
    let mut claimed = vec![0usize; form.return_field.len()];

    for (id, shards) in form.file_pos.iter().enumerate() {
        let mut source = SourceColumns::new(id, shards.clone());

        if let Some(first_shard) = shards.first() {
            let attribution = attribute_columns(first_shard, &form.return_field);
            log::debug!(
                "Source {} ({}): {} return column(s), range {:?}",
                id,
                first_shard,
                attribution.count(),
                attribution.range
            );
            for idx in &attribution.claimed {
                claimed[*idx] += 1;
            }
            source.query_show_column = attribution.columns;
            source.query_show_column_range = attribution.range;
        }

        sources.push(source);
    }

    let attributed: usize = claimed.iter().sum();
    if attributed != form.return_field.len() {
        let unmatched: Vec<String> = form
            .return_field
            .iter()
            .zip(&claimed)
            .filter(|(_, count)| **count != 1)
            .map(|(entry, _)| entry.clone())
            .collect();
        log::warn!(
            "Return columns do not match data sets: {} attributed, {} declared, suspicious: {:?}",
            attributed,
            form.return_field.len(),
            unmatched
        );
        return Err(CompileError::SchemaMismatch {
            attributed,
            declared: form.return_field.len(),
            unmatched,
        });
    }

    Ok(CanonicalQuerySpec {
        query_concat_type,
        sources,
        query_condition_groups,
        joint_conditions,
    })
}

fn convert_condition(clause: &RawCondition) -> QueryCondition {
    QueryCondition {
        query_file: clause.pos.clone(),
        query_column: clause.field.clone(),
        base_value: clause.val.clone(),
        query_operator: [clause.value_type.clone(), clause.compare.clone()],
    }
}

fn convert_join(edge: &JoinEdge) -> JointCondition {
    JointCondition {
        pos1: edge.pos1.clone(),
        pos2: edge.pos2.clone(),
        field1: edge.field1.clone(),
        field2: edge.field2.clone(),
        compare_and_type: [edge.value_type.clone(), edge.compare.clone()],
        joint_type: edge.joint_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_api::definition::{ClauseValue, ShowColumnRange, SourceRef};
    use serde_json::json;

    fn two_source_form() -> serde_json::Value {
        json!({
            "queryConcatType": "multi",
            "queryConditions": [
                [
                    {"pos": "addr1", "field": "age", "val": "30", "type": "int", "compare": "gt"},
                    {"pos": "addr1", "field": "name", "val": "^A", "type": "string", "compare": "regexp"}
                ],
                [
                    {"pos": "addr2", "field": "dept", "val": "ICU", "type": "string", "compare": "eq"}
                ]
            ],
            "jointConditions": [
                {"pos1": 0, "pos2": 1, "field1": "id", "field2": "pid",
                 "type": "int", "compare": "eq", "jointType": "INNER"}
            ],
            "filePos": [["addr1"], ["addr2"]],
            "returnField": ["addr1_name", "addr1_age", "addr2_*"]
        })
    }

    #[test]
    fn test_end_to_end_two_sources() {
        let spec = compile(&two_source_form().to_string()).unwrap();

        assert_eq!(spec.query_concat_type, QueryConcatType::Multi);
        assert_eq!(spec.sources[0].query_show_column, vec!["name", "age"]);
        assert_eq!(spec.sources[0].query_show_column_range, ShowColumnRange::Select);
        assert_eq!(spec.sources[1].id, 1);
        assert!(spec.sources[1].query_show_column.is_empty());
        assert_eq!(spec.sources[1].query_show_column_range, ShowColumnRange::All);
        assert_eq!(spec.joint_conditions.len(), 1);
        assert_eq!(spec.joint_conditions[0].compare_and_type, ["int".to_string(), "eq".to_string()]);
    }

    #[test]
    fn test_groups_and_clauses_keep_order() {
        let spec = compile(&two_source_form().to_string()).unwrap();

        assert_eq!(spec.query_condition_groups.len(), 2);
        assert_eq!(spec.query_condition_groups[1].tab_index, 1);
        let first = &spec.query_condition_groups[0].query_conditions;
        assert_eq!(first[0].query_column, "age");
        assert_eq!(first[1].query_column, "name");
        assert_eq!(first[1].query_file, SourceRef::name("addr1"));
        assert_eq!(first[1].base_value, ClauseValue::from("^A"));
        assert_eq!(first[1].query_operator, ["string".to_string(), "regexp".to_string()]);
    }

    #[test]
    fn test_single_drops_joins() {
        let mut form = two_source_form();
        form["queryConcatType"] = json!("single");
        let spec = compile(&form.to_string()).unwrap();
        assert_eq!(spec.query_concat_type, QueryConcatType::Single);
        assert!(spec.joint_conditions.is_empty());
    }

    #[test]
    fn test_unknown_concat_type_means_multi() {
        let mut form = two_source_form();
        form["queryConcatType"] = json!("both");
        let spec = compile(&form.to_string()).unwrap();
        assert_eq!(spec.query_concat_type, QueryConcatType::Multi);
        assert_eq!(spec.joint_conditions.len(), 1);
    }

    #[test]
    fn test_non_first_shard_column_is_mismatch() {
        let form = json!({
            "queryConcatType": "single",
            "queryConditions": [],
            "filePos": [["shardA", "shardB"]],
            "returnField": ["shardA_id", "shardB_name"]
        });
        match compile(&form.to_string()) {
            Err(CompileError::SchemaMismatch {
                attributed,
                declared,
                unmatched,
            }) => {
                assert_eq!(attributed, 1);
                assert_eq!(declared, 2);
                assert_eq!(unmatched, vec!["shardB_name".to_string()]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_all_shards_copied() {
        let form = json!({
            "queryConditions": [],
            "filePos": [["shardA", "shardB", "shardC"]],
            "returnField": ["shardA_id"]
        });
        let spec = compile(&form.to_string()).unwrap();
        assert_eq!(spec.sources[0].ipfs_address, vec!["shardA", "shardB", "shardC"]);
    }

    #[test]
    fn test_source_without_shards() {
        let form = json!({
            "queryConditions": [],
            "filePos": [[], ["addr2"]],
            "returnField": ["addr2_x"]
        });
        let spec = compile(&form.to_string()).unwrap();
        assert_eq!(spec.sources[0].query_show_column_range, ShowColumnRange::Non);
        assert_eq!(spec.sources[1].query_show_column, vec!["x"]);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(compile("{\"queryConditions\": ["), Err(CompileError::Parse(_))));
        assert!(matches!(compile("[]"), Err(CompileError::Parse(_))));
    }
}
