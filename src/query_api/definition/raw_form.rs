// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw query form as authored in the form editor.
//!
//! Field names follow the editor's JSON exactly. Unknown fields are rejected so
//! a typo in the editor never yields a silently incomplete canonical spec.

use serde::{Deserialize, Serialize};

use super::source_ref::{ClauseValue, SourceRef};

/// Literal marking a single-source form. Every other value means multi-source.
pub const SINGLE_CONCAT_TYPE: &str = "single";

/// One filter clause of a condition group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCondition {
    pub pos: SourceRef,
    pub field: String,
    pub val: ClauseValue,
    #[serde(rename = "type")]
    pub value_type: String,
    pub compare: String,
}

/// Join relationship between `field1` of source `pos1` and `field2` of source `pos2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinEdge {
    pub pos1: SourceRef,
    pub pos2: SourceRef,
    pub field1: String,
    pub field2: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub compare: String,
    #[serde(rename = "jointType")]
    pub joint_type: String,
}

impl JoinEdge {
    pub fn new(pos1: impl Into<SourceRef>, pos2: impl Into<SourceRef>) -> Self {
        JoinEdge {
            pos1: pos1.into(),
            pos2: pos2.into(),
            field1: String::new(),
            field2: String::new(),
            value_type: "string".to_string(),
            compare: "eq".to_string(),
            joint_type: "INNER".to_string(),
        }
    }

    pub fn on(mut self, field1: impl Into<String>, field2: impl Into<String>) -> Self {
        self.field1 = field1.into();
        self.field2 = field2.into();
        self
    }

    pub fn compared_as(mut self, value_type: impl Into<String>, compare: impl Into<String>) -> Self {
        self.value_type = value_type.into();
        self.compare = compare.into();
        self
    }
}

/// The form as submitted by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawQueryForm {
    #[serde(
        rename = "queryConcatType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub query_concat_type: Option<String>,
    #[serde(rename = "queryConditions")]
    pub query_conditions: Vec<Vec<RawCondition>>,
    #[serde(rename = "jointConditions", default)]
    pub joint_conditions: Vec<JoinEdge>,
    /// Shard addresses per source, first shard first.
    #[serde(rename = "filePos")]
    pub file_pos: Vec<Vec<String>>,
    #[serde(rename = "returnField")]
    pub return_field: Vec<String>,
}

impl RawQueryForm {
    /// Decode a form from editor JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_minimal_form() {
        let form: RawQueryForm = serde_json::from_value(json!({
            "queryConditions": [],
            "filePos": [["addr1"]],
            "returnField": ["addr1_*"]
        }))
        .unwrap();
        assert_eq!(form.query_concat_type, None);
        assert!(form.joint_conditions.is_empty());
    }

    #[test]
    fn test_rejects_unknown_field() {
        let result = serde_json::from_value::<RawQueryForm>(json!({
            "queryConditions": [],
            "filePos": [],
            "returnField": [],
            "returnFields": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_missing_clause_field() {
        let result = serde_json::from_value::<RawQueryForm>(json!({
            "queryConditions": [[{"pos": "0", "field": "age", "val": "3", "type": "int"}]],
            "filePos": [],
            "returnField": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_join_edge_renames() {
        let edge: JoinEdge = serde_json::from_value(json!({
            "pos1": 0, "pos2": "1", "field1": "id", "field2": "uid",
            "type": "int", "compare": "eq", "jointType": "INNER"
        }))
        .unwrap();
        assert_eq!(edge.pos1, SourceRef::Index(0));
        assert_eq!(edge.pos2, SourceRef::name("1"));
        assert_eq!(edge.value_type, "int");
        assert_eq!(edge.joint_type, "INNER");
    }
}
