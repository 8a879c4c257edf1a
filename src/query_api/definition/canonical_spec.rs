// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical query specification handed to the backend query service.
//!
//! The backend parses this structure by field name, so every serialized name
//! and enum literal here is part of the wire contract.

use serde::{Deserialize, Serialize};

use super::raw_form::SINGLE_CONCAT_TYPE;
use super::source_ref::{ClauseValue, SourceRef};

/// Whether a query reads one source or joins several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryConcatType {
    Single,
    Multi,
}

impl QueryConcatType {
    /// `single` only for the exact literal; everything else joins sources.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(SINGLE_CONCAT_TYPE) => QueryConcatType::Single,
            _ => QueryConcatType::Multi,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            QueryConcatType::Single => "single",
            QueryConcatType::Multi => "multi",
        }
    }
}

/// Which columns of a source are exposed in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShowColumnRange {
    /// No column of this source is returned.
    #[default]
    #[serde(rename = "non")]
    Non,
    /// Only the columns listed in `queryShowColumn`.
    #[serde(rename = "select")]
    Select,
    /// Every column of the source.
    #[serde(rename = "*")]
    All,
}

/// Shard addresses and output columns of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceColumns {
    #[serde(rename = "ipfsAddress")]
    pub ipfs_address: Vec<String>,
    pub id: usize,
    #[serde(rename = "queryShowColumn")]
    pub query_show_column: Vec<String>,
    #[serde(rename = "queryShowColumnRange")]
    pub query_show_column_range: ShowColumnRange,
}

impl SourceColumns {
    pub fn new(id: usize, ipfs_address: Vec<String>) -> Self {
        SourceColumns {
            ipfs_address,
            id,
            query_show_column: Vec::new(),
            query_show_column_range: ShowColumnRange::Non,
        }
    }

    /// Address whose columns are addressable in `returnField`.
    pub fn first_shard(&self) -> Option<&str> {
        self.ipfs_address.first().map(String::as_str)
    }
}

/// One filter clause in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    #[serde(rename = "queryFile")]
    pub query_file: SourceRef,
    #[serde(rename = "queryColumn")]
    pub query_column: String,
    #[serde(rename = "baseValue")]
    pub base_value: ClauseValue,
    /// `[type, compare]`
    #[serde(rename = "queryOperator")]
    pub query_operator: [String; 2],
}

impl QueryCondition {
    pub fn value_type(&self) -> &str {
        &self.query_operator[0]
    }

    pub fn compare(&self) -> &str {
        &self.query_operator[1]
    }
}

/// Condition group, tagged with its position in the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConditionGroup {
    #[serde(rename = "tabIndex")]
    pub tab_index: usize,
    #[serde(rename = "queryConditions")]
    pub query_conditions: Vec<QueryCondition>,
}

/// Join relationship in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointCondition {
    pub pos1: SourceRef,
    pub pos2: SourceRef,
    pub field1: String,
    pub field2: String,
    /// `[type, compare]`
    #[serde(rename = "compareAndType")]
    pub compare_and_type: [String; 2],
    #[serde(rename = "jointType")]
    pub joint_type: String,
}

impl JointCondition {
    pub fn value_type(&self) -> &str {
        &self.compare_and_type[0]
    }

    pub fn compare(&self) -> &str {
        &self.compare_and_type[1]
    }
}

/// Compiled form, ready for the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalQuerySpec {
    #[serde(rename = "queryConcatType")]
    pub query_concat_type: QueryConcatType,
    #[serde(rename = "queryIPFSAdressAndShowColumn")]
    pub sources: Vec<SourceColumns>,
    #[serde(rename = "queryConditionGroups")]
    pub query_condition_groups: Vec<QueryConditionGroup>,
    #[serde(rename = "jointConditions")]
    pub joint_conditions: Vec<JointCondition>,
}

impl CanonicalQuerySpec {
    pub fn is_multi(&self) -> bool {
        self.query_concat_type == QueryConcatType::Multi
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
