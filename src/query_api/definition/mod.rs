// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod canonical_spec;
pub mod raw_form;
pub mod source_ref;

pub use canonical_spec::{
    CanonicalQuerySpec, JointCondition, QueryConcatType, QueryCondition, QueryConditionGroup,
    ShowColumnRange, SourceColumns,
};
pub use raw_form::{JoinEdge, RawCondition, RawQueryForm, SINGLE_CONCAT_TYPE};
pub use source_ref::{ClauseValue, SourceRef};
