// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form compiler error types

use thiserror::Error;

use super::operator_validation::OperatorError;
use crate::query_api::definition::SourceRef;

/// Errors raised while turning a raw form into a canonical spec
#[derive(Error, Debug)]
pub enum CompileError {
    /// The form is not valid JSON, or does not have the form's shape
    #[error("Failed to read query form: {0}")]
    Parse(#[from] serde_json::Error),

    /// Return columns and sources disagree
    #[error(
        "Check the return columns. A return column must be prefixed with the first shard \
         address of its data set ({attributed} of {declared} return columns matched a source; \
         unmatched or repeated: {unmatched:?})"
    )]
    SchemaMismatch {
        attributed: usize,
        declared: usize,
        /// Entries claimed by no source, or by more than one
        unmatched: Vec<String>,
    },

    #[error("Query form is {size} bytes, larger than the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },
}

/// Errors of the full compile-and-validate pipeline
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The join relationships contain a cycle
    #[error(
        "Join conditions form a cycle, so there is no single order to join the data sets in \
         ({remaining} of {total} joins sit on a cycle)"
    )]
    JoinGraphCyclic { remaining: usize, total: usize },

    /// The joins leave some data sets unconnected
    #[error("Join conditions do not connect every data set: {components} separate groups, unjoined: {unjoined:?}")]
    JoinGraphDisconnected {
        components: usize,
        unjoined: Vec<SourceRef>,
    },

    /// Joining n data sets takes exactly n - 1 join conditions
    #[error(
        "Join conditions must number one less than the data sets: {joins} join(s) for {sources} data set(s)"
    )]
    JoinCountMismatch { joins: usize, sources: usize },

    #[error("Invalid operator in {0}")]
    Operator(#[from] OperatorError),
}
