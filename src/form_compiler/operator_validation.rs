// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator Validation Module
//!
//! Checks the `[type, compare]` pairs of a compiled spec against what the
//! backend can evaluate. Runs after compilation, before the spec is sent.
//!
//! | type     | compares                                              |
//! |----------|-------------------------------------------------------|
//! | `string` | eq ne lt gt le ge regexp contain suffix prefix        |
//! | `int`    | eq ne lt gt le ge                                     |
//! | `float`  | eq ne lt gt le ge                                     |
//!
//! Join conditions use the ordering compares only and `jointType = INNER`.

use regex::Regex;
use std::fmt;

use crate::query_api::definition::{CanonicalQuerySpec, JointCondition, QueryCondition};
use crate::query_api::expression::{CompareOp, JoinType, ValueType};

/// Where in the spec an operator was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorLocation {
    Clause { group: usize, clause: usize },
    Join { index: usize },
}

impl fmt::Display for OperatorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorLocation::Clause { group, clause } => {
                write!(f, "condition group {} clause {}", group, clause)
            }
            OperatorLocation::Join { index } => write!(f, "join condition {}", index),
        }
    }
}

/// Operator validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorError {
    UnknownValueType {
        location: OperatorLocation,
        value_type: String,
    },
    UnknownCompare {
        location: OperatorLocation,
        compare: String,
    },
    /// Text-only compare on a numeric type, or on a join
    UnsupportedCompare {
        location: OperatorLocation,
        value_type: ValueType,
        compare: CompareOp,
    },
    InvalidRegex {
        location: OperatorLocation,
        pattern: String,
        reason: String,
    },
    NonNumericBaseValue {
        location: OperatorLocation,
        value_type: ValueType,
        value: String,
    },
    UnsupportedJoinType {
        location: OperatorLocation,
        joint_type: String,
    },
}

impl OperatorError {
    pub fn location(&self) -> OperatorLocation {
        match self {
            OperatorError::UnknownValueType { location, .. }
            | OperatorError::UnknownCompare { location, .. }
            | OperatorError::UnsupportedCompare { location, .. }
            | OperatorError::InvalidRegex { location, .. }
            | OperatorError::NonNumericBaseValue { location, .. }
            | OperatorError::UnsupportedJoinType { location, .. } => *location,
        }
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::UnknownValueType {
                location,
                value_type,
            } => write!(
                f,
                "{}: unknown type '{}'. Use 'string', 'int' or 'float'",
                location, value_type
            ),
            OperatorError::UnknownCompare { location, compare } => {
                write!(f, "{}: unknown compare operator '{}'", location, compare)
            }
            OperatorError::UnsupportedCompare {
                location,
                value_type,
                compare,
            } => write!(
                f,
                "{}: operator '{}' is not supported for type '{}'",
                location,
                compare.as_str(),
                value_type.as_str()
            ),
            OperatorError::InvalidRegex {
                location,
                pattern,
                reason,
            } => write!(
                f,
                "{}: regular expression '{}' is invalid: {}",
                location, pattern, reason
            ),
            OperatorError::NonNumericBaseValue {
                location,
                value_type,
                value,
            } => write!(
                f,
                "{}: base value '{}' cannot be read as {}. Change the clause type",
                location,
                value,
                value_type.as_str()
            ),
            OperatorError::UnsupportedJoinType {
                location,
                joint_type,
            } => write!(
                f,
                "{}: join type '{}' is not supported, only 'INNER'",
                location, joint_type
            ),
        }
    }
}

impl std::error::Error for OperatorError {}

/// Validate every clause and join operator of `spec`, stopping at the first problem.
pub fn validate_operators(spec: &CanonicalQuerySpec) -> Result<(), OperatorError> {
    for group in &spec.query_condition_groups {
        for (clause_idx, clause) in group.query_conditions.iter().enumerate() {
            validate_clause(
                clause,
                OperatorLocation::Clause {
                    group: group.tab_index,
                    clause: clause_idx,
                },
            )?;
        }
    }

    for (index, join) in spec.joint_conditions.iter().enumerate() {
        validate_join(join, OperatorLocation::Join { index })?;
    }

    Ok(())
}

fn parse_pair(
    value_type: &str,
    compare: &str,
    location: OperatorLocation,
) -> Result<(ValueType, CompareOp), OperatorError> {
    let ty = ValueType::from_str(value_type).map_err(|_| OperatorError::UnknownValueType {
        location,
        value_type: value_type.to_string(),
    })?;
    let op = CompareOp::from_str(compare).map_err(|_| OperatorError::UnknownCompare {
        location,
        compare: compare.to_string(),
    })?;
    Ok((ty, op))
}

fn validate_clause(clause: &QueryCondition, location: OperatorLocation) -> Result<(), OperatorError> {
    let (ty, op) = parse_pair(clause.value_type(), clause.compare(), location)?;

    if !op.supports(ty) {
        return Err(OperatorError::UnsupportedCompare {
            location,
            value_type: ty,
            compare: op,
        });
    }

    let base = clause.base_value.as_text();

    if op == CompareOp::Regexp {
        if let Err(e) = Regex::new(&base) {
            return Err(OperatorError::InvalidRegex {
                location,
                pattern: base,
                reason: e.to_string(),
            });
        }
    }

    // Parsed verbatim: no trimming, and an empty value is not a number
    if ty.is_numeric() {
        let parses = match ty {
            ValueType::Int => base.parse::<i64>().is_ok(),
            ValueType::Float => base.parse::<f64>().is_ok(),
            ValueType::String => true,
        };
        if !parses {
            return Err(OperatorError::NonNumericBaseValue {
                location,
                value_type: ty,
                value: base,
            });
        }
    }

    Ok(())
}

fn validate_join(join: &JointCondition, location: OperatorLocation) -> Result<(), OperatorError> {
    let (ty, op) = parse_pair(join.value_type(), join.compare(), location)?;

    if op.is_text_only() {
        return Err(OperatorError::UnsupportedCompare {
            location,
            value_type: ty,
            compare: op,
        });
    }

    JoinType::from_str(&join.joint_type).map_err(|_| OperatorError::UnsupportedJoinType {
        location,
        joint_type: join.joint_type.clone(),
    })?;

    Ok(())
}
