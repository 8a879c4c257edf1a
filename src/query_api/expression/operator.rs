// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator vocabulary of filter clauses and join conditions.
//!
//! The canonical spec carries operators as plain strings (the backend parses
//! them itself); these enums are the typed view used when validating them.

/// Declared type used to compare a cell against a base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Int,
    Float,
}

impl ValueType {
    /// Parse value type from its wire literal
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "string" => Ok(ValueType::String),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            _ => Err(format!(
                "Invalid value type '{}'. Valid values: 'string', 'int', 'float'",
                s
            )),
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
        }
    }

    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Regexp,
    Contain,
    Suffix,
    Prefix,
}

impl CompareOp {
    /// Parse compare operator from its wire literal
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "eq" => Ok(CompareOp::Eq),
            "ne" => Ok(CompareOp::Ne),
            "lt" => Ok(CompareOp::Lt),
            "gt" => Ok(CompareOp::Gt),
            "le" => Ok(CompareOp::Le),
            "ge" => Ok(CompareOp::Ge),
            "regexp" => Ok(CompareOp::Regexp),
            "contain" => Ok(CompareOp::Contain),
            "suffix" => Ok(CompareOp::Suffix),
            "prefix" => Ok(CompareOp::Prefix),
            _ => Err(format!("Unknown compare operator '{}'", s)),
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Lt => "lt",
            CompareOp::Gt => "gt",
            CompareOp::Le => "le",
            CompareOp::Ge => "ge",
            CompareOp::Regexp => "regexp",
            CompareOp::Contain => "contain",
            CompareOp::Suffix => "suffix",
            CompareOp::Prefix => "prefix",
        }
    }

    /// Operators that only make sense on text.
    #[inline]
    pub const fn is_text_only(&self) -> bool {
        matches!(
            self,
            CompareOp::Regexp | CompareOp::Contain | CompareOp::Suffix | CompareOp::Prefix
        )
    }

    /// Whether a filter clause of `value_type` may use this operator.
    pub fn supports(&self, value_type: ValueType) -> bool {
        !(value_type.is_numeric() && self.is_text_only())
    }
}

/// Kind of join between two sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
}

impl JoinType {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "INNER" => Ok(JoinType::Inner),
            _ => Err(format!("Unsupported join type '{}'. Valid values: 'INNER'", s)),
        }
    }
}
