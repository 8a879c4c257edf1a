// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod operator;

pub use operator::{CompareOp, JoinType, ValueType};
