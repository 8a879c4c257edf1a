// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query API - the data shapes exchanged with the form editor and the backend.

pub mod definition;
pub mod expression;

pub use definition::*;
pub use expression::*;
