// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form Compiler
//!
//! Turns the raw query form authored in the editor into the canonical spec the
//! backend query service consumes, and validates it on the way:
//!
//! ```text
//! form JSON -> normalizer::compile -> CanonicalQuerySpec
//!                                        |
//!          application::compile_query_application
//!            - join graph is a forest (multi-source only)
//!            - joins reach every data set (optional)
//!            - operators match their declared types (optional)
//! ```

pub mod application;
pub mod decompose;
pub mod error;
pub mod normalizer;
pub mod operator_validation;
pub mod return_field;

pub use application::{compile_query_application, CompiledQuery};
pub use decompose::decompose;
pub use error::{ApplicationError, CompileError};
pub use normalizer::{compile, compile_form};
pub use operator_validation::{validate_operators, OperatorError, OperatorLocation};
