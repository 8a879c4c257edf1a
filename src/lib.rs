// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compile query forms spanning several sharded data sets into the canonical
//! query spec of the backend query service, and check that their join
//! relationships admit a single evaluation order.

pub mod core;
pub mod form_compiler;
pub mod query_api;

pub use crate::core::error::{QueryFormError, QueryFormResult};
pub use crate::core::validation::is_acyclic;
pub use crate::form_compiler::{compile, compile_form, compile_query_application};
