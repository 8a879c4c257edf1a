// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod compiler_config;
pub mod flat_config;

pub use compiler_config::{CompilerConfig, ParallelEdgePolicy};
pub use flat_config::{FlatConfig, PropertySource};
