// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration of the form compiler.
//!
//! ```toml
//! [compiler]
//! max-input-size = 10485760
//! validate-operators = true
//!
//! [compiler.join]
//! parallel-edges = "reject"   # or "merge"
//! require-connected = true
//! ```

use super::flat_config::{FlatConfig, PropertySource};
use crate::core::error::{QueryFormError, QueryFormResult};

pub const KEY_MAX_INPUT_SIZE: &str = "compiler.max-input-size";
pub const KEY_VALIDATE_OPERATORS: &str = "compiler.validate-operators";
pub const KEY_PARALLEL_EDGES: &str = "compiler.join.parallel-edges";
pub const KEY_REQUIRE_CONNECTED: &str = "compiler.join.require-connected";

/// Every key understood by [`CompilerConfig`].
pub const COMPILER_KEYS: &[&str] = &[
    KEY_MAX_INPUT_SIZE,
    KEY_VALIDATE_OPERATORS,
    KEY_PARALLEL_EDGES,
    KEY_REQUIRE_CONNECTED,
];

pub const DEFAULT_MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;

/// How two join edges between the same pair of sources are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParallelEdgePolicy {
    /// Each edge counts on its own; a repeated pair is a 2-cycle.
    #[default]
    Reject,
    /// Edges sharing a pair are one multi-condition join.
    Merge,
}

impl ParallelEdgePolicy {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(ParallelEdgePolicy::Reject),
            "merge" => Ok(ParallelEdgePolicy::Merge),
            _ => Err(format!(
                "Invalid parallel edge policy '{}'. Valid values: 'reject', 'merge'",
                s
            )),
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ParallelEdgePolicy::Reject => "reject",
            ParallelEdgePolicy::Merge => "merge",
        }
    }
}

/// Settings for [`crate::form_compiler::application::compile_query_application`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Largest accepted form, in bytes
    pub max_input_size: usize,
    /// Check clause and join operators against their declared types
    pub validate_operators: bool,
    pub parallel_edges: ParallelEdgePolicy,
    /// Reject multi-source joins that do not form one tree over every source
    pub require_connected: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            validate_operators: true,
            parallel_edges: ParallelEdgePolicy::Reject,
            require_connected: true,
        }
    }
}

impl CompilerConfig {
    /// Defaults expressed as a [`FlatConfig`] layer.
    pub fn defaults() -> FlatConfig {
        let defaults = CompilerConfig::default();
        let mut config = FlatConfig::new();
        config.set(
            KEY_MAX_INPUT_SIZE,
            defaults.max_input_size.to_string(),
            PropertySource::RustDefault,
        );
        config.set(
            KEY_VALIDATE_OPERATORS,
            defaults.validate_operators.to_string(),
            PropertySource::RustDefault,
        );
        config.set(
            KEY_PARALLEL_EDGES,
            defaults.parallel_edges.as_str(),
            PropertySource::RustDefault,
        );
        config.set(
            KEY_REQUIRE_CONNECTED,
            defaults.require_connected.to_string(),
            PropertySource::RustDefault,
        );
        config
    }

    /// Parse compiler settings, falling back to defaults for absent keys.
    pub fn from_flat_config(config: &FlatConfig) -> QueryFormResult<Self> {
        let defaults = CompilerConfig::default();

        let max_input_size = match config.get(KEY_MAX_INPUT_SIZE) {
            Some(raw) => {
                let size = raw.trim().parse::<usize>().map_err(|e| {
                    QueryFormError::configuration_with_key(
                        format!("Invalid byte count '{}': {}", raw, e),
                        KEY_MAX_INPUT_SIZE,
                    )
                })?;
                if size == 0 {
                    return Err(QueryFormError::configuration_with_key(
                        "max-input-size must be greater than zero",
                        KEY_MAX_INPUT_SIZE,
                    ));
                }
                size
            }
            None => defaults.max_input_size,
        };

        let validate_operators = parse_bool(config, KEY_VALIDATE_OPERATORS)?
            .unwrap_or(defaults.validate_operators);

        let parallel_edges = config
            .get(KEY_PARALLEL_EDGES)
            .map(|s| ParallelEdgePolicy::from_str(s))
            .transpose()
            .map_err(|e| QueryFormError::configuration_with_key(e, KEY_PARALLEL_EDGES))?
            .unwrap_or(defaults.parallel_edges);

        let require_connected = parse_bool(config, KEY_REQUIRE_CONNECTED)?
            .unwrap_or(defaults.require_connected);

        Ok(Self {
            max_input_size,
            validate_operators,
            parallel_edges,
            require_connected,
        })
    }

    /// Layer defaults, an optional TOML file, `QUERYFORM_*` variables and
    /// command line `overrides`.
    pub fn load(toml_path: Option<&std::path::Path>, overrides: &FlatConfig) -> QueryFormResult<Self> {
        let mut flat = CompilerConfig::defaults();
        if let Some(path) = toml_path {
            flat.merge(&FlatConfig::from_toml_file(path)?);
        }
        flat.merge(&FlatConfig::from_env_with(COMPILER_KEYS, |name| {
            std::env::var(name).ok()
        }));
        flat.merge(overrides);

        for key in unrecognized_keys(&flat) {
            log::warn!("Ignoring unknown configuration key '{}'", key);
        }
        for key in COMPILER_KEYS {
            if let Some((value, source)) = flat.get_with_source(key) {
                log::debug!("{} = {} (from {})", key, value, source.description());
            }
        }

        Self::from_flat_config(&flat)
    }
}

/// Keys under `compiler.` that [`CompilerConfig`] does not understand.
pub fn unrecognized_keys(config: &FlatConfig) -> Vec<&String> {
    let mut keys: Vec<&String> = config
        .get_properties_with_prefix("compiler.")
        .map(|(key, _)| key)
        .filter(|key| !COMPILER_KEYS.contains(&key.as_str()))
        .collect();
    keys.sort();
    keys
}

fn parse_bool(config: &FlatConfig, key: &str) -> QueryFormResult<Option<bool>> {
    match config.get(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(QueryFormError::configuration_with_key(
                format!("Invalid boolean '{}'", raw),
                key,
            )),
        },
    }
}
