// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Flat Configuration Module
//!
//! Layered key/value configuration. Every setting is a dotted key
//! (`compiler.join.parallel-edges`) and remembers where it came from, so a
//! value from a higher-priority layer always wins regardless of load order.
//!
//! ## Configuration Sources (Priority: Low to High)
//!
//! 1. **RustDefault** - Built-in Rust defaults
//! 2. **TomlFile** - `queryform.toml` (nested tables flatten to dotted keys)
//! 3. **Environment** - `QUERYFORM_*` variables
//! 4. **CommandLine** - flags passed to the `queryform` binary
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use queryform_rust::core::config::*;
//!
//! let mut config = FlatConfig::from_toml_str(
//!     "[compiler.join]\nparallel-edges = \"merge\"\n",
//! )?;
//! config.set("compiler.validate-operators", "false", PropertySource::CommandLine);
//! let compiler = CompilerConfig::from_flat_config(&config)?;
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::core::error::{QueryFormError, QueryFormResult};

/// Prefix of environment variables read by [`FlatConfig::from_env_with`].
pub const ENV_PREFIX: &str = "QUERYFORM_";

/// Property source identifier with priority ordering
///
/// Higher priority sources override lower priority sources during configuration merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertySource {
    /// Rust code defaults (priority: 0)
    RustDefault,
    /// TOML configuration file (priority: 1)
    TomlFile,
    /// QUERYFORM_* environment variables (priority: 2)
    Environment,
    /// Command line flags (priority: 3)
    CommandLine,
}

impl PropertySource {
    /// Get numeric priority for comparison (higher = more important)
    #[inline]
    pub const fn priority(&self) -> u8 {
        match self {
            PropertySource::RustDefault => 0,
            PropertySource::TomlFile => 1,
            PropertySource::Environment => 2,
            PropertySource::CommandLine => 3,
        }
    }

    /// Get human-readable description of the source
    #[inline]
    pub const fn description(&self) -> &'static str {
        match self {
            PropertySource::RustDefault => "Rust default",
            PropertySource::TomlFile => "TOML file",
            PropertySource::Environment => "environment variable",
            PropertySource::CommandLine => "command line",
        }
    }
}

/// Flat key-value configuration with source tracking
#[derive(Debug, Clone)]
pub struct FlatConfig {
    properties: HashMap<String, String>,
    sources: HashMap<String, PropertySource>,
}

impl FlatConfig {
    /// Create a new empty configuration
    #[inline]
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
            sources: HashMap::new(),
        }
    }

    /// Set a property with source tracking and priority-based override
    ///
    /// Only sets the value if the new source has equal or higher priority than the existing source.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, source: PropertySource) {
        let key = key.into();
        let value = value.into();

        if let Some(existing_source) = self.sources.get(&key) {
            if existing_source.priority() > source.priority() {
                return;
            }
        }

        self.properties.insert(key.clone(), value);
        self.sources.insert(key, source);
    }

    /// Get a property value by key
    #[inline]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }

    /// Get a property value with its source
    #[inline]
    pub fn get_with_source(&self, key: &str) -> Option<(&String, PropertySource)> {
        self.properties
            .get(key)
            .and_then(|value| self.sources.get(key).map(|source| (value, *source)))
    }

    /// Merge another configuration into this one (respects priorities)
    pub fn merge(&mut self, other: &FlatConfig) {
        for (key, value) in &other.properties {
            if let Some(source) = other.sources.get(key) {
                self.set(key.clone(), value.clone(), *source);
            }
        }
    }

    /// Get all properties with a specific prefix
    pub fn get_properties_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a String)> + 'a {
        self.properties
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
    }

    /// Parse a TOML document, flattening nested tables into dotted keys.
    pub fn from_toml_str(content: &str) -> QueryFormResult<Self> {
        let root: toml::Table = content.parse()?;
        let mut config = FlatConfig::new();
        flatten_toml_table("", &root, &mut config)?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> QueryFormResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loading configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Collect `keys` from environment-style variables.
    ///
    /// `compiler.max-input-size` is looked up as `QUERYFORM_COMPILER_MAX_INPUT_SIZE`.
    /// `lookup` is `std::env::var(..).ok()` in production and a map in tests.
    pub fn from_env_with<F>(keys: &[&str], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = FlatConfig::new();
        for key in keys {
            if let Some(value) = lookup(&env_var_name(key)) {
                config.set(*key, value, PropertySource::Environment);
            }
        }
        config
    }
}

impl Default for FlatConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Environment variable name for a dotted configuration key.
pub fn env_var_name(key: &str) -> String {
    let mut name = String::with_capacity(ENV_PREFIX.len() + key.len());
    name.push_str(ENV_PREFIX);
    for c in key.chars() {
        match c {
            '.' | '-' => name.push('_'),
            c => name.push(c.to_ascii_uppercase()),
        }
    }
    name
}

fn flatten_toml_table(prefix: &str, table: &toml::Table, config: &mut FlatConfig) -> QueryFormResult<()> {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::Table(nested) => flatten_toml_table(&full_key, nested, config)?,
            toml::Value::String(s) => config.set(full_key, s.clone(), PropertySource::TomlFile),
            toml::Value::Integer(i) => config.set(full_key, i.to_string(), PropertySource::TomlFile),
            toml::Value::Float(f) => config.set(full_key, f.to_string(), PropertySource::TomlFile),
            toml::Value::Boolean(b) => config.set(full_key, b.to_string(), PropertySource::TomlFile),
            toml::Value::Datetime(d) => config.set(full_key, d.to_string(), PropertySource::TomlFile),
            toml::Value::Array(_) => {
                return Err(QueryFormError::configuration_with_key(
                    "Array values are not supported in configuration",
                    full_key,
                ));
            }
        }
    }
    Ok(())
}
