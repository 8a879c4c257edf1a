// SPDX-License-Identifier: MIT OR Apache-2.0

//! QueryForm Core Error Types
//!
//! Crate-level errors for configuration loading and the command line surface.
//! Compiler errors live in [`crate::form_compiler::error`] and convert into
//! [`QueryFormError`] at the outer boundary.

use thiserror::Error;

/// Result type for QueryForm operations
pub type QueryFormResult<T> = Result<T, QueryFormError>;

/// Crate-level error types
#[derive(Error, Debug)]
pub enum QueryFormError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        config_key: Option<String>,
    },

    #[error("Invalid parameter '{parameter:?}': {message}")]
    InvalidParameter {
        message: String,
        parameter: Option<String>,
        expected: Option<String>,
    },

    #[error("Compilation failed: {0}")]
    Compilation(#[from] crate::form_compiler::error::ApplicationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl QueryFormError {
    /// Create a configuration error with a specific key
    pub fn configuration_with_key(message: impl Into<String>, config_key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: Some(config_key.into()),
        }
    }

    /// Create an invalid parameter error with details
    pub fn invalid_parameter_with_details(
        message: impl Into<String>,
        parameter: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            parameter: Some(parameter.into()),
            expected: Some(expected.into()),
        }
    }

    /// Configuration key this error refers to, if any
    pub fn config_key(&self) -> Option<&str> {
        match self {
            Self::Configuration { config_key, .. } => config_key.as_deref(),
            _ => None,
        }
    }
}
