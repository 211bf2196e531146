//! Error types for themeweave operations.
//!
//! This module defines [`WeaveError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `WeaveError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `WeaveError::Other`) for unexpected errors
//! - Loader failures keep the delegate's [`LoaderError`] as their source

use std::path::PathBuf;
use thiserror::Error;

use crate::loader::LoaderError;

/// Core error type for themeweave operations.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// Every resolution strategy was exhausted for a template name.
    #[error("Could not find template \"{name}\"")]
    TemplateNotFound {
        name: String,
        #[source]
        source: LoaderError,
    },

    /// Source was requested for a name that was never resolved.
    #[error("Template \"{name}\" has not been resolved")]
    UnresolvedTemplate { name: String },

    /// The template name is malformed or escapes its root.
    #[error("Invalid template name \"{name}\": {reason}")]
    InvalidTemplateName { name: String, reason: String },

    /// A custom tag or operator could not be rewritten.
    #[error("Syntax error in template \"{template}\": {message}")]
    Syntax { template: String, message: String },

    /// The template engine failed to parse or render a template.
    #[error("Failed to render template \"{template}\": {source}")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for themeweave operations.
pub type Result<T> = std::result::Result<T, WeaveError>;

impl WeaveError {
    /// The message followed by every source not already part of it.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let message = err.to_string();
            if !report.contains(&message) {
                report.push_str(": ");
                report.push_str(&message);
            }
            source = err.source();
        }
        report
    }
}
