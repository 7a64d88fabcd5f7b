//! Error types for headline_core

use thiserror::Error;

/// Errors raised while loading attribute sets
///
/// Bad attribute *values* never surface here; they resolve to defaults.
/// These errors only cover malformed attribute files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Attribute name is not observed by the widget
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Attribute value has an unsupported shape (tables, arrays, ...)
    #[error("Invalid value for `{name}`: {reason}")]
    InvalidValue { name: String, reason: String },

    /// Attribute file is not valid TOML
    #[error("Failed to parse attribute file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
