//! Error types for headline_element

use headline_core::ConfigError;
use thiserror::Error;

use crate::host::ElementId;

/// Errors raised by the headless host
#[derive(Error, Debug)]
pub enum HostError {
    /// No element with this id is mounted
    #[error("Unknown element: {0:?}")]
    UnknownElement(ElementId),

    /// Attribute name or file was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;
