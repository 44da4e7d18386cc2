//! Core SSR error types (pure - no I/O variants).

use thiserror::Error;

/// Maximum size for the serialized bootstrap data (5MB).
pub const MAX_BOOTSTRAP_DATA_SIZE: usize = 5 * 1024 * 1024;

/// Core SSR errors (pure - no I/O variants).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SsrCoreError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid asset manifest: {0}")]
    InvalidManifest(String),

    #[error("Unknown document: {0}")]
    UnknownDocument(String),

    #[error("Document template failed: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, SsrCoreError>;
