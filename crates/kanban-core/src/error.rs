//! Error types for the kanban core
//!
//! Unknown ids are not errors: mutations referencing them are no-ops.
//! These variants cover storage, decoding and configuration failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Stored snapshot is missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported snapshot version: {found} (expected {expected})")]
    UnsupportedVersion { found: i64, expected: u32 },

    #[error("Snapshot version is not an integer: {0}")]
    InvalidVersion(String),

    #[error("Snapshot integrity violation: {0}")]
    Integrity(String),

    #[error("Invalid drag id: {0}")]
    InvalidDndId(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
