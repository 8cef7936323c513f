//! Error types for the planner.
//!
//! Store mutations never fail from the caller's point of view; these errors
//! surface at the edges (snapshot loading, configuration, CLI resolution).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} not found: {ident}")]
    NotFound { kind: &'static str, ident: String },
}

impl Error {
    pub fn not_found(kind: &'static str, ident: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            ident: ident.into(),
        }
    }
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, Error>;
