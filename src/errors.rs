// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SesameError {
    /// The execution-id filter matched nothing. Retrying cannot help.
    #[error("No results for execution id: {0}")]
    NotFound(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SesameError>;
