//! Error handling for HL7v2 processing operations.
//!
//! Provides error types with context for schema loading, batch
//! processing, and Parquet output failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Hl7Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Failed to load segment schema from {path}: {reason}")]
    SchemaLoadFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for {path}: {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

pub type Result<T> = std::result::Result<T, Hl7Error>;
