//! Error types for the headcount mapping pipeline.
//!
//! Every stage has its own error type and [`PipelineError`] wraps them all:
//!
//! - [`SourceError`] - loading a table (`SourceNotFound`, `SourceFormatError`)
//! - [`SchemaError`] - a required column is absent (`SchemaMismatch`)
//! - [`SinkError`] - writing the output table
//! - [`ConfigError`] - invalid configuration values
//! - [`PipelineError`] - top-level orchestration errors
//!
//! All of them are fatal: the pipeline stops at the first error and writes
//! nothing. Conversion is automatic via `From`, so `?` works across stages.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while loading a table from a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source location does not resolve to a file.
    #[error("Source not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The sheet is missing or the content cannot be read as a table.
    #[error("Cannot read sheet '{sheet}' of {}: {message}", path.display())]
    Format {
        path: PathBuf,
        sheet: String,
        message: String,
    },

    /// Low-level IO failure while reading an existing file.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn format(path: impl Into<PathBuf>, sheet: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::Format {
            path: path.into(),
            sheet: sheet.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// A column needed by a stage is absent from its table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Column '{column}' is missing from the {table} table")]
    MissingColumn { table: String, column: String },
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors while writing the output table.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The destination extension has no writer.
    #[error("Unsupported output format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Every candidate name up to the probe limit is taken.
    #[error("No free file name for {} after {attempts} attempts", base.display())]
    NoFreeName { base: PathBuf, attempts: usize },
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Short name of the failure class, used in the CLI error line.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Source(SourceError::NotFound { .. }) => "SourceNotFound",
            PipelineError::Source(_) => "SourceFormatError",
            PipelineError::Schema(_) => "SchemaMismatch",
            PipelineError::Sink(_) => "SinkError",
            PipelineError::Config(_) => "ConfigError",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for schema-checked operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
