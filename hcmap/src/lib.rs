//! # hcmap - Tech and Ops headcount mapping
//!
//! Filters a raw headcount (HC) export down to Tech and Ops, then enriches
//! every remaining employee with MT Domain, Generic Dept and Justification
//! values taken from a reference workbook.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │  Raw export │────▶│   Filter    │────▶│ Project + enrich │────▶│ Output xlsx │
//! │ (xlsx/csv)  │     │ (T&O, !Eder)│     │ (mapping sheets) │     │ (no clobber)│
//! └─────────────┘     └─────────────┘     └──────────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hcmap::{run, PipelineConfig};
//!
//! let report = run(&PipelineConfig::default())?;
//! println!("{} employees written to {}", report.output_rows, report.output_path.display());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error hierarchy
//! - [`models`] - Row and Table
//! - [`source`] - Spreadsheet and CSV loaders
//! - [`transform`] - Filter, lookups, projection and pipeline
//! - [`sink`] - Output writers with collision-free naming
//! - [`config`] - Pipeline configuration
//! - [`logs`] - Console progress log

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// I/O
pub mod sink;
pub mod source;

// Transformation
pub mod transform;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError,
    PipelineError,
    PipelineResult,
    SchemaError,
    SinkError,
    SourceError,
};

// =============================================================================
// Re-exports - Models and configuration
// =============================================================================

pub use config::PipelineConfig;
pub use models::{Row, RowRef, Table};

// =============================================================================
// Re-exports - Sources and sinks
// =============================================================================

pub use source::{
    load_table,
    open_source,
    DelimitedSource,
    MemorySource,
    SheetSelector,
    TableSource,
    WorkbookSource,
};

pub use sink::{save_table, FileSink, OutputFormat, TableSink, MAX_NAME_ATTEMPTS};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    output_columns,
    project,
    run,
    run_with,
    transform_tables,
    DuplicateKeyPolicy,
    EnrichStats,
    Enrichments,
    ReferenceMapping,
    RowFilter,
    RunReport,
};
