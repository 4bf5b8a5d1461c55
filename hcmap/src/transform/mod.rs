//! Transformation stages.
//!
//! - `filter`: keep Tech and Ops rows, drop the excluded rollup owner
//! - `lookup`: key→value reference mappings with a duplicate-key policy
//! - `projection`: fixed output schema, copies and lookup enrichment
//! - `pipeline`: load, transform and save in one call

pub mod columns;
pub mod filter;
pub mod lookup;
pub mod pipeline;
pub mod projection;

pub use filter::{Comparison, Predicate, RowFilter};
pub use lookup::{DuplicateKeyPolicy, ReferenceMapping};
pub use pipeline::{run, run_with, transform_tables, MappingSizes, RunReport, Transformed};
pub use projection::{output_columns, project, EnrichStats, Enrichment, Enrichments, FieldRule, LookupStats, OutputField, OUTPUT_SCHEMA};
