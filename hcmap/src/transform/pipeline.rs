//! High-level pipeline: load → filter → project/enrich → save.
//!
//! # Example
//!
//! ```rust,ignore
//! use hcmap::{run, PipelineConfig};
//!
//! fn main() -> Result<(), hcmap::PipelineError> {
//!     let report = run(&PipelineConfig::from_env()?)?;
//!     println!("Wrote {} rows to {}", report.output_rows, report.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! Every input is loaded and checked before anything is written, so a
//! failing run leaves no output file behind.

use serde::Serialize;
use std::path::PathBuf;

use super::filter::RowFilter;
use super::lookup::DuplicateKeyPolicy;
use super::projection::{project, EnrichStats, Enrichments};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::Table;
use crate::sink::{FileSink, TableSink};
use crate::source::{open_source, SheetSelector, TableSource};

pub const RAW_LABEL: &str = "raw";
pub const MAPPING_LABEL: &str = "mapping";
pub const EXISTING_LABEL: &str = "existing";

/// Sizes of the reference mappings used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MappingSizes {
    pub mt_domain: usize,
    pub generic_dept: usize,
    pub justification: usize,
    /// Keys that appeared with more than one value, across all mappings
    pub conflicting_keys: usize,
}

impl MappingSizes {
    fn of(enrichments: &Enrichments) -> Self {
        Self {
            mt_domain: enrichments.mt_domain.len(),
            generic_dept: enrichments.generic_dept.len(),
            justification: enrichments.justification.len(),
            conflicting_keys: enrichments.mt_domain.conflicts()
                + enrichments.generic_dept.conflicts()
                + enrichments.justification.conflicts(),
        }
    }
}

/// In-memory result of the filter and enrichment stages.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub output: Table,
    pub raw_rows: usize,
    pub filtered_rows: usize,
    pub mappings: MappingSizes,
    pub stats: EnrichStats,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub raw_rows: usize,
    pub filtered_rows: usize,
    pub output_rows: usize,
    pub mappings: MappingSizes,
    pub enrichment: EnrichStats,
    pub output_path: PathBuf,
    pub config: PipelineConfig,
}

/// Filter the raw table and enrich it from the two reference tables.
///
/// Pure: no I/O besides progress logging.
pub fn transform_tables(
    raw: &Table,
    mapping: &Table,
    existing: &Table,
    policy: DuplicateKeyPolicy,
) -> PipelineResult<Transformed> {
    log_info("🔎 Filtering raw data...");
    let filtered = RowFilter::tech_and_ops().apply(raw)?;
    log_success(format!("Rows after filters: {} (of {})", filtered.len(), raw.len()));

    log_info(format!("🗺️  Building reference mappings (duplicate keys: {} wins)...", policy));
    let enrichments = Enrichments::build(mapping, existing, policy)?;
    let mappings = MappingSizes::of(&enrichments);
    for mapping in [&enrichments.mt_domain, &enrichments.generic_dept, &enrichments.justification] {
        log_info_indent(
            format!("{} → {}: {} keys", mapping.key_column(), mapping.value_column(), mapping.len()),
            1,
        );
    }
    if mappings.conflicting_keys > 0 {
        log_warning(format!(
            "{} reference key(s) have conflicting values; kept the {} occurrence",
            mappings.conflicting_keys, policy
        ));
    }

    log_info("⚙️  Building output and applying mappings...");
    let (output, stats) = project(&filtered, &enrichments)?;
    for lookup in &stats.lookups {
        if lookup.unmatched > 0 {
            log_warning(format!(
                "{}: {} matched, {} left blank",
                lookup.column, lookup.matched, lookup.unmatched
            ));
        } else {
            log_success(format!("{}: all {} rows matched", lookup.column, lookup.matched));
        }
    }

    Ok(Transformed {
        raw_rows: raw.len(),
        filtered_rows: filtered.len(),
        output,
        mappings,
        stats,
    })
}

/// Run the pipeline against already-opened sources and an explicit sink.
pub fn run_with(
    config: &PipelineConfig,
    raw_source: &mut dyn TableSource,
    reference_source: &mut dyn TableSource,
    sink: &dyn TableSink,
) -> PipelineResult<RunReport> {
    log_info(format!("📖 Loading raw file: {}", raw_source.location().display()));
    let raw = raw_source.load_labeled(&config.raw_sheet, RAW_LABEL)?;
    log_success(format!("Raw rows: {}", raw.len()));

    log_info(format!("📖 Loading reference workbook: {}", reference_source.location().display()));
    let mapping = reference_source.load_labeled(&SheetSelector::Name(config.mapping_sheet.clone()), MAPPING_LABEL)?;
    let existing = reference_source.load_labeled(&SheetSelector::Name(config.existing_sheet.clone()), EXISTING_LABEL)?;
    log_success(format!(
        "Sheet '{}': {} rows, sheet '{}': {} rows",
        config.mapping_sheet,
        mapping.len(),
        config.existing_sheet,
        existing.len()
    ));

    let transformed = transform_tables(&raw, &mapping, &existing, config.duplicate_policy)?;

    let destination = config.output_path();
    log_info(format!("💾 Saving (base name {})...", destination.display()));
    let output_path = sink.save(&transformed.output, &destination)?;
    log_success(format!("Saved to: {}", output_path.display()));

    Ok(RunReport {
        raw_rows: transformed.raw_rows,
        filtered_rows: transformed.filtered_rows,
        output_rows: transformed.output.len(),
        mappings: transformed.mappings,
        enrichment: transformed.stats,
        output_path,
        config: config.clone(),
    })
}

/// Run the whole pipeline from files described by `config`.
pub fn run(config: &PipelineConfig) -> PipelineResult<RunReport> {
    config.validate()?;
    let mut raw_source = open_source(&config.raw_path)?;
    let mut reference_source = open_source(&config.reference_path)?;
    run_with(config, raw_source.as_mut(), reference_source.as_mut(), &FileSink::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, SourceError};
    use crate::logs::{recent_logs, LogLevel};
    use crate::models::Row;
    use crate::sink::render_workbook;
    use crate::source::{load_table, MemorySource};
    use crate::transform::columns::*;
    use std::fs;
    use tempfile::TempDir;

    fn raw_table() -> Table {
        Table::from_rows(
            "Sheet1",
            [
                EMPLOYEE_ID,
                EMPLOYEE_NAME,
                GLOBAL_BUSINESS_FUNCTION,
                MT_ROLLUP_HIERARCHY_1,
                MT_ROLLUP_HIERARCHY_2,
                BUSINESS_LEVEL_6_DESC,
                COUNTRY,
                EMPLOYMENT_TYPE,
            ],
            vec![
                Row::from_iter(["E1", "Alice", "Tech and Ops", "Smith, Bob", "Cloud", "Infra", "UK", "Permanent"]),
                Row::from_iter(["E2", "Bruno", "Sales", "Smith, Bob", "Cloud", "Infra", "FR", "Permanent"]),
                Row::from_iter(["E3", "Chen", "Tech and Ops", "Eder, Noelle Kathleen", "Cloud", "Infra", "SG", "Contractor"]),
                Row::from_iter(["E4", "Dana", "Tech and Ops", "", "", "Payments", "US", "Permanent"]),
            ],
        )
    }

    fn mapping_table() -> Table {
        Table::from_rows(
            "mapping",
            [BUSINESS_LEVEL_6_DESC, MT_DOMAIN, MT_ROLLUP_HIERARCHY_2, GENERIC_DEPT],
            vec![Row::from_iter(["Infra", "Engineering", "Cloud", "Platform"])],
        )
    }

    fn existing_table() -> Table {
        Table::from_rows(
            "existing",
            [BANK_ID, JUSTIFICATION],
            vec![Row::from_iter(["E4", "Payments migration"])],
        )
    }

    #[test]
    fn test_transform_tables_scenario() {
        let result = transform_tables(&raw_table(), &mapping_table(), &existing_table(), DuplicateKeyPolicy::LastWins).unwrap();

        assert_eq!(result.raw_rows, 4);
        assert_eq!(result.filtered_rows, 2);
        assert_eq!(result.output.len(), result.filtered_rows);
        assert_eq!(result.output.column_values(BANK_ID).unwrap(), vec!["E1", "E4"]);

        let alice = result.output.records().next().unwrap();
        assert_eq!(alice.get(MT_DOMAIN), "Engineering");
        assert_eq!(alice.get(GENERIC_DEPT), "Platform");
        assert_eq!(alice.get(JUSTIFICATION), "");

        let dana = result.output.records().nth(1).unwrap();
        assert_eq!(dana.get(MT_DOMAIN), "");
        assert_eq!(dana.get(JUSTIFICATION), "Payments migration");

        assert_eq!(result.mappings.mt_domain, 1);
        assert_eq!(result.mappings.conflicting_keys, 0);

        assert!(recent_logs()
            .iter()
            .any(|e| e.message == "Rows after filters: 2 (of 4)" && e.level == LogLevel::Success));
        assert!(recent_logs()
            .iter()
            .any(|e| e.message == "Bank ID → Justification: 1 keys" && e.indent == 1));
    }

    #[test]
    fn test_run_end_to_end_with_workbooks() {
        let dir = TempDir::new().unwrap();
        let raw_dir = dir.path().join("Raw Data");
        fs::create_dir_all(&raw_dir).unwrap();

        let raw = raw_table();
        let mapping = mapping_table();
        let existing = existing_table();
        fs::write(raw_dir.join("raw_input.xlsx"), render_workbook(&[("Sheet1", &raw)]).unwrap()).unwrap();
        fs::write(
            raw_dir.join("mapping.xlsx"),
            render_workbook(&[("mapping", &mapping), ("existing", &existing)]).unwrap(),
        )
        .unwrap();

        let config = PipelineConfig::rooted_at(dir.path());
        let report = run(&config).unwrap();
        assert_eq!(report.raw_rows, 4);
        assert_eq!(report.output_rows, 2);
        assert_eq!(report.output_path, dir.path().join("Output/HC_output_with_mapping.xlsx"));

        let output = load_table(&report.output_path, &SheetSelector::Index(0), "output").unwrap();
        assert_eq!(output.columns().len(), 13);
        let alice = output.records().next().unwrap();
        assert_eq!(alice.get(BANK_ID), "E1");
        assert_eq!(alice.get(MT_DOMAIN), "Engineering");

        let second = run(&config).unwrap();
        assert_eq!(second.output_path, dir.path().join("Output/HC_output_with_mapping_1.xlsx"));
    }

    #[test]
    fn test_missing_reference_sheet_aborts_without_output() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::rooted_at(dir.path());
        let mut raw = MemorySource::new("raw.xlsx").with_sheet("Sheet1", raw_table());
        let mut reference = MemorySource::new("mapping.xlsx").with_sheet("mapping", mapping_table());

        let err = run_with(&config, &mut raw, &mut reference, &FileSink::new()).unwrap_err();
        assert_eq!(err.kind(), "SourceFormatError");
        assert!(err.to_string().contains("existing"));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_missing_raw_file() {
        let dir = TempDir::new().unwrap();
        let err = run(&PipelineConfig::rooted_at(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::Source(SourceError::NotFound { .. })));
        assert_eq!(err.kind(), "SourceNotFound");
    }

    #[test]
    fn test_missing_raw_column_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::rooted_at(dir.path());
        let bare = Table::new("Sheet1", [EMPLOYEE_ID, GLOBAL_BUSINESS_FUNCTION]);
        let mut raw = MemorySource::new("raw.xlsx").with_sheet("Sheet1", bare);
        let mut reference = MemorySource::new("mapping.xlsx")
            .with_sheet("mapping", mapping_table())
            .with_sheet("existing", existing_table());

        let err = run_with(&config, &mut raw, &mut reference, &FileSink::new()).unwrap_err();
        assert_eq!(err.kind(), "SchemaMismatch");
        assert!(err.to_string().contains(MT_ROLLUP_HIERARCHY_1));
        assert!(err.to_string().contains(RAW_LABEL));
    }
}
