//! Pipeline configuration.
//!
//! Defaults reproduce the fixed layout the tool was built around:
//!
//! ```text
//! Raw Data/raw_input.xlsx   first sheet, raw HC dump
//! Raw Data/mapping.xlsx     sheets "mapping" and "existing"
//! Output/HC_output_with_mapping.xlsx
//! ```
//!
//! Any field can be overridden through `HCMAP_*` environment variables,
//! optionally declared in a `.env` file.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::sink::OutputFormat;
use crate::source::SheetSelector;
use crate::transform::lookup::DuplicateKeyPolicy;

pub const DEFAULT_RAW_PATH: &str = "Raw Data/raw_input.xlsx";
pub const DEFAULT_REFERENCE_PATH: &str = "Raw Data/mapping.xlsx";
pub const DEFAULT_MAPPING_SHEET: &str = "mapping";
pub const DEFAULT_EXISTING_SHEET: &str = "existing";
pub const DEFAULT_OUTPUT_DIR: &str = "Output";
pub const DEFAULT_OUTPUT_BASENAME: &str = "HC_output_with_mapping.xlsx";

pub const ENV_RAW_PATH: &str = "HCMAP_RAW_PATH";
pub const ENV_REFERENCE_PATH: &str = "HCMAP_REFERENCE_PATH";
pub const ENV_RAW_SHEET: &str = "HCMAP_RAW_SHEET";
pub const ENV_MAPPING_SHEET: &str = "HCMAP_MAPPING_SHEET";
pub const ENV_EXISTING_SHEET: &str = "HCMAP_EXISTING_SHEET";
pub const ENV_OUTPUT_DIR: &str = "HCMAP_OUTPUT_DIR";
pub const ENV_OUTPUT_BASENAME: &str = "HCMAP_OUTPUT_BASENAME";
pub const ENV_DUPLICATE_POLICY: &str = "HCMAP_DUPLICATE_POLICY";

/// Everything a pipeline run needs to know about its inputs and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw HC export
    pub raw_path: PathBuf,

    /// Workbook holding the mapping and existing-justification sheets
    pub reference_path: PathBuf,

    /// Sheet of the raw export to read
    pub raw_sheet: SheetSelector,

    /// Sheet with BL6, MT Domain, MT Rollup 2 and Generic Dept columns
    pub mapping_sheet: String,

    /// Sheet with Bank ID and Justification columns
    pub existing_sheet: String,

    pub output_dir: PathBuf,

    /// File name of the output; its extension selects the format
    pub output_basename: String,

    /// Which value survives when a reference key repeats
    #[serde(default)]
    pub duplicate_policy: DuplicateKeyPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from(DEFAULT_RAW_PATH),
            reference_path: PathBuf::from(DEFAULT_REFERENCE_PATH),
            raw_sheet: SheetSelector::Index(0),
            mapping_sheet: DEFAULT_MAPPING_SHEET.to_string(),
            existing_sheet: DEFAULT_EXISTING_SHEET.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_basename: DEFAULT_OUTPUT_BASENAME.to_string(),
            duplicate_policy: DuplicateKeyPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults with every path resolved against `base`.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let defaults = Self::default();
        Self {
            raw_path: base.join(defaults.raw_path),
            reference_path: base.join(defaults.reference_path),
            output_dir: base.join(defaults.output_dir),
            ..defaults
        }
    }

    /// Defaults plus `HCMAP_*` overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try loading .env file
        let _ = dotenvy::dotenv();
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup, then validate.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_RAW_PATH) {
            self.raw_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_REFERENCE_PATH) {
            self.reference_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_RAW_SHEET) {
            self.raw_sheet = SheetSelector::parse(&v);
        }
        if let Some(v) = get(ENV_MAPPING_SHEET) {
            self.mapping_sheet = v;
        }
        if let Some(v) = get(ENV_EXISTING_SHEET) {
            self.existing_sheet = v;
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_OUTPUT_BASENAME) {
            self.output_basename = v;
        }
        if let Some(v) = get(ENV_DUPLICATE_POLICY) {
            self.duplicate_policy = v
                .parse()
                .map_err(|e: String| ConfigError::invalid(ENV_DUPLICATE_POLICY, e))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check values that would otherwise only fail at the end of a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_basename.trim().is_empty() {
            return Err(ConfigError::invalid("output_basename", "must not be empty"));
        }
        if Path::new(&self.output_basename).components().count() != 1 {
            return Err(ConfigError::invalid(
                "output_basename",
                format!("'{}' must be a plain file name", self.output_basename),
            ));
        }
        if OutputFormat::from_path(Path::new(&self.output_basename)).is_none() {
            return Err(ConfigError::invalid(
                "output_basename",
                format!("'{}' must end in .xlsx, .csv or .json", self.output_basename),
            ));
        }
        if self.mapping_sheet.is_empty() || self.existing_sheet.is_empty() {
            return Err(ConfigError::invalid("sheet", "reference sheet names must not be empty"));
        }
        Ok(())
    }

    /// Destination before collision avoidance.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_basename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.raw_sheet, SheetSelector::Index(0));
        assert_eq!(config.mapping_sheet, "mapping");
        assert_eq!(config.existing_sheet, "existing");
        assert_eq!(config.output_path(), PathBuf::from("Output/HC_output_with_mapping.xlsx"));
        assert_eq!(config.duplicate_policy, DuplicateKeyPolicy::LastWins);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rooted_at() {
        let config = PipelineConfig::rooted_at("/data/hc");
        assert_eq!(config.raw_path, PathBuf::from("/data/hc/Raw Data/raw_input.xlsx"));
        assert_eq!(config.output_dir, PathBuf::from("/data/hc/Output"));
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::default()
            .with_overrides(lookup(&[
                (ENV_RAW_SHEET, "Sheet2"),
                (ENV_OUTPUT_BASENAME, "out.csv"),
                (ENV_DUPLICATE_POLICY, "first"),
                (ENV_MAPPING_SHEET, "   "),
            ]))
            .unwrap();
        assert_eq!(config.raw_sheet, SheetSelector::Name("Sheet2".into()));
        assert_eq!(config.output_basename, "out.csv");
        assert_eq!(config.duplicate_policy, DuplicateKeyPolicy::FirstWins);
        // blank values are ignored
        assert_eq!(config.mapping_sheet, "mapping");

        let config = PipelineConfig::default()
            .with_overrides(lookup(&[(ENV_RAW_SHEET, "2")]))
            .unwrap();
        assert_eq!(config.raw_sheet, SheetSelector::Index(2));
    }

    #[test]
    fn test_invalid_values() {
        let err = PipelineConfig::default()
            .with_overrides(lookup(&[(ENV_OUTPUT_BASENAME, "report.pdf")]))
            .unwrap_err();
        assert!(err.to_string().contains("output_basename"));

        let err = PipelineConfig::default()
            .with_overrides(lookup(&[(ENV_OUTPUT_BASENAME, "sub/out.xlsx")]))
            .unwrap_err();
        assert!(err.to_string().contains("plain file name"));

        let err = PipelineConfig::default()
            .with_overrides(lookup(&[(ENV_DUPLICATE_POLICY, "random")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_DUPLICATE_POLICY));
    }
}
