//! Tabular data sources.
//!
//! A [`TableSource`] turns one sheet of a file into a [`Table`] of strings.
//!
//! - [`workbook`] - spreadsheet files (xlsx, xlsm, xlsb, xls, ods)
//! - [`delimited`] - CSV-like text with encoding and delimiter auto-detection
//! - [`MemorySource`] - named in-memory tables
//!
//! Whatever the format, the first non-empty row is the header, missing cells
//! become empty strings and fully blank rows are dropped.

pub mod delimited;
pub mod workbook;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{SourceError, SourceResult};
use crate::models::{Row, Table};

pub use delimited::{decode_content, detect_delimiter, detect_encoding, DelimitedSource};
pub use workbook::WorkbookSource;

// =============================================================================
// Sheet selection
// =============================================================================

/// Which sheet of a source to read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    /// Zero-based position in the workbook
    Index(usize),
    /// Sheet name, exact match
    Name(String),
}

impl SheetSelector {
    /// Digits select by position, anything else by name.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(trimmed.to_string()),
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{}", i),
            SheetSelector::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        SheetSelector::Name(name.to_string())
    }
}

impl From<usize> for SheetSelector {
    fn from(index: usize) -> Self {
        SheetSelector::Index(index)
    }
}

// =============================================================================
// Source trait
// =============================================================================

/// Something tables can be loaded from.
pub trait TableSource {
    /// Where the data comes from, for messages.
    fn location(&self) -> &Path;

    /// Names of the sheets this source exposes, in order.
    fn sheet_names(&self) -> Vec<String>;

    /// Load one sheet as a table.
    fn load(&mut self, sheet: &SheetSelector) -> SourceResult<Table>;

    /// Load a sheet and give the resulting table a label.
    fn load_labeled(&mut self, sheet: &SheetSelector, label: &str) -> SourceResult<Table> {
        Ok(self.load(sheet)?.with_label(label))
    }
}

/// Open a file source, choosing the reader from the file extension.
pub fn open_source(path: impl AsRef<Path>) -> SourceResult<Box<dyn TableSource>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(WorkbookSource::open(path)?)),
        "csv" | "tsv" | "txt" => Ok(Box::new(DelimitedSource::open(path)?)),
        _ => Err(SourceError::format(
            path,
            "*",
            format!("unsupported file type '.{}'", ext),
        )),
    }
}

/// Open `path` and load one sheet with the given label.
pub fn load_table(path: impl AsRef<Path>, sheet: &SheetSelector, label: &str) -> SourceResult<Table> {
    open_source(path)?.load_labeled(sheet, label)
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Build a table from raw string rows: first non-blank row is the header.
///
/// Fails when there is no header row at all.
pub(crate) fn table_from_raw_rows<I>(path: &Path, sheet: &SheetSelector, rows: I) -> SourceResult<Table>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut rows = rows.into_iter().map(Row::new).filter(|r| !r.is_blank());

    let header = rows
        .next()
        .ok_or_else(|| SourceError::format(path, sheet.to_string(), "no header row"))?;

    let mut table = Table::new(sheet.to_string(), normalize_headers(header.into_values()));
    for row in rows {
        table.push_row(row);
    }
    Ok(table)
}

/// Name blank header cells `Unnamed: <index>` and suffix repeats with `.1`, `.2`, ...
pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

// =============================================================================
// In-memory source
// =============================================================================

/// Named tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    location: PathBuf,
    sheets: Vec<(String, Table)>,
}

impl MemorySource {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            sheets: Vec::new(),
        }
    }

    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        self.sheets.push((name.into(), table));
        self
    }
}

impl TableSource for MemorySource {
    fn location(&self) -> &Path {
        &self.location
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn load(&mut self, sheet: &SheetSelector) -> SourceResult<Table> {
        let found = match sheet {
            SheetSelector::Index(i) => self.sheets.get(*i),
            SheetSelector::Name(name) => self.sheets.iter().find(|(n, _)| n == name),
        };
        found
            .map(|(_, table)| table.clone())
            .ok_or_else(|| SourceError::format(&self.location, sheet.to_string(), "sheet not found"))
    }
}
