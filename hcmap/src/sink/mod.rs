//! Tabular data sinks.
//!
//! Output files are never overwritten. When the destination exists, the
//! sink probes `<stem>_1.<ext>`, `<stem>_2.<ext>`, ... and writes to the
//! first free name. Files are opened with create-new semantics, so a file
//! that appears between probing and writing is skipped rather than clobbered.
//! Probing stops after [`MAX_NAME_ATTEMPTS`] names.

pub mod writers;

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{SinkError, SinkResult};
use crate::models::Table;

pub use writers::{render_csv, render_json, render_workbook, render_xlsx};

/// Upper bound on candidate file names tried by [`FileSink`].
pub const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Output file format, chosen from the destination extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(OutputFormat::Xlsx),
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn render(self, table: &Table) -> SinkResult<Vec<u8>> {
        match self {
            OutputFormat::Xlsx => render_xlsx(table),
            OutputFormat::Csv => render_csv(table),
            OutputFormat::Json => render_json(table),
        }
    }
}

/// Something a finished table can be written to.
pub trait TableSink {
    /// Write `table` at `destination` (or a free variant of it) and return
    /// the path actually written.
    fn save(&self, table: &Table, destination: &Path) -> SinkResult<PathBuf>;
}

/// Writes files on the local filesystem without overwriting.
#[derive(Debug, Clone)]
pub struct FileSink {
    max_attempts: usize,
}

impl FileSink {
    pub fn new() -> Self {
        Self {
            max_attempts: MAX_NAME_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSink for FileSink {
    fn save(&self, table: &Table, destination: &Path) -> SinkResult<PathBuf> {
        let format = OutputFormat::from_path(destination).ok_or_else(|| SinkError::UnsupportedFormat {
            path: destination.to_path_buf(),
        })?;
        let bytes = format.render(table)?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        for attempt in 0..self.max_attempts {
            let path = candidate_path(destination, attempt);
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(SinkError::Io { path, source }),
            };

            if let Err(source) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
                drop(file);
                let _ = fs::remove_file(&path);
                return Err(SinkError::Io { path, source });
            }
            return Ok(path);
        }

        Err(SinkError::NoFreeName {
            base: destination.to_path_buf(),
            attempts: self.max_attempts,
        })
    }
}

/// `base` for attempt 0, then `<stem>_<n>.<ext>` next to it.
pub fn candidate_path(base: &Path, attempt: usize) -> PathBuf {
    if attempt == 0 {
        return base.to_path_buf();
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, attempt, ext.to_string_lossy()),
        None => format!("{}_{}", stem, attempt),
    };
    base.with_file_name(name)
}

/// Save `table` as `dir/basename`, creating `dir` if needed.
pub fn save_table(table: &Table, dir: &Path, basename: &str) -> SinkResult<PathBuf> {
    FileSink::new().save(table, &dir.join(basename))
}
