//! Delimited text exports (CSV, TSV) with encoding and delimiter auto-detection.
//!
//! HR systems often export Latin-1 or Windows-1252 files with `;` separators,
//! so the bytes are decoded and the delimiter sniffed before the `csv` reader
//! runs. A delimited file has exactly one sheet, addressable as `#0` or by
//! the file stem.

use std::path::{Path, PathBuf};

use super::{table_from_raw_rows, SheetSelector, TableSource};
use crate::error::{SourceError, SourceResult};
use crate::logs::log_info_indent;
use crate::models::Table;

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to text. Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let text = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Pick the separator that occurs most often in the first line.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = b',';
    let mut best_count = 0;
    for sep in [b',', b';', b'\t', b'|'] {
        let count = first_line.bytes().filter(|b| *b == sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

/// A CSV/TSV file, decoded eagerly on open.
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    path: PathBuf,
    content: String,
    encoding: String,
    delimiter: u8,
}

impl DelimitedSource {
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(path, &bytes))
    }

    /// Build a source from bytes already in memory; `path` is only a label.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        let encoding = detect_encoding(bytes);
        let content = decode_content(bytes, &encoding);
        let delimiter = detect_delimiter(&content);
        Self {
            path: path.into(),
            content,
            encoding,
            delimiter,
        }
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn delimiter(&self) -> char {
        self.delimiter as char
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

impl TableSource for DelimitedSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn sheet_names(&self) -> Vec<String> {
        vec![self.stem()]
    }

    fn load(&mut self, sheet: &SheetSelector) -> SourceResult<Table> {
        let matches = match sheet {
            SheetSelector::Index(i) => *i == 0,
            SheetSelector::Name(name) => *name == self.stem(),
        };
        if !matches {
            return Err(SourceError::format(
                &self.path,
                sheet.to_string(),
                "delimited files have a single sheet",
            ));
        }

        log_info_indent(
            format!("Encoding: {}, delimiter: {:?}", self.encoding(), self.delimiter()),
            1,
        );

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(self.content.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| SourceError::format(&self.path, sheet.to_string(), e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<String>>());
        }

        table_from_raw_rows(&self.path, sheet, rows)
    }
}
