//! Spreadsheet workbooks read through calamine.
//!
//! Cells are rendered to strings the way a text export of the sheet would
//! show them: empty and error cells become `""`, whole floats lose their
//! `.0`, booleans read `True`/`False` and date cells `YYYY-MM-DD HH:MM:SS`.

use calamine::{open_workbook_auto, Data, DataType, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{table_from_raw_rows, SheetSelector, TableSource};
use crate::error::{SourceError, SourceResult};
use crate::models::Table;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An opened xlsx/xlsm/xlsb/xls/ods workbook.
pub struct WorkbookSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookSource {
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let workbook = open_workbook_auto(path)
            .map_err(|e| SourceError::format(path, "*", format!("cannot open workbook: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    fn range(&mut self, sheet: &SheetSelector) -> SourceResult<Range<Data>> {
        let names = self.workbook.sheet_names();
        let result = match sheet {
            SheetSelector::Index(i) => match self.workbook.worksheet_range_at(*i) {
                Some(result) => result,
                None => {
                    return Err(SourceError::format(
                        &self.path,
                        sheet.to_string(),
                        format!("workbook has only {} sheet(s)", names.len()),
                    ))
                }
            },
            SheetSelector::Name(name) => {
                if !names.iter().any(|n| n == name) {
                    return Err(SourceError::format(
                        &self.path,
                        name.as_str(),
                        format!("sheet not found (available: {})", names.join(", ")),
                    ));
                }
                self.workbook.worksheet_range(name)
            }
        };

        result.map_err(|e| SourceError::format(&self.path, sheet.to_string(), e.to_string()))
    }
}

impl TableSource for WorkbookSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn load(&mut self, sheet: &SheetSelector) -> SourceResult<Table> {
        let range = self.range(sheet)?;
        let rows = range
            .rows()
            .map(|cells| cells.iter().map(cell_to_string).collect::<Vec<String>>());
        table_from_raw_rows(&self.path, sheet, rows)
    }
}

/// Text form of one cell.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => dt.format(DATETIME_FORMAT).to_string(),
            None => cell.to_string(),
        },
    }
}
