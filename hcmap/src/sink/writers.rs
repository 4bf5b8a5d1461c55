//! Serializers from a [`Table`] to file bytes.
//!
//! Every writer emits the header first and keeps the table's column order.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde_json::{Map, Value};

use crate::error::SinkResult;
use crate::models::Table;

/// Sheet name used for single-table workbooks.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// An xlsx workbook with one sheet per `(name, table)` pair.
pub fn render_workbook(sheets: &[(&str, &Table)]) -> SinkResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name)?;

        for (col, column) in table.columns().iter().enumerate() {
            worksheet.write_string_with_format(0, column_index(col)?, column, &header_format)?;
        }

        for (r, row) in table.rows().iter().enumerate() {
            let excel_row = u32::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col, value) in row.values().iter().enumerate() {
                // blank cells stay unwritten
                if !value.is_empty() {
                    worksheet.write_string(excel_row, column_index(col)?, value)?;
                }
            }
        }

        worksheet.autofit();
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

pub fn render_xlsx(table: &Table) -> SinkResult<Vec<u8>> {
    render_workbook(&[(DEFAULT_SHEET_NAME, table)])
}

pub fn render_csv(table: &Table) -> SinkResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.values())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(bytes)
}

/// Array of objects, keys in column order.
pub fn render_json(table: &Table) -> SinkResult<Vec<u8>> {
    let records: Vec<Value> = table
        .rows()
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .columns()
                .iter()
                .zip(row.values())
                .map(|(column, value)| (column.clone(), Value::String(value.clone())))
                .collect();
            Value::Object(object)
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&records)?)
}
