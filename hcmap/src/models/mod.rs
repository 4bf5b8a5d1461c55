//! Tabular data model shared by every pipeline stage.
//!
//! - [`Table`] - labelled header plus rows of string cells
//! - [`Row`] - one record, one value per table column
//! - [`RowRef`] - a row viewed through its table's header, for lookups by name
//!
//! All values are strings; the empty string means "no value". A table never
//! holds a row whose width differs from its header: [`Table::push_row`] pads
//! short rows with empty strings and drops cells past the last column.

use serde::Serialize;

use crate::error::{SchemaError, SchemaResult};

// =============================================================================
// Row
// =============================================================================

/// One record of a table. Values are positional, matching [`Table::columns`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Value at a column position, empty if out of range.
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|v| v.is_empty())
    }

    pub fn into_values(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Table
// =============================================================================

/// An ordered sequence of rows sharing one header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Short name used in error messages (`raw`, `mapping`, ...).
    label: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new<S: Into<String>>(label: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            label: label.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from a header and raw rows, normalizing row widths.
    pub fn from_rows<S, R>(label: impl Into<String>, columns: impl IntoIterator<Item = S>, rows: R) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = Row>,
    {
        let mut table = Self::new(label, columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, row: Row) {
        let mut values = row.into_values();
        values.resize(self.columns.len(), String::new());
        self.rows.push(Row(values));
    }

    /// Position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, or a `SchemaMismatch` naming this table.
    pub fn require_column(&self, name: &str) -> SchemaResult<usize> {
        self.column_index(name).ok_or_else(|| SchemaError::MissingColumn {
            table: self.label.clone(),
            column: name.to_string(),
        })
    }

    /// Iterate rows with access by column name.
    pub fn records(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |row| RowRef { table: self, row })
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> SchemaResult<Vec<&str>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|r| r.get(idx)).collect())
    }

    /// New table with the same header and label, keeping rows for which
    /// `keep` returns true. Relative order is preserved.
    pub fn retain_rows(&self, mut keep: impl FnMut(&Row) -> bool) -> Table {
        Table {
            label: self.label.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

/// A borrowed row together with its table header.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    row: &'a Row,
}

impl<'a> RowRef<'a> {
    /// Value of a named column; empty for unknown columns.
    pub fn get(&self, column: &str) -> &'a str {
        match self.table.column_index(column) {
            Some(idx) => self.row.get(idx),
            None => "",
        }
    }
}
