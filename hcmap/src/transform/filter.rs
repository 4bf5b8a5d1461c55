//! Row selection by exact field comparisons.
//!
//! A [`RowFilter`] is a conjunction of [`Predicate`]s. Comparisons are exact
//! and case-sensitive; an empty field is just another value, so it fails an
//! `Equals` test and passes a `NotEquals` test.

use serde::{Deserialize, Serialize};

use super::columns::{GLOBAL_BUSINESS_FUNCTION, MT_ROLLUP_HIERARCHY_1};
use crate::error::SchemaResult;
use crate::models::Table;

/// Business function kept by the headcount report.
pub const TECH_AND_OPS: &str = "Tech and Ops";

/// Rollup owner whose organisation is reported separately.
pub const EXCLUDED_ROLLUP_OWNER: &str = "Eder, Noelle Kathleen";

/// Comparison applied by a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equals,
    NotEquals,
}

/// `column <op> value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: Comparison,
    pub value: String,
}

impl Predicate {
    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: Comparison::Equals,
            value: value.into(),
        }
    }

    pub fn not_equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: Comparison::NotEquals,
            value: value.into(),
        }
    }

    pub fn holds(&self, field: &str) -> bool {
        match self.op {
            Comparison::Equals => field == self.value,
            Comparison::NotEquals => field != self.value,
        }
    }
}

/// All predicates must hold for a row to survive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowFilter {
    pub predicates: Vec<Predicate>,
}

impl RowFilter {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    /// Tech and Ops headcount, minus the excluded rollup owner.
    pub fn tech_and_ops() -> Self {
        Self::new(vec![
            Predicate::equals(GLOBAL_BUSINESS_FUNCTION, TECH_AND_OPS),
            Predicate::not_equals(MT_ROLLUP_HIERARCHY_1, EXCLUDED_ROLLUP_OWNER),
        ])
    }

    /// Rows satisfying every predicate, in input order.
    ///
    /// Every predicate column must exist, even when the table has no rows.
    pub fn apply(&self, table: &Table) -> SchemaResult<Table> {
        let mut checks = Vec::with_capacity(self.predicates.len());
        for predicate in &self.predicates {
            checks.push((table.require_column(&predicate.column)?, predicate));
        }

        Ok(table.retain_rows(|row| checks.iter().all(|(idx, p)| p.holds(row.get(*idx)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::models::Row;

    fn raw(rows: &[(&str, &str, &str)]) -> Table {
        Table::from_rows(
            "raw",
            ["Employee ID", GLOBAL_BUSINESS_FUNCTION, MT_ROLLUP_HIERARCHY_1],
            rows.iter().map(|(id, gbf, mt1)| Row::from_iter([*id, *gbf, *mt1])),
        )
    }

    fn ids(table: &Table) -> Vec<&str> {
        table.column_values("Employee ID").unwrap()
    }

    #[test]
    fn test_tech_and_ops_filter() {
        let table = raw(&[
            ("E1", "Tech and Ops", "Smith, Bob"),
            ("E2", "Sales", "Smith, Bob"),
            ("E3", "Tech and Ops", "Eder, Noelle Kathleen"),
            ("E4", "Tech and Ops", ""),
            ("E5", "tech and ops", "Smith, Bob"),
            ("E6", "Tech and Ops ", "Smith, Bob"),
            ("E7", "", "Smith, Bob"),
            ("E8", "Tech and Ops", "Eder, Noelle"),
        ]);

        let filtered = RowFilter::tech_and_ops().apply(&table).unwrap();
        assert_eq!(ids(&filtered), vec!["E1", "E4", "E8"]);
    }

    #[test]
    fn test_filter_is_idempotent_and_order_preserving() {
        let table = raw(&[
            ("E9", "Tech and Ops", "A"),
            ("E1", "Sales", "A"),
            ("E5", "Tech and Ops", "B"),
            ("E2", "Tech and Ops", "Eder, Noelle Kathleen"),
            ("E3", "Tech and Ops", "C"),
        ]);
        let filter = RowFilter::tech_and_ops();

        let once = filter.apply(&table).unwrap();
        let twice = filter.apply(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec!["E9", "E5", "E3"]);
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let table = Table::new("raw", ["Employee ID", GLOBAL_BUSINESS_FUNCTION]);
        let err = RowFilter::tech_and_ops().apply(&table).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn {
                table: "raw".into(),
                column: MT_ROLLUP_HIERARCHY_1.into()
            }
        );
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let table = raw(&[("E1", "Sales", "")]);
        assert_eq!(RowFilter::default().apply(&table).unwrap(), table);
    }
}
