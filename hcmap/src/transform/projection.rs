//! Output projection and lookup enrichment.
//!
//! The output layout is declared as data in [`OUTPUT_SCHEMA`]: each output
//! column has a [`FieldRule`] saying where its value comes from.
//!
//! ```text
//! Copy(source)       raw column copied as-is (possibly renamed)
//! Blank              always "" (filled in by hand downstream)
//! Lookup(key, map)   reference mapping applied to another output column
//! ```
//!
//! Copies run first, then lookups read their key from the row being built,
//! so `Justification` is keyed by `Bank ID` exactly as it appears in the
//! output.

use serde::Serialize;

use super::columns::*;
use super::lookup::{DuplicateKeyPolicy, ReferenceMapping};
use crate::error::{SchemaError, SchemaResult};
use crate::models::{Row, Table};

/// Which reference mapping a lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Enrichment {
    /// `Business Level 6 Desc -> MT Domain` from the mapping sheet
    MtDomain,
    /// `MT Rollup Hierarchy 2 Name -> Generic Dept (roll up)` from the mapping sheet
    GenericDept,
    /// `Bank ID -> Justification` from the existing sheet
    Justification,
}

/// Where an output column gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Copy(&'static str),
    Blank,
    Lookup {
        /// Output column holding the key
        key: &'static str,
        mapping: Enrichment,
    },
}

/// One output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputField {
    pub name: &'static str,
    pub rule: FieldRule,
}

const fn field(name: &'static str, rule: FieldRule) -> OutputField {
    OutputField { name, rule }
}

/// The output table layout, in column order.
pub const OUTPUT_SCHEMA: [OutputField; 13] = [
    field(BANK_ID, FieldRule::Copy(EMPLOYEE_ID)),
    field(NAME, FieldRule::Copy(EMPLOYEE_NAME)),
    field(BUSINESS_LEVEL_6_DESC, FieldRule::Copy(BUSINESS_LEVEL_6_DESC)),
    field(MT_ROLLUP_HIERARCHY_1, FieldRule::Copy(MT_ROLLUP_HIERARCHY_1)),
    field(MT_ROLLUP_HIERARCHY_2, FieldRule::Copy(MT_ROLLUP_HIERARCHY_2)),
    field(
        MT_DOMAIN,
        FieldRule::Lookup {
            key: BUSINESS_LEVEL_6_DESC,
            mapping: Enrichment::MtDomain,
        },
    ),
    field(
        GENERIC_DEPT,
        FieldRule::Lookup {
            key: MT_ROLLUP_HIERARCHY_2,
            mapping: Enrichment::GenericDept,
        },
    ),
    field(
        JUSTIFICATION,
        FieldRule::Lookup {
            key: BANK_ID,
            mapping: Enrichment::Justification,
        },
    ),
    field(START_DATE, FieldRule::Blank),
    field(END_DATE, FieldRule::Blank),
    field(COUNTRY, FieldRule::Copy(COUNTRY)),
    field(EMPLOYMENT_TYPE, FieldRule::Copy(EMPLOYMENT_TYPE)),
    field(GLOBAL_BUSINESS_FUNCTION, FieldRule::Copy(GLOBAL_BUSINESS_FUNCTION)),
];

/// Output column names in order.
pub fn output_columns() -> Vec<&'static str> {
    OUTPUT_SCHEMA.iter().map(|f| f.name).collect()
}

// =============================================================================
// Reference mappings
// =============================================================================

/// The three lookups, built fresh from the reference sheets.
#[derive(Debug, Clone)]
pub struct Enrichments {
    pub mt_domain: ReferenceMapping,
    pub generic_dept: ReferenceMapping,
    pub justification: ReferenceMapping,
}

impl Enrichments {
    pub fn build(mapping: &Table, existing: &Table, policy: DuplicateKeyPolicy) -> SchemaResult<Self> {
        Ok(Self {
            mt_domain: ReferenceMapping::build(mapping, BUSINESS_LEVEL_6_DESC, MT_DOMAIN, policy)?,
            generic_dept: ReferenceMapping::build(mapping, MT_ROLLUP_HIERARCHY_2, GENERIC_DEPT, policy)?,
            justification: ReferenceMapping::build(existing, BANK_ID, JUSTIFICATION, policy)?,
        })
    }

    pub fn get(&self, which: Enrichment) -> &ReferenceMapping {
        match which {
            Enrichment::MtDomain => &self.mt_domain,
            Enrichment::GenericDept => &self.generic_dept,
            Enrichment::Justification => &self.justification,
        }
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Hit counts for one lookup column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    pub column: String,
    pub mapping: Enrichment,
    pub matched: usize,
    pub unmatched: usize,
}

/// Per-lookup statistics of one projection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnrichStats {
    pub lookups: Vec<LookupStats>,
}

impl EnrichStats {
    pub fn for_column(&self, column: &str) -> Option<&LookupStats> {
        self.lookups.iter().find(|s| s.column == column)
    }
}

/// A schema rule resolved against concrete column positions.
enum Step {
    Copy(usize),
    Blank,
    Lookup { key: usize, mapping: Enrichment, stats: usize },
}

fn plan(source: &Table) -> SchemaResult<(Vec<Step>, EnrichStats)> {
    let mut steps = Vec::with_capacity(OUTPUT_SCHEMA.len());
    let mut stats = EnrichStats::default();

    for field in &OUTPUT_SCHEMA {
        let step = match field.rule {
            FieldRule::Copy(column) => Step::Copy(source.require_column(column)?),
            FieldRule::Blank => Step::Blank,
            FieldRule::Lookup { key, mapping } => {
                let key_idx = OUTPUT_SCHEMA
                    .iter()
                    .position(|f| f.name == key && matches!(f.rule, FieldRule::Copy(_)))
                    .ok_or_else(|| SchemaError::MissingColumn {
                        table: "output".to_string(),
                        column: key.to_string(),
                    })?;
                stats.lookups.push(LookupStats {
                    column: field.name.to_string(),
                    mapping,
                    matched: 0,
                    unmatched: 0,
                });
                Step::Lookup {
                    key: key_idx,
                    mapping,
                    stats: stats.lookups.len() - 1,
                }
            }
        };
        steps.push(step);
    }

    Ok((steps, stats))
}

/// Build the output table: one output row per input row, in order.
///
/// Fails with a schema mismatch before producing anything if a source
/// column named by [`OUTPUT_SCHEMA`] is absent.
pub fn project(filtered: &Table, enrichments: &Enrichments) -> SchemaResult<(Table, EnrichStats)> {
    let (steps, mut stats) = plan(filtered)?;
    let mut output = Table::new("output", output_columns());

    for row in filtered.rows() {
        let mut values: Vec<String> = steps
            .iter()
            .map(|step| match step {
                Step::Copy(idx) => row.get(*idx).to_string(),
                Step::Blank | Step::Lookup { .. } => String::new(),
            })
            .collect();

        for (pos, step) in steps.iter().enumerate() {
            if let Step::Lookup { key, mapping, stats: slot } = step {
                let found = enrichments.get(*mapping).get(&values[*key]).map(str::to_string);
                let entry = &mut stats.lookups[*slot];
                match found {
                    Some(value) => {
                        entry.matched += 1;
                        values[pos] = value;
                    }
                    None => entry.unmatched += 1,
                }
            }
        }

        output.push_row(Row::new(values));
    }

    Ok((output, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_columns() -> Vec<&'static str> {
        vec![
            EMPLOYEE_ID,
            EMPLOYEE_NAME,
            GLOBAL_BUSINESS_FUNCTION,
            MT_ROLLUP_HIERARCHY_1,
            MT_ROLLUP_HIERARCHY_2,
            BUSINESS_LEVEL_6_DESC,
            COUNTRY,
            EMPLOYMENT_TYPE,
        ]
    }

    fn raw_row(id: &str, name: &str, bl6: &str, mt2: &str) -> Row {
        Row::from_iter([id, name, "Tech and Ops", "Smith, Bob", mt2, bl6, "UK", "Permanent"])
    }

    fn mapping() -> Table {
        Table::from_rows(
            "mapping",
            [BUSINESS_LEVEL_6_DESC, MT_DOMAIN, MT_ROLLUP_HIERARCHY_2, GENERIC_DEPT],
            vec![
                Row::from_iter(["Infra", "Engineering", "Cloud", "Platform Eng"]),
                Row::from_iter(["Risk Tech", "Risk", "", ""]),
            ],
        )
    }

    fn existing() -> Table {
        Table::from_rows(
            "existing",
            [BANK_ID, JUSTIFICATION],
            vec![Row::from_iter(["E1", "Critical run"]), Row::from_iter(["E9", "Other"])],
        )
    }

    fn enrichments() -> Enrichments {
        Enrichments::build(&mapping(), &existing(), DuplicateKeyPolicy::LastWins).unwrap()
    }

    #[test]
    fn test_output_schema_order() {
        assert_eq!(
            output_columns(),
            vec![
                "Bank ID",
                "Name",
                "Business Level 6 Desc",
                "MT Rollup Hierarchy 1 Name",
                "MT Rollup Hierarchy 2 Name",
                "MT Domain",
                "Generic Dept (roll up)",
                "Justification",
                "Start Date",
                "End Date",
                "Country",
                "Employment Type",
                "Global Business Function",
            ]
        );
    }

    #[test]
    fn test_project_copies_and_lookups() {
        let filtered = Table::from_rows(
            "raw",
            raw_columns(),
            vec![
                raw_row("E1", "Alice", "Infra", "Cloud"),
                raw_row("E2", "Bob", "Unknown", "Nowhere"),
            ],
        );
        let (output, stats) = project(&filtered, &enrichments()).unwrap();

        assert_eq!(output.len(), 2);
        let alice = output.records().next().unwrap();
        assert_eq!(alice.get(BANK_ID), "E1");
        assert_eq!(alice.get(NAME), "Alice");
        assert_eq!(alice.get(MT_DOMAIN), "Engineering");
        assert_eq!(alice.get(GENERIC_DEPT), "Platform Eng");
        assert_eq!(alice.get(JUSTIFICATION), "Critical run");
        assert_eq!(alice.get(START_DATE), "");
        assert_eq!(alice.get(END_DATE), "");
        assert_eq!(alice.get(COUNTRY), "UK");
        assert_eq!(alice.get(EMPLOYMENT_TYPE), "Permanent");
        assert_eq!(alice.get(GLOBAL_BUSINESS_FUNCTION), "Tech and Ops");

        let bob = output.records().nth(1).unwrap();
        assert_eq!(bob.get(BANK_ID), "E2");
        assert_eq!(bob.get(MT_DOMAIN), "");
        assert_eq!(bob.get(GENERIC_DEPT), "");
        assert_eq!(bob.get(JUSTIFICATION), "");

        let domain = stats.for_column(MT_DOMAIN).unwrap();
        assert_eq!((domain.matched, domain.unmatched), (1, 1));
        assert_eq!(stats.lookups.len(), 3);
    }

    #[test]
    fn test_empty_key_is_never_matched() {
        // "Risk Tech" maps an empty MT Rollup 2 name, which must not leak
        let filtered = Table::from_rows("raw", raw_columns(), vec![raw_row("", "Nobody", "Risk Tech", "")]);
        let (output, _) = project(&filtered, &enrichments()).unwrap();
        let row = output.records().next().unwrap();
        assert_eq!(row.get(MT_DOMAIN), "Risk");
        assert_eq!(row.get(GENERIC_DEPT), "");
        assert_eq!(row.get(JUSTIFICATION), "");
    }

    #[test]
    fn test_missing_source_column() {
        let mut columns = raw_columns();
        columns.retain(|c| *c != COUNTRY);
        let filtered = Table::new("raw", columns);
        let err = project(&filtered, &enrichments()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn {
                table: "raw".into(),
                column: COUNTRY.into()
            }
        );
    }

    #[test]
    fn test_missing_reference_column() {
        let existing = Table::new("existing", [BANK_ID]);
        let err = Enrichments::build(&mapping(), &existing, DuplicateKeyPolicy::LastWins).unwrap_err();
        assert!(err.to_string().contains("Justification"));
        assert!(err.to_string().contains("existing"));
    }
}
