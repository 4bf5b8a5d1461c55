//! Key→value lookups built from two columns of a reference table.
//!
//! Rows with an empty key never enter the mapping. When a key repeats with
//! different values, [`DuplicateKeyPolicy`] decides which value is kept;
//! the default keeps the last occurrence. Missing keys resolve to `""`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaResult;
use crate::models::Table;

/// Which value survives when a key appears more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// First row with the key wins
    FirstWins,
    /// Later rows overwrite earlier ones
    #[default]
    LastWins,
}

impl FromStr for DuplicateKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_wins" | "first-wins" => Ok(Self::FirstWins),
            "last" | "last_wins" | "last-wins" => Ok(Self::LastWins),
            other => Err(format!("unknown duplicate policy '{}' (expected 'first' or 'last')", other)),
        }
    }
}

impl fmt::Display for DuplicateKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstWins => write!(f, "first"),
            Self::LastWins => write!(f, "last"),
        }
    }
}

/// A key→value lookup with left-outer, empty-string semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMapping {
    key_column: String,
    value_column: String,
    entries: HashMap<String, String>,
    /// Keys seen with more than one distinct value
    conflicts: usize,
}

impl ReferenceMapping {
    /// Build from `table[key_column] -> table[value_column]`.
    pub fn build(
        table: &Table,
        key_column: &str,
        value_column: &str,
        policy: DuplicateKeyPolicy,
    ) -> SchemaResult<Self> {
        let key_idx = table.require_column(key_column)?;
        let value_idx = table.require_column(value_column)?;

        let mut entries: HashMap<String, String> = HashMap::new();
        let mut conflicted: HashSet<&str> = HashSet::new();

        for row in table.rows() {
            let key = row.get(key_idx);
            if key.is_empty() {
                continue;
            }
            let value = row.get(value_idx);

            match entries.get_mut(key) {
                None => {
                    entries.insert(key.to_string(), value.to_string());
                }
                Some(existing) => {
                    if existing.as_str() != value {
                        conflicted.insert(key);
                        if policy == DuplicateKeyPolicy::LastWins {
                            *existing = value.to_string();
                        }
                    }
                }
            }
        }

        Ok(Self {
            key_column: key_column.to_string(),
            value_column: value_column.to_string(),
            entries,
            conflicts: conflicted.len(),
        })
    }

    /// Value for `key`, or `""` when the key is unknown.
    pub fn lookup(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        self.entries.get(key).map(String::as_str)
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys that appeared with different values.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }
}
