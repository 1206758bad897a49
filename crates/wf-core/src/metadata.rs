//! External metadata rows describing source files and their columns.
//!
//! Weft does not read these tables itself; whatever ingests them hands rows of
//! this shape to the IR, which turns them into `Source` columns and
//! `SourceFile` tables.

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::{default_delimiter, default_true};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with rows whose value appears in `filter_values`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    /// Keep only rows whose value is listed
    #[default]
    Keep,
    /// Drop rows whose value is listed
    Drop,
}

/// One row of the column description table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Schema the dataset belongs to
    pub schema: String,
    /// Dataset (file/table) the column belongs to
    pub dataset: String,
    /// Column name as found in the file
    pub column_name: String,
    /// Output name, when different from `column_name`
    #[serde(default)]
    pub column_alias: Option<String>,
    /// Variable type tag (`numeric`, `categorical`, `key`, ...)
    #[serde(default)]
    pub var_type: Option<String>,
    /// SQL data type name (`VARCHAR`, `DOUBLE`, `DECIMAL(10,2)`, ...)
    pub data_type: String,
    /// On-null policy (`pass`, `warn`, `skip`, `fail`)
    #[serde(default)]
    pub on_null: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_event_time: bool,
    /// Values used for row filtering together with `on_filter`
    #[serde(default)]
    pub filter_values: Vec<String>,
    #[serde(default)]
    pub on_filter: FilterAction,
    /// Pattern every value must match
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub source_unit: Option<String>,
    #[serde(default)]
    pub target_unit: Option<String>,
    /// Decimal places to round numeric values to
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub ordinal_position: Option<u32>,
}

impl ColumnMetadata {
    /// The name the column is exposed under
    pub fn output_name(&self) -> &str {
        self.column_alias
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(&self.column_name)
    }

    /// Physical unit of the column: `target_unit` when set, else `source_unit`
    pub fn unit(&self) -> CoreResult<Unit> {
        let raw = self
            .target_unit
            .as_deref()
            .or(self.source_unit.as_deref())
            .unwrap_or("");
        Unit::parse(raw).map_err(|_| CoreError::InvalidMetadata {
            column: self.column_name.clone(),
            field: "unit".to_string(),
            value: raw.to_string(),
        })
    }

    /// Parse a list of rows from JSON (an array of objects)
    pub fn rows_from_json(json: &str) -> CoreResult<Vec<ColumnMetadata>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a list of rows from YAML (a sequence of mappings)
    pub fn rows_from_yaml(yaml: &str) -> CoreResult<Vec<ColumnMetadata>> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Group rows by `(schema, dataset)`, each group sorted by ordinal position.
///
/// Rows without an ordinal position keep their relative input order after
/// the positioned ones.
pub fn group_by_dataset(
    rows: &[ColumnMetadata],
) -> BTreeMap<(String, String), Vec<ColumnMetadata>> {
    let mut groups: BTreeMap<(String, String), Vec<ColumnMetadata>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.schema.clone(), row.dataset.clone()))
            .or_default()
            .push(row.clone());
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.ordinal_position.unwrap_or(u32::MAX));
    }
    groups
}

/// One row of the file description table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub schema: String,
    pub dataset: String,
    /// File path or glob pattern
    #[serde(alias = "file_regex")]
    pub path: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Deduplicate rows on read
    #[serde(default)]
    pub distinct: bool,
    #[serde(default = "default_true")]
    pub header: bool,
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
