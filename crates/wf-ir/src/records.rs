//! Inline rows of literal values

use crate::column::{Column, ColumnKind};
use crate::container::ColumnList;
use crate::error::{IrError, IrResult};
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::value::Value;
use wf_core::StableHasher;

/// Named columns plus rows of literals, the payload of a `VALUES` list.
///
/// Every row has one value per column and each value fits its column's data
/// type (or is NULL).
#[derive(Debug, Clone)]
pub struct Records {
    columns: ColumnList,
    rows: Vec<Vec<Value>>,
    lineage: Lineage,
}

impl Records {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> IrResult<Self> {
        let mut list = ColumnList::restricted(&[ColumnKind::Blank]);
        for column in columns {
            list.add(column, false)?;
        }
        if list.is_empty() {
            return Err(IrError::Empty {
                what: "record columns".to_string(),
            });
        }
        if rows.is_empty() {
            return Err(IrError::Empty {
                what: "record rows".to_string(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != list.len() {
                return Err(IrError::LengthMismatch {
                    what: format!("record row {i}"),
                    expected: list.len(),
                    found: row.len(),
                });
            }
            for (column, value) in list.iter().zip(row) {
                if !value.is_null() && !column.data_type().accepts(value.data_type()) {
                    return Err(IrError::TypeMismatch {
                        context: format!("record row {i}, column '{}'", column.name()),
                        expected: column.data_type().to_string(),
                        found: value.data_type().to_string(),
                    });
                }
            }
        }

        let key = NodeKey::from_hasher(
            rows.iter().fold(
                StableHasher::new("records").sequence("columns", list.iter().map(|c| c.key())),
                |h, row| h.sequence("row", row.iter().map(|v| v.key())),
            ),
        );
        let record = NodeRecord::new(key, NodeTag::Records, "records", "VALUES")
            .with_attribute("rows", rows.len());
        let lineage = {
            let mut deps = Dependencies::new();
            deps.extend(EdgeKind::Column, list.iter().map(|c| c.lineage()));
            Lineage::build(record, &deps)
        };

        Ok(Self {
            columns: list,
            rows,
            lineage,
        })
    }

    pub fn columns(&self) -> &ColumnList {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

impl Provenance for Records {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn columns() -> Vec<Column> {
        vec![
            Column::blank("id", DataType::Integer).unwrap(),
            Column::blank("label", DataType::Varchar).unwrap(),
        ]
    }

    #[test]
    fn test_valid_records() {
        let records = Records::new(
            columns(),
            vec![
                vec![Value::integer(1), Value::varchar("a")],
                vec![Value::integer(2), Value::null()],
            ],
        )
        .unwrap();
        assert_eq!(records.rows().len(), 2);
        assert_eq!(records.columns().list_names(), vec!["id", "label"]);
        assert_eq!(records.graph().in_degree(records.key()), 2);
    }

    #[test]
    fn test_row_length_checked() {
        let err = Records::new(columns(), vec![vec![Value::integer(1)]]).unwrap_err();
        assert!(matches!(err, IrError::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_value_type_checked() {
        let err = Records::new(
            columns(),
            vec![vec![Value::varchar("one"), Value::varchar("a")]],
        )
        .unwrap_err();
        assert!(matches!(err, IrError::TypeMismatch { .. }));
    }

    #[test]
    fn test_only_blank_columns() {
        let base = Column::blank("x", DataType::Integer).unwrap();
        let err = Records::new(vec![Column::select(&base)], vec![vec![Value::integer(1)]]).unwrap_err();
        assert!(matches!(err, IrError::WrongVariant { .. }));
    }
}
