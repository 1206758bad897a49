//! Data types, variable types and null policies carried by typed nodes

use crate::error::{IrError, IrResult};
use serde::{Deserialize, Serialize};

/// SQL data type of a value, column or derived expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Varchar,
    Integer,
    BigInt,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    Decimal {
        precision: u8,
        scale: u8,
    },
    Boolean,
    Date,
    Time,
    Timestamp,
    Interval,
    /// Homogeneous list (`INTEGER[]`)
    List(Box<DataType>),
    /// Positional tuple, only valid as the right side of `IN`
    Tuple(Vec<DataType>),
    /// Named fields (`STRUCT(lat DOUBLE, lon DOUBLE)`)
    Struct(Vec<(String, DataType)>),
    /// Type of a bare NULL literal
    Null,
    /// Type could not be determined (tables, join expressions)
    Unknown,
}

impl DataType {
    /// Parse a SQL type name as found in metadata rows.
    ///
    /// Accepts the common aliases (`TEXT`, `INT`, `REAL`, `DATETIME`, ...),
    /// `DECIMAL(p,s)` and the `T[]` list suffix. Length modifiers on string
    /// types are ignored.
    pub fn parse(input: &str) -> IrResult<Self> {
        let trimmed = input.trim();
        if let Some(inner) = trimmed.strip_suffix("[]") {
            return Ok(DataType::List(Box::new(Self::parse(inner)?)));
        }

        let upper = trimmed.to_ascii_uppercase();
        let (base, args) = match upper.split_once('(') {
            Some((base, rest)) => (base.trim(), Some(rest.trim_end_matches(')'))),
            None => (upper.as_str(), None),
        };

        let unknown = || IrError::UnknownType {
            name: input.to_string(),
        };

        let ty = match base {
            "VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" => DataType::Varchar,
            "INTEGER" | "INT" | "INT4" | "SMALLINT" | "TINYINT" => DataType::Integer,
            "BIGINT" | "INT8" | "LONG" | "HUGEINT" => DataType::BigInt,
            "FLOAT" | "REAL" | "FLOAT4" => DataType::Float,
            "DOUBLE" | "FLOAT8" | "DOUBLE PRECISION" => DataType::Double,
            "DECIMAL" | "NUMERIC" => match args {
                Some(args) => {
                    let mut parts = args.split(',').map(|p| p.trim().parse::<u8>());
                    let precision = parts.next().and_then(|p| p.ok()).ok_or_else(unknown)?;
                    let scale = match parts.next() {
                        Some(s) => s.map_err(|_| unknown())?,
                        None => 0,
                    };
                    DataType::Decimal { precision, scale }
                }
                None => DataType::Decimal {
                    precision: 18,
                    scale: 3,
                },
            },
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "DATE" => DataType::Date,
            "TIME" => DataType::Time,
            "TIMESTAMP" | "DATETIME" | "TIMESTAMPTZ" => DataType::Timestamp,
            "INTERVAL" => DataType::Interval,
            _ => return Err(unknown()),
        };
        Ok(ty)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Integer
                | DataType::BigInt
                | DataType::Float
                | DataType::Double
                | DataType::Decimal { .. }
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Time | DataType::Timestamp)
    }

    /// Type of a point in time moved by an interval (`ts + INTERVAL`).
    ///
    /// `None` unless one side is temporal and the other an interval; only
    /// addition accepts the interval on the left.
    pub fn shifted_by(&self, other: &DataType, subtract: bool) -> Option<DataType> {
        match (self, other) {
            (t, DataType::Interval) if t.is_temporal() => Some(t.clone()),
            (DataType::Interval, t) if t.is_temporal() && !subtract => Some(t.clone()),
            _ => None,
        }
    }

    /// True for types whose exact identity is not known at build time
    pub fn is_open(&self) -> bool {
        matches!(self, DataType::Null | DataType::Unknown)
    }

    /// Result type of combining two operands arithmetically.
    ///
    /// Integers widen to BIGINT, anything floating widens to DOUBLE and
    /// decimals keep the larger scale. A timestamp shifted by an interval
    /// stays a timestamp.
    pub fn widen(&self, other: &DataType) -> DataType {
        use DataType::*;
        match (self, other) {
            (a, b) if a == b => a.clone(),
            (Null | Unknown, b) => b.clone(),
            (a, Null | Unknown) => a.clone(),
            (Integer, BigInt) | (BigInt, Integer) => BigInt,
            (Float | Double, b) | (b, Float | Double) if b.is_numeric() => Double,
            (
                Decimal {
                    precision: p1,
                    scale: s1,
                },
                Decimal {
                    precision: p2,
                    scale: s2,
                },
            ) => Decimal {
                precision: (*p1).max(*p2),
                scale: (*s1).max(*s2),
            },
            (d @ Decimal { .. }, Integer | BigInt) | (Integer | BigInt, d @ Decimal { .. }) => {
                d.clone()
            }
            (Timestamp | Date, Interval) | (Interval, Timestamp | Date) => Timestamp,
            _ => Unknown,
        }
    }

    /// Whether values of `other` can populate a slot of this type
    pub fn accepts(&self, other: &DataType) -> bool {
        self == other
            || other.is_open()
            || self.is_open()
            || (self.is_numeric() && other.is_numeric())
            || matches!(
                (self, other),
                (DataType::Timestamp, DataType::Date) | (DataType::Date, DataType::Timestamp)
            )
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Varchar => write!(f, "VARCHAR"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Decimal { precision, scale } => write!(f, "DECIMAL({precision},{scale})"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Interval => write!(f, "INTERVAL"),
            DataType::List(inner) => write!(f, "{inner}[]"),
            DataType::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|t| t.to_string()).collect();
                write!(f, "TUPLE({})", parts.join(", "))
            }
            DataType::Struct(fields) => {
                let parts: Vec<String> = fields.iter().map(|(n, t)| format!("{n} {t}")).collect();
                write!(f, "STRUCT({})", parts.join(", "))
            }
            DataType::Null => write!(f, "NULL"),
            DataType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Analytical role of a column, independent of its storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Numeric,
    Categorical,
    /// Identifier column; never aggregated arithmetically
    Key,
    Temporal,
    Boolean,
    Text,
    #[default]
    Unknown,
}

impl VarType {
    /// Parse a var-type tag from metadata; unknown tags map to `Unknown`
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "numeric" | "number" | "continuous" => VarType::Numeric,
            "categorical" | "category" | "dimension" => VarType::Categorical,
            "key" | "id" | "identifier" => VarType::Key,
            "temporal" | "time" | "datetime" => VarType::Temporal,
            "boolean" | "bool" | "flag" => VarType::Boolean,
            "text" | "string" | "free_text" => VarType::Text,
            _ => VarType::Unknown,
        }
    }

    /// Default role for a storage type
    pub fn for_data_type(data_type: &DataType) -> Self {
        match data_type {
            t if t.is_numeric() => VarType::Numeric,
            DataType::Interval => VarType::Numeric,
            t if t.is_temporal() => VarType::Temporal,
            DataType::Varchar => VarType::Categorical,
            DataType::Boolean => VarType::Boolean,
            _ => VarType::Unknown,
        }
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VarType::Numeric => "numeric",
            VarType::Categorical => "categorical",
            VarType::Key => "key",
            VarType::Temporal => "temporal",
            VarType::Boolean => "boolean",
            VarType::Text => "text",
            VarType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// What the data-quality layer should do when a value is NULL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnNull {
    #[default]
    Pass,
    Warn,
    Skip,
    Fail,
}

impl OnNull {
    /// Parse a policy name; anything unrecognised is `Pass`
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "warn" => OnNull::Warn,
            "skip" => OnNull::Skip,
            "fail" | "error" => OnNull::Fail,
            _ => OnNull::Pass,
        }
    }
}

impl std::fmt::Display for OnNull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OnNull::Pass => "pass",
            OnNull::Warn => "warn",
            OnNull::Skip => "skip",
            OnNull::Fail => "fail",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
