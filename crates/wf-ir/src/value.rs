//! Typed literal values

use crate::error::{IrError, IrResult};
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::table::Table;
use crate::types::DataType;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use wf_core::{StableHasher, Unit};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Boundary of a window frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl std::fmt::Display for FrameBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            FrameBound::Preceding(n) => write!(f, "{n} PRECEDING"),
            FrameBound::CurrentRow => write!(f, "CURRENT ROW"),
            FrameBound::Following(n) => write!(f, "{n} FOLLOWING"),
            FrameBound::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
        }
    }
}

/// The literal payload of a [`Value`]
#[derive(Debug, Clone)]
pub enum ValueKind {
    Varchar(String),
    Integer(i64),
    Float(f64),
    Double(f64),
    /// Exact decimal kept as validated text
    Decimal(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Boolean(bool),
    Null,
    /// Amount of the value's time unit
    Interval(i64),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Struct(Vec<(String, Value)>),
    GeoCoordinate {
        latitude: f64,
        longitude: f64,
    },
    WildCard,
    Subquery(Box<Table>),
    FrameBound(FrameBound),
}

/// A literal with its data type and physical unit
#[derive(Debug, Clone)]
pub struct Value {
    kind: ValueKind,
    data_type: DataType,
    unit: Unit,
    lineage: Lineage,
}

impl Value {
    fn from_parts(kind: ValueKind, data_type: DataType, unit: Unit) -> Self {
        let key = value_key(&kind, &data_type, &unit);
        let record = NodeRecord::new(key, NodeTag::Value, variant_name(&kind), literal_text(&kind))
            .with_attribute("data_type", &data_type)
            .with_attribute("unit", &unit);

        let lineage = {
            let mut deps = Dependencies::new();
            match &kind {
                ValueKind::List(items) | ValueKind::Tuple(items) => {
                    deps.extend(EdgeKind::Element, items.iter().map(|v| &v.lineage));
                }
                ValueKind::Struct(fields) => {
                    deps.extend(EdgeKind::Element, fields.iter().map(|(_, v)| &v.lineage));
                }
                ValueKind::Subquery(table) => {
                    deps.push(EdgeKind::Source, table.lineage());
                }
                _ => {}
            }
            Lineage::build(record, &deps)
        };

        Self {
            kind,
            data_type,
            unit,
            lineage,
        }
    }

    fn plain(kind: ValueKind, data_type: DataType) -> Self {
        Self::from_parts(kind, data_type, Unit::dimensionless())
    }

    pub fn varchar(value: impl Into<String>) -> Self {
        Self::plain(ValueKind::Varchar(value.into()), DataType::Varchar)
    }

    /// Integer literal; typed INTEGER when it fits 32 bits, else BIGINT
    pub fn integer(value: i64) -> Self {
        let data_type = if i32::try_from(value).is_ok() {
            DataType::Integer
        } else {
            DataType::BigInt
        };
        Self::plain(ValueKind::Integer(value), data_type)
    }

    pub fn float(value: f64) -> IrResult<Self> {
        ensure_finite("float", value)?;
        Ok(Self::plain(ValueKind::Float(value), DataType::Float))
    }

    pub fn double(value: f64) -> IrResult<Self> {
        ensure_finite("double", value)?;
        Ok(Self::plain(ValueKind::Double(value), DataType::Double))
    }

    /// Exact decimal from text such as `-12.50`; precision and scale follow the digits
    pub fn decimal(text: &str) -> IrResult<Self> {
        let invalid = |reason: &str| IrError::InvalidLiteral {
            kind: "decimal".to_string(),
            value: text.to_string(),
            reason: reason.to_string(),
        };
        let digits = text.strip_prefix('-').unwrap_or(text);
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("only digits, one '.' and a leading '-' are allowed"));
        }
        let precision = (whole.len() + frac.len()).max(1);
        if precision > 38 {
            return Err(invalid("more than 38 digits"));
        }
        let data_type = DataType::Decimal {
            precision: precision as u8,
            scale: frac.len() as u8,
        };
        Ok(Self::plain(ValueKind::Decimal(text.to_string()), data_type))
    }

    pub fn timestamp(value: NaiveDateTime) -> Self {
        Self::plain(ValueKind::Timestamp(value), DataType::Timestamp)
    }

    /// Parse `YYYY-MM-DD HH:MM:SS[.fff]` (a `T` separator is accepted)
    pub fn parse_timestamp(text: &str) -> IrResult<Self> {
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
            .map(Self::timestamp)
            .ok_or_else(|| IrError::InvalidLiteral {
                kind: "timestamp".to_string(),
                value: text.to_string(),
                reason: "expected YYYY-MM-DD HH:MM:SS".to_string(),
            })
    }

    pub fn date(value: NaiveDate) -> Self {
        Self::plain(ValueKind::Date(value), DataType::Date)
    }

    pub fn parse_date(text: &str) -> IrResult<Self> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Self::date)
            .map_err(|e| IrError::InvalidLiteral {
                kind: "date".to_string(),
                value: text.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn boolean(value: bool) -> Self {
        Self::plain(ValueKind::Boolean(value), DataType::Boolean)
    }

    /// Untyped NULL
    pub fn null() -> Self {
        Self::plain(ValueKind::Null, DataType::Null)
    }

    /// NULL of a specific type (`CAST(NULL AS DOUBLE)`)
    pub fn typed_null(data_type: DataType) -> Self {
        Self::plain(ValueKind::Null, data_type)
    }

    /// Interval of `amount` time units; the unit must be a single time unit
    pub fn interval(amount: i64, unit: Unit) -> IrResult<Self> {
        if unit.time_keyword().is_none() {
            return Err(IrError::InvalidLiteral {
                kind: "interval".to_string(),
                value: format!("{amount} {unit}"),
                reason: "unit must be a single time unit (s, min, h, d, ...)".to_string(),
            });
        }
        Ok(Self::from_parts(
            ValueKind::Interval(amount),
            DataType::Interval,
            unit,
        ))
    }

    /// Homogeneous list; NULL elements are allowed anywhere
    pub fn list(items: Vec<Value>) -> IrResult<Self> {
        let element_type = common_type("list", &items)?;
        let unit = common_unit(&items)?;
        Ok(Self::from_parts(
            ValueKind::List(items),
            DataType::List(Box::new(element_type)),
            unit,
        ))
    }

    /// Parenthesised value list, the right side of `IN`
    pub fn tuple(items: Vec<Value>) -> IrResult<Self> {
        if items.is_empty() {
            return Err(IrError::Empty {
                what: "tuple".to_string(),
            });
        }
        let unit = common_unit(&items)?;
        let data_type = DataType::Tuple(items.iter().map(|v| v.data_type.clone()).collect());
        Ok(Self::from_parts(ValueKind::Tuple(items), data_type, unit))
    }

    pub fn structure(fields: Vec<(String, Value)>) -> IrResult<Self> {
        let mut seen = HashSet::new();
        for (name, _) in &fields {
            if name.trim().is_empty() {
                return Err(IrError::Empty {
                    what: "struct field name".to_string(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(IrError::DuplicateName {
                    container: "struct".to_string(),
                    name: name.clone(),
                });
            }
        }
        let data_type = DataType::Struct(
            fields
                .iter()
                .map(|(n, v)| (n.clone(), v.data_type.clone()))
                .collect(),
        );
        Ok(Self::plain(ValueKind::Struct(fields), data_type))
    }

    /// Latitude/longitude pair in degrees
    pub fn geo_coordinate(latitude: f64, longitude: f64) -> IrResult<Self> {
        let invalid = |reason: &str| IrError::InvalidLiteral {
            kind: "geo coordinate".to_string(),
            value: format!("({latitude}, {longitude})"),
            reason: reason.to_string(),
        };
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude outside [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("longitude outside [-180, 180]"));
        }
        Ok(Self::plain(
            ValueKind::GeoCoordinate {
                latitude,
                longitude,
            },
            geo_type(),
        ))
    }

    /// `*`, as in `COUNT(*)`
    pub fn wildcard() -> Self {
        Self::plain(ValueKind::WildCard, DataType::Unknown)
    }

    /// Inline query; typed by its column when it has exactly one
    pub fn subquery(table: Table) -> Self {
        let (data_type, unit) = match table.columns().list_columns() {
            [only] => (only.data_type().clone(), only.unit().clone()),
            _ => (DataType::Unknown, Unit::dimensionless()),
        };
        Self::from_parts(ValueKind::Subquery(Box::new(table)), data_type, unit)
    }

    /// Window frame boundary counted in rows
    pub fn frame_bound(bound: FrameBound) -> Self {
        Self::plain(ValueKind::FrameBound(bound), DataType::Unknown)
    }

    /// Window frame boundary measured in a time unit (a RANGE frame)
    pub fn frame_range(bound: FrameBound, unit: Unit) -> IrResult<Self> {
        if unit.time_keyword().is_none() {
            return Err(IrError::InvalidLiteral {
                kind: "frame bound".to_string(),
                value: format!("{bound} {unit}"),
                reason: "range offsets need a single time unit".to_string(),
            });
        }
        Ok(Self::from_parts(
            ValueKind::FrameBound(bound),
            DataType::Unknown,
            unit,
        ))
    }

    /// Attach a physical unit to a numeric literal
    pub fn with_unit(self, unit: Unit) -> IrResult<Self> {
        if !self.data_type.is_numeric() {
            return Err(IrError::InvalidLiteral {
                kind: variant_name(&self.kind).to_string(),
                value: literal_text(&self.kind),
                reason: "only numeric literals carry a unit".to_string(),
            });
        }
        Ok(Self::from_parts(self.kind, self.data_type, unit))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.kind {
            ValueKind::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// The frame bound, when this value is one
    pub fn as_frame_bound(&self) -> Option<FrameBound> {
        match self.kind {
            ValueKind::FrameBound(bound) => Some(bound),
            _ => None,
        }
    }

    pub fn with_macro_group(mut self, group: &str) -> Self {
        self.lineage.set_macro_group(group);
        self
    }
}

impl Provenance for Value {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

fn ensure_finite(kind: &str, value: f64) -> IrResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(IrError::InvalidLiteral {
            kind: kind.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        })
    }
}

fn geo_type() -> DataType {
    DataType::Struct(vec![
        ("latitude".to_string(), DataType::Double),
        ("longitude".to_string(), DataType::Double),
    ])
}

fn common_type(what: &str, items: &[Value]) -> IrResult<DataType> {
    let mut common = DataType::Unknown;
    for item in items.iter().filter(|v| !v.is_null()) {
        if common == DataType::Unknown {
            common = item.data_type.clone();
        } else if !common.accepts(&item.data_type) {
            return Err(IrError::TypeMismatch {
                context: format!("{what} element"),
                expected: common.to_string(),
                found: item.data_type.to_string(),
            });
        } else {
            common = common.widen(&item.data_type);
        }
    }
    Ok(common)
}

fn common_unit(items: &[Value]) -> IrResult<Unit> {
    let mut values = items.iter().filter(|v| !v.is_null());
    let Some(first) = values.next() else {
        return Ok(Unit::dimensionless());
    };
    for item in values {
        first.unit.ensure_compatible(&item.unit, "list")?;
    }
    Ok(first.unit.clone())
}

fn variant_name(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Varchar(_) => "varchar",
        ValueKind::Integer(_) => "integer",
        ValueKind::Float(_) => "float",
        ValueKind::Double(_) => "double",
        ValueKind::Decimal(_) => "decimal",
        ValueKind::Timestamp(_) => "timestamp",
        ValueKind::Date(_) => "date",
        ValueKind::Boolean(_) => "boolean",
        ValueKind::Null => "null",
        ValueKind::Interval(_) => "interval",
        ValueKind::List(_) => "list",
        ValueKind::Tuple(_) => "tuple",
        ValueKind::Struct(_) => "struct",
        ValueKind::GeoCoordinate { .. } => "geo_coordinate",
        ValueKind::WildCard => "wildcard",
        ValueKind::Subquery(_) => "subquery",
        ValueKind::FrameBound(_) => "frame_bound",
    }
}

/// Canonical text of the payload; nested values contribute through their keys
fn literal_text(kind: &ValueKind) -> String {
    match kind {
        ValueKind::Varchar(s) | ValueKind::Decimal(s) => s.clone(),
        ValueKind::Integer(n) | ValueKind::Interval(n) => n.to_string(),
        ValueKind::Float(x) | ValueKind::Double(x) => format!("{x:?}"),
        ValueKind::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        ValueKind::Date(d) => d.format("%Y-%m-%d").to_string(),
        ValueKind::Boolean(b) => b.to_string(),
        ValueKind::Null => "NULL".to_string(),
        ValueKind::List(items) => format!("list[{}]", items.len()),
        ValueKind::Tuple(items) => format!("tuple[{}]", items.len()),
        ValueKind::Struct(fields) => {
            let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
            format!("struct{{{}}}", names.join(","))
        }
        ValueKind::GeoCoordinate {
            latitude,
            longitude,
        } => format!("({latitude:?}, {longitude:?})"),
        ValueKind::WildCard => "*".to_string(),
        ValueKind::Subquery(table) => table.name().to_string(),
        ValueKind::FrameBound(bound) => bound.to_string(),
    }
}

fn value_key(kind: &ValueKind, data_type: &DataType, unit: &Unit) -> NodeKey {
    let children: Vec<&NodeKey> = match kind {
        ValueKind::List(items) | ValueKind::Tuple(items) => items.iter().map(|v| v.key()).collect(),
        ValueKind::Struct(fields) => fields.iter().map(|(_, v)| v.key()).collect(),
        ValueKind::Subquery(table) => vec![table.key()],
        _ => Vec::new(),
    };
    NodeKey::from_hasher(
        StableHasher::new("value")
            .field("variant", variant_name(kind))
            .field("data_type", data_type)
            .field("unit", unit)
            .field("literal", literal_text(kind))
            .sequence("children", children),
    )
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
