//! SQL function calls with type, variable-type and unit derivation.
//!
//! A function's data type, var type and unit are derived from its arguments
//! at construction. Unit rules:
//!
//! * add, subtract, coalesce, greatest and least need identical argument units
//! * multiply and divide combine units (`m / s` → `m/s`)
//! * power with an integer literal exponent raises the unit; any other
//!   exponent keeps the base unit and logs a warning
//! * date differences carry the requested time unit
//!
//! Aggregates become window functions when given a partition or ordering;
//! ranking and offset functions are only valid as window functions and get
//! an empty `OVER ()` when neither is given.

use crate::error::{IrError, IrResult};
use crate::expression::Expression;
use crate::operand::Operand;
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::types::{DataType, VarType};
use wf_core::{StableHasher, Unit};

/// Which function is called, with any non-argument parameters
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    Sum,
    Avg,
    Min,
    Max,
    /// `COUNT(x)`, or `COUNT(*)` with no argument
    Count,
    CountDistinct,
    StdDev,
    Variance,
    Median,
    AnyValue,
    RowNumber,
    Rank,
    DenseRank,
    Lag,
    Lead,
    FirstValue,
    LastValue,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Negate,
    Abs,
    Round,
    Floor,
    Ceil,
    Sqrt,
    Power,
    Ln,
    Exp,
    Greatest,
    Least,
    Coalesce,
    NullIf,
    Cast(DataType),
    TryCast(DataType),
    Concat,
    Lower,
    Upper,
    Trim,
    Length,
    RegexpMatches,
    Md5,
    /// Truncate a timestamp to a time unit
    DateTrunc(Unit),
    /// Extract a field of a timestamp
    DatePart(Unit),
    /// Difference of two timestamps counted in a time unit
    DateDiff(Unit),
    Now,
}

impl FunctionKind {
    /// SQL name of the function
    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Sum => "SUM",
            FunctionKind::Avg => "AVG",
            FunctionKind::Min => "MIN",
            FunctionKind::Max => "MAX",
            FunctionKind::Count | FunctionKind::CountDistinct => "COUNT",
            FunctionKind::StdDev => "STDDEV_SAMP",
            FunctionKind::Variance => "VAR_SAMP",
            FunctionKind::Median => "MEDIAN",
            FunctionKind::AnyValue => "ANY_VALUE",
            FunctionKind::RowNumber => "ROW_NUMBER",
            FunctionKind::Rank => "RANK",
            FunctionKind::DenseRank => "DENSE_RANK",
            FunctionKind::Lag => "LAG",
            FunctionKind::Lead => "LEAD",
            FunctionKind::FirstValue => "FIRST_VALUE",
            FunctionKind::LastValue => "LAST_VALUE",
            FunctionKind::Add => "ADD",
            FunctionKind::Subtract => "SUBTRACT",
            FunctionKind::Multiply => "MULTIPLY",
            FunctionKind::Divide => "DIVIDE",
            FunctionKind::Modulo => "MOD",
            FunctionKind::Negate => "NEGATE",
            FunctionKind::Abs => "ABS",
            FunctionKind::Round => "ROUND",
            FunctionKind::Floor => "FLOOR",
            FunctionKind::Ceil => "CEIL",
            FunctionKind::Sqrt => "SQRT",
            FunctionKind::Power => "POWER",
            FunctionKind::Ln => "LN",
            FunctionKind::Exp => "EXP",
            FunctionKind::Greatest => "GREATEST",
            FunctionKind::Least => "LEAST",
            FunctionKind::Coalesce => "COALESCE",
            FunctionKind::NullIf => "NULLIF",
            FunctionKind::Cast(_) => "CAST",
            FunctionKind::TryCast(_) => "TRY_CAST",
            FunctionKind::Concat => "CONCAT",
            FunctionKind::Lower => "LOWER",
            FunctionKind::Upper => "UPPER",
            FunctionKind::Trim => "TRIM",
            FunctionKind::Length => "LENGTH",
            FunctionKind::RegexpMatches => "REGEXP_MATCHES",
            FunctionKind::Md5 => "MD5",
            FunctionKind::DateTrunc(_) => "DATE_TRUNC",
            FunctionKind::DatePart(_) => "DATE_PART",
            FunctionKind::DateDiff(_) => "DATE_DIFF",
            FunctionKind::Now => "NOW",
        }
    }

    /// Aggregates collapse rows when used without a window
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            FunctionKind::Sum
                | FunctionKind::Avg
                | FunctionKind::Min
                | FunctionKind::Max
                | FunctionKind::Count
                | FunctionKind::CountDistinct
                | FunctionKind::StdDev
                | FunctionKind::Variance
                | FunctionKind::Median
                | FunctionKind::AnyValue
        )
    }

    /// Functions that only exist with an `OVER` clause
    pub fn is_window_only(&self) -> bool {
        matches!(
            self,
            FunctionKind::RowNumber
                | FunctionKind::Rank
                | FunctionKind::DenseRank
                | FunctionKind::Lag
                | FunctionKind::Lead
                | FunctionKind::FirstValue
                | FunctionKind::LastValue
        )
    }

    /// Accepted argument count as (min, max); `None` means unbounded
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            FunctionKind::RowNumber
            | FunctionKind::Rank
            | FunctionKind::DenseRank
            | FunctionKind::Now => (0, Some(0)),
            FunctionKind::Count => (0, Some(1)),
            FunctionKind::Lag | FunctionKind::Lead => (1, Some(3)),
            FunctionKind::Round => (1, Some(2)),
            FunctionKind::Add
            | FunctionKind::Subtract
            | FunctionKind::Multiply
            | FunctionKind::Divide
            | FunctionKind::Modulo
            | FunctionKind::Power
            | FunctionKind::NullIf
            | FunctionKind::RegexpMatches
            | FunctionKind::DateDiff(_) => (2, Some(2)),
            FunctionKind::Greatest | FunctionKind::Least => (2, None),
            FunctionKind::Coalesce | FunctionKind::Concat => (1, None),
            _ => (1, Some(1)),
        }
    }

    /// Parameters that are not arguments, for keys and labels
    fn parameter(&self) -> Option<String> {
        match self {
            FunctionKind::Cast(t) | FunctionKind::TryCast(t) => Some(t.to_string()),
            FunctionKind::DateTrunc(u) | FunctionKind::DatePart(u) | FunctionKind::DateDiff(u) => {
                Some(u.to_string())
            }
            FunctionKind::CountDistinct => Some("DISTINCT".to_string()),
            _ => None,
        }
    }

    fn label(&self) -> String {
        match self.parameter() {
            Some(p) => format!("{}[{}]", self.name(), p),
            None => self.name().to_string(),
        }
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Window clause of a function call
#[derive(Debug, Clone, Default)]
pub struct Window {
    pub partition_by: Vec<Operand>,
    pub order_by: Vec<Operand>,
    /// `BETWEEN <bound> AND <bound>` frame
    pub framing: Option<Expression>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by<I, T>(mut self, operands: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        self.partition_by = operands.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by<I, T>(mut self, operands: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        self.order_by = operands.into_iter().map(Into::into).collect();
        self
    }

    pub fn framing(mut self, frame: Expression) -> Self {
        self.framing = Some(frame);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.partition_by.is_empty() && self.order_by.is_empty() && self.framing.is_none()
    }
}

/// A function call
#[derive(Debug, Clone)]
pub struct Function {
    kind: FunctionKind,
    args: Vec<Operand>,
    window: Window,
    data_type: DataType,
    var_type: VarType,
    unit: Unit,
    lineage: Lineage,
}

impl Function {
    pub fn new<I, T>(kind: FunctionKind, args: I) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        Self::with_window(kind, args, Window::default())
    }

    pub fn with_window<I, T>(kind: FunctionKind, args: I, window: Window) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        let args: Vec<Operand> = args.into_iter().map(Into::into).collect();
        check_arity(&kind, args.len())?;
        if let Some(frame) = &window.framing {
            if !frame.is_frame() {
                return Err(IrError::InvalidArgument {
                    function: kind.name().to_string(),
                    reason: "framing must be BETWEEN two frame bounds".to_string(),
                });
            }
        }
        let (data_type, var_type, unit) = derive(&kind, &args)?;

        let key = function_key(&kind, &args, &window);
        let record = NodeRecord::new(key, NodeTag::Function, kind.name().to_lowercase(), kind.label())
            .with_attribute("data_type", &data_type)
            .with_attribute("unit", &unit);
        let lineage = {
            let mut deps = Dependencies::new();
            deps.extend(EdgeKind::Argument, args.iter().map(|a| a.lineage()))
                .extend(
                    EdgeKind::PartitionBy,
                    window.partition_by.iter().map(|p| p.lineage()),
                )
                .extend(EdgeKind::OrderBy, window.order_by.iter().map(|o| o.lineage()));
            if let Some(frame) = &window.framing {
                deps.push(EdgeKind::Framing, frame.lineage());
            }
            Lineage::build(record, &deps)
        };

        Ok(Self {
            kind,
            args,
            window,
            data_type,
            var_type,
            unit,
            lineage,
        })
    }

    pub fn with_macro_group(mut self, group: &str) -> Self {
        self.lineage.set_macro_group(group);
        self
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    pub fn args(&self) -> &[Operand] {
        &self.args
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn var_type(&self) -> VarType {
        self.var_type
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// True when the call is rendered with an `OVER` clause
    pub fn is_windowed(&self) -> bool {
        self.kind.is_window_only() || !self.window.is_empty()
    }

    /// True when the call collapses rows and so forces grouping
    pub fn is_aggregate(&self) -> bool {
        if self.is_windowed() {
            return false;
        }
        self.kind.is_aggregate() || self.args.iter().any(|a| a.is_aggregate())
    }
}

impl Provenance for Function {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

fn check_arity(kind: &FunctionKind, found: usize) -> IrResult<()> {
    let (min, max) = kind.arity();
    let ok = found >= min && max.map_or(true, |m| found <= m);
    if ok {
        return Ok(());
    }
    let expected = match max {
        Some(m) if m == min => min.to_string(),
        Some(m) => format!("{min}..={m}"),
        None => format!("at least {min}"),
    };
    Err(IrError::Arity {
        function: kind.name().to_string(),
        expected,
        found,
    })
}

fn function_key(kind: &FunctionKind, args: &[Operand], window: &Window) -> NodeKey {
    NodeKey::from_hasher(
        StableHasher::new("function")
            .field("name", kind.name())
            .optional("parameter", kind.parameter())
            .sequence("args", args.iter().map(|a| a.key()))
            .sequence("partition_by", window.partition_by.iter().map(|p| p.key()))
            .sequence("order_by", window.order_by.iter().map(|o| o.key()))
            .optional("framing", window.framing.as_ref().map(|f| f.key())),
    )
}

/// Units of all non-NULL arguments must match; returns the shared unit
fn shared_unit(kind: &FunctionKind, args: &[Operand]) -> IrResult<Unit> {
    let mut units = args.iter().filter(|a| !a.is_null_literal()).map(|a| a.unit());
    let Some(first) = units.next() else {
        return Ok(Unit::dimensionless());
    };
    for unit in units {
        first.ensure_compatible(&unit, kind.name())?;
    }
    Ok(first)
}

fn widened(args: &[Operand]) -> DataType {
    args.iter()
        .map(|a| a.data_type())
        .reduce(|acc, t| acc.widen(&t))
        .unwrap_or(DataType::Unknown)
}

fn numeric_var_type(data_type: &DataType) -> VarType {
    if data_type.is_temporal() {
        VarType::Temporal
    } else {
        VarType::Numeric
    }
}

fn require_time_unit(kind: &FunctionKind, unit: &Unit) -> IrResult<()> {
    if unit.time_keyword().is_some() {
        Ok(())
    } else {
        Err(IrError::InvalidArgument {
            function: kind.name().to_string(),
            reason: format!("'{unit}' is not a single time unit"),
        })
    }
}

fn derive(kind: &FunctionKind, args: &[Operand]) -> IrResult<(DataType, VarType, Unit)> {
    use FunctionKind as F;

    let dimensionless = Unit::dimensionless;
    let first = args.first();
    let first_type = first.map(|a| a.data_type()).unwrap_or(DataType::Unknown);
    let first_unit = first.map(|a| a.unit()).unwrap_or_default();
    let first_var = first.map(|a| a.var_type()).unwrap_or_default();

    if let (F::Add | F::Subtract, [left, right]) = (kind, args) {
        if let Some(data_type) = left
            .data_type()
            .shifted_by(&right.data_type(), *kind == F::Subtract)
        {
            return Ok((data_type, VarType::Temporal, dimensionless()));
        }
    }

    let derived = match kind {
        F::Sum => (first_type, VarType::Numeric, first_unit),
        F::Avg | F::StdDev | F::Median => (DataType::Double, VarType::Numeric, first_unit),
        F::Variance => (DataType::Double, VarType::Numeric, first_unit.pow(2)?),
        F::Min | F::Max | F::AnyValue | F::FirstValue | F::LastValue | F::Lag | F::Lead => {
            (first_type, first_var, first_unit)
        }
        F::Count | F::CountDistinct | F::RowNumber | F::Rank | F::DenseRank => {
            (DataType::BigInt, VarType::Numeric, dimensionless())
        }
        F::Add | F::Subtract => {
            let unit = shared_unit(kind, args)?;
            let data_type = match (kind, &args[0].data_type(), &args[1].data_type()) {
                (F::Subtract, l, r) if l.is_temporal() && r.is_temporal() => DataType::Interval,
                _ => widened(args),
            };
            let var_type = numeric_var_type(&data_type);
            (data_type, var_type, unit)
        }
        F::Multiply => {
            let data_type = widened(args);
            (data_type, VarType::Numeric, args[0].unit().multiply(&args[1].unit())?)
        }
        F::Divide => {
            let data_type = match widened(args) {
                d @ DataType::Decimal { .. } => d,
                _ => DataType::Double,
            };
            (data_type, VarType::Numeric, args[0].unit().divide(&args[1].unit())?)
        }
        F::Modulo => (widened(args), VarType::Numeric, first_unit),
        F::Negate | F::Abs | F::Round | F::Floor | F::Ceil => {
            (first_type, first_var, first_unit)
        }
        F::Sqrt => {
            let unit = first_unit.root(2).unwrap_or_else(|| {
                log::warn!(
                    "SQRT of unit '{first_unit}' has no exact root; keeping the base unit"
                );
                first_unit.clone()
            });
            (DataType::Double, VarType::Numeric, unit)
        }
        F::Power => {
            let exponent = args[1]
                .as_value()
                .and_then(|v| v.as_integer())
                .and_then(|n| i32::try_from(n).ok());
            let unit = match exponent {
                Some(n) => first_unit.pow(n).unwrap_or_else(|e| {
                    log::warn!(
                        "POWER exponent {n} truncated ({e}); keeping base unit '{first_unit}'"
                    );
                    first_unit.clone()
                }),
                None => {
                    if !first_unit.is_dimensionless() {
                        log::warn!(
                            "POWER exponent is not an integer literal; keeping base unit '{first_unit}'"
                        );
                    }
                    first_unit
                }
            };
            (DataType::Double, VarType::Numeric, unit)
        }
        F::Ln | F::Exp => {
            if !first_unit.is_dimensionless() {
                log::warn!("{} of a value in '{first_unit}' drops the unit", kind.name());
            }
            (DataType::Double, VarType::Numeric, dimensionless())
        }
        F::Greatest | F::Least | F::Coalesce => {
            let unit = shared_unit(kind, args)?;
            (widened(args), first_var, unit)
        }
        F::NullIf => (first_type, first_var, first_unit),
        F::Cast(target) | F::TryCast(target) => {
            let var_type = if first_var == VarType::Key {
                VarType::Key
            } else {
                VarType::for_data_type(target)
            };
            (target.clone(), var_type, first_unit)
        }
        F::Concat => (DataType::Varchar, VarType::Categorical, dimensionless()),
        F::Lower | F::Upper | F::Trim => (DataType::Varchar, first_var, dimensionless()),
        F::Length => (DataType::BigInt, VarType::Numeric, dimensionless()),
        F::RegexpMatches => (DataType::Boolean, VarType::Boolean, dimensionless()),
        F::Md5 => (DataType::Varchar, VarType::Key, dimensionless()),
        F::DateTrunc(unit) => {
            require_time_unit(kind, unit)?;
            (DataType::Timestamp, VarType::Temporal, dimensionless())
        }
        F::DatePart(unit) => {
            require_time_unit(kind, unit)?;
            (DataType::BigInt, VarType::Numeric, dimensionless())
        }
        F::DateDiff(unit) => {
            require_time_unit(kind, unit)?;
            (DataType::BigInt, VarType::Numeric, unit.clone())
        }
        F::Now => (DataType::Timestamp, VarType::Temporal, dimensionless()),
    };
    Ok(derived)
}

#[cfg(test)]
#[path = "function_test.rs"]
mod tests;
