//! Physical units attached to values, columns and function results.
//!
//! A `Unit` is a product of symbols raised to integer exponents (`kg*m/s^2`).
//! It is kept in canonical form at all times: one entry per symbol, no zero
//! exponents, sorted by descending exponent then symbol. Two units are
//! compatible for addition exactly when their canonical decompositions are
//! equal.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a unit decomposition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubUnit {
    /// Long name (`second`, `metre`); equals the symbol for custom units
    pub unit_name: String,
    /// Symbol as written in unit strings (`s`, `m`)
    pub symbol: String,
    /// Integer exponent, never zero
    pub exponent: i32,
}

/// (symbol, unit name, SQL time keyword)
const KNOWN_UNITS: &[(&str, &str, Option<&str>)] = &[
    ("us", "microsecond", Some("MICROSECOND")),
    ("ms", "millisecond", Some("MILLISECOND")),
    ("s", "second", Some("SECOND")),
    ("min", "minute", Some("MINUTE")),
    ("h", "hour", Some("HOUR")),
    ("d", "day", Some("DAY")),
    ("wk", "week", Some("WEEK")),
    ("mo", "month", Some("MONTH")),
    ("yr", "year", Some("YEAR")),
    ("mm", "millimetre", None),
    ("cm", "centimetre", None),
    ("m", "metre", None),
    ("km", "kilometre", None),
    ("g", "gram", None),
    ("kg", "kilogram", None),
    ("t", "tonne", None),
    ("K", "kelvin", None),
    ("A", "ampere", None),
    ("mol", "mole", None),
    ("cd", "candela", None),
    ("N", "newton", None),
    ("J", "joule", None),
    ("W", "watt", None),
    ("kWh", "kilowatt_hour", None),
    ("Pa", "pascal", None),
    ("V", "volt", None),
    ("Hz", "hertz", None),
    ("L", "litre", None),
    ("%", "percent", None),
];

fn lookup(symbol: &str) -> Option<&'static (&'static str, &'static str, Option<&'static str>)> {
    KNOWN_UNITS.iter().find(|(s, _, _)| *s == symbol)
}

/// A physical unit in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Unit {
    sub_units: Vec<SubUnit>,
}

impl Unit {
    /// The unit of pure numbers and of non-numeric data
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// Parse a symbolic unit string such as `m/s^2`, `kg*m`, `1/s` or `1`.
    ///
    /// Empty strings and `1` are dimensionless. Unknown symbols are accepted
    /// as custom units (`EUR`, `items`) as long as they are identifier-like.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "1" {
            return Ok(Self::dimensionless());
        }

        let mut exponents: BTreeMap<String, i32> = BTreeMap::new();
        let mut sign = 1;
        let mut term = String::new();
        for ch in trimmed.chars().chain(std::iter::once('*')) {
            match ch {
                '*' | '/' => {
                    let (symbol, exponent) = parse_term(input, term.trim())?;
                    if let Some(symbol) = symbol {
                        let entry = exponents.entry(symbol).or_insert(0);
                        let current = *entry;
                        *entry = exponent
                            .checked_mul(sign)
                            .and_then(|e| current.checked_add(e))
                            .ok_or_else(|| CoreError::InvalidUnit {
                                unit: input.to_string(),
                                reason: "exponent out of range".to_string(),
                            })?;
                    }
                    term.clear();
                    sign = if ch == '/' { -1 } else { 1 };
                }
                c if c.is_whitespace() => {}
                c => term.push(c),
            }
        }
        Ok(Self::from_exponents(exponents))
    }

    fn from_exponents(exponents: BTreeMap<String, i32>) -> Self {
        let mut sub_units: Vec<SubUnit> = exponents
            .into_iter()
            .filter(|(_, exp)| *exp != 0)
            .map(|(symbol, exponent)| SubUnit {
                unit_name: lookup(&symbol)
                    .map(|(_, name, _)| name.to_string())
                    .unwrap_or_else(|| symbol.clone()),
                symbol,
                exponent,
            })
            .collect();
        sub_units.sort_by(|a, b| {
            b.exponent
                .cmp(&a.exponent)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        Self { sub_units }
    }

    fn exponents(&self) -> BTreeMap<String, i32> {
        self.sub_units
            .iter()
            .map(|s| (s.symbol.clone(), s.exponent))
            .collect()
    }

    /// Decomposition rows in canonical order
    pub fn sub_units(&self) -> &[SubUnit] {
        &self.sub_units
    }

    /// True when the unit has no sub-units
    pub fn is_dimensionless(&self) -> bool {
        self.sub_units.is_empty()
    }

    fn out_of_range(&self, operation: &str) -> CoreError {
        CoreError::InvalidUnit {
            unit: self.to_string(),
            reason: format!("exponent out of range after {operation}"),
        }
    }

    /// Product of two units
    pub fn multiply(&self, other: &Unit) -> CoreResult<Unit> {
        let mut exponents = self.exponents();
        for sub in &other.sub_units {
            let entry = exponents.entry(sub.symbol.clone()).or_insert(0);
            let current = *entry;
            *entry = current
                .checked_add(sub.exponent)
                .ok_or_else(|| self.out_of_range("multiplication"))?;
        }
        Ok(Self::from_exponents(exponents))
    }

    /// Reciprocal (all exponents negated)
    pub fn reciprocal(&self) -> CoreResult<Unit> {
        self.pow(-1)
    }

    /// Quotient, computed as multiplication by the reciprocal
    pub fn divide(&self, other: &Unit) -> CoreResult<Unit> {
        self.multiply(&other.reciprocal()?)
    }

    /// Raise to an integer power
    pub fn pow(&self, power: i32) -> CoreResult<Unit> {
        let exponents = self
            .sub_units
            .iter()
            .map(|s| {
                s.exponent
                    .checked_mul(power)
                    .map(|e| (s.symbol.clone(), e))
                    .ok_or_else(|| self.out_of_range(&format!("raising to {power}")))
            })
            .collect::<CoreResult<BTreeMap<_, _>>>()?;
        Ok(Self::from_exponents(exponents))
    }

    /// Integer root, when every exponent is divisible by `degree`
    pub fn root(&self, degree: i32) -> Option<Unit> {
        if degree <= 0 || self.sub_units.iter().any(|s| s.exponent % degree != 0) {
            return None;
        }
        let exponents = self
            .sub_units
            .iter()
            .map(|s| (s.symbol.clone(), s.exponent / degree))
            .collect();
        Some(Self::from_exponents(exponents))
    }

    /// Check that two units can be added, subtracted or compared.
    pub fn ensure_compatible(&self, other: &Unit, operation: &str) -> CoreResult<()> {
        if self.sub_units == other.sub_units {
            Ok(())
        } else {
            Err(CoreError::IncompatibleUnits {
                operation: operation.to_string(),
                left: self.to_string(),
                right: other.to_string(),
            })
        }
    }

    /// SQL interval keyword when the unit is exactly one time unit (`s` → `SECOND`)
    pub fn time_keyword(&self) -> Option<&'static str> {
        match self.sub_units.as_slice() {
            [single] if single.exponent == 1 => lookup(&single.symbol).and_then(|(_, _, kw)| *kw),
            _ => None,
        }
    }
}

/// Parse one `symbol[^exp]` term; `1` yields no symbol.
fn parse_term(input: &str, term: &str) -> CoreResult<(Option<String>, i32)> {
    let invalid = |reason: &str| CoreError::InvalidUnit {
        unit: input.to_string(),
        reason: reason.to_string(),
    };
    if term.is_empty() {
        return Err(invalid("empty term"));
    }
    let (symbol, exponent) = match term.split_once('^') {
        Some((symbol, exp)) => {
            let exp: i32 = exp
                .parse()
                .map_err(|_| invalid(&format!("bad exponent in '{term}'")))?;
            (symbol, exp)
        }
        None => (term, 1),
    };
    if symbol == "1" {
        return Ok((None, 0));
    }
    let valid_start = symbol
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '%' || c == '$');
    let valid_rest = symbol
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '%' || c == '$');
    if !valid_start || !valid_rest {
        return Err(invalid(&format!("bad symbol '{symbol}'")));
    }
    Ok((Some(symbol.to_string()), exponent))
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.sub_units.is_empty() {
            return write!(f, "1");
        }
        let render = |s: &SubUnit, exp: i32| {
            if exp == 1 {
                s.symbol.clone()
            } else {
                format!("{}^{}", s.symbol, exp)
            }
        };
        let numerator: Vec<String> = self
            .sub_units
            .iter()
            .filter(|s| s.exponent > 0)
            .map(|s| render(s, s.exponent))
            .collect();
        let denominator: Vec<String> = self
            .sub_units
            .iter()
            .filter(|s| s.exponent < 0)
            .map(|s| render(s, -s.exponent))
            .collect();
        if numerator.is_empty() {
            write!(f, "1")?;
        } else {
            write!(f, "{}", numerator.join("*"))?;
        }
        for d in denominator {
            write!(f, "/{d}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Unit {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl Serialize for Unit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Unit::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "unit_test.rs"]
mod tests;
