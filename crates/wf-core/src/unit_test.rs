use super::*;

#[test]
fn test_parse_dimensionless() {
    assert!(Unit::parse("").unwrap().is_dimensionless());
    assert!(Unit::parse("1").unwrap().is_dimensionless());
    assert_eq!(Unit::dimensionless().to_string(), "1");
}

#[test]
fn test_parse_compound_unit() {
    let unit = Unit::parse("kg*m/s^2").unwrap();
    let rows: Vec<(&str, i32)> = unit
        .sub_units()
        .iter()
        .map(|s| (s.symbol.as_str(), s.exponent))
        .collect();
    assert_eq!(rows, vec![("kg", 1), ("m", 1), ("s", -2)]);
    assert_eq!(unit.to_string(), "kg*m/s^2");
    assert_eq!(unit.sub_units()[2].unit_name, "second");
}

#[test]
fn test_parse_reciprocal() {
    let unit = Unit::parse("1/s").unwrap();
    assert_eq!(unit.sub_units()[0].exponent, -1);
    assert_eq!(unit.to_string(), "1/s");
}

#[test]
fn test_parse_merges_repeated_symbols() {
    let unit = Unit::parse("m*m/m").unwrap();
    assert_eq!(unit, Unit::parse("m").unwrap());
}

#[test]
fn test_parse_custom_symbol() {
    let unit = Unit::parse("EUR/kWh").unwrap();
    assert_eq!(unit.sub_units()[0].unit_name, "EUR");
    assert_eq!(unit.sub_units()[1].unit_name, "kilowatt_hour");
}

#[test]
fn test_parse_rejects_garbage() {
    assert!(matches!(
        Unit::parse("m/"),
        Err(CoreError::InvalidUnit { .. })
    ));
    assert!(Unit::parse("m^x").is_err());
    assert!(Unit::parse("2m").is_err());
}

#[test]
fn test_multiply_and_divide() {
    let m = Unit::parse("m").unwrap();
    let s = Unit::parse("s").unwrap();
    let speed = m.divide(&s).unwrap();
    assert_eq!(speed.to_string(), "m/s");
    assert_eq!(speed.multiply(&s).unwrap(), m);
    assert!(m.divide(&m).unwrap().is_dimensionless());
}

#[test]
fn test_pow_and_root() {
    let m = Unit::parse("m").unwrap();
    let area = m.pow(2).unwrap();
    assert_eq!(area.to_string(), "m^2");
    assert_eq!(area.root(2), Some(m.clone()));
    assert_eq!(m.root(2), None);
    assert!(m.pow(0).unwrap().is_dimensionless());
}

#[test]
fn test_exponent_overflow_is_an_error() {
    let err = Unit::parse("m^2147483647*m").unwrap_err();
    assert!(matches!(err, CoreError::InvalidUnit { .. }));
    assert!(Unit::parse("m^-2147483648/m").is_err());

    let area = Unit::parse("m^2").unwrap();
    let err = area.pow(2_000_000_000).unwrap_err();
    assert!(err.to_string().starts_with("[C007]"));

    let huge = Unit::parse("m^2147483647").unwrap();
    assert!(huge.multiply(&Unit::parse("m").unwrap()).is_err());
    assert!(Unit::parse("m^-2147483648").unwrap().reciprocal().is_err());
}

#[test]
fn test_ensure_compatible() {
    let a = Unit::parse("m/s").unwrap();
    let b = Unit::parse("1/s*m").unwrap();
    assert!(a.ensure_compatible(&b, "add").is_ok());

    let m = Unit::parse("m").unwrap();
    let s = Unit::parse("s").unwrap();
    let err = m.ensure_compatible(&s, "add").unwrap_err();
    assert!(matches!(err, CoreError::IncompatibleUnits { .. }));
    assert!(err.to_string().contains("add"));
}

#[test]
fn test_time_keyword() {
    assert_eq!(Unit::parse("min").unwrap().time_keyword(), Some("MINUTE"));
    assert_eq!(Unit::parse("d").unwrap().time_keyword(), Some("DAY"));
    assert_eq!(Unit::parse("m").unwrap().time_keyword(), None);
    assert_eq!(Unit::parse("s^2").unwrap().time_keyword(), None);
}

#[test]
fn test_serde_round_trip_as_string() {
    let unit: Unit = serde_yaml::from_str("\"kg/m^3\"").unwrap();
    assert_eq!(unit.to_string(), "kg/m^3");
    let json = serde_json::to_string(&unit).unwrap();
    assert_eq!(json, "\"kg/m^3\"");
}
