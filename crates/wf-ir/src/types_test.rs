use super::*;

#[test]
fn test_parse_aliases() {
    assert_eq!(DataType::parse("text").unwrap(), DataType::Varchar);
    assert_eq!(DataType::parse("VARCHAR(255)").unwrap(), DataType::Varchar);
    assert_eq!(DataType::parse("int").unwrap(), DataType::Integer);
    assert_eq!(DataType::parse("datetime").unwrap(), DataType::Timestamp);
    assert_eq!(DataType::parse(" double ").unwrap(), DataType::Double);
}

#[test]
fn test_parse_decimal_and_list() {
    assert_eq!(
        DataType::parse("DECIMAL(10, 2)").unwrap(),
        DataType::Decimal {
            precision: 10,
            scale: 2
        }
    );
    assert_eq!(
        DataType::parse("INTEGER[]").unwrap(),
        DataType::List(Box::new(DataType::Integer))
    );
}

#[test]
fn test_parse_unknown_type() {
    assert!(matches!(
        DataType::parse("GEOMETRY"),
        Err(IrError::UnknownType { .. })
    ));
}

#[test]
fn test_display_round_trips_through_parse() {
    for ty in [
        DataType::Varchar,
        DataType::BigInt,
        DataType::Decimal {
            precision: 12,
            scale: 4,
        },
        DataType::List(Box::new(DataType::Date)),
    ] {
        assert_eq!(DataType::parse(&ty.to_string()).unwrap(), ty);
    }
}

#[test]
fn test_widen_numeric() {
    assert_eq!(DataType::Integer.widen(&DataType::Integer), DataType::Integer);
    assert_eq!(DataType::Integer.widen(&DataType::BigInt), DataType::BigInt);
    assert_eq!(DataType::Integer.widen(&DataType::Double), DataType::Double);
    assert_eq!(DataType::Null.widen(&DataType::Varchar), DataType::Varchar);
}

#[test]
fn test_widen_temporal() {
    assert_eq!(
        DataType::Timestamp.widen(&DataType::Interval),
        DataType::Timestamp
    );
    assert_eq!(
        DataType::Timestamp.widen(&DataType::Timestamp),
        DataType::Timestamp
    );
    assert_eq!(DataType::Varchar.widen(&DataType::Integer), DataType::Unknown);
}

#[test]
fn test_var_type_defaults() {
    assert_eq!(VarType::for_data_type(&DataType::Double), VarType::Numeric);
    assert_eq!(VarType::for_data_type(&DataType::Varchar), VarType::Categorical);
    assert_eq!(VarType::for_data_type(&DataType::Date), VarType::Temporal);
    assert_eq!(VarType::parse("KEY"), VarType::Key);
    assert_eq!(VarType::parse("whatever"), VarType::Unknown);
}

#[test]
fn test_on_null_parse() {
    assert_eq!(OnNull::parse("fail"), OnNull::Fail);
    assert_eq!(OnNull::parse("Warn"), OnNull::Warn);
    assert_eq!(OnNull::parse(""), OnNull::Pass);
}
