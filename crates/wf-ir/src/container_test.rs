use super::*;
use crate::types::DataType;

fn col(name: &str) -> Column {
    Column::blank(name, DataType::Integer).unwrap()
}

#[test]
fn test_insertion_order_is_kept() {
    let list = ColumnList::from_items(["c", "a", "b"].map(col)).unwrap();
    assert_eq!(list.list_names(), vec!["c", "a", "b"]);
    let names: Vec<&str> = list.list_columns().iter().map(|c| c.name().as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
    assert_eq!(list.position("a"), Some(1));
}

#[test]
fn test_duplicate_without_override_fails() {
    let mut list = ColumnList::from_items([col("x")]).unwrap();
    let err = list.add(col("x"), false).unwrap_err();
    assert!(matches!(err, IrError::DuplicateName { ref name, .. } if name == "x"));
    assert_eq!(list.len(), 1);
}

#[test]
fn test_override_replaces_in_place() {
    let mut list = ColumnList::from_items([col("x"), col("y")]).unwrap();
    let replacement = Column::blank("x", DataType::Varchar).unwrap();
    list.add(replacement, true).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.list_names(), vec!["x", "y"]);
    assert_eq!(list.get("x").unwrap().data_type(), &DataType::Varchar);
}

#[test]
fn test_restricted_rejects_other_variants() {
    let mut list = ColumnList::restricted(&[ColumnKind::Blank]);
    list.add(col("a"), false).unwrap();
    let err = list.add(Column::wildcard(), false).unwrap_err();
    assert!(matches!(err, IrError::WrongVariant { ref variant, .. } if variant == "wildcard"));
}

#[test]
fn test_remove_reindexes() {
    let mut list = ColumnList::from_items(["a", "b", "c"].map(col)).unwrap();
    assert!(list.remove("a").is_some());
    assert!(list.remove("missing").is_none());
    assert_eq!(list.position("c"), Some(1));
    assert_eq!(list.get("c").unwrap().name(), "c");
}

#[test]
fn test_filter_names() {
    let list = ColumnList::from_items(["speed_avg", "speed_max", "count"].map(col)).unwrap();
    let speeds = list.filter_names("^speed_").unwrap();
    assert_eq!(speeds.list_names(), vec!["speed_avg", "speed_max"]);
    assert!(matches!(
        list.filter_names("(unclosed"),
        Err(IrError::InvalidPattern { .. })
    ));
}

#[test]
fn test_filter_unit() {
    let metres = Unit::parse("m").unwrap();
    let list = ColumnList::from_items([
        col("a").with_unit(metres.clone()),
        col("b").with_unit(Unit::parse("s").unwrap()),
        col("c").with_unit(metres.clone()),
    ])
    .unwrap();
    assert_eq!(list.filter_unit(&metres).list_names(), vec!["a", "c"]);
}

#[test]
fn test_merge_missing() {
    let mut left = ColumnList::from_items(["a", "b"].map(col)).unwrap();
    let right = ColumnList::from_items(["b", "c"].map(col)).unwrap();
    left.merge_missing(&right).unwrap();
    assert_eq!(left.list_names(), vec!["a", "b", "c"]);
}

#[test]
fn test_merge_missing_rejects_different_entry() {
    let mut left = ColumnList::from_items(["a", "b"].map(col)).unwrap();
    let right = ColumnList::from_items([Column::blank("b", DataType::Varchar).unwrap()]).unwrap();
    let err = left.merge_missing(&right).unwrap_err();
    assert!(matches!(err, IrError::DuplicateName { ref name, .. } if name == "b"));
    assert_eq!(left.len(), 2);
}
