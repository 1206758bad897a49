//! Strongly-typed identifiers for columns, tables and schemas.
//!
//! Keeping the three apart stops a column name from being used where a
//! table handle is expected (the column back-reference to its table is a
//! `TableName`, never a string).

use crate::newtype_string::define_identifier;

define_identifier! {
    /// Name of a column inside a table or column list.
    pub struct ColumnName => "column name";
}

define_identifier! {
    /// Name of a table; doubles as the non-owning handle stored on columns.
    pub struct TableName => "table name";
}

define_identifier! {
    /// Name of a schema (a named collection of tables sharing settings).
    pub struct SchemaName => "schema name";
}

impl ColumnName {
    /// The `*` column
    pub fn wildcard() -> Self {
        Self("*".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_try_new_rejects_empty() {
        assert!(matches!(
            ColumnName::try_new(""),
            Err(CoreError::EmptyName { .. })
        ));
        assert!(TableName::try_new("   ").is_err());
    }

    #[test]
    fn test_wildcard_name() {
        assert_eq!(ColumnName::wildcard(), "*");
    }

    #[test]
    fn test_quoted_escapes_embedded_quotes() {
        let name = TableName::try_new(r#"odd"name"#).unwrap();
        assert_eq!(name.quoted(), r#""odd""name""#);
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        let ok: SchemaName = serde_yaml::from_str("raw").unwrap();
        assert_eq!(ok, "raw");
        let err = serde_yaml::from_str::<SchemaName>("''");
        assert!(err.is_err());
    }

    #[test]
    fn test_compares_with_str() {
        let name = ColumnName::try_new("amount").unwrap();
        assert_eq!(name, "amount");
        assert_eq!(name.as_str(), "amount");
        assert_eq!(name.to_string(), "amount");
    }
}
