use super::*;
use std::collections::BTreeMap;
use wf_core::SchemaName;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_from_default_config_is_in_memory() {
    let db = DuckDbBackend::from_config(&DatabaseConfig::default()).unwrap();
    db.execute("CREATE TABLE t AS SELECT 1 AS id").await.unwrap();
    assert!(db.relation_exists("t").await.unwrap());
}

#[tokio::test]
async fn test_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weft.duckdb");
    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        db.execute("CREATE TABLE kept AS SELECT 1 AS id").await.unwrap();
    }
    let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    assert!(db.relation_exists("kept").await.unwrap());
}

#[tokio::test]
async fn test_query_count() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .await
        .unwrap();

    let count = db.query_count("SELECT * FROM nums").await.unwrap();
    assert_eq!(count, 10);
}

#[tokio::test]
async fn test_query_rows_as_strings() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = db
        .query("SELECT 1 AS id, 'berlin' AS city, NULL AS missing UNION ALL SELECT 2, 'paris', NULL ORDER BY id")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["id", "city", "missing"]);
    assert_eq!(
        result.rows,
        vec![
            vec!["1".to_string(), "berlin".to_string(), "null".to_string()],
            vec!["2".to_string(), "paris".to_string(), "null".to_string()],
        ]
    );
}

#[tokio::test]
async fn test_missing_table_is_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.query("SELECT * FROM nowhere").await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[tokio::test]
async fn test_relation_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(!db.relation_exists("nonexistent").await.unwrap());
}

#[tokio::test]
async fn test_drop_if_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE to_drop AS SELECT 1 AS id")
        .await
        .unwrap();
    assert!(db.relation_exists("to_drop").await.unwrap());

    db.drop_if_exists("to_drop").await.unwrap();
    assert!(!db.relation_exists("to_drop").await.unwrap());
}

#[tokio::test]
async fn test_create_schema_if_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_schema_if_not_exists("staging").await.unwrap();
    db.execute(r#"CREATE TABLE "staging"."t" AS SELECT 1 AS id"#)
        .await
        .unwrap();
    assert!(db.relation_exists("staging.t").await.unwrap());

    db.create_schema_if_not_exists("staging").await.unwrap();
}

#[tokio::test]
async fn test_prepare_schema_applies_settings() {
    let db = DuckDbBackend::in_memory().unwrap();
    let settings = SchemaConfig {
        name: SchemaName::try_new("marts").unwrap(),
        connection: BTreeMap::from([("threads".to_string(), "2".to_string())]),
        substitutions: BTreeMap::new(),
        extensions: Vec::new(),
    };
    db.prepare_schema(&settings).unwrap();

    db.execute(r#"CREATE TABLE "marts"."m" AS SELECT 1 AS id"#)
        .await
        .unwrap();
    assert!(db.relation_exists("marts.m").await.unwrap());

    let threads = db
        .query("SELECT current_setting('threads') AS threads")
        .await
        .unwrap();
    assert_eq!(threads.rows, vec![vec!["2".to_string()]]);
}
