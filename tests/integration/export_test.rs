//! Export integration tests.
//!
//! Exports real query results into a temporary directory.

use db_tabula::config::ExportConfig;
use db_tabula::error::TabulaError;
use db_tabula::export::Exporter;
use db_tabula::query::QueryExecutor;
use pretty_assertions::assert_eq;

use super::seeded_client;

fn exporter(dir: &tempfile::TempDir) -> Exporter {
    Exporter::new(&ExportConfig {
        directory: Some(dir.path().to_path_buf()),
    })
}

#[tokio::test]
async fn test_csv_export_of_query_result() {
    let client = seeded_client().await;
    let result = QueryExecutor::new(&client)
        .execute("SELECT id, name, email FROM users ORDER BY id")
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("users");
    let summary = exporter(&dir)
        .export_csv(&result, target.to_str().unwrap())
        .unwrap();

    assert_eq!(summary.path, dir.path().join("users.csv"));
    assert_eq!(summary.rows, 3);

    let content = std::fs::read_to_string(&summary.path).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            "id,name,email",
            "1,Alice,alice@example.com",
            "2,Bob,",
            "3,Carol,carol@example.com",
        ]
    );
}

#[tokio::test]
async fn test_csv_export_quotes_special_characters() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);
    executor
        .execute("UPDATE users SET name = 'Smith, \"Jr\"' WHERE id = 1")
        .await;
    let result = executor
        .execute("SELECT name FROM users WHERE id = 1")
        .await;

    let dir = tempfile::tempdir().unwrap();
    let summary = exporter(&dir).export_csv(&result, "").unwrap();

    let mut reader = csv::Reader::from_path(&summary.path).unwrap();
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[0], "Smith, \"Jr\"");

    let raw = std::fs::read_to_string(&summary.path).unwrap();
    assert!(raw.contains("\"Smith, \"\"Jr\"\"\""), "{raw}");
}

#[tokio::test]
async fn test_text_export_of_query_result() {
    let client = seeded_client().await;
    let result = QueryExecutor::new(&client)
        .execute("SELECT id, age FROM users ORDER BY id")
        .await;

    let dir = tempfile::tempdir().unwrap();
    let summary = exporter(&dir).export_text(&result, "").unwrap();
    assert_eq!(summary.path.extension().and_then(|e| e.to_str()), Some("txt"));

    let content = std::fs::read_to_string(&summary.path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "Database Export");
    assert_eq!(lines[2], "Total Rows: 3");
    assert_eq!(
        lines[4..].to_vec(),
        vec![
            "+------+------+",
            "| id   | age  |",
            "+------+------+",
            "| 1    | 30   |",
            "| 2    | 25   |",
            "| 3    | NULL |",
            "+------+------+",
        ]
    );
}

#[tokio::test]
async fn test_failed_query_is_not_exported() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(&dir);

    let failed = executor.execute("SELECT * FROM nowhere").await;
    let mutation = executor.execute("DELETE FROM users WHERE id = 3").await;

    assert!(matches!(
        exporter.export_csv(&failed, ""),
        Err(TabulaError::Export(_))
    ));
    assert!(matches!(
        exporter.export_text(&mutation, ""),
        Err(TabulaError::Export(_))
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_duplicate_column_labels_survive_export() {
    let client = seeded_client().await;
    let result = QueryExecutor::new(&client)
        .execute("SELECT 1 AS x, 2 AS x")
        .await;
    assert_eq!(result.columns(), &["x", "x"]);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("dupes.csv");
    exporter(&dir)
        .export_csv(&result, target.to_str().unwrap())
        .unwrap();

    let mut reader = csv::Reader::from_path(&target).unwrap();
    assert_eq!(reader.headers().unwrap(), vec!["x", "x"]);
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(record.iter().collect::<Vec<_>>(), vec!["1", "2"]);
}
