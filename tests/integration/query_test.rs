//! Query execution integration tests.
//!
//! Runs the executor, renderer and metadata inspector against SQLite.

use db_tabula::db::{DatabaseClient, Value};
use db_tabula::query::{
    MetadataInspector, QueryExecutor, EMPTY_STATEMENT_MESSAGE, MULTIPLE_STATEMENTS_MESSAGE,
    NO_CONNECTION_MESSAGE,
};
use db_tabula::render::TableRenderer;
use pretty_assertions::assert_eq;

use super::seeded_client;

#[tokio::test]
async fn test_select_returns_rows_and_columns() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let result = executor
        .execute("SELECT id, name, age FROM users ORDER BY id")
        .await;

    assert!(result.is_success());
    assert!(result.is_tabular());
    assert_eq!(result.row_count(), 3);
    assert_eq!(result.columns(), &["id", "name", "age"]);
    assert!(result.message().starts_with("3 row(s) in "), "{}", result.message());

    let rows = result.data().unwrap();
    assert_eq!(rows.row(0).unwrap()[1], Value::from("Alice"));
    assert_eq!(rows.row(2).unwrap()[2], Value::Null);
}

#[tokio::test]
async fn test_with_and_lowercase_keywords_are_row_producing() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let result = executor
        .execute("with adults as (select name from users where age >= 18) select count(*) as n from adults")
        .await;

    assert!(result.is_tabular());
    assert_eq!(result.data().unwrap().row(0).unwrap()[0], Value::Int(2));
}

#[tokio::test]
async fn test_empty_select_keeps_columns() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let result = executor.execute("SELECT * FROM users WHERE id = 99").await;

    assert!(result.is_success());
    assert!(result.is_tabular());
    assert_eq!(result.row_count(), 0);
    assert_eq!(result.columns().len(), 4);

    let text = TableRenderer::new(&result).render();
    assert!(text.starts_with("No data found.\n0 row(s) in "), "{text}");
}

#[tokio::test]
async fn test_mutation_reports_affected_rows() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let result = executor
        .execute("UPDATE users SET age = 40 WHERE age IS NOT NULL")
        .await;

    assert!(result.is_success());
    assert!(!result.is_tabular());
    assert_eq!(result.row_count(), 2);
    assert!(result.message().starts_with("Update completed in "));
    assert!(result.columns().is_empty());
}

#[tokio::test]
async fn test_driver_error_becomes_failed_result() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let result = executor.execute("SELECT * FROM missing_table").await;

    assert!(!result.is_success());
    assert!(!result.is_tabular());
    assert_eq!(result.row_count(), 0);
    assert!(result.message().starts_with("SQL error: "), "{}", result.message());
    assert!(result.message().contains("missing_table"));
    assert!(result.message().contains("(took "));

    let text = TableRenderer::new(&result).render();
    assert!(text.starts_with("Error: SQL error: "));
}

#[tokio::test]
async fn test_blank_statement_is_rejected() {
    let client = seeded_client().await;
    let result = QueryExecutor::new(&client).execute("   ").await;

    assert!(!result.is_success());
    assert_eq!(result.message(), EMPTY_STATEMENT_MESSAGE);

    let validated = QueryExecutor::new(&client).validate("").await;
    assert!(!validated.is_success());
    assert_eq!(validated.message(), EMPTY_STATEMENT_MESSAGE);
}

#[tokio::test]
async fn test_single_statement_paths_reject_several_statements() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let mixed = executor
        .execute("SELECT 1 AS a; SELECT 1 AS x, 2 AS y")
        .await;
    assert!(!mixed.is_success());
    assert_eq!(mixed.message(), MULTIPLE_STATEMENTS_MESSAGE);

    let select_then_delete = executor
        .execute("SELECT COUNT(*) FROM users; DELETE FROM users")
        .await;
    assert!(!select_then_delete.is_success());
    assert_eq!(select_then_delete.message(), MULTIPLE_STATEMENTS_MESSAGE);

    let count = executor.execute("SELECT COUNT(*) FROM users").await;
    assert_eq!(count.data().unwrap().row(0).unwrap()[0], Value::Int(3));

    let trailing = executor.execute("SELECT name FROM users WHERE id = 1;").await;
    assert!(trailing.is_success());
    assert_eq!(trailing.row_count(), 1);
}

#[tokio::test]
async fn test_batch_skips_empty_fragments_and_continues_after_failure() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let results = executor.execute_multiple("BAD SQL;;SELECT 1;").await;

    assert_eq!(results.len(), 2);
    assert!(!results[0].is_success());
    assert!(results[0].message().starts_with("SQL error: "));
    assert!(results[1].is_success());
    assert!(results[1].is_tabular());
    assert_eq!(results[1].row_count(), 1);
}

#[tokio::test]
async fn test_batch_runs_in_order() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let results = executor
        .execute_multiple(
            "INSERT INTO users (id, name) VALUES (4, 'Dan');
             DELETE FROM users WHERE id = 1;
             SELECT COUNT(*) AS total FROM users",
        )
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].row_count(), 1);
    assert_eq!(results[1].row_count(), 1);
    assert_eq!(results[2].data().unwrap().row(0).unwrap()[0], Value::Int(3));
}

#[tokio::test]
async fn test_prepared_select_and_insert() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let result = executor
        .execute_prepared(
            "SELECT name FROM users WHERE age > ? ORDER BY id",
            &[Value::Int(26)],
        )
        .await;
    assert!(result.is_tabular());
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.data().unwrap().row(0).unwrap()[0], Value::from("Alice"));

    let insert = executor
        .execute_prepared(
            "INSERT INTO users (id, name, email, age) VALUES (?, ?, ?, ?)",
            &[
                Value::Int(4),
                Value::from("Dan"),
                Value::Null,
                Value::Int(52),
            ],
        )
        .await;
    assert!(insert.is_success());
    assert!(!insert.is_tabular());
    assert_eq!(insert.row_count(), 1);

    let check = executor
        .execute_prepared("SELECT email FROM users WHERE id = ?", &[Value::Int(4)])
        .await;
    assert_eq!(check.data().unwrap().row(0).unwrap()[0], Value::Null);
}

#[tokio::test]
async fn test_prepared_error_is_reported() {
    let client = seeded_client().await;
    let result = QueryExecutor::new(&client)
        .execute_prepared("SELECT * FROM nowhere WHERE id = ?", &[Value::Int(1)])
        .await;

    assert!(!result.is_success());
    assert!(result.message().starts_with("SQL error: "));
}

#[tokio::test]
async fn test_null_renders_as_null_text() {
    let client = seeded_client().await;
    let result = QueryExecutor::new(&client)
        .execute("SELECT id, name, email FROM users WHERE id = 2")
        .await;

    let text = TableRenderer::new(&result).render();
    let (table, message) = text.rsplit_once('\n').unwrap();
    assert_eq!(
        table,
        "\
+------+------+-------+
| id   | name | email |
+------+------+-------+
| 2    | Bob  | NULL  |
+------+------+-------+
1 row(s) returned"
    );
    assert!(message.starts_with("1 row(s) in "));
}

#[tokio::test]
async fn test_validate() {
    let client = seeded_client().await;
    let executor = QueryExecutor::new(&client);

    let ok = executor.validate("SELECT * FROM users").await;
    assert!(ok.is_success());
    assert_eq!(ok.message(), "SQL syntax is valid");

    let bad = executor.validate("SELEC * FROM users").await;
    assert!(!bad.is_success());
    assert!(bad.message().starts_with("SQL syntax error: "));

    // Validation must not run the statement.
    let before = executor.execute("SELECT COUNT(*) FROM users").await;
    let _ = executor.validate("DELETE FROM users").await;
    let after = executor.execute("SELECT COUNT(*) FROM users").await;
    assert_eq!(before.data(), after.data());
}

#[tokio::test]
async fn test_list_tables() {
    let client = seeded_client().await;
    client
        .execute("CREATE TABLE orders (id INTEGER PRIMARY KEY)")
        .await
        .unwrap();

    let result = QueryExecutor::new(&client).list_tables().await;

    assert!(result.is_tabular());
    assert!(result.message().starts_with("Tables list: 2 table(s) in "));
    assert_eq!(result.columns(), &["TABLE_SCHEMA", "TABLE_NAME", "TABLE_TYPE"]);
    let names: Vec<Value> = result
        .data()
        .unwrap()
        .rows()
        .map(|row| row[1].clone())
        .collect();
    assert_eq!(names, vec![Value::from("orders"), Value::from("users")]);
}

#[tokio::test]
async fn test_closed_connection_counts_as_absent() {
    let client = seeded_client().await;
    client.close().await.unwrap();
    let executor = QueryExecutor::new(&client);

    for result in [
        executor.execute("SELECT 1").await,
        executor.execute_prepared("SELECT ?", &[Value::Int(1)]).await,
        executor.validate("SELECT 1").await,
        executor.list_tables().await,
    ] {
        assert!(!result.is_success());
        assert_eq!(result.message(), NO_CONNECTION_MESSAGE);
    }

    let batch = executor.execute_multiple("SELECT 1; SELECT 2").await;
    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|r| r.message() == NO_CONNECTION_MESSAGE));
}

#[tokio::test]
async fn test_metadata_inspection() {
    let client = seeded_client().await;
    let inspector = MetadataInspector::new(&client);

    let columns = inspector.describe_table("users").await;
    assert!(columns.is_tabular());
    assert_eq!(columns.message(), "Columns in users");
    assert_eq!(columns.row_count(), 4);
    assert_eq!(columns.data().unwrap().row(1).unwrap()[0], Value::from("name"));
    assert_eq!(columns.data().unwrap().row(1).unwrap()[2], Value::from("NO"));

    let info = inspector.database_info().await;
    assert!(info.is_tabular());
    assert_eq!(info.row_count(), 1);
    assert_eq!(info.columns()[0], "Database Product");
    assert_eq!(info.data().unwrap().row(0).unwrap()[0], Value::from("SQLite"));
}
