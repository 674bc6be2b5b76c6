//! Integration tests for Tabula.
//!
//! Each test opens its own in-memory SQLite database, so tests never share
//! state.

pub mod export_test;
pub mod paging_test;
pub mod query_test;

use db_tabula::db::{DatabaseClient, SqliteClient};

/// Opens an in-memory database with a small `users` table.
pub async fn seeded_client() -> SqliteClient {
    let client = SqliteClient::connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");

    client
        .execute(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                age INTEGER
            )",
        )
        .await
        .expect("create users");

    client
        .execute(
            "INSERT INTO users (id, name, email, age) VALUES
                (1, 'Alice', 'alice@example.com', 30),
                (2, 'Bob', NULL, 25),
                (3, 'Carol', 'carol@example.com', NULL)",
        )
        .await
        .expect("insert users");

    client
}

/// Opens an in-memory database with a `numbers` table holding 1..=n.
pub async fn numbers_client(n: i64) -> SqliteClient {
    let client = SqliteClient::connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");

    client
        .execute("CREATE TABLE numbers (n INTEGER NOT NULL, label TEXT)")
        .await
        .expect("create numbers");

    for i in 1..=n {
        client
            .execute(&format!("INSERT INTO numbers (n, label) VALUES ({i}, 'row {i}')"))
            .await
            .expect("insert number");
    }

    client
}
