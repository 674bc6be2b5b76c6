//! Paging integration tests.
//!
//! Fetches once, then pages and renders the fetched rows.

use db_tabula::config::DisplayConfig;
use db_tabula::db::Value;
use db_tabula::paging::{PageCommand, Paginator};
use db_tabula::query::QueryExecutor;
use db_tabula::render::TableRenderer;

use super::numbers_client;

fn first_column(values: &db_tabula::query::TabularResult) -> Vec<i64> {
    values
        .data()
        .unwrap()
        .rows()
        .map(|row| match &row[0] {
            Value::Int(n) => *n,
            other => panic!("Expected Int, got {:?}", other),
        })
        .collect()
}

#[tokio::test]
async fn test_page_through_query_result() {
    let client = numbers_client(23).await;
    let result = QueryExecutor::new(&client)
        .execute("SELECT n, label FROM numbers ORDER BY n")
        .await;
    assert_eq!(result.row_count(), 23);

    let paginator = Paginator::default();
    let mut page = paginator.paginate(&result, 1, 10);
    let mut seen = first_column(&page.result);
    let mut sizes = vec![page.result.row_count()];

    while let Some(next) = page.target(PageCommand::Next).filter(|p| *p != page.page) {
        page = paginator.paginate(&result, next as i64, 10);
        seen.extend(first_column(&page.result));
        sizes.push(page.result.row_count());
    }

    assert_eq!(sizes, vec![10, 10, 3]);
    assert_eq!(seen, (1..=23).collect::<Vec<_>>());
    assert_eq!(page.result.message(), "Page 3 of 3 (rows 21-23 of 23)");
    assert_eq!(page.result.execution_time(), result.execution_time());
}

#[tokio::test]
async fn test_rendered_page_only_contains_its_rows() {
    let client = numbers_client(12).await;
    let result = QueryExecutor::new(&client)
        .execute("SELECT n, label FROM numbers ORDER BY n")
        .await;

    let paginator = Paginator::from_config(&DisplayConfig { page_size: 5 });
    let page = paginator.paginate(&result, 2, 0);
    let text = TableRenderer::new(&page.result).render();

    assert!(text.contains("| 6    | row 6  |"), "{text}");
    assert!(text.contains("| 10   | row 10 |"), "{text}");
    assert!(!text.contains("row 11"));
    assert!(text.ends_with("5 row(s) returned\nPage 2 of 3 (rows 6-10 of 12)"));
    assert_eq!(
        page.navigation_hint().as_deref(),
        Some("[P]revious page  [N]ext page  [Q]uit paging")
    );
}

#[tokio::test]
async fn test_mutation_and_failure_pass_through() {
    let client = numbers_client(3).await;
    let executor = QueryExecutor::new(&client);
    let paginator = Paginator::default();

    let update = executor.execute("UPDATE numbers SET label = NULL").await;
    let page = paginator.paginate(&update, 4, 2);
    assert_eq!(page.result, update);
    assert_eq!((page.page, page.total_pages), (1, 1));

    let failed = executor.execute("SELECT nope FROM numbers").await;
    assert_eq!(paginator.paginate(&failed, 1, 2).result, failed);
}
