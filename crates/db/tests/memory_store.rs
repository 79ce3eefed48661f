//! Behaviour tests for `MemoryBookStore`, which must follow the same rules
//! as the Postgres store.

use assert_matches::assert_matches;
use bookshelf_core::admin::{search_terms, ChangelistQuery, DateFilter, SortKey};
use bookshelf_core::form::BookDraft;
use bookshelf_db::store::{BookStore, MemoryBookStore, StoreError};
use chrono::{NaiveDate, Utc};

fn draft(title: &str, author: &str, isbn: &str) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: author.to_string(),
        price_cents: 1500,
        publication_date: NaiveDate::from_ymd_opt(2010, 10, 10).unwrap(),
        isbn: isbn.to_string(),
    }
}

fn changelist_query() -> ChangelistQuery {
    ChangelistQuery {
        terms: Vec::new(),
        author: None,
        publication_date: DateFilter::Any,
        created_at: DateFilter::Any,
        sort: SortKey::default(),
        today: Utc::now().date_naive(),
        limit: 100,
        offset: 0,
    }
}

#[tokio::test]
async fn create_assigns_sequential_ids() {
    let store = MemoryBookStore::new();
    let a = store.create(&draft("A", "X", "9780306406157")).await.unwrap();
    let b = store.create(&draft("B", "X", "9780141439518")).await.unwrap();
    assert_eq!(a.id, 1);
    assert_eq!(b.id, 2);
    assert_eq!(store.find_by_id(2).await.unwrap(), Some(b));
}

#[tokio::test]
async fn list_is_newest_first() {
    let store = MemoryBookStore::new();
    for (title, isbn) in [
        ("First", "9780306406157"),
        ("Second", "9780141439518"),
        ("Third", "9780743273565"),
    ] {
        store.create(&draft(title, "X", isbn)).await.unwrap();
    }
    let titles: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn duplicate_isbn_rejected_on_create_and_update() {
    let store = MemoryBookStore::new();
    store.create(&draft("A", "X", "9780306406157")).await.unwrap();
    let b = store.create(&draft("B", "X", "9780141439518")).await.unwrap();

    let err = store
        .create(&draft("C", "X", "9780306406157"))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::DuplicateIsbn(_));

    let err = store
        .update(b.id, &draft("B", "X", "9780306406157"))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::DuplicateIsbn(_));

    // Keeping its own ISBN is fine.
    let kept = store
        .update(b.id, &draft("B2", "X", "9780141439518"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.title, "B2");
}

#[tokio::test]
async fn update_and_delete_missing_ids() {
    let store = MemoryBookStore::new();
    assert!(store
        .update(42, &draft("A", "X", "9780306406157"))
        .await
        .unwrap()
        .is_none());
    assert!(!store.delete(42).await.unwrap());
}

#[tokio::test]
async fn delete_removes_from_list() {
    let store = MemoryBookStore::new();
    let a = store.create(&draft("A", "X", "9780306406157")).await.unwrap();
    assert!(store.delete(a.id).await.unwrap());
    assert!(store.list().await.unwrap().is_empty());
    assert!(store.find_by_id(a.id).await.unwrap().is_none());
}

#[tokio::test]
async fn changelist_search_filter_sort_and_paginate() {
    let store = MemoryBookStore::new();
    store
        .create(&draft("Dune", "Frank Herbert", "9780306406157"))
        .await
        .unwrap();
    store
        .create(&draft("Dune Messiah", "Frank Herbert", "9780141439518"))
        .await
        .unwrap();
    let mut emma = draft("Emma", "Jane Austen", "9780743273565");
    emma.publication_date = NaiveDate::from_ymd_opt(1815, 12, 23).unwrap();
    emma.price_cents = 100;
    store.create(&emma).await.unwrap();

    let mut query = changelist_query();
    query.terms = search_terms("DUNE herbert");
    query.sort = SortKey::parse(Some("-title"));
    let page = store.changelist(&query).await.unwrap();
    assert_eq!(page.result_count, 2);
    assert_eq!(page.total_count, 3);
    assert_eq!(page.rows[0].title, "Dune Messiah");

    let mut query = changelist_query();
    query.author = Some("Jane Austen".to_string());
    assert_eq!(store.changelist(&query).await.unwrap().result_count, 1);

    let mut query = changelist_query();
    query.sort = SortKey::parse(Some("price"));
    query.limit = 2;
    query.offset = 1;
    let page = store.changelist(&query).await.unwrap();
    assert_eq!(page.result_count, 3);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0].title, "Dune");

    let mut query = changelist_query();
    query.publication_date = DateFilter::ThisYear;
    assert_eq!(store.changelist(&query).await.unwrap().result_count, 0);

    let mut query = changelist_query();
    query.created_at = DateFilter::Today;
    assert_eq!(store.changelist(&query).await.unwrap().result_count, 3);

    assert_eq!(
        store.distinct_authors().await.unwrap(),
        vec!["Frank Herbert", "Jane Austen"]
    );
}

#[tokio::test]
async fn health_and_backend() {
    let store = MemoryBookStore::new();
    store.health_check().await.unwrap();
    assert_eq!(store.backend(), "memory");
}
