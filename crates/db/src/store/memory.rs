use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use bookshelf_core::admin::{ChangelistPage, ChangelistQuery, SortField, SortKey};
use bookshelf_core::form::BookDraft;
use bookshelf_core::types::DbId;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{BookStore, StoreError, StoreResult};
use crate::models::book::Book;

/// In-memory [`BookStore`] with the same ordering, filtering and ISBN
/// uniqueness rules as the Postgres store.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    books: BTreeMap<DbId, Book>,
    last_id: DbId,
}

impl MemoryState {
    fn isbn_taken(&self, isbn: &str, except: Option<DbId>) -> bool {
        self.books
            .values()
            .any(|b| b.isbn == isbn && Some(b.id) != except)
    }
}

impl MemoryBookStore {
    /// Creates a new empty memory book store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `books`. Ids keep counting from
    /// the largest one given.
    pub fn with_books(books: Vec<Book>) -> Self {
        let last_id = books.iter().map(|b| b.id).max().unwrap_or(0);
        Self {
            state: RwLock::new(MemoryState {
                books: books.into_iter().map(|b| (b.id, b)).collect(),
                last_id,
            }),
        }
    }
}

/// Compare two books on `key`, breaking ties on id in the same direction.
fn compare_books(a: &Book, b: &Book, key: SortKey) -> Ordering {
    let by_field = match key.field {
        SortField::Title => a.title.cmp(&b.title),
        SortField::Author => a.author.cmp(&b.author),
        SortField::Price => a.price_cents.cmp(&b.price_cents),
        SortField::PublicationDate => a.publication_date.cmp(&b.publication_date),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    let ordering = by_field.then(a.id.cmp(&b.id));
    if key.descending {
        ordering.reverse()
    } else {
        ordering
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, draft: &BookDraft) -> StoreResult<Book> {
        let mut state = self.state.write().await;
        if state.isbn_taken(&draft.isbn, None) {
            return Err(StoreError::DuplicateIsbn(draft.isbn.clone()));
        }

        state.last_id += 1;
        let now = Utc::now();
        let book = Book {
            id: state.last_id,
            title: draft.title.clone(),
            author: draft.author.clone(),
            price_cents: draft.price_cents,
            publication_date: draft.publication_date,
            isbn: draft.isbn.clone(),
            created_at: now,
            updated_at: now,
        };
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Book>> {
        Ok(self.state.read().await.books.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        let state = self.state.read().await;
        let mut books: Vec<Book> = state.books.values().cloned().collect();
        books.sort_by(|a, b| compare_books(a, b, SortKey::default()));
        Ok(books)
    }

    async fn update(&self, id: DbId, draft: &BookDraft) -> StoreResult<Option<Book>> {
        let mut state = self.state.write().await;
        if !state.books.contains_key(&id) {
            return Ok(None);
        }
        if state.isbn_taken(&draft.isbn, Some(id)) {
            return Err(StoreError::DuplicateIsbn(draft.isbn.clone()));
        }

        let Some(book) = state.books.get_mut(&id) else {
            return Ok(None);
        };
        book.title = draft.title.clone();
        book.author = draft.author.clone();
        book.price_cents = draft.price_cents;
        book.publication_date = draft.publication_date;
        book.isbn = draft.isbn.clone();
        book.updated_at = Utc::now();
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.state.write().await.books.remove(&id).is_some())
    }

    async fn changelist(&self, query: &ChangelistQuery) -> StoreResult<ChangelistPage<Book>> {
        let state = self.state.read().await;
        let mut matching: Vec<&Book> = state
            .books
            .values()
            .filter(|b| {
                query.matches(
                    &b.title,
                    &b.author,
                    &b.isbn,
                    b.publication_date,
                    b.created_at,
                )
            })
            .collect();
        matching.sort_by(|a, b| compare_books(a, b, query.sort));

        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        let rows = matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(|b| (*b).clone())
            .collect();

        Ok(ChangelistPage {
            rows,
            result_count: matching.len() as i64,
            total_count: state.books.len() as i64,
        })
    }

    async fn distinct_authors(&self) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        let authors: BTreeSet<&str> = state.books.values().map(|b| b.author.as_str()).collect();
        Ok(authors.into_iter().map(str::to_string).collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn book(id: DbId, title: &str, created_offset_secs: i64) -> Book {
        let created_at = Utc::now() - Duration::seconds(created_offset_secs);
        Book {
            id,
            title: title.to_string(),
            author: "Author".to_string(),
            price_cents: 100 * id,
            publication_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            isbn: format!("isbn-{id}"),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn compare_breaks_ties_on_id() {
        let mut a = book(1, "Same", 0);
        let b = Book {
            id: 2,
            ..a.clone()
        };
        a.created_at = b.created_at;
        assert_eq!(
            compare_books(&a, &b, SortKey::default()),
            Ordering::Greater
        );
        let ascending = SortKey::parse(Some("created_at"));
        assert_eq!(compare_books(&a, &b, ascending), Ordering::Less);
    }

    #[tokio::test]
    async fn with_books_continues_id_sequence() {
        let store = MemoryBookStore::with_books(vec![book(7, "Seeded", 60)]);
        let draft = BookDraft {
            title: "Next".to_string(),
            author: "Author".to_string(),
            price_cents: 0,
            publication_date: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            isbn: "9780306406157".to_string(),
        };
        let created = store.create(&draft).await.unwrap();
        assert_eq!(created.id, 8);
    }

    #[tokio::test]
    async fn list_orders_by_created_at_descending() {
        let store = MemoryBookStore::with_books(vec![
            book(1, "Oldest", 300),
            book(2, "Newest", 10),
            book(3, "Middle", 100),
        ]);
        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
    }
}
