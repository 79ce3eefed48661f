//! The book store seam used by request handlers.
//!
//! Handlers depend on [`BookStore`] rather than on a pool so the server can
//! run against Postgres or, without a `DATABASE_URL`, entirely in memory.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_core::admin::{ChangelistPage, ChangelistQuery};
use bookshelf_core::form::BookDraft;
use bookshelf_core::types::DbId;

use crate::models::book::Book;

pub mod memory;
pub mod postgres;

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;

/// Name of the unique constraint on `books.isbn`.
pub const ISBN_UNIQUE_CONSTRAINT: &str = "uq_books_isbn";

/// Errors raised by a [`BookStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another book already uses this ISBN.
    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for books.
#[async_trait]
pub trait BookStore: Debug + Send + Sync {
    /// Insert a book, assigning its id and timestamps.
    async fn create(&self, draft: &BookDraft) -> StoreResult<Book>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Book>>;

    /// Every book, newest first.
    async fn list(&self) -> StoreResult<Vec<Book>>;

    /// Replace a book's editable fields. `None` when the id is unknown.
    async fn update(&self, id: DbId, draft: &BookDraft) -> StoreResult<Option<Book>>;

    /// Remove a book. `false` when the id is unknown.
    async fn delete(&self, id: DbId) -> StoreResult<bool>;

    /// One page of the admin change list.
    async fn changelist(&self, query: &ChangelistQuery) -> StoreResult<ChangelistPage<Book>>;

    /// Distinct author names, alphabetically.
    async fn distinct_authors(&self) -> StoreResult<Vec<String>>;

    /// Whether the backing storage is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Thread-safe shared reference to a book store.
pub type BookStoreArc = Arc<dyn BookStore>;
