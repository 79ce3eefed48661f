use async_trait::async_trait;
use bookshelf_core::admin::{ChangelistPage, ChangelistQuery};
use bookshelf_core::form::BookDraft;
use bookshelf_core::types::DbId;

use super::{BookStore, StoreError, StoreResult, ISBN_UNIQUE_CONSTRAINT};
use crate::models::book::Book;
use crate::repositories::BookRepo;
use crate::DbPool;

/// [`BookStore`] backed by the `books` table.
#[derive(Debug, Clone)]
pub struct PgBookStore {
    pool: DbPool,
}

impl PgBookStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Turn a unique violation on the ISBN constraint into
/// [`StoreError::DuplicateIsbn`]; pass everything else through.
fn classify_write_error(err: sqlx::Error, isbn: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL unique constraint violation: error code 23505
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some(ISBN_UNIQUE_CONSTRAINT)
        {
            tracing::debug!(isbn, "Rejected duplicate ISBN");
            return StoreError::DuplicateIsbn(isbn.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, draft: &BookDraft) -> StoreResult<Book> {
        BookRepo::create(&self.pool, draft)
            .await
            .map_err(|e| classify_write_error(e, &draft.isbn))
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Book>> {
        Ok(BookRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        Ok(BookRepo::list(&self.pool).await?)
    }

    async fn update(&self, id: DbId, draft: &BookDraft) -> StoreResult<Option<Book>> {
        BookRepo::update(&self.pool, id, draft)
            .await
            .map_err(|e| classify_write_error(e, &draft.isbn))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        Ok(BookRepo::delete(&self.pool, id).await?)
    }

    async fn changelist(&self, query: &ChangelistQuery) -> StoreResult<ChangelistPage<Book>> {
        Ok(BookRepo::changelist(&self.pool, query).await?)
    }

    async fn distinct_authors(&self) -> StoreResult<Vec<String>> {
        Ok(BookRepo::distinct_authors(&self.pool).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
