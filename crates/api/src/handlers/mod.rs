pub mod admin;
pub mod book;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use bookshelf_core::error::CoreError;
use bookshelf_core::form::format_price;
use bookshelf_core::types::DbId;
use bookshelf_db::models::book::Book;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Display format for `created_at` / `updated_at`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// The `{id}` path segment of a book route.
///
/// An id that is not an integer names no book, so it is reported as not
/// found rather than as a bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookId(pub DbId);

impl<S: Send + Sync> FromRequestParts<S> for BookId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = Path::<String>::from_request_parts(parts, state).await.ok();
        raw.and_then(|Path(raw)| raw.parse::<DbId>().ok())
            .map(BookId)
            .ok_or_else(|| AppError::PageNotFound(parts.uri.path().to_string()))
    }
}

/// Fetch a book or fail with a not-found error.
pub async fn get_book_or_404(state: &AppState, id: DbId) -> AppResult<Book> {
    state
        .books
        .find_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))
}

pub fn detail_url(id: DbId) -> String {
    format!("/books/{id}")
}

/// A book prepared for display: formatted values and its page links.
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub price: String,
    pub publication_date: String,
    pub isbn: String,
    pub created_at: String,
    pub updated_at: String,
    pub detail_url: String,
    pub edit_url: String,
    pub delete_url: String,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        let detail_url = detail_url(book.id);
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            price: format_price(book.price_cents),
            publication_date: book.publication_date.format("%Y-%m-%d").to_string(),
            isbn: book.isbn.clone(),
            created_at: book.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: book.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            edit_url: format!("{detail_url}/edit"),
            delete_url: format!("{detail_url}/delete"),
            detail_url,
        }
    }
}
