//! Book entity model.

use bookshelf_core::form::BookForm;
use bookshelf_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub price_cents: i64,
    pub publication_date: NaiveDate,
    pub isbn: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Book {
    /// The edit form pre-filled with this book's current values.
    pub fn to_form(&self) -> BookForm {
        BookForm::from_values(
            &self.title,
            &self.author,
            self.price_cents,
            self.publication_date,
            &self.isbn,
        )
    }
}
