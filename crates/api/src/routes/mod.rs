pub mod admin;
pub mod book;
pub mod health;

use axum::http::Uri;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Build the page route tree.
///
/// Route hierarchy:
///
/// ```text
/// /                        redirect to /books
/// /books                   list
/// /books/new               create form
/// /books/{id}              detail
/// /books/{id}/edit         edit form
/// /books/{id}/delete       delete confirmation
/// /admin/books             admin change list
/// /health                  JSON health check
/// ```
///
/// Unmatched paths render the 404 page.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(book::router())
        .merge(admin::router())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::PageNotFound(uri.path().to_string())
}
