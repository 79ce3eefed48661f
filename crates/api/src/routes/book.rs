//! Route definitions for the book pages.

use axum::routing::get;
use axum::Router;

use crate::handlers::book;
use crate::state::AppState;

/// Book catalog pages.
///
/// ```text
/// GET    /                      -> index (redirect to /books)
/// GET    /books                 -> list
/// GET    /books/new             -> new_form
/// POST   /books/new             -> create
/// GET    /books/{id}            -> detail
/// GET    /books/{id}/edit       -> edit_form
/// POST   /books/{id}/edit       -> update
/// GET    /books/{id}/delete     -> delete_confirm
/// POST   /books/{id}/delete     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(book::index))
        .route("/books", get(book::list))
        .route("/books/new", get(book::new_form).post(book::create))
        .route("/books/{id}", get(book::detail))
        .route("/books/{id}/edit", get(book::edit_form).post(book::update))
        .route(
            "/books/{id}/delete",
            get(book::delete_confirm).post(book::delete),
        )
}
