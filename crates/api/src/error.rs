use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use bookshelf_core::error::CoreError;
use bookshelf_db::store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures. Implements [`IntoResponse`] to produce HTML error pages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bookshelf_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A book store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No route or resource matches the request path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// The submitted body could not be read as a form.
    #[error(transparent)]
    FormRejected(#[from] FormRejection),

    /// A template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status code and the message safe to show to the visitor.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                format!("No {entity} found with id {id}."),
            ),
            AppError::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                format!("The page {path} does not exist."),
            ),
            // Form handlers re-render with a field error instead.
            AppError::Store(StoreError::DuplicateIsbn(isbn)) => (
                StatusCode::CONFLICT,
                format!("A book with ISBN {isbn} already exists."),
            ),
            AppError::FormRejected(rejection) => {
                tracing::debug!(error = %rejection, "Rejected form submission");
                (rejection.status(), rejection.body_text())
            }
            AppError::Store(StoreError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                internal()
            }
            AppError::Template(err) => {
                tracing::error!(error = %err, "Template render error");
                internal()
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "An internal error occurred.".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Html(error_page(status, &message))).into_response()
    }
}

/// Minimal standalone error document. It does not go through the template
/// registry so it still renders when rendering itself is what failed.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<p>{message}</p>\n\
         <p><a href=\"/books\">Back to the book list</a></p>\n</body>\n</html>\n",
        title = handlebars::html_escape(&title),
        message = handlebars::html_escape(message),
    )
}
