#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bookshelf_api::config::ServerConfig;
use bookshelf_api::router::build_app_router;
use bookshelf_api::state::AppState;
use bookshelf_db::store::{BookStore, BookStoreArc, MemoryBookStore};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// A fresh in-memory store, shared between the app and the test body.
pub fn test_store() -> Arc<MemoryBookStore> {
    Arc::new(MemoryBookStore::new())
}

/// Build the full application router over `store`, with the same
/// middleware stack production uses.
pub fn build_test_app(store: Arc<MemoryBookStore>) -> Router {
    build_test_app_with_config(store, test_config())
}

pub fn build_test_app_with_config(store: Arc<MemoryBookStore>, config: ServerConfig) -> Router {
    let books: BookStoreArc = store;
    let state = AppState::new(books, config.clone()).unwrap();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

/// GET with a `Cookie` header, as a browser following a redirect would.
pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::get(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST an `application/x-www-form-urlencoded` body.
pub async fn post_form(app: Router, uri: &str, pairs: &[(&str, &str)]) -> Response {
    let body = serde_urlencoded::to_string(pairs).unwrap();
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Undo the template engine's attribute escaping so links can be compared
/// as plain URLs.
pub fn html_unescape(html: &str) -> String {
    html.replace("&#x3D;", "=")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn location(response: &Response) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

/// The `name=value` pair of the first `Set-Cookie` header, ready to send
/// back in a `Cookie` header.
pub fn set_cookie_pair(response: &Response) -> Option<String> {
    let value = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(str::to_string)
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const DUNE_ISBN: &str = "9780441013593";
pub const HOBBIT_ISBN: &str = "9780261103344";
pub const GATSBY_ISBN: &str = "9780743273565";

/// Form fields for a valid book.
pub fn book_fields<'a>(title: &'a str, author: &'a str, isbn: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("title", title),
        ("author", author),
        ("price", "12.99"),
        ("publication_date", "1965-08-01"),
        ("isbn", isbn),
    ]
}

/// Create a book through the store directly and return its id.
pub async fn seed_book(store: &MemoryBookStore, title: &str, author: &str, isbn: &str) -> i64 {
    use bookshelf_core::form::BookForm;

    let form = BookForm {
        title: title.to_string(),
        author: author.to_string(),
        price: "9.50".to_string(),
        publication_date: "2001-02-03".to_string(),
        isbn: isbn.to_string(),
    };
    let draft = form.clean().unwrap();
    store.create(&draft).await.unwrap().id
}
