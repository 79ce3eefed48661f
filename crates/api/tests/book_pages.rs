//! Integration tests for the `/books` pages.

mod common;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use bookshelf_db::store::BookStore;
use common::*;

// ---------------------------------------------------------------------------
// Test: GET / redirects to the list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_redirects_to_book_list() {
    let app = build_test_app(test_store());
    let response = get(app, "/").await;
    assert_redirect(&response, "/books");
}

// ---------------------------------------------------------------------------
// Test: create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_form_renders_empty_form() {
    let app = build_test_app(test_store());
    let response = get(app, "/books/new").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1>Add New Book</h1>"));
    assert!(body.contains("name=\"isbn\""));
    assert!(!body.contains("errorlist"));
}

#[tokio::test]
async fn create_valid_book_persists_and_redirects_to_detail() {
    let store = test_store();
    let app = build_test_app(store.clone());

    let response = post_form(
        app,
        "/books/new",
        &book_fields("Dune", "Frank Herbert", "978-0-441-01359-3"),
    )
    .await;

    assert_redirect(&response, "/books/1");

    let books = store.list().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(books[0].price_cents, 1299);
    assert_eq!(books[0].isbn, DUNE_ISBN);
}

#[tokio::test]
async fn create_invalid_book_rerenders_without_persisting() {
    let store = test_store();
    let app = build_test_app(store.clone());

    let response = post_form(
        app,
        "/books/new",
        &[
            ("title", ""),
            ("author", "Frank Herbert"),
            ("price", "twelve"),
            ("publication_date", "1965-08-01"),
            ("isbn", DUNE_ISBN),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("This field is required."));
    assert!(body.contains("Enter a number."));
    // Submitted values are echoed back.
    assert!(body.contains("value=\"Frank Herbert\""));
    assert!(body.contains("value=\"twelve\""));

    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_duplicate_isbn_reports_isbn_error() {
    let store = test_store();
    seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let app = build_test_app(store.clone());

    let response = post_form(
        app,
        "/books/new",
        &book_fields("Dune Messiah", "Frank Herbert", DUNE_ISBN),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Book with this Isbn already exists."));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn detail_shows_book() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let app = build_test_app(store);

    let response = get(app, &format!("/books/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1>Dune</h1>"));
    assert!(body.contains("Frank Herbert"));
    assert!(body.contains("9.50"));
    assert!(body.contains("2001-02-03"));
    assert!(body.contains(DUNE_ISBN));
}

#[tokio::test]
async fn missing_book_pages_return_404() {
    let store = test_store();
    for uri in ["/books/99", "/books/99/edit", "/books/99/delete"] {
        let response = get(build_test_app(store.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }

    for uri in ["/books/99/edit", "/books/99/delete"] {
        let response = post_form(
            build_test_app(store.clone()),
            uri,
            &book_fields("Dune", "Frank Herbert", DUNE_ISBN),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "POST {uri}");
    }
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let store = test_store();
    for uri in ["/books/abc", "/books/1.5/edit", "/books/x/delete"] {
        let response = get(build_test_app(store.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }
}

// ---------------------------------------------------------------------------
// Test: list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_orders_newest_first() {
    let store = test_store();
    seed_book(&store, "First Added", "A", DUNE_ISBN).await;
    seed_book(&store, "Second Added", "B", HOBBIT_ISBN).await;
    seed_book(&store, "Third Added", "C", GATSBY_ISBN).await;
    let app = build_test_app(store);

    let response = get(app, "/books").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    let first = body.find("First Added").unwrap();
    let second = body.find("Second Added").unwrap();
    let third = body.find("Third Added").unwrap();
    assert!(third < second && second < first);
}

#[tokio::test]
async fn empty_list_says_so() {
    let app = build_test_app(test_store());
    let body = body_text(get(app, "/books").await).await;
    assert!(body.contains("No books yet."));
}

// ---------------------------------------------------------------------------
// Test: update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn edit_form_is_prefilled() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let app = build_test_app(store);

    let response = get(app, &format!("/books/{id}/edit")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1>Edit Dune</h1>"));
    assert!(body.contains("value=\"9.50\""));
    assert!(body.contains("value=\"2001-02-03\""));
    assert!(body.contains(&format!("action=\"/books/{id}/edit\"")));
}

#[tokio::test]
async fn update_valid_book_saves_and_redirects() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let app = build_test_app(store.clone());

    let response = post_form(
        app,
        &format!("/books/{id}/edit"),
        &[
            ("title", "Dune (Deluxe Edition)"),
            ("author", "Frank Herbert"),
            ("price", "30"),
            ("publication_date", "08/01/1965"),
            ("isbn", DUNE_ISBN),
        ],
    )
    .await;

    assert_redirect(&response, &format!("/books/{id}"));
    let book = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(book.title, "Dune (Deluxe Edition)");
    assert_eq!(book.price_cents, 3000);
    assert_eq!(book.publication_date.to_string(), "1965-08-01");
}

#[tokio::test]
async fn update_invalid_book_leaves_row_unchanged() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let before = store.find_by_id(id).await.unwrap().unwrap();
    let app = build_test_app(store.clone());

    let response = post_form(
        app,
        &format!("/books/{id}/edit"),
        &[
            ("title", "Dune"),
            ("author", "Frank Herbert"),
            ("price", "-1"),
            ("publication_date", "not a date"),
            ("isbn", "12345"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1>Edit Dune</h1>"));
    assert!(body.contains("Enter a valid date."));
    assert!(body.contains("Enter a valid ISBN-10 or ISBN-13."));

    let after = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn update_to_taken_isbn_reports_isbn_error() {
    let store = test_store();
    seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let id = seed_book(&store, "The Hobbit", "J.R.R. Tolkien", HOBBIT_ISBN).await;
    let app = build_test_app(store.clone());

    let response = post_form(
        app,
        &format!("/books/{id}/edit"),
        &book_fields("The Hobbit", "J.R.R. Tolkien", DUNE_ISBN),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Book with this Isbn already exists."));
    let book = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(book.isbn, HOBBIT_ISBN);
}

#[tokio::test]
async fn update_keeping_own_isbn_is_allowed() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let app = build_test_app(store);

    let response = post_form(
        app,
        &format!("/books/{id}/edit"),
        &book_fields("Dune", "F. Herbert", DUNE_ISBN),
    )
    .await;

    assert_redirect(&response, &format!("/books/{id}"));
}

// ---------------------------------------------------------------------------
// Test: delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_confirmation_does_not_delete() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    let app = build_test_app(store.clone());

    let response = get(app, &format!("/books/{id}/delete")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Are you sure you want to delete"));
    assert!(body.contains(&format!("action=\"/books/{id}/delete\"")));
    assert!(store.find_by_id(id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_removes_book_and_redirects_to_list() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;
    seed_book(&store, "The Hobbit", "J.R.R. Tolkien", HOBBIT_ISBN).await;

    let response = post_form(
        build_test_app(store.clone()),
        &format!("/books/{id}/delete"),
        &[],
    )
    .await;
    assert_redirect(&response, "/books");
    assert!(store.find_by_id(id).await.unwrap().is_none());

    let body = body_text(get(build_test_app(store.clone()), "/books").await).await;
    assert!(!body.contains("Dune"));
    assert!(body.contains("The Hobbit"));

    let again = post_form(build_test_app(store), &format!("/books/{id}/delete"), &[]).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: flash messages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn flash_message_is_shown_once_after_create() {
    let store = test_store();

    let response = post_form(
        build_test_app(store.clone()),
        "/books/new",
        &book_fields("Dune", "Frank Herbert", DUNE_ISBN),
    )
    .await;
    assert_redirect(&response, "/books/1");
    let cookie = set_cookie_pair(&response).expect("flash cookie set on redirect");

    let shown = get_with_cookie(build_test_app(store.clone()), "/books/1", &cookie).await;
    assert_eq!(shown.status(), StatusCode::OK);
    let cleared = shown.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.starts_with("flash=;"));
    let body = body_text(shown).await;
    assert!(body.contains("Book &quot;Dune&quot; was created successfully!"));

    // The browser drops the cookie; the next page has no message.
    let next = get(build_test_app(store), "/books/1").await;
    assert!(!next.headers().contains_key(SET_COOKIE));
    assert!(!body_text(next).await.contains("class=\"flash\""));
}

#[tokio::test]
async fn flash_messages_for_update_and_delete() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;

    let updated = post_form(
        build_test_app(store.clone()),
        &format!("/books/{id}/edit"),
        &book_fields("Dune", "Frank Herbert", DUNE_ISBN),
    )
    .await;
    let cookie = set_cookie_pair(&updated).unwrap();
    let page = get_with_cookie(
        build_test_app(store.clone()),
        &format!("/books/{id}"),
        &cookie,
    )
    .await;
    let body = body_text(page).await;
    assert!(body.contains("Book &quot;Dune&quot; was updated successfully!"));

    let deleted = post_form(
        build_test_app(store.clone()),
        &format!("/books/{id}/delete"),
        &[],
    )
    .await;
    let cookie = set_cookie_pair(&deleted).unwrap();
    let body = body_text(get_with_cookie(build_test_app(store), "/books", &cookie).await).await;
    assert!(body.contains("Book &quot;Dune&quot; was deleted successfully!"));
}

// ---------------------------------------------------------------------------
// Test: unsupported methods
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsupported_methods_return_405() {
    let store = test_store();
    let id = seed_book(&store, "Dune", "Frank Herbert", DUNE_ISBN).await;

    let cases = [
        (Method::POST, "/books".to_string()),
        (Method::PUT, format!("/books/{id}")),
        (Method::DELETE, format!("/books/{id}/delete")),
        (Method::PATCH, format!("/books/{id}/edit")),
    ];
    for (method, uri) in cases {
        let request = Request::builder()
            .method(method.clone())
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let response = send(build_test_app(store.clone()), request).await;
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{method} {uri}"
        );
    }
}

// ---------------------------------------------------------------------------
// Test: unreadable form bodies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn form_without_content_type_gets_html_error_page() {
    let store = test_store();
    let request = Request::post("/books/new")
        .body(Body::from("title=Dune"))
        .unwrap();
    let response = send(build_test_app(store.clone()), request).await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    let body = body_text(response).await;
    assert!(body.contains("<title>415 Unsupported Media Type</title>"));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_of_missing_book_with_bad_body_is_not_found() {
    let request = Request::post("/books/999/edit")
        .body(Body::from("title=Dune"))
        .unwrap();
    let response = send(build_test_app(test_store()), request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
