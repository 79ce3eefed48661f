//! Handlers for the `/books` pages.
//!
//! Each handler fetches the book (or fails with 404), optionally cleans a
//! submitted [`BookForm`], then renders a page or redirects with a flash
//! message.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Redirect, Response};
use axum::Form;
use bookshelf_core::error::CoreError;
use bookshelf_core::form::{
    BookForm, FieldErrors, FIELD_AUTHOR, FIELD_ISBN, FIELD_PRICE, FIELD_PUBLICATION_DATE,
    FIELD_TITLE, MSG_DUPLICATE_ISBN,
};
use bookshelf_db::models::book::Book;
use bookshelf_db::store::StoreError;
use serde::Serialize;

use super::{detail_url, get_book_or_404, BookId, BookView};
use crate::error::{AppError, AppResult};
use crate::flash::{redirect_with_flash, IncomingFlash};
use crate::state::AppState;
use crate::templates::{BOOK_CONFIRM_DELETE, BOOK_DETAIL, BOOK_FORM, BOOK_LIST};

const LIST_URL: &str = "/books";
const NEW_TITLE: &str = "Add New Book";

// ---------------------------------------------------------------------------
// Page data
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ListPage {
    books: Vec<BookView>,
}

#[derive(Serialize)]
struct BookPage {
    book: BookView,
}

#[derive(Serialize)]
struct FormPage {
    form: FormView,
}

#[derive(Serialize)]
struct FormView {
    action: String,
    submit_label: &'static str,
    cancel_url: String,
    has_errors: bool,
    fields: Vec<FieldView>,
}

#[derive(Serialize)]
struct FieldView {
    name: &'static str,
    label: &'static str,
    input_type: &'static str,
    value: String,
    errors: Vec<String>,
    max_length: Option<usize>,
    help: Option<&'static str>,
}

/// Which book the form page creates or edits.
enum FormTarget<'a> {
    New,
    Edit(&'a Book),
}

impl FormTarget<'_> {
    fn page_title(&self) -> String {
        match self {
            FormTarget::New => NEW_TITLE.to_string(),
            FormTarget::Edit(book) => format!("Edit {}", book.title),
        }
    }

    fn action(&self) -> String {
        match self {
            FormTarget::New => "/books/new".to_string(),
            FormTarget::Edit(book) => format!("{}/edit", detail_url(book.id)),
        }
    }

    fn cancel_url(&self) -> String {
        match self {
            FormTarget::New => LIST_URL.to_string(),
            FormTarget::Edit(book) => detail_url(book.id),
        }
    }
}

fn form_view(target: &FormTarget<'_>, form: &BookForm, errors: &FieldErrors) -> FormView {
    let field = |name: &'static str,
                 label: &'static str,
                 value: &str,
                 max_length: Option<usize>,
                 help: Option<&'static str>| FieldView {
        name,
        label,
        input_type: "text",
        value: value.to_string(),
        errors: errors.get(name).map(<[String]>::to_vec).unwrap_or_default(),
        max_length,
        help,
    };

    FormView {
        action: target.action(),
        submit_label: match target {
            FormTarget::New => "Create",
            FormTarget::Edit(_) => "Save",
        },
        cancel_url: target.cancel_url(),
        has_errors: !errors.is_empty(),
        fields: vec![
            field(FIELD_TITLE, "Title", &form.title, Some(200), None),
            field(FIELD_AUTHOR, "Author", &form.author, Some(100), None),
            field(FIELD_PRICE, "Price", &form.price, None, Some("e.g. 12.99")),
            field(
                FIELD_PUBLICATION_DATE,
                "Publication date",
                &form.publication_date,
                None,
                Some("YYYY-MM-DD"),
            ),
            field(FIELD_ISBN, "ISBN", &form.isbn, None, Some("ISBN-10 or ISBN-13")),
        ],
    }
}

fn render_form(
    state: &AppState,
    target: FormTarget<'_>,
    form: &BookForm,
    errors: &FieldErrors,
    flash: &IncomingFlash,
) -> AppResult<Response> {
    let page = FormPage {
        form: form_view(&target, form, errors),
    };
    state
        .templates
        .page(BOOK_FORM, &target.page_title(), flash, &page)
}

fn duplicate_isbn() -> FieldErrors {
    FieldErrors::single(FIELD_ISBN, MSG_DUPLICATE_ISBN)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /
pub async fn index() -> Redirect {
    Redirect::to(LIST_URL)
}

/// GET /books
pub async fn list(State(state): State<AppState>, flash: IncomingFlash) -> AppResult<Response> {
    let books = state.books.list().await?;
    let page = ListPage {
        books: books.iter().map(BookView::from).collect(),
    };
    state.templates.page(BOOK_LIST, "Books", &flash, &page)
}

/// GET /books/{id}
pub async fn detail(
    State(state): State<AppState>,
    flash: IncomingFlash,
    BookId(id): BookId,
) -> AppResult<Response> {
    let book = get_book_or_404(&state, id).await?;
    let page = BookPage {
        book: BookView::from(&book),
    };
    state.templates.page(BOOK_DETAIL, &book.title, &flash, &page)
}

/// GET /books/new
pub async fn new_form(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    render_form(
        &state,
        FormTarget::New,
        &BookForm::default(),
        &FieldErrors::new(),
        &flash,
    )
}

/// POST /books/new
pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<BookForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form?;
    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Rejected new book form");
            return render_form(
                &state,
                FormTarget::New,
                &form,
                &errors,
                &IncomingFlash::default(),
            );
        }
    };

    match state.books.create(&draft).await {
        Ok(book) => {
            tracing::info!(book_id = book.id, isbn = %book.isbn, "Book created");
            Ok(redirect_with_flash(
                &detail_url(book.id),
                &format!("Book \"{}\" was created successfully!", book.title),
            ))
        }
        Err(StoreError::DuplicateIsbn(_)) => render_form(
            &state,
            FormTarget::New,
            &form,
            &duplicate_isbn(),
            &IncomingFlash::default(),
        ),
        Err(err) => Err(err.into()),
    }
}

/// GET /books/{id}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    flash: IncomingFlash,
    BookId(id): BookId,
) -> AppResult<Response> {
    let book = get_book_or_404(&state, id).await?;
    render_form(
        &state,
        FormTarget::Edit(&book),
        &book.to_form(),
        &FieldErrors::new(),
        &flash,
    )
}

/// POST /books/{id}/edit
pub async fn update(
    State(state): State<AppState>,
    BookId(id): BookId,
    form: Result<Form<BookForm>, FormRejection>,
) -> AppResult<Response> {
    let book = get_book_or_404(&state, id).await?;
    let Form(form) = form?;

    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(book_id = id, fields = errors.len(), "Rejected book edit form");
            return render_form(
                &state,
                FormTarget::Edit(&book),
                &form,
                &errors,
                &IncomingFlash::default(),
            );
        }
    };

    match state.books.update(id, &draft).await {
        Ok(Some(updated)) => {
            tracing::info!(book_id = id, "Book updated");
            Ok(redirect_with_flash(
                &detail_url(id),
                &format!("Book \"{}\" was updated successfully!", updated.title),
            ))
        }
        Ok(None) => Err(AppError::Core(CoreError::NotFound { entity: "Book", id })),
        Err(StoreError::DuplicateIsbn(_)) => render_form(
            &state,
            FormTarget::Edit(&book),
            &form,
            &duplicate_isbn(),
            &IncomingFlash::default(),
        ),
        Err(err) => Err(err.into()),
    }
}

/// GET /books/{id}/delete
pub async fn delete_confirm(
    State(state): State<AppState>,
    flash: IncomingFlash,
    BookId(id): BookId,
) -> AppResult<Response> {
    let book = get_book_or_404(&state, id).await?;
    let page = BookPage {
        book: BookView::from(&book),
    };
    state
        .templates
        .page(BOOK_CONFIRM_DELETE, "Delete book", &flash, &page)
}

/// POST /books/{id}/delete
pub async fn delete(State(state): State<AppState>, BookId(id): BookId) -> AppResult<Response> {
    let book = get_book_or_404(&state, id).await?;
    if !state.books.delete(id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Book", id }));
    }
    tracing::info!(book_id = id, "Book deleted");
    Ok(redirect_with_flash(
        LIST_URL,
        &format!("Book \"{}\" was deleted successfully!", book.title),
    ))
}
