//! Handler for the admin change list at `/admin/books`.

use axum::extract::{Query, State};
use axum::response::Response;
use bookshelf_core::admin::{page_count, DateFilter, SortField, LIST_DISPLAY};
use chrono::Utc;
use serde::Serialize;

use super::BookView;
use crate::error::AppResult;
use crate::flash::IncomingFlash;
use crate::query::ChangelistParams;
use crate::state::AppState;
use crate::templates::ADMIN_BOOK_CHANGELIST;

#[derive(Serialize)]
struct ChangelistPageView {
    search: String,
    hidden: Vec<HiddenField>,
    result_summary: String,
    filtered: bool,
    clear_url: String,
    columns: Vec<ColumnView>,
    rows: Vec<BookView>,
    filters: Vec<FilterView>,
    pagination: PaginationView,
}

#[derive(Serialize)]
struct HiddenField {
    name: &'static str,
    value: String,
}

#[derive(Serialize)]
struct ColumnView {
    label: &'static str,
    url: String,
    sorted: bool,
    descending: bool,
}

#[derive(Serialize)]
struct FilterView {
    title: &'static str,
    choices: Vec<ChoiceView>,
}

#[derive(Serialize)]
struct ChoiceView {
    label: String,
    url: String,
    selected: bool,
}

#[derive(Serialize)]
struct PaginationView {
    multiple: bool,
    pages: Vec<PageLink>,
}

#[derive(Serialize)]
struct PageLink {
    number: i64,
    url: String,
    current: bool,
}

fn column_label(field: SortField) -> &'static str {
    match field {
        SortField::Title => "Title",
        SortField::Author => "Author",
        SortField::Price => "Price",
        SortField::PublicationDate => "Publication date",
        SortField::CreatedAt => "Created at",
    }
}

fn columns(params: &ChangelistParams) -> Vec<ColumnView> {
    let sort = params.sort();
    LIST_DISPLAY
        .iter()
        .filter_map(|name| SortField::from_name(name))
        .map(|field| ColumnView {
            label: column_label(field),
            url: params.with_sort(sort.toggled_for(field)).url(),
            sorted: sort.field == field,
            descending: sort.field == field && sort.descending,
        })
        .collect()
}

fn date_filter(
    title: &'static str,
    active: DateFilter,
    link: impl Fn(DateFilter) -> ChangelistParams,
) -> FilterView {
    FilterView {
        title,
        choices: DateFilter::ALL
            .iter()
            .map(|&choice| ChoiceView {
                label: choice.label().to_string(),
                url: link(choice).url(),
                selected: choice == active,
            })
            .collect(),
    }
}

fn filters(params: &ChangelistParams, authors: &[String]) -> Vec<FilterView> {
    let active_author = params.normalized().author;

    let mut author_choices = vec![ChoiceView {
        label: "All".to_string(),
        url: params.with_author(None).url(),
        selected: active_author.is_none(),
    }];
    author_choices.extend(authors.iter().map(|author| ChoiceView {
        label: author.clone(),
        url: params.with_author(Some(author)).url(),
        selected: active_author.as_deref() == Some(author.as_str()),
    }));

    vec![
        FilterView {
            title: "author",
            choices: author_choices,
        },
        date_filter(
            "publication date",
            params.publication_date_filter(),
            |f| params.with_publication_date(f),
        ),
        date_filter("created at", params.created_at_filter(), |f| {
            params.with_created_at(f)
        }),
    ]
}

fn pagination(params: &ChangelistParams, page: i64, pages: i64) -> PaginationView {
    PaginationView {
        multiple: pages > 1,
        pages: (1..=pages)
            .map(|number| PageLink {
                number,
                url: params.with_page(number).url(),
                current: number == page,
            })
            .collect(),
    }
}

fn result_summary(result_count: i64, total_count: i64) -> String {
    let noun = if result_count == 1 { "result" } else { "results" };
    format!("{result_count} {noun} ({total_count} total)")
}

/// GET /admin/books
pub async fn changelist(
    State(state): State<AppState>,
    flash: IncomingFlash,
    Query(params): Query<ChangelistParams>,
) -> AppResult<Response> {
    let today = Utc::now().date_naive();
    let page_size = state.config.admin_page_size;

    let mut page = params.page();
    let mut result = state
        .books
        .changelist(&params.to_query(today, page, page_size))
        .await?;

    // Past the end: show the last page instead.
    let pages = page_count(result.result_count, page_size);
    if page > pages {
        page = pages;
        result = state
            .books
            .changelist(&params.to_query(today, page, page_size))
            .await?;
    }

    let authors = state.books.distinct_authors().await?;

    tracing::debug!(
        page,
        result_count = result.result_count,
        total_count = result.total_count,
        "Rendered change list"
    );

    let view = ChangelistPageView {
        search: params.normalized().q.unwrap_or_default(),
        hidden: params
            .hidden_fields()
            .into_iter()
            .map(|(name, value)| HiddenField { name, value })
            .collect(),
        result_summary: result_summary(result.result_count, result.total_count),
        filtered: params.is_filtered(),
        clear_url: params.cleared().url(),
        columns: columns(&params),
        rows: result.rows.iter().map(BookView::from).collect(),
        filters: filters(&params, &authors),
        pagination: pagination(&params, page, pages),
    };

    state
        .templates
        .page(ADMIN_BOOK_CHANGELIST, "Select book to change", &flash, &view)
}
