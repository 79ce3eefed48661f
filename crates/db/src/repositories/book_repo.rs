//! Repository for the `books` table.

use bookshelf_core::admin::{like_pattern, ChangelistPage, ChangelistQuery};
use bookshelf_core::form::BookDraft;
use bookshelf_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::book::Book;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, author, price_cents, publication_date, isbn, created_at, updated_at";

/// Provides CRUD operations for books.
pub struct BookRepo;

impl BookRepo {
    /// Insert a new book, returning the created row.
    pub async fn create(pool: &PgPool, input: &BookDraft) -> Result<Book, sqlx::Error> {
        let query = format!(
            "INSERT INTO books (title, author, price_cents, publication_date, isbn)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(&input.author)
            .bind(input.price_cents)
            .bind(input.publication_date)
            .bind(&input.isbn)
            .fetch_one(pool)
            .await
    }

    /// Find a book by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all books ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Book>(&query).fetch_all(pool).await
    }

    /// Replace every editable field of a book.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &BookDraft,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books SET
                title = $2,
                author = $3,
                price_cents = $4,
                publication_date = $5,
                isbn = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.author)
            .bind(input.price_cents)
            .bind(input.publication_date)
            .bind(&input.isbn)
            .fetch_optional(pool)
            .await
    }

    /// Delete a book by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of rows in the table.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await
    }

    /// Every distinct author, alphabetically. Feeds the change-list filter.
    pub async fn distinct_authors(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT author FROM books ORDER BY author")
            .fetch_all(pool)
            .await
    }

    /// One searched, filtered and sorted page of the admin change list.
    pub async fn changelist(
        pool: &PgPool,
        query: &ChangelistQuery,
    ) -> Result<ChangelistPage<Book>, sqlx::Error> {
        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        push_filters(&mut count_builder, query);
        let result_count: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await?;

        let total_count = Self::count(pool).await?;

        let direction = if query.sort.descending { "DESC" } else { "ASC" };
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM books"));
        push_filters(&mut builder, query);
        builder
            .push(format!(
                " ORDER BY {} {direction}, id {direction}",
                query.sort.field.column()
            ))
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let rows = builder.build_query_as::<Book>().fetch_all(pool).await?;

        Ok(ChangelistPage {
            rows,
            result_count,
            total_count,
        })
    }
}

/// Append the `WHERE` clause for search terms and sidebar filters.
///
/// Each search term must match at least one searchable column; all terms
/// and filters are combined with `AND`.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ChangelistQuery) {
    let mut separator = " WHERE ";

    for term in &query.terms {
        builder.push(separator);
        separator = " AND ";
        let pattern = like_pattern(term);
        builder
            .push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR author ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR isbn ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(author) = &query.author {
        builder.push(separator);
        separator = " AND ";
        builder.push("author = ").push_bind(author.clone());
    }

    if let Some((start, end)) = query.publication_date.bounds(query.today) {
        builder.push(separator);
        separator = " AND ";
        builder
            .push("publication_date >= ")
            .push_bind(start)
            .push(" AND publication_date < ")
            .push_bind(end);
    }

    if let Some((start, end)) = query.created_at.timestamp_bounds(query.today) {
        builder.push(separator);
        builder
            .push("created_at >= ")
            .push_bind(start)
            .push(" AND created_at < ")
            .push_bind(end);
    }
}
