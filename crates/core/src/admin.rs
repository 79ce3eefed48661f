//! Admin change-list configuration and query rules for books.
//!
//! Declares which columns the change list shows, which fields it filters and
//! searches on, and its default ordering. The storage layer turns a
//! [`ChangelistQuery`] into SQL; the in-memory store evaluates the same
//! rules with the helpers here.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Declarative configuration
// ---------------------------------------------------------------------------

/// Columns shown in the change list, in display order.
pub const LIST_DISPLAY: &[&str] = &["title", "author", "price", "publication_date", "created_at"];

/// Fields offered as sidebar filters.
pub const LIST_FILTER: &[&str] = &["author", "publication_date", "created_at"];

/// Fields matched by the search box.
pub const SEARCH_FIELDS: &[&str] = &["title", "author", "isbn"];

/// Default ordering (newest first).
pub const DEFAULT_ORDERING: &str = "-created_at";

/// Default number of rows per change-list page.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Upper bound for a configured page size.
pub const MAX_PAGE_SIZE: i64 = 500;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// A column the change list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Author,
    Price,
    PublicationDate,
    CreatedAt,
}

impl SortField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            "price" => Some(Self::Price),
            "publication_date" => Some(Self::PublicationDate),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Price => "price",
            Self::PublicationDate => "publication_date",
            Self::CreatedAt => "created_at",
        }
    }

    /// Database column backing this field.
    pub fn column(self) -> &'static str {
        match self {
            Self::Price => "price_cents",
            other => other.name(),
        }
    }
}

/// Ordering for the change list: a column and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    /// Parse an `o=` value such as `title` or `-price`.
    ///
    /// Unknown or missing values fall back to [`DEFAULT_ORDERING`].
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(Self::try_parse).unwrap_or_default()
    }

    fn try_parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        SortField::from_name(name).map(|field| Self { field, descending })
    }

    /// Serialize back to the `o=` form.
    pub fn as_param(self) -> String {
        if self.descending {
            format!("-{}", self.field.name())
        } else {
            self.field.name().to_string()
        }
    }

    /// The key a column header should link to: flips direction when the
    /// column is already the active sort, otherwise sorts ascending.
    pub fn toggled_for(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                descending: !self.descending,
            }
        } else {
            Self {
                field,
                descending: false,
            }
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Date filters
// ---------------------------------------------------------------------------

/// Sidebar choices for a date or timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    Any,
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl DateFilter {
    /// All choices in sidebar order.
    pub const ALL: [DateFilter; 5] = [
        DateFilter::Any,
        DateFilter::Today,
        DateFilter::PastSevenDays,
        DateFilter::ThisMonth,
        DateFilter::ThisYear,
    ];

    /// Parse a query value. Unknown values mean [`DateFilter::Any`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("today") => Self::Today,
            Some("past_7_days") => Self::PastSevenDays,
            Some("this_month") => Self::ThisMonth,
            Some("this_year") => Self::ThisYear,
            _ => Self::Any,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Today => "today",
            Self::PastSevenDays => "past_7_days",
            Self::ThisMonth => "this_month",
            Self::ThisYear => "this_year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "Any date",
            Self::Today => "Today",
            Self::PastSevenDays => "Past 7 days",
            Self::ThisMonth => "This month",
            Self::ThisYear => "This year",
        }
    }

    /// Half-open `[start, end)` date range relative to `today`, or `None`
    /// for [`DateFilter::Any`].
    pub fn bounds(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let tomorrow = today + Duration::days(1);
        match self {
            Self::Any => None,
            Self::Today => Some((today, tomorrow)),
            Self::PastSevenDays => Some((today - Duration::days(7), tomorrow)),
            Self::ThisMonth => {
                let start = today.with_day(1)?;
                let end = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some((start, end))
            }
            Self::ThisYear => Some((
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
            )),
        }
    }

    /// Same as [`DateFilter::bounds`], widened to UTC midnights for
    /// timestamp columns.
    pub fn timestamp_bounds(self, today: NaiveDate) -> Option<(Timestamp, Timestamp)> {
        self.bounds(today).map(|(start, end)| {
            (
                start.and_time(NaiveTime::MIN).and_utc(),
                end.and_time(NaiveTime::MIN).and_utc(),
            )
        })
    }

    /// Whether `date` falls inside this filter's range.
    pub fn contains_date(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.bounds(today) {
            None => true,
            Some((start, end)) => start <= date && date < end,
        }
    }

    /// Whether `ts` falls inside this filter's range.
    pub fn contains_timestamp(self, ts: Timestamp, today: NaiveDate) -> bool {
        match self.timestamp_bounds(today) {
            None => true,
            Some((start, end)) => start <= ts && ts < end,
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Split a search box value into lower-cased terms.
pub fn search_terms(q: &str) -> Vec<String> {
    q.split_whitespace().map(str::to_lowercase).collect()
}

/// Every term must appear (case-insensitively) in at least one of `fields`.
pub fn matches_search(terms: &[String], fields: &[&str]) -> bool {
    let haystacks: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
    terms
        .iter()
        .all(|term| haystacks.iter().any(|h| h.contains(term.as_str())))
}

/// Escape `%`, `_` and `\` so a term can be embedded in an `ILIKE` pattern.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Clamp a configured page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(size: Option<i64>) -> i64 {
    size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Clamp a 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Number of pages needed for `total` rows (at least one).
pub fn page_count(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + page_size - 1) / page_size
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Fully resolved change-list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelistQuery {
    /// Lower-cased search terms; empty means no search.
    pub terms: Vec<String>,
    /// Exact author filter.
    pub author: Option<String>,
    pub publication_date: DateFilter,
    pub created_at: DateFilter,
    pub sort: SortKey,
    /// Current UTC date, the anchor for date filters.
    pub today: NaiveDate,
    pub limit: i64,
    pub offset: i64,
}

impl ChangelistQuery {
    /// Whether a row with the given values passes search and filters.
    pub fn matches(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        publication_date: NaiveDate,
        created_at: Timestamp,
    ) -> bool {
        matches_search(&self.terms, &[title, author, isbn])
            && self.author.as_deref().map_or(true, |a| a == author)
            && self.publication_date.contains_date(publication_date, self.today)
            && self.created_at.contains_timestamp(created_at, self.today)
    }
}

/// One page of change-list rows plus the counts shown in the header.
#[derive(Debug, Clone, Serialize)]
pub struct ChangelistPage<T> {
    pub rows: Vec<T>,
    /// Rows matching search and filters.
    pub result_count: i64,
    /// Rows in the table.
    pub total_count: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
