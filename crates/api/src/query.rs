//! Query parameters for the admin change list.
//!
//! Every value is kept as a raw string so that a malformed `p=` or an
//! unknown `o=` falls back to a default instead of rejecting the request.

use bookshelf_core::admin::{clamp_page, search_terms, ChangelistQuery, DateFilter, SortKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Path of the change-list page.
pub const CHANGELIST_PATH: &str = "/admin/books";

/// `?q=&author=&publication_date=&created_at=&o=&p=`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelistParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
}

impl ChangelistParams {
    /// Canonical form: blank values dropped, defaults omitted.
    pub fn normalized(&self) -> Self {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let date = |v: &Option<String>| match DateFilter::parse(v.as_deref()) {
            DateFilter::Any => None,
            other => Some(other.as_param().to_string()),
        };
        let sort = SortKey::parse(self.o.as_deref());
        let page = self.page();

        Self {
            q: non_blank(&self.q),
            author: non_blank(&self.author),
            publication_date: date(&self.publication_date),
            created_at: date(&self.created_at),
            o: (sort != SortKey::default()).then(|| sort.as_param()),
            p: (page > 1).then(|| page.to_string()),
        }
    }

    /// 1-based page number; anything unparsable is page 1.
    pub fn page(&self) -> i64 {
        clamp_page(self.p.as_deref().and_then(|p| p.trim().parse().ok()))
    }

    pub fn sort(&self) -> SortKey {
        SortKey::parse(self.o.as_deref())
    }

    pub fn publication_date_filter(&self) -> DateFilter {
        DateFilter::parse(self.publication_date.as_deref())
    }

    pub fn created_at_filter(&self) -> DateFilter {
        DateFilter::parse(self.created_at.as_deref())
    }

    /// Resolve into a store query for `page`.
    pub fn to_query(&self, today: NaiveDate, page: i64, page_size: i64) -> ChangelistQuery {
        let params = self.normalized();
        ChangelistQuery {
            terms: search_terms(params.q.as_deref().unwrap_or_default()),
            author: params.author,
            publication_date: self.publication_date_filter(),
            created_at: self.created_at_filter(),
            sort: self.sort(),
            today,
            limit: page_size,
            offset: (page.max(1) - 1).saturating_mul(page_size),
        }
    }

    /// Link to the change list with these parameters.
    pub fn url(&self) -> String {
        let query = serde_urlencoded::to_string(self.normalized()).unwrap_or_default();
        if query.is_empty() {
            CHANGELIST_PATH.to_string()
        } else {
            format!("{CHANGELIST_PATH}?{query}")
        }
    }

    /// Same filters, different ordering, back on the first page.
    pub fn with_sort(&self, sort: SortKey) -> Self {
        Self {
            o: Some(sort.as_param()),
            p: None,
            ..self.clone()
        }
    }

    pub fn with_author(&self, author: Option<&str>) -> Self {
        Self {
            author: author.map(str::to_string),
            p: None,
            ..self.clone()
        }
    }

    pub fn with_publication_date(&self, filter: DateFilter) -> Self {
        Self {
            publication_date: Some(filter.as_param().to_string()),
            p: None,
            ..self.clone()
        }
    }

    pub fn with_created_at(&self, filter: DateFilter) -> Self {
        Self {
            created_at: Some(filter.as_param().to_string()),
            p: None,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: i64) -> Self {
        Self {
            p: Some(page.to_string()),
            ..self.clone()
        }
    }

    /// Keeps only the ordering; used by the "clear all" link.
    pub fn cleared(&self) -> Self {
        Self {
            o: self.o.clone(),
            ..Self::default()
        }
    }

    /// Whether any search or filter narrows the rows.
    pub fn is_filtered(&self) -> bool {
        let params = self.normalized();
        params.q.is_some()
            || params.author.is_some()
            || params.publication_date.is_some()
            || params.created_at.is_some()
    }

    /// Parameters the search box must resubmit as hidden inputs.
    pub fn hidden_fields(&self) -> Vec<(&'static str, String)> {
        let params = self.normalized();
        [
            ("author", params.author),
            ("publication_date", params.publication_date),
            ("created_at", params.created_at),
            ("o", params.o),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}
