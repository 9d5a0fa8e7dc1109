//! List filters, sort order, and the paged response envelope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction for list queries and table views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter parameters for a list query.
///
/// `status` and `search` are applied conjunctively: a record matches when the
/// status filter is absent or equals the record's status, AND the search text
/// is absent or matches one of the record's searchable fields
/// (case-insensitive substring). `page` is 1-based.
///
/// `sort_by`/`sort_order` request backend-side ordering before paging; field
/// names follow the entity's column naming (e.g. `totalValue`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListFilter {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListFilter {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Effective 1-based page number.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(Self::DEFAULT_PAGE).max(1)
    }

    /// Effective page size.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).max(1)
    }

    /// Canonical form used for cache-key derivation.
    ///
    /// Search text is trimmed and lowercased (matching is case-insensitive,
    /// so `"Acme"` and `"acme "` are the same query); empty search and the
    /// `"all"` status sentinel collapse to `None`; page/limit collapse to
    /// their effective values. Two filters that produce identical results
    /// normalize to the same value.
    pub fn normalized(&self) -> Self {
        let search = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase);
        Self {
            status,
            search,
            page: Some(self.page()),
            limit: Some(self.limit()),
            sort_by: self.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            sort_order: self.sort_order,
        }
    }

    /// Deterministic string form of the normalized filter, used as the
    /// list-entry cache key payload.
    pub fn fingerprint(&self) -> String {
        let n = self.normalized();
        format!(
            "status={};search={};page={};limit={};sort={}:{}",
            n.status.as_deref().unwrap_or("all"),
            n.search.as_deref().unwrap_or(""),
            n.page(),
            n.limit(),
            n.sort_by.as_deref().unwrap_or(""),
            n.sort_order.map(SortOrder::as_str).unwrap_or(""),
        )
    }

    /// Query-string pairs for the HTTP backend.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder", order.as_str().to_string()));
        }
        pairs
    }
}

/// Paged list response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> Page<T> {
    /// Slices an already-filtered record set into one page.
    ///
    /// `page` is 1-based; a page past the end yields an empty record list
    /// with the envelope counts intact.
    pub fn paginate(matching: Vec<T>, page: u32, limit: u32) -> Self {
        let total = matching.len();
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit as usize) as u32;
        let start = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let records: Vec<T> = matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();
        Self {
            records,
            total,
            page,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1 && total > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_collapses_equivalent_filters() {
        let a = ListFilter {
            search: Some("  Acme ".to_string()),
            status: Some("ALL".to_string()),
            ..Default::default()
        };
        let b = ListFilter {
            search: Some("acme".to_string()),
            ..Default::default()
        };
        assert_eq!(a.normalized(), b.normalized());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_pages() {
        let a = ListFilter {
            page: Some(1),
            ..Default::default()
        };
        let b = ListFilter {
            page: Some(2),
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_paginate_bounds() {
        let page = Page::paginate((0..25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(page.records, (20..25).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next_page);
        assert!(page.has_previous_page);

        // Out-of-range page yields an empty slice, never an error
        let past_end = Page::paginate((0..25).collect::<Vec<_>>(), 9, 10);
        assert!(past_end.records.is_empty());
        assert_eq!(past_end.total, 25);
    }

    #[test]
    fn test_paginate_empty_set() {
        let page = Page::paginate(Vec::<i32>::new(), 1, 10);
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next_page);
        assert!(!page.has_previous_page);
    }
}
