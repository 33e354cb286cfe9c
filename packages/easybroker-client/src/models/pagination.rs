//! Pagination metadata and the paginated response wrapper.

use serde::Deserialize;

/// The `next_page` field has been observed as a bare page number on older
/// API versions and as a full URL on newer ones. Both are accepted; see
/// [`NextPage::number`] for normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NextPage {
    Number(u32),
    Url(String),
}

impl NextPage {
    /// Extract the page number, parsing the query string of URL-shaped
    /// values. Exact query-key matching, so parameters like `subpage` can
    /// never false-match.
    pub fn number(&self) -> Option<u32> {
        match self {
            NextPage::Number(n) => Some(*n),
            NextPage::Url(raw) => {
                let parsed = url::Url::parse(raw).ok()?;
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "page")
                    .and_then(|(_, value)| value.parse().ok())
            }
        }
    }
}

/// Pagination metadata from a list-endpoint envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next_page: Option<NextPage>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            total: 0,
            next_page: None,
        }
    }
}

impl Pagination {
    /// Whether more pages are available.
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }

    /// The next page number, when one can be determined.
    pub fn next_page_number(&self) -> Option<u32> {
        self.next_page.as_ref().and_then(NextPage::number)
    }

    /// Total number of pages, rounding up. Zero when total or limit is zero.
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 || self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as u64)
    }

    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }

    pub fn is_last_page(&self) -> bool {
        !self.has_next()
    }
}

/// One page of typed items plus its pagination metadata.
///
/// Immutable once constructed; `items.len()` never exceeds
/// `pagination.limit` for well-formed upstream responses.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResponse<T> {
    items: Vec<T>,
    pagination: Pagination,
    total: u64,
}

impl<T> PaginatedResponse<T> {
    /// A top-level envelope `total`, when present, overrides the one inside
    /// the pagination object.
    pub fn new(items: Vec<T>, pagination: Pagination, total: Option<u64>) -> Self {
        let total = total.unwrap_or(pagination.total);
        Self {
            items,
            pagination,
            total,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Decompose into the plain record parts.
    pub fn into_parts(self) -> (Vec<T>, Pagination, u64) {
        (self.items, self.pagination, self.total)
    }
}

impl<T> IntoIterator for PaginatedResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PaginatedResponse<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
