//! List-query builder for collection fetches.

/// Query parameters for a collection list request.
///
/// `page`, `limit`, and `search` are first-class; any additional filter
/// pairs (e.g. `status`, `categoryId`) are forwarded to the server
/// verbatim, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    filters: Vec<(String, String)>,
}

impl ListQuery {
    /// Create an empty query (no paging, no filters).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific page (1-based).
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Limit the number of items per page.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Free-text search term.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Add a caller-defined filter pair, forwarded verbatim.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Render the query as URL parameter pairs.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(3 + self.filters.len());
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(ref search) = self.search {
            params.push(("search".to_string(), search.clone()));
        }
        params.extend(self.filters.iter().cloned());
        params
    }

    /// Whether the query carries no parameters at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page.is_none()
            && self.limit.is_none()
            && self.search.is_none()
            && self.filters.is_empty()
    }
}
