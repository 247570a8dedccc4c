//! Filter context for task listings
//!
//! A `FilterContext` selects one page of tasks and doubles as the cache key
//! for that page. Changing any field means a different ordering context.

use crate::models::{Priority, Status};

/// Default number of tasks per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// The search/status/priority/page/limit tuple for a task listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterContext {
    /// Trimmed search text; `None` means no search
    search: Option<String>,
    /// Status filter
    pub status: Option<Status>,
    /// Priority filter
    pub priority: Option<Priority>,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
}

impl Default for FilterContext {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            priority: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterContext {
    /// Create a new filter for the first page with the default page size
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text. Blank text clears the search.
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        self.set_search(search);
        self
    }

    /// Filter by status
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Select a page (values below 1 are clamped to 1)
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size (values below 1 are clamped to 1)
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// The active search text, if any
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Replace the search text. A new search starts again at page 1.
    pub fn set_search(&mut self, search: impl AsRef<str>) {
        let trimmed = search.as_ref().trim();
        let next = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if next != self.search {
            self.search = next;
            self.page = 1;
        }
    }

    /// Replace the status filter. Resets to page 1 when it changes.
    pub fn set_status(&mut self, status: Option<Status>) {
        if self.status != status {
            self.status = status;
            self.page = 1;
        }
    }

    /// Replace the priority filter. Resets to page 1 when it changes.
    pub fn set_priority(&mut self, priority: Option<Priority>) {
        if self.priority != priority {
            self.priority = priority;
            self.page = 1;
        }
    }

    /// The filter for the following page
    pub fn next_page(&self) -> Self {
        self.clone().with_page(self.page.saturating_add(1))
    }

    /// The filter for the preceding page (stays on page 1)
    pub fn previous_page(&self) -> Self {
        self.clone().with_page(self.page.saturating_sub(1))
    }

    /// Whether any narrowing filter (search, status, priority) is set
    pub fn is_filtered(&self) -> bool {
        self.search.is_some() || self.status.is_some() || self.priority.is_some()
    }

    /// Query parameters for the listing endpoint.
    ///
    /// Only fields that are set are included, in the order
    /// search, status, priority, page, limit.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// Cycle an optional status: all -> pending -> in-progress -> completed -> all
pub fn cycle_status(current: Option<Status>) -> Option<Status> {
    match current {
        None => Some(Status::Pending),
        Some(Status::Pending) => Some(Status::InProgress),
        Some(Status::InProgress) => Some(Status::Completed),
        Some(Status::Completed) => None,
    }
}

/// Cycle an optional priority: all -> low -> medium -> high -> all
pub fn cycle_priority(current: Option<Priority>) -> Option<Priority> {
    match current {
        None => Some(Priority::Low),
        Some(Priority::Low) => Some(Priority::Medium),
        Some(Priority::Medium) => Some(Priority::High),
        Some(Priority::High) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = FilterContext::new();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
        assert!(!filter.is_filtered());
    }

    #[test]
    fn test_search_is_trimmed_and_blank_clears() {
        let filter = FilterContext::new().with_search("  docs  ");
        assert_eq!(filter.search(), Some("docs"));

        let filter = filter.with_search("   ");
        assert_eq!(filter.search(), None);
    }

    #[test]
    fn test_changing_search_resets_page() {
        let mut filter = FilterContext::new().with_page(4);
        filter.set_search("bug");
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn test_same_search_keeps_page() {
        let mut filter = FilterContext::new().with_search("bug").with_page(3);
        filter.set_search(" bug ");
        assert_eq!(filter.page, 3);
    }

    #[test]
    fn test_changing_status_resets_page() {
        let mut filter = FilterContext::new().with_page(2);
        filter.set_status(Some(Status::Completed));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.status, Some(Status::Completed));
    }

    #[test]
    fn test_page_and_limit_clamp_to_one() {
        let filter = FilterContext::new().with_page(0).with_limit(0);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 1);
    }

    #[test]
    fn test_previous_page_stays_on_first() {
        let filter = FilterContext::new();
        assert_eq!(filter.previous_page().page, 1);
        assert_eq!(filter.next_page().page, 2);
    }

    #[test]
    fn test_query_pairs_only_include_set_fields() {
        let pairs = FilterContext::new().query_pairs();
        assert_eq!(
            pairs,
            vec![("page", "1".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn test_query_pairs_full() {
        let filter = FilterContext::new()
            .with_search("login")
            .with_status(Status::InProgress)
            .with_priority(Priority::High)
            .with_page(2)
            .with_limit(5);
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("search", "login".to_string()),
                ("status", "in-progress".to_string()),
                ("priority", "high".to_string()),
                ("page", "2".to_string()),
                ("limit", "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_filters_are_distinct_cache_keys() {
        use std::collections::HashSet;
        let mut keys = HashSet::new();
        keys.insert(FilterContext::new());
        keys.insert(FilterContext::new().with_page(2));
        keys.insert(FilterContext::new().with_status(Status::Pending));
        keys.insert(FilterContext::new());
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_cycle_status_wraps() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = cycle_status(current);
            seen.push(current);
        }
        assert_eq!(
            seen,
            vec![
                Some(Status::Pending),
                Some(Status::InProgress),
                Some(Status::Completed),
                None
            ]
        );
    }

    #[test]
    fn test_cycle_priority_wraps() {
        assert_eq!(cycle_priority(None), Some(Priority::Low));
        assert_eq!(cycle_priority(Some(Priority::High)), None);
    }
}
