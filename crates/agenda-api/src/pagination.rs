//! Shared page/limit handling for the listing endpoints.

use serde::Deserialize;

use agenda_db::Window;
use agenda_types::api::{Page, Pagination};

pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_LIMIT: u32 = 50;

/// Row cap for the unpaginated task listing.
pub const UNPAGED_TASK_CAP: u32 = 500;

/// Raw query parameters. Kept as strings so a malformed value degrades to
/// "absent" instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn positive(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

impl PageParams {
    /// A page request only when both `page` and `limit` are usable.
    pub fn explicit(&self) -> Option<PageRequest> {
        let page = positive(self.page.as_deref())?;
        let limit = positive(self.limit.as_deref())?;
        Some(PageRequest::new(page, limit))
    }

    /// Fill in whatever is missing with page 1 and [`DEFAULT_LIMIT`].
    pub fn or_default(&self) -> PageRequest {
        PageRequest::new(
            positive(self.page.as_deref()).unwrap_or(1),
            positive(self.limit.as_deref()).unwrap_or(DEFAULT_LIMIT),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn window(&self) -> Window {
        Window::new(self.limit, self.offset())
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total.div_ceil(u64::from(self.limit)),
        }
    }

    pub fn into_page<T>(self, items: Vec<T>, total: u64) -> Page<T> {
        Page {
            items,
            pagination: self.pagination(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(Into::into),
            limit: limit.map(Into::into),
        }
    }

    #[test]
    fn second_page_of_twenty_five() {
        let req = params(Some("2"), Some("10")).explicit().unwrap();
        assert_eq!(req.offset(), 10);
        assert_eq!(
            req.pagination(25),
            Pagination { page: 2, limit: 10, total: 25, total_pages: 3 }
        );
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let req = params(Some("1"), Some("1000")).explicit().unwrap();
        assert_eq!(req.limit, MAX_LIMIT);
    }

    #[test]
    fn explicit_needs_both_values() {
        assert!(params(Some("2"), None).explicit().is_none());
        assert!(params(None, Some("10")).explicit().is_none());
        assert!(params(Some("0"), Some("10")).explicit().is_none());
        assert!(params(Some("abc"), Some("10")).explicit().is_none());
        assert!(params(Some("-1"), Some("10")).explicit().is_none());
    }

    #[test]
    fn defaults_fill_gaps() {
        assert_eq!(PageParams::default().or_default(), PageRequest::new(1, DEFAULT_LIMIT));
        assert_eq!(params(Some("3"), Some("x")).or_default(), PageRequest::new(3, DEFAULT_LIMIT));
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        assert_eq!(PageRequest::new(1, 10).pagination(0).total_pages, 0);
        assert_eq!(PageRequest::new(1, 10).pagination(10).total_pages, 1);
        assert_eq!(PageRequest::new(1, 10).pagination(11).total_pages, 2);
    }
}
