//! Offset pagination for list endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page/limit pair as received in a query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved, clamped pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Clamps raw params: page starts at 1, limit lies in `1..=max_limit`,
    /// and the page is capped so `offset()` stays within `i64`.
    pub fn from_params(params: PageParams, default_limit: i64, max_limit: i64) -> Self {
        let limit = params.limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        let page = params.page.unwrap_or(1).clamp(1, i64::MAX / limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total)
    }
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Self::from_params(params, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

/// Pagination block returned alongside list payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_params_missing() {
        let page = Page::from(PageParams::default());
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        let page = Page::from_params(
            PageParams {
                page: Some(1),
                limit: Some(500),
            },
            20,
            100,
        );
        assert_eq!(page.limit, 100);

        let page = Page::from_params(
            PageParams {
                page: Some(1),
                limit: Some(0),
            },
            20,
            100,
        );
        assert_eq!(page.limit, 1);
    }

    #[test]
    fn test_non_positive_page_becomes_first() {
        let page = Page::from(PageParams {
            page: Some(-3),
            limit: None,
        });
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_offset() {
        let page = Page::from(PageParams {
            page: Some(3),
            limit: Some(10),
        });
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = Page::from_params(
            PageParams {
                page: Some(i64::MAX),
                limit: Some(20),
            },
            20,
            100,
        );
        assert_eq!(page.page, i64::MAX / 20);
        assert!(page.offset() >= 0);
        assert_eq!(page.offset(), (i64::MAX / 20 - 1) * 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PageMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PageMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageMeta::new(1, 10, 11).total_pages, 2);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let json = serde_json::to_value(PageMeta::new(2, 5, 12)).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["page"], 2);
    }
}
