//! Pagination types.

use serde::{Deserialize, Serialize};

/// Maximum items per page.
const MAX_PAGE_SIZE: u32 = 100;

/// Default items per page.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination request (1-indexed).
#[derive(Debug, Clone, Copy)]
pub struct Page {
    /// Page number, minimum 1.
    pub page: u32,
    /// Items per page, clamped to 1..=100.
    pub page_size: u32,
}

impl Page {
    /// Create a page request, clamping out-of-range values.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL OFFSET value. Widened before multiplying so the largest page
    /// number a query string can carry stays in range.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Paginated<T> {
    /// Total number of pages (at least 1).
    pub fn total_pages(&self) -> u32 {
        if self.total <= 0 {
            1
        } else {
            let pages = (self.total as u64).div_ceil(self.page_size as u64);
            pages.min(u32::MAX as u64) as u32
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Query-string parameters for pagination.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}
