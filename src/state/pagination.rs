//! Page arithmetic.

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based page.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// First page with the given size. A size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Number of pages for `total` rows. An empty table still has one page.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Page index clamped into range for `total` rows.
    pub fn clamped_index(&self, total: usize) -> usize {
        self.page_index.min(self.page_count(total) - 1)
    }

    /// Half-open row range of the (clamped) current page.
    pub fn window(&self, total: usize) -> std::ops::Range<usize> {
        let size = self.page_size.max(1);
        let start = (self.clamped_index(total) * size).min(total);
        let end = (start + size).min(total);
        start..end
    }
}
