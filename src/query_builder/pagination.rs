use serde::{Deserialize, Serialize};

/// 1-based page request. A page number or page size of zero disables windowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
}

impl Pagination {
    /// Create pagination with page number and per-page count
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// No window: every matching row
    pub fn unpaged() -> Self {
        Self::default()
    }

    pub fn is_paged(&self) -> bool {
        self.page_number > 0 && self.page_size > 0
    }

    /// `(offset, size)` of the requested window, if any
    pub fn window(&self) -> Option<(u64, u64)> {
        self.is_paged().then(|| {
            let size = u64::from(self.page_size);
            ((u64::from(self.page_number) - 1) * size, size)
        })
    }

    /// Calculate total pages given a total count
    pub fn total_pages(&self, total_count: i64) -> i64 {
        get_page_count(total_count, i64::from(self.page_size))
    }

    /// Check if there's a next page
    pub fn has_next_page(&self, total_count: i64) -> bool {
        match self.window() {
            Some((offset, size)) => (offset + size) < total_count.max(0) as u64,
            None => false,
        }
    }

    /// Check if there's a previous page
    pub fn has_previous_page(&self) -> bool {
        self.is_paged() && self.page_number > 1
    }
}

/// `ceil(total / page_size)`, with a page size of zero (or less) treated as one.
pub fn get_page_count(total: i64, page_size: i64) -> i64 {
    let size = page_size.max(1);
    let total = total.max(0);
    total / size + i64::from(total % size != 0)
}

/// One page of results plus the totals needed to render a pager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page_number: u32,
    pub page_size: u32,
    pub page_count: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page_number: pagination.page_number,
            page_size: pagination.page_size,
            page_count: if pagination.is_paged() {
                pagination.total_pages(total)
            } else {
                i64::from(total > 0)
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_number: self.page_number,
            page_size: self.page_size,
            page_count: self.page_count,
        }
    }
}
