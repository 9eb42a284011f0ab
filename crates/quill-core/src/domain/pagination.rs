use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Largest row offset handed to a store; SQL offsets are signed 64-bit.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Page/limit window requested by a client, already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Missing values fall back to page 1 / limit 10; page is at least 1 and
    /// limit is clamped to `1..=MAX_LIMIT`.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Rows to skip. Saturates for absurd page numbers instead of overflowing.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(MAX_OFFSET)
    }

    /// Apply this window to an already-ordered iterator.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total number of matching records.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.request, self.total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

/// Pagination block returned alongside list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(3), Some(500)).limit, MAX_LIMIT);
    }

    #[test]
    fn second_page_of_twenty_five() {
        let request = PageRequest::new(Some(2), Some(10));
        let items = request.slice(0..25);

        assert_eq!(items, (10..20).collect::<Vec<_>>());
        let pagination = Pagination::new(request, 25);
        assert_eq!(pagination.pages, 3);
        assert_eq!(pagination.total, 25);
    }

    #[test]
    fn huge_page_number_saturates() {
        let request = PageRequest::new(Some(u64::MAX), Some(10));
        assert_eq!(request.offset(), MAX_OFFSET);
        assert!(request.slice(0..25).is_empty());
        assert_eq!(Pagination::new(request, 25).page, u64::MAX);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let request = PageRequest::new(Some(4), Some(10));
        assert!(request.slice(0..25).is_empty());
        assert_eq!(Pagination::new(request, 0).pages, 0);
    }
}
