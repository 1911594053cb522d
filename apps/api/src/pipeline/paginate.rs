use serde::Serialize;

use crate::pipeline::QueryError;

/// Page sizes offered by the list views.
pub const PAGE_SIZES: [usize; 3] = [10, 20, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Page 0 is read as page 1. Sizes outside `PAGE_SIZES` are rejected.
    pub fn new(page: usize, page_size: usize) -> Result<Self, QueryError> {
        if !PAGE_SIZES.contains(&page_size) {
            return Err(QueryError::UnsupportedPageSize(page_size));
        }
        Ok(Self {
            page: page.max(1),
            page_size,
        })
    }

    pub fn from_params(page: Option<usize>, page_size: Option<usize>) -> Result<Self, QueryError> {
        Self::new(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changing the size always returns to the first page.
    pub fn with_page_size(self, page_size: usize) -> Result<Self, QueryError> {
        Self::new(1, page_size)
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Slices `[(page-1)*size, page*size)` clipped to the sequence. Pages past
/// the end yield an empty slice.
pub fn paginate<T>(items: &[T], request: PageRequest) -> &[T] {
    let start = request.offset().min(items.len());
    let end = start.saturating_add(request.page_size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    pub fn from_slice(all: &[&T], request: PageRequest) -> Self {
        Self {
            items: paginate(all, request).iter().map(|r| (*r).clone()).collect(),
            page: request.page(),
            page_size: request.page_size(),
            total: all.len(),
            total_pages: total_pages(all.len(), request.page_size()),
        }
    }
}

impl<T> Page<T> {
    /// Converts the items, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_first_page_full() {
        let items = seq(25);
        let page = paginate(&items, PageRequest::new(1, 10).unwrap());
        assert_eq!(page, &items[0..10]);
    }

    #[test]
    fn test_last_page_partial() {
        let items = seq(25);
        let page = paginate(&items, PageRequest::new(3, 10).unwrap());
        assert_eq!(page, &[20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items = seq(25);
        assert!(paginate(&items, PageRequest::new(4, 10).unwrap()).is_empty());
        assert!(paginate(&items, PageRequest::new(usize::MAX, 50).unwrap()).is_empty());
    }

    #[test]
    fn test_length_formula_holds() {
        for len in [0usize, 1, 9, 10, 11, 49, 50, 51, 137] {
            let items = seq(len);
            for size in PAGE_SIZES {
                for page in 1..=6 {
                    let got = paginate(&items, PageRequest::new(page, size).unwrap()).len();
                    let expected = size.min(len.saturating_sub((page - 1) * size));
                    assert_eq!(got, expected, "len={len} size={size} page={page}");
                }
            }
        }
    }

    #[test]
    fn test_page_zero_reads_as_first() {
        assert_eq!(PageRequest::new(0, 20).unwrap().page(), 1);
    }

    #[test]
    fn test_unsupported_page_size_rejected() {
        assert!(matches!(
            PageRequest::new(1, 15),
            Err(QueryError::UnsupportedPageSize(15))
        ));
    }

    #[test]
    fn test_changing_page_size_resets_page() {
        let request = PageRequest::new(3, 10).unwrap().with_page_size(20).unwrap();
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), 20);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(1, 50), 1);
    }
}
