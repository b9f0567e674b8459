//! Page-numbered listings

use serde::Serialize;

/// Fixed number of entries per page.
pub const PAGE_SIZE: u32 = 10;

/// A single page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Build a page from a query result and the total row count it was drawn from.
    #[must_use]
    pub fn new(items: Vec<T>, page_number: u32, total: u64) -> Self {
        Self {
            items,
            page_number: normalize_page(page_number),
            total_pages: total_pages(total),
        }
    }

    /// Cut one page out of an in-memory list.
    #[must_use]
    pub fn slice(items: Vec<T>, page_number: u32) -> Self {
        let page_number = normalize_page(page_number);
        let total = u64::try_from(items.len()).unwrap_or(u64::MAX);

        let items = items
            .into_iter()
            .skip(usize::try_from(offset(page_number)).unwrap_or(usize::MAX))
            .take(PAGE_SIZE as usize)
            .collect();

        Self::new(items, page_number, total)
    }

    /// An empty first page.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), 1, 0)
    }
}

/// Page numbers start at 1; 0 means "first page".
#[must_use]
pub const fn normalize_page(page_number: u32) -> u32 {
    if page_number == 0 { 1 } else { page_number }
}

/// Number of rows to skip for the given page.
#[must_use]
pub fn offset(page_number: u32) -> i64 {
    (i64::from(normalize_page(page_number)) - 1) * i64::from(PAGE_SIZE)
}

#[must_use]
pub fn total_pages(total: u64) -> u32 {
    u32::try_from(total.div_ceil(u64::from(PAGE_SIZE))).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
    }

    #[test]
    fn page_zero_is_first_page() {
        assert_eq!(normalize_page(0), 1);
        assert_eq!(offset(0), 0);
        assert_eq!(offset(3), 20);
    }

    #[test]
    fn slice_returns_requested_window() {
        let page = Page::slice((1..=23).collect::<Vec<u32>>(), 3);

        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.page_number, 3);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let page = Page::slice(vec![1_u32, 2], 4);

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
