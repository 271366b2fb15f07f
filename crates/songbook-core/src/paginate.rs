//! Fixed-size paging over a filtered list.

/// One page of items plus enough context to draw pager controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number actually shown (after out-of-range reset).
    pub number: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// `max(1, ceil(count / page_size))`.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// Normalize a requested page. Anything past the end (or 0) goes back to
/// page 1; it is not clamped to the last page.
pub fn normalize_page(page: usize, count: usize, page_size: usize) -> usize {
    if page == 0 || page > total_pages(count, page_size) {
        1
    } else {
        page
    }
}

pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let number = normalize_page(page, items.len(), page_size);
    let start = ((number - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        number,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<u32> = (0..25).collect();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, &[20, 21, 22, 23, 24]);
        assert_eq!(page.number, 3);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_out_of_range_resets_to_first_page() {
        let items: Vec<u32> = (0..25).collect();
        let page = paginate(&items, 4, 10);
        assert_eq!(page.number, 1);
        assert_eq!(page.items, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(!page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_empty_list_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let items: Vec<u32> = (0..5).collect();
        assert_eq!(paginate(&items, 0, 2).number, 1);
    }
}
