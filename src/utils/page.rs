use serde::Serialize;

/// Number of pages needed for `total_items`, never less than one
pub fn compute_pages(total_items: u64, page_size: u32) -> u32 {
    let page_size = page_size.max(1) as u64;
    let pages = total_items.div_ceil(page_size);
    pages.clamp(1, u32::MAX as u64) as u32
}

/// Pull a requested page back into `[1, total_pages]`
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.max(1).min(total_pages.max(1))
}

/// Contiguous run of page numbers centred on `current`, shifted toward
/// whichever end is near so every entry stays in range
pub fn window_of(total_pages: u32, current: u32, max_visible: u32) -> Vec<u32> {
    let total_pages = total_pages.max(1);
    let len = max_visible.max(1).min(total_pages);
    let current = clamp_page(current, total_pages);

    // len <= total_pages, so neither bound can overflow
    let last_start = total_pages - len + 1;
    let start = current.saturating_sub(len / 2).max(1).min(last_start);
    (start..=start + (len - 1)).collect()
}

/// Pagination snapshot for one fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationState {
    /// Build from the server-reported total. The page is clamped into range.
    pub fn new(page: u32, page_size: u32, total_items: u64) -> Self {
        let total_pages = compute_pages(total_items, page_size);
        Self {
            page: clamp_page(page, total_pages),
            page_size: page_size.max(1),
            total_items,
            total_pages,
        }
    }

    /// State before anything has been fetched
    pub fn empty(page_size: u32) -> Self {
        Self::new(1, page_size, 0)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    pub fn prev_page(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    pub fn page_numbers(&self, max_visible: u32) -> Vec<u32> {
        window_of(self.total_pages, self.page, max_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_pages() {
        assert_eq!(compute_pages(0, 10), 1);
        assert_eq!(compute_pages(1, 10), 1);
        assert_eq!(compute_pages(10, 10), 1);
        assert_eq!(compute_pages(11, 10), 2);
        assert_eq!(compute_pages(25, 10), 3);
        assert_eq!(compute_pages(3, 1), 3);
        assert_eq!(compute_pages(5, 0), 5);
    }

    #[test]
    fn test_clamp_page_stays_in_range() {
        for total_items in [0u64, 1, 9, 10, 11, 99, 1000] {
            for page_size in [1u32, 3, 10, 50] {
                let total_pages = compute_pages(total_items, page_size);
                assert!(total_pages >= 1);
                for requested in [0u32, 1, 2, 5, 100, u32::MAX] {
                    let page = clamp_page(requested, total_pages);
                    assert!((1..=total_pages).contains(&page));
                }
            }
        }
    }

    #[test]
    fn test_window_centred_and_shifted() {
        assert_eq!(window_of(10, 5, 5), vec![3, 4, 5, 6, 7]);
        assert_eq!(window_of(10, 1, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(window_of(10, 2, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(window_of(10, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(window_of(10, 9, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(window_of(10, 5, 4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_window_short_collections() {
        assert_eq!(window_of(1, 1, 5), vec![1]);
        assert_eq!(window_of(3, 2, 5), vec![1, 2, 3]);
        assert_eq!(window_of(3, 7, 5), vec![1, 2, 3]);
        assert_eq!(window_of(0, 0, 0), vec![1]);
    }

    #[test]
    fn test_window_at_largest_page_count() {
        let total_pages = compute_pages(u64::MAX, 1);
        assert_eq!(total_pages, u32::MAX);
        let last = u32::MAX;
        assert_eq!(
            window_of(total_pages, total_pages, 5),
            vec![last - 4, last - 3, last - 2, last - 1, last]
        );
        assert_eq!(window_of(total_pages, 1, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(window_of(total_pages, u32::MAX / 2, 1), vec![u32::MAX / 2]);

        let state = PaginationState::new(u32::MAX, 1, u64::MAX);
        assert_eq!(state.page_numbers(3), vec![last - 2, last - 1, last]);
        assert_eq!(state.next_page(), None);
    }

    #[test]
    fn test_empty_collection() {
        let state = PaginationState::new(4, 10, 0);
        assert_eq!(state.page, 1);
        assert_eq!(state.total_pages, 1);
        assert_eq!(state.page_numbers(5), vec![1]);
        assert!(!state.has_next());
        assert!(!state.has_prev());
    }

    #[test]
    fn test_navigation_flags() {
        let middle = PaginationState::new(2, 10, 25);
        assert_eq!(middle.total_pages, 3);
        assert_eq!(middle.next_page(), Some(3));
        assert_eq!(middle.prev_page(), Some(1));

        let last = PaginationState::new(3, 10, 25);
        assert_eq!(last.next_page(), None);
        assert_eq!(last.prev_page(), Some(2));
    }
}
