//! Pure pagination math. Pages are zero-based internally.

/// Largest page size a selector menu can address with its number glyphs.
pub const MAX_PAGE_SIZE: usize = 8;

/// Bound a configured page size into `1..=MAX_PAGE_SIZE`.
pub fn effective_page_size(configured: usize) -> usize {
    configured.clamp(1, MAX_PAGE_SIZE)
}

/// Compute the number of pages for a paginated list. An empty list still
/// renders one (empty) page.
pub fn total_pages(item_count: usize, per_page: usize) -> usize {
    item_count.div_ceil(per_page.max(1)).max(1)
}

/// Clamp a requested page into a valid range.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages.max(1) - 1)
}

/// Return start/end indices for a page window.
pub fn page_window(total_items: usize, per_page: usize, page: usize) -> (usize, usize) {
    let safe_per_page = per_page.max(1);
    let start = page.saturating_mul(safe_per_page).min(total_items);
    let end = start.saturating_add(safe_per_page).min(total_items);
    (start, end)
}

/// Map a slot on a page back to the index in the full list.
pub fn absolute_index(page: usize, per_page: usize, slot: usize) -> usize {
    page * per_page.max(1) + slot
}

/// Parse a one-based page argument into a zero-based page.
///
/// A missing argument means the first page; `0` or garbage is rejected.
pub fn parse_one_based_page(raw: Option<&str>) -> Option<usize> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|page| *page >= 1)
            .map(|page| page - 1),
        None => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_has_floor_of_one() {
        assert_eq!(total_pages(0, 8), 1);
        assert_eq!(total_pages(8, 8), 1);
        assert_eq!(total_pages(9, 8), 2);
        assert_eq!(total_pages(3, 0), 3);
    }

    #[test]
    fn windows_partition_every_list() {
        for count in 0..40 {
            for per_page in 1..=MAX_PAGE_SIZE {
                let pages = total_pages(count, per_page);
                let mut covered = Vec::new();

                for page in 0..pages {
                    let (start, end) = page_window(count, per_page, page);
                    assert!(end - start <= per_page);
                    if page + 1 < pages {
                        assert_eq!(end - start, per_page);
                    }
                    covered.extend(start..end);
                }

                assert_eq!(covered, (0..count).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn slot_maps_back_to_list_index() {
        for per_page in 1..=MAX_PAGE_SIZE {
            for page in 0..5 {
                let (start, end) = page_window(100, per_page, page);
                for slot in 0..(end - start) {
                    assert_eq!(absolute_index(page, per_page, slot), start + slot);
                }
            }
        }
    }

    #[test]
    fn clamp_and_parse() {
        assert_eq!(clamp_page(7, 3), 2);
        assert_eq!(clamp_page(0, 0), 0);
        assert_eq!(parse_one_based_page(Some("2")), Some(1));
        assert_eq!(parse_one_based_page(Some("0")), None);
        assert_eq!(parse_one_based_page(None), Some(0));
        assert_eq!(effective_page_size(20), MAX_PAGE_SIZE);
        assert_eq!(effective_page_size(0), 1);
    }
}
