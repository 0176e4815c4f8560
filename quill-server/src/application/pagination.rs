use serde::Serialize;

/// Fixed page size for the index, category and profile listings.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slices an ordered sequence into one fixed-size page. Out-of-range page
/// numbers clamp to the first or last page instead of erroring; an empty
/// sequence yields a single empty page.
pub fn paginate<T>(items: Vec<T>, page_size: usize, page: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let number = page.clamp(1, total_pages);

    let start = (number - 1) * page_size;
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    Page {
        items,
        number,
        total_pages,
        total_items,
        has_next: number < total_pages,
        has_prev: number > 1,
    }
}

/// Page query parameter: 1 when absent or non-numeric.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(1)
}
