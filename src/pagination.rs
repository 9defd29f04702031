use serde::Serialize;

/// One page of an in-memory result set.
#[derive(Debug, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based, already clamped into `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice `items` into pages of `page_size` and return the requested one.
///
/// Out-of-range page numbers are clamped, and an empty sequence still has one
/// (empty) page. A zero `page_size` is treated as 1.
pub fn paginate<T>(items: &[T], page_size: usize, page_number: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page_number.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);

    Page {
        items: &items[start..end],
        page,
        total_pages,
        total_items,
    }
}
