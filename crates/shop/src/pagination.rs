//! Page arithmetic for catalog listings.

/// One page of a listing plus the navigation facts a paginator renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub last_page: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub next_page: u64,
    pub previous_page: u64,
}

impl<T> Page<T> {
    /// Assemble a page from fetched items and the collection total.
    ///
    /// `current_page` is 1-based; callers clamp it before fetching (see
    /// [`normalize_page`]).
    #[must_use]
    pub fn build(items: Vec<T>, total_items: u64, current_page: u64, per_page: u64) -> Self {
        let last_page = total_items.div_ceil(per_page).max(1);
        Self {
            items,
            current_page,
            per_page,
            total_items,
            last_page,
            has_next_page: current_page * per_page < total_items,
            has_previous_page: current_page > 1,
            next_page: current_page + 1,
            previous_page: current_page.saturating_sub(1),
        }
    }

    /// The row offset for `current_page`.
    #[must_use]
    pub const fn offset(current_page: u64, per_page: u64) -> u64 {
        (current_page - 1) * per_page
    }
}

/// Clamp a requested page number to at least 1 (page 0 and "no page given
/// defaults to 0" both mean the first page).
#[must_use]
pub const fn normalize_page(requested: u64) -> u64 {
    if requested == 0 { 1 } else { requested }
}
