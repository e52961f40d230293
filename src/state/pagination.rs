//! Page cursor over server-reported totals.

#[cfg(test)]
#[path = "pagination_test.rs"]
mod pagination_test;

use crate::net::types::PageInfo;

pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: u32,
    total_pages: u32,
    total_items: u64,
    items_per_page: u32,
    total_known: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            items_per_page: DEFAULT_PER_PAGE,
            total_known: false,
        }
    }
}

impl PaginationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start on `page` before any server totals are known. Page 0 becomes 1.
    ///
    /// The page count is widened to include `page` so the first request can
    /// ask for it; the next `update_pagination` replaces it.
    #[must_use]
    pub fn starting_at(page: u32) -> Self {
        let page = page.max(1);
        Self { current_page: page, total_pages: page, ..Self::default() }
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    #[must_use]
    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    /// Whether the last update carried a server `total`.
    #[must_use]
    pub fn total_known(&self) -> bool {
        self.total_known
    }

    /// Replace every field from server metadata.
    ///
    /// Missing values fall back to page 1 and 10 per page. With a reported
    /// `total` the page count is `ceil(total / per_page)`, never below 1, and
    /// the current page is clamped into it. Without one the reported page is
    /// kept as-is, 0 items are assumed and the page count only reaches the
    /// current page.
    pub fn update_pagination(&mut self, info: &PageInfo) {
        let per_page = info
            .per_page
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PER_PAGE);
        let reported_page = info.current_page.unwrap_or(1).max(1);

        self.items_per_page = per_page;
        self.total_known = info.total.is_some();
        if let Some(total) = info.total {
            let pages = total.div_ceil(u64::from(per_page)).max(1);
            let total_pages = u32::try_from(pages).unwrap_or(u32::MAX);
            self.total_items = total;
            self.total_pages = total_pages;
            self.current_page = reported_page.min(total_pages);
        } else {
            self.total_items = 0;
            self.total_pages = reported_page;
            self.current_page = reported_page;
        }
    }

    /// `page 2 of 10 (95 items)`, or just `page 3` when no total was reported.
    #[must_use]
    pub fn position_label(&self) -> String {
        if self.total_known {
            format!("page {} of {} ({} items)", self.current_page, self.total_pages, self.total_items)
        } else {
            format!("page {}", self.current_page)
        }
    }

    /// Move to `page` if it is within `1..=total_pages`.
    ///
    /// Returns `false` and changes nothing otherwise.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.total_pages {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        match self.current_page.checked_add(1) {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    pub fn prev_page(&mut self) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}
