//! Page-bar state derived from the current page and the known page count.

use std::ops::RangeInclusive;

use delights_core::ResultPage;

/// What a pagination bar should offer for one result page.
///
/// Both numbers are clamped so `1 <= page <= total_pages` always holds,
/// even when built from inconsistent input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControls {
    page: u32,
    total_pages: u32,
}

impl PageControls {
    #[must_use]
    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            page: page.clamp(1, total_pages),
            total_pages,
        }
    }

    #[must_use]
    pub fn for_page(result: &ResultPage) -> Self {
        Self::new(result.page, result.total_pages)
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Target for a "previous" button, if enabled.
    #[must_use]
    pub fn previous(&self) -> Option<u32> {
        self.has_previous().then(|| self.page - 1)
    }

    /// Target for a "next" button, if enabled.
    #[must_use]
    pub fn next(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    /// Every page number, for a numbered page bar.
    #[must_use]
    pub fn pages(&self) -> RangeInclusive<u32> {
        1..=self.total_pages
    }
}
