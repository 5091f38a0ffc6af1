//! The paginator and the pages it produces.

use std::num::NonZeroUsize;

use serde::Serialize;
use thiserror::Error;

use crate::number::{PageNumber, RequestedPage};

/// Raised when a paginator is configured with a zero page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page size must be at least one item")]
pub struct PageSizeError;

/// Page size used by [`Paginator::default`].
pub const DEFAULT_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

/// Slices ordered sequences into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: NonZeroUsize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl Paginator {
    /// Create a paginator serving `per_page` items per page.
    #[must_use]
    pub const fn new(per_page: NonZeroUsize) -> Self {
        Self { per_page }
    }

    /// Create a paginator from an unchecked size.
    ///
    /// # Errors
    ///
    /// Returns [`PageSizeError`] when `per_page` is zero.
    pub const fn try_new(per_page: usize) -> Result<Self, PageSizeError> {
        match NonZeroUsize::new(per_page) {
            Some(size) => Ok(Self::new(size)),
            None => Err(PageSizeError),
        }
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(self) -> NonZeroUsize {
        self.per_page
    }

    /// Number of pages needed for `total` items. Never zero: an empty
    /// sequence still has one (empty) page.
    #[must_use]
    pub fn num_pages(self, total: usize) -> NonZeroUsize {
        NonZeroUsize::new(total.div_ceil(self.per_page.get())).unwrap_or(NonZeroUsize::MIN)
    }

    /// Clamp a requested page onto `1..=num_pages(total)`.
    #[must_use]
    pub fn clamp(self, requested: RequestedPage, total: usize) -> PageNumber {
        let last = self.num_pages(total);
        let value = requested.get().clamp(1, last.get());
        PageNumber::new(value).unwrap_or(PageNumber::FIRST)
    }

    /// Serve the requested page of `items`.
    ///
    /// `items` must already be in display order. Out-of-range requests are
    /// clamped to the first or last page.
    #[must_use]
    pub fn page<T>(self, items: Vec<T>, requested: RequestedPage) -> Page<T> {
        let total = items.len();
        let number = self.clamp(requested, total);
        let offset = (number.get() - 1).saturating_mul(self.per_page.get());
        let slice = items
            .into_iter()
            .skip(offset)
            .take(self.per_page.get())
            .collect();
        Page {
            items: slice,
            number,
            num_pages: self.num_pages(total),
            per_page: self.per_page,
            total,
        }
    }
}

/// One page of a paginated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    number: PageNumber,
    num_pages: NonZeroUsize,
    per_page: NonZeroUsize,
    total: usize,
}

impl<T> Page<T> {
    /// Items on this page, in display order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, keeping its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The served page number, after clamping.
    #[must_use]
    pub const fn number(&self) -> PageNumber {
        self.number
    }

    /// Total number of pages.
    #[must_use]
    pub const fn num_pages(&self) -> NonZeroUsize {
        self.num_pages
    }

    /// Page size the page was cut with.
    #[must_use]
    pub const fn per_page(&self) -> NonZeroUsize {
        self.per_page
    }

    /// Number of items across all pages.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number.get() > 1
    }

    /// Whether a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number.get() < self.num_pages.get()
    }

    /// Number of the preceding page.
    #[must_use]
    pub const fn previous_number(&self) -> Option<PageNumber> {
        if self.has_previous() {
            self.number.previous()
        } else {
            None
        }
    }

    /// Number of the following page.
    #[must_use]
    pub const fn next_number(&self) -> Option<PageNumber> {
        if self.has_next() {
            Some(self.number.next())
        } else {
            None
        }
    }

    /// Transform every item, keeping the page geometry.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            per_page: self.per_page,
            total: self.total,
        }
    }
}
