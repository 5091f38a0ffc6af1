//! Page numbers, both as requested and as served.

use std::fmt;
use std::num::{IntErrorKind, NonZeroUsize};

use serde::{Deserialize, Serialize};

/// A valid 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(NonZeroUsize);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    /// Build a page number, rejecting zero.
    #[must_use]
    pub const fn new(value: usize) -> Option<Self> {
        match NonZeroUsize::new(value) {
            Some(number) => Some(Self(number)),
            None => None,
        }
    }

    /// Wrap an already non-zero value.
    #[must_use]
    pub const fn from_non_zero(value: NonZeroUsize) -> Self {
        Self(value)
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// The preceding page, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        Self::new(self.0.get().saturating_sub(1))
    }

    /// The following page, saturating at `usize::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page number exactly as a client asked for it, before clamping.
///
/// Zero and negative integers are kept as zero so they clamp onto the first
/// page; integers too large for `usize` saturate so they clamp onto the last
/// page. Anything that is not an integer means the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestedPage(usize);

impl RequestedPage {
    /// Request the first page.
    pub const FIRST: Self = Self(1);

    /// Request an explicit number.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Parse the raw `page` query value.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim) else {
            return Self::FIRST;
        };
        match text.parse::<usize>() {
            Ok(value) => Self(value),
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => Self(usize::MAX),
            Err(_) if is_negative_integer(text) => Self(0),
            Err(_) => Self::FIRST,
        }
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<PageNumber> for RequestedPage {
    fn from(value: PageNumber) -> Self {
        Self(value.get())
    }
}

fn is_negative_integer(text: &str) -> bool {
    text.strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
