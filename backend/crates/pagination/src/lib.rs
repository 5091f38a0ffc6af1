//! Page-number pagination for ordered feeds.
//!
//! A [`Paginator`] slices an already ordered sequence into fixed-size pages
//! addressed by a 1-based [`PageNumber`]. Requests arrive as a
//! [`RequestedPage`], parsed leniently from a query string value, and are
//! clamped onto the valid range so callers never see an empty page for an
//! overshooting page number.
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use pagination::{Paginator, RequestedPage};
//!
//! let per_page = NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN);
//! let paginator = Paginator::new(per_page);
//! let page = paginator.page((1..=13).collect::<Vec<u32>>(), RequestedPage::parse(Some("7")));
//!
//! assert_eq!(page.number().get(), 2);
//! assert_eq!(page.items(), &[11, 12, 13]);
//! assert!(!page.has_next());
//! ```

mod links;
mod number;
mod page;

pub use links::PageLinks;
pub use number::{PageNumber, RequestedPage};
pub use page::{DEFAULT_PER_PAGE, Page, PageSizeError, Paginator};
