//! Navigation links between pages.
//!
//! Links are origin-relative (`/path?query`) so a response never repeats a
//! host taken from request headers.

use serde::Serialize;
use url::form_urlencoded;

use crate::number::PageNumber;
use crate::page::Page;

const PAGE_PARAM: &str = "page";

/// `self`, `prev` and `next` links for a served page.
///
/// Query parameters other than `page` are carried over unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// The page that was served, with its clamped number.
    #[serde(rename = "self")]
    pub self_link: String,
    /// The preceding page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// The following page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    /// Derive links for `page` from the request path and raw query string.
    #[must_use]
    pub fn for_page<T>(path: &str, query: &str, page: &Page<T>) -> Self {
        Self {
            self_link: with_page(path, query, page.number()),
            prev: page.previous_number().map(|n| with_page(path, query, n)),
            next: page.next_number().map(|n| with_page(path, query, n)),
        }
    }
}

fn with_page(path: &str, query: &str, number: PageNumber) -> String {
    let retained = form_urlencoded::parse(query.as_bytes()).filter(|(key, _)| key != PAGE_PARAM);
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(retained)
        .append_pair(PAGE_PARAM, &number.to_string())
        .finish();
    format!("{path}?{query}")
}
