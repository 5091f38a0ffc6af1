//! Postboard: a small social blogging service.
//!
//! Users publish short posts (optionally in a group, optionally with an
//! image), comment on them and follow each other. Feeds are paged; the
//! landing feed is served from a short-lived response cache.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
pub mod startup;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
