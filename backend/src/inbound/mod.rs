//! Inbound adapters that translate external requests into domain calls.
//!
//! The HTTP API under [`http`] is the only transport.

pub mod http;
