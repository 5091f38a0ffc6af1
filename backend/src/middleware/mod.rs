//! Application-wide request middleware.

pub mod trace;

pub use trace::Trace;
