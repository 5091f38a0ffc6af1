//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories over Diesel
//! - **memory**: in-process store implementing every repository port
//! - **cache**: response caches (no-op, in-memory, Redis)
//! - **media**: image storage (filesystem, in-memory)
//!
//! Adapters only translate; business rules stay in the domain services.

pub mod cache;
pub mod media;
pub mod memory;
pub mod persistence;
