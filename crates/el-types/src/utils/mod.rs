//! Utility items shared across the resolver crates.

pub mod constants;
