//! Data models
//!
//! Shared vocabulary between the sync engine and the backend API.
//! All IDs are opaque server-assigned strings; wire format is camelCase
//! JSON with RFC 3339 timestamps.

pub mod call_request;
pub mod dining_table;
pub mod order;

// Re-exports
pub use call_request::*;
pub use dining_table::*;
pub use order::*;
