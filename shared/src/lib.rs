//! Shared types for the Mesa table-ordering platform
//!
//! Common vocabulary used across the backend and client crates: data
//! models, push event definitions, the error code registry, and API
//! request/response types.

pub mod client;
pub mod error;
pub mod event;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

// Event vocabulary re-exports (for convenient access)
pub use event::{EventFrame, PushEvent};
