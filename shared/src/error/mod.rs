//! Unified error system for the Mesa platform
//!
//! This module provides the error vocabulary shared by the backend and the
//! sync engine:
//! - [`ErrorCode`]: standardized numeric codes for all error types
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`ApiError`]: the structured error body with code, message and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Call request errors
//! - 7xxx: Table errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiError, ErrorCode};
//!
//! // Create a simple error
//! let err = ApiError::new(ErrorCode::OrderNotFound);
//!
//! // Create an error with custom message and field detail
//! let err = ApiError::validation("Invalid email format").with_detail("field", "email");
//!
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiError, ApiResult};
