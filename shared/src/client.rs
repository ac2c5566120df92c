//! Client-related types shared between server and client
//!
//! Common request/response types used in API communication.
//! List endpoints wrap their payload in `{ "data": [...] }`; item
//! endpoints return the bare record.

use serde::{Deserialize, Serialize};

/// Envelope for list responses: `{ "data": [T] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<ListEnvelope<T>> for Vec<T> {
    fn from(envelope: ListEnvelope<T>) -> Self {
        envelope.data
    }
}

// =============================================================================
// Auth API DTOs
// =============================================================================

/// User role, drives which screens and poll scopes a client runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Waiter,
    Chef,
    Admin,
}

/// Login request (`POST /auth/login`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_envelope_decodes() {
        let body = r#"{"data":[1,2,3]}"#;
        let envelope: ListEnvelope<i32> = serde_json::from_str(body).unwrap();
        assert_eq!(Vec::from(envelope), vec![1, 2, 3]);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&UserRole::Waiter).unwrap(), "\"waiter\"");
    }
}
