//! Call Request Model
//!
//! A table-side service call (bill, napkins, cleaning). Two-state
//! lifecycle: pending until a waiter completes it; completed is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the table is asking for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Bill,
    Napkin,
    Cleaning,
}

impl CallKind {
    /// Wire name (lowercase)
    pub const fn as_str(&self) -> &'static str {
        match self {
            CallKind::Bill => "bill",
            CallKind::Napkin => "napkin",
            CallKind::Cleaning => "cleaning",
        }
    }

    /// Phrase shown in the waiter task list
    pub const fn message(&self) -> &'static str {
        match self {
            CallKind::Bill => "is asking for the bill",
            CallKind::Napkin => "needs napkins",
            CallKind::Cleaning => "needs the table cleaned",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Call request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    #[default]
    Pending,
    /// Terminal
    Completed,
}

impl CallStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Pending => "pending",
            CallStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Call request entity (server-owned; cached projection on the client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub id: String,
    pub table_id: String,
    pub table_name: String,
    pub customer_name: String,
    #[serde(rename = "type")]
    pub kind: CallKind,
    pub status: CallStatus,
    /// Waiter holding the task. Clearable only while status = pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
}

/// Create call request payload (`POST /call-requests`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequestCreate {
    pub table_id: String,
    pub table_name: String,
    pub customer_name: String,
    #[serde(rename = "type")]
    pub kind: CallKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_to_type_field() {
        let create = CallRequestCreate {
            table_id: "t1".to_string(),
            table_name: "Mesa 1".to_string(),
            customer_name: "Ana".to_string(),
            kind: CallKind::Bill,
        };
        let json = serde_json::to_value(&create).unwrap();
        assert_eq!(json["type"], "bill");
        assert_eq!(json["tableId"], "t1");
    }

    #[test]
    fn test_kind_messages() {
        assert_eq!(CallKind::Bill.message(), "is asking for the bill");
        assert_eq!(CallKind::Napkin.message(), "needs napkins");
        assert_eq!(CallKind::Cleaning.message(), "needs the table cleaned");
    }
}
