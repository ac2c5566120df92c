//! Realtime push event vocabulary
//!
//! The backend publishes full-record events over the realtime channel;
//! clients fold them into their cached state. The wire unit is an
//! [`EventFrame`] (`{event, ts, data}` JSON); [`PushEvent`] is the decoded,
//! typed form.
//!
//! ```text
//! backend ──frame──▶ transport ──EventFrame──▶ PushEvent ──▶ store merge
//! ```

use crate::models::{CallRequest, DiningTable, Order};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event names as they appear on the wire
pub const ORDER_NEW: &str = "order:new";
pub const ORDER_UPDATED: &str = "order:updated";
pub const ORDER_CONFIRMED: &str = "order:confirmed";
pub const CALL_NEW: &str = "call:new";
pub const CALL_CLAIMED: &str = "call:claimed";
pub const CALL_RELEASED: &str = "call:released";
pub const CALL_COMPLETED: &str = "call:completed";
pub const TABLE_UPDATED: &str = "table:updated";

/// Client-to-server handshake event, first frame after connect
pub const AUTH: &str = "auth";

/// Handshake payload carrying the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
}

/// Wire frame for the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    /// Event name, e.g. "order:updated"
    pub event: String,
    /// Sender timestamp, milliseconds since epoch
    pub ts: i64,
    /// Full record payload
    pub data: serde_json::Value,
}

impl EventFrame {
    /// Build a frame from an event name and a serializable payload
    pub fn new(event: impl Into<String>, payload: &impl Serialize) -> serde_json::Result<Self> {
        Ok(Self {
            event: event.into(),
            ts: crate::util::now_millis(),
            data: serde_json::to_value(payload)?,
        })
    }

    /// Build the auth handshake frame
    pub fn auth(token: impl Into<String>) -> Self {
        Self {
            event: AUTH.to_string(),
            ts: crate::util::now_millis(),
            data: serde_json::json!({ "token": token.into() }),
        }
    }
}

/// Decoded push event, one variant per wire event name
#[derive(Debug, Clone)]
pub enum PushEvent {
    OrderNew(Order),
    OrderUpdated(Order),
    OrderConfirmed(Order),
    CallNew(CallRequest),
    CallClaimed(CallRequest),
    CallReleased(CallRequest),
    CallCompleted(CallRequest),
    TableUpdated(DiningTable),
}

impl PushEvent {
    /// The wire event name for this variant
    pub const fn name(&self) -> &'static str {
        match self {
            PushEvent::OrderNew(_) => ORDER_NEW,
            PushEvent::OrderUpdated(_) => ORDER_UPDATED,
            PushEvent::OrderConfirmed(_) => ORDER_CONFIRMED,
            PushEvent::CallNew(_) => CALL_NEW,
            PushEvent::CallClaimed(_) => CALL_CLAIMED,
            PushEvent::CallReleased(_) => CALL_RELEASED,
            PushEvent::CallCompleted(_) => CALL_COMPLETED,
            PushEvent::TableUpdated(_) => TABLE_UPDATED,
        }
    }

    /// Encode back into a wire frame
    pub fn to_frame(&self) -> serde_json::Result<EventFrame> {
        match self {
            PushEvent::OrderNew(o)
            | PushEvent::OrderUpdated(o)
            | PushEvent::OrderConfirmed(o) => EventFrame::new(self.name(), o),
            PushEvent::CallNew(c)
            | PushEvent::CallClaimed(c)
            | PushEvent::CallReleased(c)
            | PushEvent::CallCompleted(c) => EventFrame::new(self.name(), c),
            PushEvent::TableUpdated(t) => EventFrame::new(self.name(), t),
        }
    }
}

/// Failure to decode a frame into a typed event
#[derive(Debug, Error)]
pub enum EventDecodeError {
    /// Event name not in the vocabulary
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Payload did not match the expected record shape
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl TryFrom<EventFrame> for PushEvent {
    type Error = EventDecodeError;

    fn try_from(frame: EventFrame) -> Result<Self, Self::Error> {
        let event = match frame.event.as_str() {
            ORDER_NEW => PushEvent::OrderNew(serde_json::from_value(frame.data)?),
            ORDER_UPDATED => PushEvent::OrderUpdated(serde_json::from_value(frame.data)?),
            ORDER_CONFIRMED => PushEvent::OrderConfirmed(serde_json::from_value(frame.data)?),
            CALL_NEW => PushEvent::CallNew(serde_json::from_value(frame.data)?),
            CALL_CLAIMED => PushEvent::CallClaimed(serde_json::from_value(frame.data)?),
            CALL_RELEASED => PushEvent::CallReleased(serde_json::from_value(frame.data)?),
            CALL_COMPLETED => PushEvent::CallCompleted(serde_json::from_value(frame.data)?),
            TABLE_UPDATED => PushEvent::TableUpdated(serde_json::from_value(frame.data)?),
            other => return Err(EventDecodeError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderSource, OrderStatus};
    use chrono::Utc;

    fn make_order() -> Order {
        Order {
            id: "o1".to_string(),
            table_id: "t1".to_string(),
            table_name: "Mesa 1".to_string(),
            customer_name: "Ana".to_string(),
            customer_email: None,
            customer_id: None,
            items: vec![],
            status: OrderStatus::Pending,
            queue_position: None,
            total_amount: 0.0,
            order_source: OrderSource::Customer,
            claimed_by: None,
            claimed_at: None,
            created_at: Utc::now(),
            confirmed_at: None,
            ready_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_frame_roundtrip() {
        let event = PushEvent::OrderUpdated(make_order());
        let frame = event.to_frame().unwrap();
        assert_eq!(frame.event, ORDER_UPDATED);

        let decoded = PushEvent::try_from(frame).unwrap();
        match decoded {
            PushEvent::OrderUpdated(o) => assert_eq!(o.id, "o1"),
            other => panic!("wrong variant: {}", other.name()),
        }
    }

    #[test]
    fn test_unknown_event_rejected() {
        let frame = EventFrame {
            event: "order:deleted".to_string(),
            ts: 0,
            data: serde_json::Value::Null,
        };
        let err = PushEvent::try_from(frame).unwrap_err();
        assert!(matches!(err, EventDecodeError::UnknownEvent(_)));
    }

    #[test]
    fn test_auth_frame_carries_token() {
        let frame = EventFrame::auth("tok-123");
        assert_eq!(frame.event, AUTH);
        assert_eq!(frame.data["token"], "tok-123");
    }
}
