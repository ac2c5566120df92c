//! Persisted customer session
//!
//! The QR flow has no login, so "my order" must survive a page refresh or
//! process restart. [`SessionStore`] keeps flat key/value entries in one
//! JSON file:
//!
//! - `active_order_{tableId}_{customerEmail}` -> the order id being tracked
//! - `customer_email_{tableId}` -> last email used at that table (prefill)
//!
//! [`ActiveOrderTracker`] watches accepted records and retires entries when
//! the order leaves the open set, when the table is vacated, or when the
//! server no longer knows the order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::models::{DiningTable, Order};

const SESSION_FILE: &str = "session.json";

/// Session persistence error
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionData {
    #[serde(default)]
    entries: HashMap<String, String>,
}

fn active_order_key(table_id: &str, customer_email: &str) -> String {
    format!("active_order_{}_{}", table_id, customer_email)
}

fn customer_email_key(table_id: &str) -> String {
    format!("customer_email_{}", table_id)
}

const ACTIVE_ORDER_PREFIX: &str = "active_order_";

/// File-backed session store
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    data: Mutex<SessionData>,
}

impl SessionStore {
    /// Open the session file inside `dir`, starting empty when it is
    /// missing or unreadable.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(SESSION_FILE);
        let data = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("Session file unreadable, starting fresh: {}", e);
                    SessionData::default()
                }
            },
            Err(_) => SessionData::default(),
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    fn persist(&self, data: &SessionData) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Remember which order a (table, email) pair is tracking
    pub fn record_active_order(
        &self,
        table_id: &str,
        customer_email: &str,
        order_id: &str,
    ) -> Result<(), SessionError> {
        let mut data = self.data.lock();
        data.entries.insert(
            active_order_key(table_id, customer_email),
            order_id.to_string(),
        );
        self.persist(&data)
    }

    /// The order this (table, email) pair is tracking, if any
    pub fn active_order(&self, table_id: &str, customer_email: &str) -> Option<String> {
        self.data
            .lock()
            .entries
            .get(&active_order_key(table_id, customer_email))
            .cloned()
    }

    /// Forget the tracked order for one (table, email) pair.
    /// Returns whether an entry existed.
    pub fn clear_active_order(
        &self,
        table_id: &str,
        customer_email: &str,
    ) -> Result<bool, SessionError> {
        let mut data = self.data.lock();
        let removed = data
            .entries
            .remove(&active_order_key(table_id, customer_email))
            .is_some();
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }

    /// Forget every tracked order at this table. The remembered email
    /// stays; it is a prefill convenience, not a session.
    pub fn clear_table(&self, table_id: &str) -> Result<bool, SessionError> {
        let prefix = format!("{}{}_", ACTIVE_ORDER_PREFIX, table_id);
        let mut data = self.data.lock();
        let before = data.entries.len();
        data.entries.retain(|key, _| !key.starts_with(&prefix));
        let removed = data.entries.len() != before;
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }

    /// Forget this order wherever it is tracked.
    /// Returns whether any entry existed.
    pub fn clear_order(&self, order_id: &str) -> Result<bool, SessionError> {
        let mut data = self.data.lock();
        let before = data.entries.len();
        data.entries
            .retain(|key, value| !(key.starts_with(ACTIVE_ORDER_PREFIX) && value == order_id));
        let removed = data.entries.len() != before;
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }

    /// Remember the last email used at a table
    pub fn remember_email(
        &self,
        table_id: &str,
        customer_email: &str,
    ) -> Result<(), SessionError> {
        let mut data = self.data.lock();
        data.entries
            .insert(customer_email_key(table_id), customer_email.to_string());
        self.persist(&data)
    }

    /// The last email used at this table, if any
    pub fn saved_email(&self, table_id: &str) -> Option<String> {
        self.data
            .lock()
            .entries
            .get(&customer_email_key(table_id))
            .cloned()
    }
}

/// Watches accepted records and retires finished sessions
#[derive(Debug, Clone)]
pub struct ActiveOrderTracker {
    session: Arc<SessionStore>,
}

impl ActiveOrderTracker {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// An order that left the open set ends any session tracking it
    pub fn observe_order(&self, order: &Order) {
        if order.status.is_open() {
            return;
        }
        match self.session.clear_order(&order.id) {
            Ok(true) => {
                tracing::info!(
                    order_id = %order.id,
                    table_id = %order.table_id,
                    status = %order.status,
                    "Tracked order closed, session cleared"
                );
            }
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to clear session: {}", e),
        }
    }

    /// A table reported available again ends every session at it
    pub fn observe_table(&self, table: &DiningTable) {
        if !table.is_available() {
            return;
        }
        match self.session.clear_table(&table.id) {
            Ok(true) => {
                tracing::info!(table_id = %table.id, "Table vacated, sessions cleared");
            }
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to clear session: {}", e),
        }
    }

    /// The server no longer knows this order
    pub fn observe_missing(&self, order_id: &str) {
        match self.session.clear_order(order_id) {
            Ok(true) => {
                tracing::info!(order_id = %order_id, "Stale order reference, session cleared");
            }
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to clear session: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::{OrderSource, OrderStatus, TableStatus};

    fn order(id: &str, table_id: &str, email: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            table_id: table_id.to_string(),
            table_name: "Mesa 1".to_string(),
            customer_name: "Ana".to_string(),
            customer_email: Some(email.to_string()),
            customer_id: None,
            items: vec![],
            status,
            queue_position: None,
            total_amount: 15.0,
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
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = SessionStore::open(dir.path());
        store.record_active_order("t1", "ana@mesa.es", "o42").unwrap();
        store.remember_email("t1", "ana@mesa.es").unwrap();
        drop(store);

        let reopened = SessionStore::open(dir.path());
        assert_eq!(
            reopened.active_order("t1", "ana@mesa.es").as_deref(),
            Some("o42")
        );
        assert_eq!(reopened.saved_email("t1").as_deref(), Some("ana@mesa.es"));
    }

    #[test]
    fn keys_use_the_flat_session_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.record_active_order("t1", "ana@mesa.es", "o42").unwrap();
        store.remember_email("t1", "ana@mesa.es").unwrap();

        let raw = fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["entries"]["active_order_t1_ana@mesa.es"], "o42");
        assert_eq!(json["entries"]["customer_email_t1"], "ana@mesa.es");
    }

    #[test]
    fn clear_table_keeps_the_remembered_email() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.record_active_order("t1", "ana@mesa.es", "o1").unwrap();
        store.record_active_order("t1", "luis@mesa.es", "o2").unwrap();
        store.record_active_order("t2", "ana@mesa.es", "o3").unwrap();
        store.remember_email("t1", "ana@mesa.es").unwrap();

        assert!(store.clear_table("t1").unwrap());

        assert_eq!(store.active_order("t1", "ana@mesa.es"), None);
        assert_eq!(store.active_order("t1", "luis@mesa.es"), None);
        // Other tables and the prefill email are untouched
        assert_eq!(store.active_order("t2", "ana@mesa.es").as_deref(), Some("o3"));
        assert_eq!(store.saved_email("t1").as_deref(), Some("ana@mesa.es"));
    }

    #[test]
    fn corrupted_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "not json{").unwrap();

        let store = SessionStore::open(dir.path());
        assert_eq!(store.active_order("t1", "ana@mesa.es"), None);
        // And it can write again
        store.record_active_order("t1", "ana@mesa.es", "o1").unwrap();
        assert!(store.active_order("t1", "ana@mesa.es").is_some());
    }

    #[test]
    fn tracker_clears_when_order_leaves_open_set() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionStore::open(dir.path()));
        session.record_active_order("t1", "ana@mesa.es", "o1").unwrap();

        let tracker = ActiveOrderTracker::new(session.clone());

        // Open statuses keep the session alive
        tracker.observe_order(&order("o1", "t1", "ana@mesa.es", OrderStatus::Ready));
        assert!(session.active_order("t1", "ana@mesa.es").is_some());

        tracker.observe_order(&order("o1", "t1", "ana@mesa.es", OrderStatus::Completed));
        assert_eq!(session.active_order("t1", "ana@mesa.es"), None);
    }

    #[test]
    fn tracker_clears_all_sessions_on_vacated_table() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionStore::open(dir.path()));
        session.record_active_order("t1", "ana@mesa.es", "o1").unwrap();
        session.record_active_order("t1", "luis@mesa.es", "o2").unwrap();

        let tracker = ActiveOrderTracker::new(session.clone());
        let table = DiningTable {
            id: "t1".to_string(),
            name: "Mesa 1".to_string(),
            qr_code_url: "https://mesa.example/qr/t1".to_string(),
            status: TableStatus::Available,
            occupied_since: None,
            current_occupants: vec![],
            created_at: Utc::now(),
        };
        tracker.observe_table(&table);

        assert_eq!(session.active_order("t1", "ana@mesa.es"), None);
        assert_eq!(session.active_order("t1", "luis@mesa.es"), None);
    }
}
