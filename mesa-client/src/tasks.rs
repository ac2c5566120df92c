//! Waiter task feed
//!
//! A task is anything a waiter can act on right now: a pending order to
//! confirm or a pending call request to answer. The visible list is derived
//! fresh from cache snapshots on every read; nothing is stored, so there is
//! no second copy to invalidate when records change underneath.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::store::{Sequenced, SyncStore};
use shared::models::{CallKind, CallRequest, CallStatus, Order, OrderStatus};

/// What kind of work a task is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// A pending order waiting for confirmation
    Order,
    /// A pending call request
    Call(CallKind),
}

/// One actionable item in a waiter's list
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub kind: TaskKind,
    pub table_name: String,
    pub customer_name: String,
    /// What to show: the item summary for orders, the request phrase for calls
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub claimed_by: Option<String>,
    seq: u64,
}

impl Task {
    fn from_order(order: &Order, seq: u64) -> Self {
        Self {
            id: order.id.clone(),
            kind: TaskKind::Order,
            table_name: order.table_name.clone(),
            customer_name: order.customer_name.clone(),
            message: order.item_summary(),
            created_at: order.created_at,
            claimed_by: order.claimed_by.clone(),
            seq,
        }
    }

    fn from_call(call: &CallRequest, seq: u64) -> Self {
        Self {
            id: call.id.clone(),
            kind: TaskKind::Call(call.kind),
            table_name: call.table_name.clone(),
            customer_name: call.customer_name.clone(),
            message: call.kind.message().to_string(),
            created_at: call.created_at,
            claimed_by: call.claimed_by.clone(),
            seq,
        }
    }
}

fn visible_to(claimed_by: Option<&str>, waiter_id: &str) -> bool {
    match claimed_by {
        None => true,
        Some(holder) => holder == waiter_id,
    }
}

/// Derive the task list one waiter should see.
///
/// Included: pending orders and pending call requests that are unclaimed or
/// claimed by this waiter, minus locally skipped ids. Sorted newest first;
/// ties on equal timestamps keep their insertion order.
pub fn visible_tasks(
    orders: &[Sequenced<Order>],
    calls: &[Sequenced<CallRequest>],
    waiter_id: &str,
    skipped: &HashSet<String>,
) -> Vec<Task> {
    let mut tasks: Vec<Task> = orders
        .iter()
        .filter(|s| s.record.status == OrderStatus::Pending)
        .filter(|s| visible_to(s.record.claimed_by.as_deref(), waiter_id))
        .filter(|s| !skipped.contains(&s.record.id))
        .map(|s| Task::from_order(&s.record, s.seq))
        .chain(
            calls
                .iter()
                .filter(|s| s.record.status == CallStatus::Pending)
                .filter(|s| visible_to(s.record.claimed_by.as_deref(), waiter_id))
                .filter(|s| !skipped.contains(&s.record.id))
                .map(|s| Task::from_call(&s.record, s.seq)),
        )
        .collect();

    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.seq.cmp(&b.seq)));
    tasks
}

/// A waiter's live view over the store.
///
/// Skipping hides a task on this device only. The server never hears about
/// it, so other waiters keep seeing the task; releasing a claim is the
/// server-visible counterpart.
#[derive(Debug)]
pub struct TaskFeed {
    store: Arc<SyncStore>,
    waiter_id: String,
    skipped: RwLock<HashSet<String>>,
}

impl TaskFeed {
    pub fn new(store: Arc<SyncStore>, waiter_id: impl Into<String>) -> Self {
        Self {
            store,
            waiter_id: waiter_id.into(),
            skipped: RwLock::new(HashSet::new()),
        }
    }

    pub fn waiter_id(&self) -> &str {
        &self.waiter_id
    }

    /// Hide a task on this device
    pub fn skip(&self, task_id: impl Into<String>) {
        self.skipped.write().insert(task_id.into());
    }

    /// Forget all local skips
    pub fn clear_skips(&self) {
        self.skipped.write().clear();
    }

    /// The tasks this waiter should see right now
    pub fn visible(&self) -> Vec<Task> {
        visible_tasks(
            &self.store.sequenced_orders(),
            &self.store.sequenced_calls(),
            &self.waiter_id,
            &self.skipped.read(),
        )
    }
}
