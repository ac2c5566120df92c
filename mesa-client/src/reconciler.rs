//! Single entry point for server updates
//!
//! Push events, poll snapshots and REST responses all land here, so the
//! merge rule and the session bookkeeping run identically no matter which
//! channel delivered a record first. Both channels stay live at once; the
//! merge rule makes duplicate and out-of-order delivery harmless.

use std::sync::Arc;

use shared::PushEvent;
use shared::models::{CallRequest, DiningTable, Order, OrderStatus};

use crate::session::ActiveOrderTracker;
use crate::store::{Merge, SyncStore};

/// Routes incoming records into the store and keeps sessions honest
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: Arc<SyncStore>,
    tracker: ActiveOrderTracker,
}

impl Reconciler {
    pub fn new(store: Arc<SyncStore>, tracker: ActiveOrderTracker) -> Self {
        Self { store, tracker }
    }

    pub fn store(&self) -> &Arc<SyncStore> {
        &self.store
    }

    /// Route one push event through the merge rule
    pub fn apply_event(&self, event: PushEvent) {
        match event {
            PushEvent::OrderNew(order)
            | PushEvent::OrderUpdated(order)
            | PushEvent::OrderConfirmed(order) => {
                self.apply_order(order);
            }
            PushEvent::CallNew(call)
            | PushEvent::CallClaimed(call)
            | PushEvent::CallReleased(call)
            | PushEvent::CallCompleted(call) => {
                self.apply_call(call);
            }
            PushEvent::TableUpdated(table) => {
                self.apply_table(table);
            }
        }
    }

    /// Merge one order; a closed order retires any session tracking it
    pub fn apply_order(&self, order: Order) -> Merge {
        let outcome = self.store.apply_order(order.clone());
        if outcome.accepted() {
            self.tracker.observe_order(&order);
        }
        outcome
    }

    /// Merge one call request
    pub fn apply_call(&self, call: CallRequest) -> Merge {
        self.store.apply_call(call)
    }

    /// Merge one table; a vacated table retires every session at it
    pub fn apply_table(&self, table: DiningTable) -> Merge {
        let outcome = self.store.apply_table(table.clone());
        if outcome.accepted() {
            self.tracker.observe_table(&table);
        }
        outcome
    }

    /// Merge a poll snapshot of orders in the given statuses.
    ///
    /// Only open statuses are ever polled as lists, so eviction never has
    /// to touch sessions; a tracked order that closes is observed through
    /// its own record, not through absence from a list.
    pub fn sync_orders(&self, statuses: &[OrderStatus], fetched: Vec<Order>) -> Vec<String> {
        self.store.sync_orders(statuses, fetched)
    }

    /// Merge a poll snapshot of pending call requests
    pub fn sync_calls(&self, fetched: Vec<CallRequest>) -> Vec<String> {
        self.store.sync_calls(fetched)
    }

    /// Merge a poll snapshot of the table list
    pub fn sync_tables(&self, fetched: Vec<DiningTable>) {
        for table in fetched {
            self.apply_table(table);
        }
    }

    /// The server answered 404 for this order: drop it everywhere
    pub fn order_missing(&self, order_id: &str) {
        self.store.remove_order(order_id);
        self.tracker.observe_missing(order_id);
    }
}
