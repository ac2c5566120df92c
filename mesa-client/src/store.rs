//! Client-side cache of server-owned records
//!
//! [`SyncStore`] holds the latest accepted copy of every order, call request
//! and table this client has seen. All writes funnel through the merge
//! methods so push events and poll snapshots land under one rule:
//!
//! - a record with a new id is inserted
//! - a record whose status advanced replaces the cached copy
//! - at equal status, server-arbitrated side fields (claim holder) still
//!   replace the cached copy
//! - a record whose status went backwards is stale and ignored
//!
//! Orders only ever move forward through their lifecycle, so the status
//! comparison doubles as an out-of-order delivery guard.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use shared::models::{CallRequest, CallStatus, DiningTable, Order, OrderStatus};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Outcome of merging one incoming record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// First sighting, inserted
    Inserted,
    /// Replaced the cached copy
    Updated,
    /// Identical to the cached copy, nothing to do
    Unchanged,
    /// Older than the cached copy, dropped
    Stale,
}

impl Merge {
    /// Whether the incoming record was taken into the cache
    pub fn accepted(&self) -> bool {
        matches!(self, Merge::Inserted | Merge::Updated)
    }
}

/// Change notification sent to store subscribers
#[derive(Debug, Clone)]
pub enum StoreChange {
    /// An order was inserted or replaced
    Order(Order),
    /// A call request was inserted or replaced
    Call(CallRequest),
    /// A table was inserted or replaced
    Table(DiningTable),
    /// A poll snapshot dropped orders that left its scope
    OrdersEvicted(Vec<String>),
    /// A poll snapshot dropped call requests that left its scope
    CallsEvicted(Vec<String>),
}

/// A cached record plus its insertion sequence number.
///
/// The sequence is assigned once, when the id first enters the cache, and
/// survives updates. Sorting ties on equal timestamps break by it, so the
/// visible order of tasks never jitters between rebuilds.
#[derive(Debug, Clone)]
pub struct Sequenced<T> {
    pub record: T,
    pub seq: u64,
}

/// Shared cache of server-owned records
#[derive(Debug)]
pub struct SyncStore {
    orders: RwLock<HashMap<String, Sequenced<Order>>>,
    calls: RwLock<HashMap<String, Sequenced<CallRequest>>>,
    tables: RwLock<HashMap<String, Sequenced<DiningTable>>>,
    seq: AtomicU64,
    change_tx: broadcast::Sender<StoreChange>,
}

impl Default for SyncStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncStore {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            orders: RwLock::new(HashMap::new()),
            calls: RwLock::new(HashMap::new()),
            tables: RwLock::new(HashMap::new()),
            seq: AtomicU64::new(0),
            change_tx,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.change_tx.subscribe()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    // ==================== Orders ====================

    /// Merge one order into the cache
    pub fn apply_order(&self, incoming: Order) -> Merge {
        let mut changes = Vec::with_capacity(1);
        let outcome = {
            let mut orders = self.orders.write();
            self.merge_order(&mut orders, incoming, &mut changes)
        };
        self.notify(changes);
        outcome
    }

    fn merge_order(
        &self,
        orders: &mut HashMap<String, Sequenced<Order>>,
        incoming: Order,
        changes: &mut Vec<StoreChange>,
    ) -> Merge {
        match orders.get_mut(&incoming.id) {
            None => {
                let seq = self.next_seq();
                changes.push(StoreChange::Order(incoming.clone()));
                orders.insert(
                    incoming.id.clone(),
                    Sequenced {
                        record: incoming,
                        seq,
                    },
                );
                Merge::Inserted
            }
            Some(held) => {
                if incoming.status > held.record.status {
                    changes.push(StoreChange::Order(incoming.clone()));
                    held.record = incoming;
                    Merge::Updated
                } else if incoming.status < held.record.status {
                    tracing::debug!(
                        order_id = %incoming.id,
                        cached = %held.record.status,
                        incoming = %incoming.status,
                        "Ignoring stale order update"
                    );
                    Merge::Stale
                } else if incoming.claimed_by != held.record.claimed_by
                    || incoming.claimed_at != held.record.claimed_at
                {
                    changes.push(StoreChange::Order(incoming.clone()));
                    held.record = incoming;
                    Merge::Updated
                } else {
                    Merge::Unchanged
                }
            }
        }
    }

    /// Merge a poll snapshot of every order in the given statuses.
    ///
    /// Each fetched order goes through the normal merge rule. Cached orders
    /// still inside the polled statuses but absent from the snapshot left
    /// the scope on the server (advanced, claimed elsewhere, deleted) and
    /// are evicted. Returns the evicted ids.
    pub fn sync_orders(&self, statuses: &[OrderStatus], fetched: Vec<Order>) -> Vec<String> {
        let fresh: HashSet<String> = fetched.iter().map(|o| o.id.clone()).collect();
        let mut changes = Vec::new();
        let evicted = {
            let mut orders = self.orders.write();
            for incoming in fetched {
                self.merge_order(&mut orders, incoming, &mut changes);
            }
            let stale: Vec<String> = orders
                .values()
                .filter(|held| {
                    statuses.contains(&held.record.status) && !fresh.contains(&held.record.id)
                })
                .map(|held| held.record.id.clone())
                .collect();
            for id in &stale {
                orders.remove(id);
            }
            stale
        };
        self.notify(changes);
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "Evicted orders that left poll scope");
            let _ = self.change_tx.send(StoreChange::OrdersEvicted(evicted.clone()));
        }
        evicted
    }

    /// Drop one order from the cache (e.g. the server no longer knows it)
    pub fn remove_order(&self, order_id: &str) -> bool {
        let removed = self.orders.write().remove(order_id).is_some();
        if removed {
            let _ = self
                .change_tx
                .send(StoreChange::OrdersEvicted(vec![order_id.to_string()]));
        }
        removed
    }

    /// Latest accepted copy of one order
    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.orders.read().get(order_id).map(|h| h.record.clone())
    }

    /// All cached orders
    pub fn orders(&self) -> Vec<Order> {
        self.orders.read().values().map(|h| h.record.clone()).collect()
    }

    /// All cached orders with their insertion sequence
    pub fn sequenced_orders(&self) -> Vec<Sequenced<Order>> {
        self.orders.read().values().cloned().collect()
    }

    // ==================== Call requests ====================

    /// Merge one call request into the cache
    pub fn apply_call(&self, incoming: CallRequest) -> Merge {
        let mut changes = Vec::with_capacity(1);
        let outcome = {
            let mut calls = self.calls.write();
            self.merge_call(&mut calls, incoming, &mut changes)
        };
        self.notify(changes);
        outcome
    }

    fn merge_call(
        &self,
        calls: &mut HashMap<String, Sequenced<CallRequest>>,
        incoming: CallRequest,
        changes: &mut Vec<StoreChange>,
    ) -> Merge {
        match calls.get_mut(&incoming.id) {
            None => {
                let seq = self.next_seq();
                changes.push(StoreChange::Call(incoming.clone()));
                calls.insert(
                    incoming.id.clone(),
                    Sequenced {
                        record: incoming,
                        seq,
                    },
                );
                Merge::Inserted
            }
            Some(held) => {
                if incoming.status == held.record.status {
                    if incoming.claimed_by != held.record.claimed_by
                        || incoming.claimed_at != held.record.claimed_at
                    {
                        changes.push(StoreChange::Call(incoming.clone()));
                        held.record = incoming;
                        Merge::Updated
                    } else {
                        Merge::Unchanged
                    }
                } else if held.record.status == CallStatus::Completed {
                    // Completed is terminal
                    tracing::debug!(call_id = %incoming.id, "Ignoring stale call update");
                    Merge::Stale
                } else {
                    changes.push(StoreChange::Call(incoming.clone()));
                    held.record = incoming;
                    Merge::Updated
                }
            }
        }
    }

    /// Merge a poll snapshot of every pending call request.
    ///
    /// Cached pending calls absent from the snapshot were completed or
    /// deleted elsewhere and are evicted. Returns the evicted ids.
    pub fn sync_calls(&self, fetched: Vec<CallRequest>) -> Vec<String> {
        let fresh: HashSet<String> = fetched.iter().map(|c| c.id.clone()).collect();
        let mut changes = Vec::new();
        let evicted = {
            let mut calls = self.calls.write();
            for incoming in fetched {
                self.merge_call(&mut calls, incoming, &mut changes);
            }
            let stale: Vec<String> = calls
                .values()
                .filter(|held| {
                    held.record.status == CallStatus::Pending && !fresh.contains(&held.record.id)
                })
                .map(|held| held.record.id.clone())
                .collect();
            for id in &stale {
                calls.remove(id);
            }
            stale
        };
        self.notify(changes);
        if !evicted.is_empty() {
            let _ = self.change_tx.send(StoreChange::CallsEvicted(evicted.clone()));
        }
        evicted
    }

    /// Latest accepted copy of one call request
    pub fn call(&self, call_id: &str) -> Option<CallRequest> {
        self.calls.read().get(call_id).map(|h| h.record.clone())
    }

    /// All cached call requests
    pub fn calls(&self) -> Vec<CallRequest> {
        self.calls.read().values().map(|h| h.record.clone()).collect()
    }

    /// All cached call requests with their insertion sequence
    pub fn sequenced_calls(&self) -> Vec<Sequenced<CallRequest>> {
        self.calls.read().values().cloned().collect()
    }

    // ==================== Tables ====================

    /// Merge one table into the cache.
    ///
    /// Tables move between available and occupied in both directions, so
    /// there is no staleness direction; any status or occupant change
    /// replaces the cached copy.
    pub fn apply_table(&self, incoming: DiningTable) -> Merge {
        let mut changes = Vec::with_capacity(1);
        let outcome = {
            let mut tables = self.tables.write();
            match tables.get_mut(&incoming.id) {
                None => {
                    let seq = self.next_seq();
                    changes.push(StoreChange::Table(incoming.clone()));
                    tables.insert(
                        incoming.id.clone(),
                        Sequenced {
                            record: incoming,
                            seq,
                        },
                    );
                    Merge::Inserted
                }
                Some(held) => {
                    if incoming.status != held.record.status
                        || incoming.current_occupants != held.record.current_occupants
                    {
                        changes.push(StoreChange::Table(incoming.clone()));
                        held.record = incoming;
                        Merge::Updated
                    } else {
                        Merge::Unchanged
                    }
                }
            }
        };
        self.notify(changes);
        outcome
    }

    /// Latest accepted copy of one table
    pub fn table(&self, table_id: &str) -> Option<DiningTable> {
        self.tables.read().get(table_id).map(|h| h.record.clone())
    }

    /// All cached tables
    pub fn tables(&self) -> Vec<DiningTable> {
        self.tables.read().values().map(|h| h.record.clone()).collect()
    }

    fn notify(&self, changes: Vec<StoreChange>) {
        for change in changes {
            // Send fails only when nobody subscribed yet
            let _ = self.change_tx.send(change);
        }
    }
}
