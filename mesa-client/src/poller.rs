//! Polling fallback
//!
//! Push delivery is best-effort, so every surface keeps a poll loop running
//! underneath it. Each tick fetches its scope and hands the snapshot to the
//! reconciler; the shared merge rule makes overlap between an in-flight
//! fetch and a push event harmless, so nothing coordinates the two.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use shared::models::{CallStatus, OrderStatus};

use crate::api::{ApiSet, CallFilter, OrderFilter};
use crate::error::{ClientError, ClientResult};
use crate::reconciler::Reconciler;

const KITCHEN_STATUSES: [OrderStatus; 2] = [OrderStatus::Confirmed, OrderStatus::Preparing];

/// What a poll loop keeps fresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollScope {
    /// Pending orders and pending call requests (waiter dashboard)
    WaiterTasks,
    /// Confirmed and preparing orders (kitchen queue)
    KitchenQueue,
    /// One order by id (customer tracking screen)
    CustomerOrder { order_id: String },
    /// The table list (floor overview)
    Tables,
}

/// Spawns and drives poll loops
#[derive(Debug, Clone)]
pub struct PollService {
    apis: ApiSet,
    reconciler: Reconciler,
}

impl PollService {
    pub fn new(apis: ApiSet, reconciler: Reconciler) -> Self {
        Self { apis, reconciler }
    }

    /// Fetch a scope once and reconcile the snapshot
    pub async fn poll_once(&self, scope: &PollScope) -> ClientResult<()> {
        match scope {
            PollScope::WaiterTasks => {
                let orders = self
                    .apis
                    .orders
                    .list(&OrderFilter::statuses(&[OrderStatus::Pending]))
                    .await?;
                self.reconciler.sync_orders(&[OrderStatus::Pending], orders);

                let calls = self
                    .apis
                    .calls
                    .list(&CallFilter::status(CallStatus::Pending))
                    .await?;
                self.reconciler.sync_calls(calls);
            }
            PollScope::KitchenQueue => {
                let orders = self
                    .apis
                    .orders
                    .list(&OrderFilter::statuses(&KITCHEN_STATUSES))
                    .await?;
                self.reconciler.sync_orders(&KITCHEN_STATUSES, orders);
            }
            PollScope::CustomerOrder { order_id } => match self.apis.orders.get(order_id).await {
                Ok(order) => {
                    self.reconciler.apply_order(order);
                }
                Err(ClientError::NotFound(_)) => {
                    self.reconciler.order_missing(order_id);
                }
                Err(e) => return Err(e),
            },
            PollScope::Tables => {
                let tables = self.apis.tables.list().await?;
                self.reconciler.sync_tables(tables);
            }
        }
        Ok(())
    }

    /// Start a poll loop for a scope.
    ///
    /// Each tick runs its fetch in its own task so a slow response never
    /// delays the next tick. A failed poll logs and keeps the cached
    /// records; the next tick retries.
    pub fn start(&self, scope: PollScope, every: Duration) -> PollHandle {
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let service = self.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let service = service.clone();
                        let tick_scope = scope.clone();
                        tokio::spawn(async move {
                            if let Err(e) = service.poll_once(&tick_scope).await {
                                tracing::warn!(
                                    scope = ?tick_scope,
                                    error = %e,
                                    "Poll failed, keeping cached records"
                                );
                            }
                        });
                    }
                    _ = loop_token.cancelled() => {
                        tracing::debug!(scope = ?scope, "Poll loop stopped");
                        return;
                    }
                }
            }
        });

        PollHandle { token, handle }
    }
}

/// Owns one running poll loop and stops it when dropped
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Ask the loop to stop
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether the loop has wound down
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthApi, CallRequestsApi, OrdersApi, TablesApi};
    use crate::session::{ActiveOrderTracker, SessionStore};
    use crate::store::SyncStore;
    use async_trait::async_trait;
    use shared::client::{LoginRequest, LoginResponse};
    use shared::models::{
        CallRequest, CallRequestCreate, DiningTable, DiningTableUpdate, Order, OrderCreate,
        OrderSource,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            table_id: "t1".to_string(),
            table_name: "Mesa 1".to_string(),
            customer_name: "Ana".to_string(),
            customer_email: Some("ana@mesa.es".to_string()),
            customer_id: None,
            items: vec![],
            status,
            queue_position: None,
            total_amount: 18.0,
            order_source: OrderSource::Customer,
            claimed_by: None,
            claimed_at: None,
            created_at: chrono::Utc::now(),
            confirmed_at: None,
            ready_at: None,
            completed_at: None,
        }
    }

    /// Stub that fails every call; tests swap in what they need
    struct NoApi;

    #[async_trait]
    impl OrdersApi for NoApi {
        async fn list(&self, _: &OrderFilter) -> ClientResult<Vec<Order>> {
            unimplemented!()
        }
        async fn get(&self, _: &str) -> ClientResult<Order> {
            unimplemented!()
        }
        async fn create(&self, _: &OrderCreate) -> ClientResult<Order> {
            unimplemented!()
        }
        async fn update_status(&self, _: &str, _: OrderStatus) -> ClientResult<Order> {
            unimplemented!()
        }
        async fn claim(&self, _: &str) -> ClientResult<Order> {
            unimplemented!()
        }
        async fn release(&self, _: &str) -> ClientResult<Order> {
            unimplemented!()
        }
    }

    #[async_trait]
    impl CallRequestsApi for NoApi {
        async fn list(&self, _: &CallFilter) -> ClientResult<Vec<CallRequest>> {
            Ok(vec![])
        }
        async fn create(&self, _: &CallRequestCreate) -> ClientResult<CallRequest> {
            unimplemented!()
        }
        async fn claim(&self, _: &str) -> ClientResult<CallRequest> {
            unimplemented!()
        }
        async fn release(&self, _: &str) -> ClientResult<CallRequest> {
            unimplemented!()
        }
        async fn complete(&self, _: &str) -> ClientResult<CallRequest> {
            unimplemented!()
        }
    }

    #[async_trait]
    impl TablesApi for NoApi {
        async fn list(&self) -> ClientResult<Vec<DiningTable>> {
            Ok(vec![])
        }
        async fn update(&self, _: &str, _: &DiningTableUpdate) -> ClientResult<DiningTable> {
            unimplemented!()
        }
    }

    #[async_trait]
    impl AuthApi for NoApi {
        async fn login(&self, _: &LoginRequest) -> ClientResult<LoginResponse> {
            unimplemented!()
        }
        async fn logout(&self) -> ClientResult<()> {
            unimplemented!()
        }
    }

    struct MissingOrder;

    #[async_trait]
    impl OrdersApi for MissingOrder {
        async fn list(&self, _: &OrderFilter) -> ClientResult<Vec<Order>> {
            unimplemented!()
        }
        async fn get(&self, _: &str) -> ClientResult<Order> {
            Err(ClientError::NotFound("order".to_string()))
        }
        async fn create(&self, _: &OrderCreate) -> ClientResult<Order> {
            unimplemented!()
        }
        async fn update_status(&self, _: &str, _: OrderStatus) -> ClientResult<Order> {
            unimplemented!()
        }
        async fn claim(&self, _: &str) -> ClientResult<Order> {
            unimplemented!()
        }
        async fn release(&self, _: &str) -> ClientResult<Order> {
            unimplemented!()
        }
    }

    /// Counts `list` calls, returns nothing
    struct CountingTables(AtomicUsize);

    #[async_trait]
    impl TablesApi for CountingTables {
        async fn list(&self) -> ClientResult<Vec<DiningTable>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
        async fn update(&self, _: &str, _: &DiningTableUpdate) -> ClientResult<DiningTable> {
            unimplemented!()
        }
    }

    fn service_with(
        dir: &std::path::Path,
        orders: Arc<dyn OrdersApi>,
        tables: Arc<dyn TablesApi>,
    ) -> (PollService, Arc<SyncStore>, Arc<SessionStore>) {
        let store = Arc::new(SyncStore::new());
        let session = Arc::new(SessionStore::open(dir));
        let reconciler = Reconciler::new(store.clone(), ActiveOrderTracker::new(session.clone()));
        let apis = ApiSet {
            orders,
            calls: Arc::new(NoApi),
            tables,
            auth: Arc::new(NoApi),
        };
        (PollService::new(apis, reconciler), store, session)
    }

    #[tokio::test]
    async fn customer_scope_drops_missing_orders() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store, session) =
            service_with(dir.path(), Arc::new(MissingOrder), Arc::new(NoApi));

        store.apply_order(order("o1", OrderStatus::Confirmed));
        session.record_active_order("t1", "ana@mesa.es", "o1").unwrap();

        service
            .poll_once(&PollScope::CustomerOrder {
                order_id: "o1".to_string(),
            })
            .await
            .unwrap();

        assert!(store.order("o1").is_none());
        assert_eq!(session.active_order("t1", "ana@mesa.es"), None);
    }

    #[tokio::test]
    async fn poll_loop_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(CountingTables(AtomicUsize::new(0)));
        let (service, _, _) = service_with(dir.path(), Arc::new(NoApi), counter.clone());

        let handle = service.start(PollScope::Tables, Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(handle.is_finished());
        let after_stop = counter.0.load(Ordering::SeqCst);
        assert!(after_stop >= 1);

        // No further ticks after cancellation
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), after_stop);
    }
}
