//! The synchronization engine
//!
//! One [`SyncEngine`] wires the whole client together: the REST APIs, the
//! push event stream, the poll loops, the record cache and the persisted
//! customer session. Construction does no IO; [`SyncEngine::sign_in`] or
//! [`SyncEngine::connect_events`] bring the realtime half up, and every
//! surface (waiter feed, kitchen queue, customer tracker) reads from the
//! same store underneath.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use shared::client::{LoginRequest, UserInfo};
use shared::models::{
    CallRequest, CallRequestCreate, DiningTable, DiningTableUpdate, Order, OrderCreate,
    OrderStatus, TableOccupant,
};

use crate::api::{ApiSet, OrderFilter};
use crate::config::ClientConfig;
use crate::coordinator::TaskCoordinator;
use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;
use crate::poller::{PollHandle, PollScope, PollService};
use crate::realtime::EventClient;
use crate::reconciler::Reconciler;
use crate::session::{ActiveOrderTracker, SessionStore};
use crate::store::{StoreChange, SyncStore};
use crate::tasks::TaskFeed;

/// Order & task state synchronization engine
pub struct SyncEngine {
    config: ClientConfig,
    http: Arc<HttpClient>,
    apis: ApiSet,
    store: Arc<SyncStore>,
    session: Arc<SessionStore>,
    reconciler: Reconciler,
    poller: PollService,
    coordinator: TaskCoordinator,
    current_user: RwLock<Option<UserInfo>>,
    events: Mutex<EventPump>,
}

#[derive(Default)]
struct EventPump {
    client: Option<EventClient>,
    task: Option<JoinHandle<()>>,
}

impl SyncEngine {
    /// Engine over the HTTP backend named in the configuration
    pub fn new(config: ClientConfig) -> Self {
        let http = Arc::new(HttpClient::new(&config));
        let apis = ApiSet::http(http.clone());
        Self::assemble(config, http, apis)
    }

    /// Engine over custom API implementations (in-process fakes, tests)
    pub fn with_apis(config: ClientConfig, apis: ApiSet) -> Self {
        let http = Arc::new(HttpClient::new(&config));
        Self::assemble(config, http, apis)
    }

    fn assemble(config: ClientConfig, http: Arc<HttpClient>, apis: ApiSet) -> Self {
        let store = Arc::new(SyncStore::new());
        let session = Arc::new(SessionStore::open(&config.session_dir));
        let tracker = ActiveOrderTracker::new(session.clone());
        let reconciler = Reconciler::new(store.clone(), tracker);
        let poller = PollService::new(apis.clone(), reconciler.clone());
        let coordinator = TaskCoordinator::new(apis.clone(), reconciler.clone());

        Self {
            config,
            http,
            apis,
            store,
            session,
            reconciler,
            poller,
            coordinator,
            current_user: RwLock::new(None),
            events: Mutex::new(EventPump::default()),
        }
    }

    // ==================== Auth ====================

    /// Sign in and bring up the push stream when one is configured.
    /// A refused stream is not fatal; polling covers until it returns.
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<UserInfo> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.apis.auth.login(&request).await?;
        self.http.set_token(Some(response.token.clone()));
        *self.current_user.write() = Some(response.user.clone());
        tracing::info!(user = %response.user.email, role = ?response.user.role, "Signed in");

        if let Some(addr) = self.config.event_addr.clone() {
            match EventClient::connect(&addr, &response.token).await {
                Ok(client) => self.attach_events(client).await,
                Err(e) => {
                    tracing::warn!(addr = %addr, "Event stream unavailable, relying on polling: {}", e);
                }
            }
        }
        Ok(response.user)
    }

    /// Sign out: stop the event pump, tell the server, drop the token
    pub async fn sign_out(&self) -> ClientResult<()> {
        self.detach_events().await;
        if let Err(e) = self.apis.auth.logout().await {
            tracing::warn!("Logout call failed: {}", e);
        }
        self.http.set_token(None);
        *self.current_user.write() = None;
        tracing::info!("Signed out");
        Ok(())
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<UserInfo> {
        self.current_user.read().clone()
    }

    // ==================== Event stream ====================

    /// Connect the push stream without signing in (customer surfaces
    /// have no account)
    pub async fn connect_events(&self) -> ClientResult<()> {
        let Some(addr) = self.config.event_addr.clone() else {
            return Ok(());
        };
        let token = self.http.token().unwrap_or_default();
        let client = EventClient::connect(&addr, &token).await?;
        self.attach_events(client).await;
        Ok(())
    }

    /// Attach a connected event client and pump its events into the
    /// reconciler. Re-attaching replaces the previous pump, so a reconnect
    /// never leaves two pumps applying the same stream.
    pub async fn attach_events(&self, client: EventClient) {
        let mut pump = self.events.lock().await;
        if let Some(task) = pump.task.take() {
            task.abort();
        }
        if let Some(old) = pump.client.take() {
            let _ = old.close().await;
        }

        let mut rx = client.subscribe();
        let reconciler = self.reconciler.clone();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => reconciler.apply_event(event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Event pump lagged; poll loops will reconcile");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        pump.client = Some(client);
        pump.task = Some(task);
    }

    /// Stop the event pump and close the stream
    pub async fn detach_events(&self) {
        let mut pump = self.events.lock().await;
        if let Some(task) = pump.task.take() {
            task.abort();
        }
        if let Some(client) = pump.client.take() {
            let _ = client.close().await;
        }
    }

    // ==================== Polling ====================

    fn interval_for(&self, scope: &PollScope) -> Duration {
        match scope {
            PollScope::WaiterTasks => self.config.task_poll,
            PollScope::KitchenQueue => self.config.queue_poll,
            PollScope::CustomerOrder { .. } => self.config.task_poll,
            PollScope::Tables => self.config.table_poll,
        }
    }

    /// Start the polling fallback for a scope at its configured interval
    pub fn start_polling(&self, scope: PollScope) -> PollHandle {
        let every = self.interval_for(&scope);
        self.poller.start(scope, every)
    }

    /// Fetch a scope once (initial load, manual refresh)
    pub async fn refresh(&self, scope: &PollScope) -> ClientResult<()> {
        self.poller.poll_once(scope).await
    }

    // ==================== Customer flow ====================

    /// Place an order and remember it as this (table, email)'s active order
    pub async fn place_order(&self, payload: OrderCreate) -> ClientResult<Order> {
        let order = self.apis.orders.create(&payload).await?;
        tracing::info!(order_id = %order.id, table_id = %order.table_id, "Order placed");
        self.reconciler.apply_order(order.clone());
        if let Some(email) = order.customer_email.as_deref() {
            self.session
                .record_active_order(&order.table_id, email, &order.id)?;
            self.session.remember_email(&order.table_id, email)?;
        }
        Ok(order)
    }

    /// The order this (table, email) pair should resume tracking.
    ///
    /// The persisted session is checked first; a dead reference is cleared
    /// and the server is asked for open orders at the table instead. A
    /// transport failure propagates without touching the session, so a
    /// network blip cannot end a live one.
    pub async fn resume_order(
        &self,
        table_id: &str,
        customer_email: &str,
    ) -> ClientResult<Option<Order>> {
        if let Some(order_id) = self.session.active_order(table_id, customer_email) {
            match self.apis.orders.get(&order_id).await {
                Ok(order) if order.status.is_open() => {
                    self.reconciler.apply_order(order.clone());
                    return Ok(Some(order));
                }
                Ok(order) => {
                    // Closed while we were away; the tracker clears the session
                    self.reconciler.apply_order(order);
                }
                Err(ClientError::NotFound(_)) => {
                    self.reconciler.order_missing(&order_id);
                }
                Err(e) => return Err(e),
            }
        }
        self.find_open_order(table_id, customer_email).await
    }

    /// Ask the server whether this (table, email) already has an open
    /// order. Covers a lost session file.
    async fn find_open_order(
        &self,
        table_id: &str,
        customer_email: &str,
    ) -> ClientResult<Option<Order>> {
        let filter = OrderFilter::table(table_id).with_statuses(&OrderStatus::OPEN);
        let orders = self.apis.orders.list(&filter).await?;
        for order in orders {
            if order.customer_email.as_deref() == Some(customer_email) {
                self.reconciler.apply_order(order.clone());
                self.session
                    .record_active_order(table_id, customer_email, &order.id)?;
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    /// Prime the cache for one order and keep it fresh
    pub async fn track_order(&self, order_id: &str) -> ClientResult<PollHandle> {
        let scope = PollScope::CustomerOrder {
            order_id: order_id.to_string(),
        };
        self.refresh(&scope).await?;
        Ok(self.start_polling(scope))
    }

    /// Progress of a cached order, 0.0 at pending to 1.0 at completed
    pub fn order_progress(&self, order_id: &str) -> Option<f32> {
        self.store.order(order_id).map(|o| o.progress())
    }

    /// Place a call request (bill, napkins, cleaning)
    pub async fn place_call(&self, payload: CallRequestCreate) -> ClientResult<CallRequest> {
        let call = self.apis.calls.create(&payload).await?;
        tracing::info!(call_id = %call.id, kind = %call.kind, "Call request placed");
        self.reconciler.apply_call(call.clone());
        Ok(call)
    }

    /// Last email used at this table, for prefill
    pub fn saved_email(&self, table_id: &str) -> Option<String> {
        self.session.saved_email(table_id)
    }

    // ==================== Tables ====================

    /// Seat occupants at a table (customer landing flow)
    pub async fn occupy_table(
        &self,
        table_id: &str,
        occupants: Vec<TableOccupant>,
    ) -> ClientResult<DiningTable> {
        let table = self
            .apis
            .tables
            .update(table_id, &DiningTableUpdate::occupy(occupants))
            .await?;
        self.reconciler.apply_table(table.clone());
        Ok(table)
    }

    /// Mark a table available again (staff flow). Every session at it ends.
    pub async fn vacate_table(&self, table_id: &str) -> ClientResult<DiningTable> {
        let table = self
            .apis
            .tables
            .update(table_id, &DiningTableUpdate::vacate())
            .await?;
        tracing::info!(table_id = %table.id, "Table vacated");
        self.reconciler.apply_table(table.clone());
        Ok(table)
    }

    // ==================== Views ====================

    /// A waiter's live task feed over the shared store
    pub fn task_feed(&self, waiter_id: impl Into<String>) -> TaskFeed {
        TaskFeed::new(self.store.clone(), waiter_id)
    }

    /// Claims, releases and lifecycle transitions
    pub fn coordinator(&self) -> &TaskCoordinator {
        &self.coordinator
    }

    /// The shared record cache
    pub fn store(&self) -> &Arc<SyncStore> {
        &self.store
    }

    /// The persisted customer session
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Change notifications from the record cache
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthApi, CallFilter, CallRequestsApi, OrdersApi, TablesApi};
    use async_trait::async_trait;
    use chrono::Utc;
    use shared::EventFrame;
    use shared::client::{LoginResponse, UserRole};
    use shared::event::ORDER_NEW;
    use shared::models::OrderSource;

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
            total_amount: 40.0,
            order_source: OrderSource::Customer,
            claimed_by: None,
            claimed_at: None,
            created_at: Utc::now(),
            confirmed_at: None,
            ready_at: None,
            completed_at: None,
        }
    }

    struct FakeAuth;

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
            Ok(LoginResponse {
                token: "tok-123".to_string(),
                user: UserInfo {
                    id: "w1".to_string(),
                    name: "Marta".to_string(),
                    email: request.email.clone(),
                    role: UserRole::Waiter,
                },
            })
        }
        async fn logout(&self) -> ClientResult<()> {
            Ok(())
        }
    }

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
            unimplemented!()
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
            unimplemented!()
        }
        async fn update(&self, _: &str, _: &DiningTableUpdate) -> ClientResult<DiningTable> {
            unimplemented!()
        }
    }

    fn engine(dir: &std::path::Path) -> SyncEngine {
        let config = ClientConfig::new("http://localhost:8080").with_session_dir(dir);
        let apis = ApiSet {
            orders: Arc::new(NoApi),
            calls: Arc::new(NoApi),
            tables: Arc::new(NoApi),
            auth: Arc::new(FakeAuth),
        };
        SyncEngine::with_apis(config, apis)
    }

    #[tokio::test]
    async fn sign_in_installs_the_token_and_user() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path());

        let user = engine.sign_in("marta@mesa.es", "secret").await.unwrap();
        assert_eq!(user.id, "w1");
        assert_eq!(engine.current_user().unwrap().email, "marta@mesa.es");

        engine.sign_out().await.unwrap();
        assert!(engine.current_user().is_none());
    }

    #[tokio::test]
    async fn events_flow_into_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path());

        let (server_tx, _) = broadcast::channel(16);
        let (client_tx, _keep) = broadcast::channel(16);
        let client = EventClient::memory(&server_tx, &client_tx, "tok")
            .await
            .unwrap();
        engine.attach_events(client).await;

        let frame = EventFrame::new(ORDER_NEW, &order("o1", OrderStatus::Pending)).unwrap();
        server_tx.send(frame).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(engine.store().order("o1").is_some());
    }

    #[tokio::test]
    async fn reattaching_replaces_the_old_pump() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path());

        let (old_tx, _) = broadcast::channel(16);
        let (client_tx, _keep) = broadcast::channel(16);
        let old = EventClient::memory(&old_tx, &client_tx, "tok").await.unwrap();
        engine.attach_events(old).await;

        let (new_tx, _) = broadcast::channel(16);
        let new = EventClient::memory(&new_tx, &client_tx, "tok").await.unwrap();
        engine.attach_events(new).await;

        // Frames on the replaced stream no longer reach the store
        let stale = EventFrame::new(ORDER_NEW, &order("old", OrderStatus::Pending)).unwrap();
        let _ = old_tx.send(stale);
        // Frames on the live stream do
        let fresh = EventFrame::new(ORDER_NEW, &order("new", OrderStatus::Pending)).unwrap();
        new_tx.send(fresh).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(engine.store().order("new").is_some());
        assert!(engine.store().order("old").is_none());
    }
}
