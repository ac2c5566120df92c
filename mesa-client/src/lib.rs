//! Mesa Client - order & task state synchronization engine
//!
//! Client-side sync for the Mesa table-service platform. One engine keeps
//! customer order tracking, waiter task lists and the kitchen queue
//! consistent against the backend through two channels at once: a push
//! event stream and per-surface poll loops. All updates merge through a
//! single monotonic rule, so duplicates, overlaps and out-of-order
//! delivery are harmless.
//!
//! ```no_run
//! use mesa_client::{ClientConfig, PollScope, SyncEngine};
//!
//! # async fn run() -> mesa_client::ClientResult<()> {
//! let engine = SyncEngine::new(ClientConfig::from_env());
//! let user = engine.sign_in("marta@mesa.es", "secret").await?;
//!
//! let _poll = engine.start_polling(PollScope::WaiterTasks);
//! let feed = engine.task_feed(&user.id);
//! for task in feed.visible() {
//!     println!("{}: {} {}", task.table_name, task.customer_name, task.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod http;
pub mod poller;
pub mod realtime;
pub mod reconciler;
pub mod session;
pub mod store;
pub mod tasks;

pub use api::{ApiSet, AuthApi, CallFilter, CallRequestsApi, OrderFilter, OrdersApi, TablesApi};
pub use config::ClientConfig;
pub use coordinator::TaskCoordinator;
pub use engine::SyncEngine;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use poller::{PollHandle, PollScope, PollService};
pub use realtime::{EventClient, EventError};
pub use reconciler::Reconciler;
pub use session::{ActiveOrderTracker, SessionError, SessionStore};
pub use store::{Merge, Sequenced, StoreChange, SyncStore};
pub use tasks::{Task, TaskFeed, TaskKind, visible_tasks};

// Re-export shared types for convenience
pub use shared::client::{ListEnvelope, LoginRequest, LoginResponse, UserInfo, UserRole};
pub use shared::error::{ApiError, ErrorCode};
pub use shared::event::{EventFrame, PushEvent};
pub use shared::models::{
    CallKind, CallRequest, CallRequestCreate, CallStatus, Customization, DiningTable,
    DiningTableUpdate, Order, OrderCreate, OrderItem, OrderSource, OrderStatus,
    OrderStatusUpdate, TableOccupant, TableStatus,
};
