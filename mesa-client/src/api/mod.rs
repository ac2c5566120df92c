//! Typed access to the Mesa REST API
//!
//! Each resource gets a small trait so the engine can run against the real
//! HTTP backend or an in-process fake in tests. [`ApiSet`] bundles the four
//! handles the engine needs.

mod http;

pub use http::{HttpAuthApi, HttpCallRequestsApi, HttpOrdersApi, HttpTablesApi};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use shared::client::{LoginRequest, LoginResponse};
use shared::models::{
    CallRequest, CallRequestCreate, CallStatus, DiningTable, DiningTableUpdate, Order,
    OrderCreate, OrderStatus,
};

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Filter for `GET /orders`
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Restrict to a single table
    pub table_id: Option<String>,
    /// Restrict to these statuses (comma-joined on the wire)
    pub statuses: Vec<OrderStatus>,
}

impl OrderFilter {
    /// Orders for one table, any status
    pub fn table(table_id: impl Into<String>) -> Self {
        Self {
            table_id: Some(table_id.into()),
            statuses: Vec::new(),
        }
    }

    /// Orders in any of the given statuses, any table
    pub fn statuses(statuses: &[OrderStatus]) -> Self {
        Self {
            table_id: None,
            statuses: statuses.to_vec(),
        }
    }

    /// Restrict an existing filter to the given statuses
    pub fn with_statuses(mut self, statuses: &[OrderStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    /// Render as a query string (empty when unfiltered)
    pub fn query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(table_id) = &self.table_id {
            parts.push(format!("tableId={}", table_id));
        }
        if !self.statuses.is_empty() {
            let joined = self
                .statuses
                .iter()
                .map(OrderStatus::as_str)
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("status={}", joined));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

/// Filter for `GET /call-requests`
#[derive(Debug, Clone, Default)]
pub struct CallFilter {
    pub table_id: Option<String>,
    pub status: Option<CallStatus>,
}

impl CallFilter {
    /// Calls in the given status, any table
    pub fn status(status: CallStatus) -> Self {
        Self {
            table_id: None,
            status: Some(status),
        }
    }

    /// Render as a query string (empty when unfiltered)
    pub fn query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(table_id) = &self.table_id {
            parts.push(format!("tableId={}", table_id));
        }
        if let Some(status) = self.status {
            parts.push(format!("status={}", status.as_str()));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

/// Order endpoints
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// `GET /orders` with optional filters
    async fn list(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>>;

    /// `GET /orders/:id`
    async fn get(&self, order_id: &str) -> ClientResult<Order>;

    /// `POST /orders`
    async fn create(&self, payload: &OrderCreate) -> ClientResult<Order>;

    /// `PUT /orders/:id/status`
    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order>;

    /// `POST /orders/:id/claim`. The server arbitrates races; losers get
    /// a conflict error and the winning record stands.
    async fn claim(&self, order_id: &str) -> ClientResult<Order>;

    /// `POST /orders/:id/release`
    async fn release(&self, order_id: &str) -> ClientResult<Order>;
}

/// Call request endpoints
#[async_trait]
pub trait CallRequestsApi: Send + Sync {
    /// `GET /call-requests` with optional filters
    async fn list(&self, filter: &CallFilter) -> ClientResult<Vec<CallRequest>>;

    /// `POST /call-requests`
    async fn create(&self, payload: &CallRequestCreate) -> ClientResult<CallRequest>;

    /// `POST /call-requests/:id/claim`
    async fn claim(&self, call_id: &str) -> ClientResult<CallRequest>;

    /// `POST /call-requests/:id/release`
    async fn release(&self, call_id: &str) -> ClientResult<CallRequest>;

    /// `PUT /call-requests/:id/complete`
    async fn complete(&self, call_id: &str) -> ClientResult<CallRequest>;
}

/// Table endpoints
#[async_trait]
pub trait TablesApi: Send + Sync {
    /// `GET /tables`
    async fn list(&self) -> ClientResult<Vec<DiningTable>>;

    /// `PUT /tables/:id`
    async fn update(&self, table_id: &str, update: &DiningTableUpdate)
    -> ClientResult<DiningTable>;
}

/// Auth endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse>;

    /// `POST /auth/logout`
    async fn logout(&self) -> ClientResult<()>;
}

/// The set of API handles the engine runs on
#[derive(Clone)]
pub struct ApiSet {
    pub orders: Arc<dyn OrdersApi>,
    pub calls: Arc<dyn CallRequestsApi>,
    pub tables: Arc<dyn TablesApi>,
    pub auth: Arc<dyn AuthApi>,
}

impl ApiSet {
    /// Build the HTTP-backed API set over a shared client
    pub fn http(http: Arc<HttpClient>) -> Self {
        Self {
            orders: Arc::new(HttpOrdersApi::new(http.clone())),
            calls: Arc::new(HttpCallRequestsApi::new(http.clone())),
            tables: Arc::new(HttpTablesApi::new(http.clone())),
            auth: Arc::new(HttpAuthApi::new(http)),
        }
    }
}

impl fmt::Debug for ApiSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSet").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_filter_joins_statuses_with_commas() {
        let filter = OrderFilter::statuses(&[OrderStatus::Pending, OrderStatus::Confirmed]);
        assert_eq!(filter.query(), "?status=pending,confirmed");
    }

    #[test]
    fn order_filter_combines_table_and_status() {
        let filter = OrderFilter::table("t42").with_statuses(&[
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
        ]);
        assert_eq!(
            filter.query(),
            "?tableId=t42&status=pending,confirmed,preparing,ready"
        );
    }

    #[test]
    fn empty_filters_render_no_query() {
        assert_eq!(OrderFilter::default().query(), "");
        assert_eq!(CallFilter::default().query(), "");
        assert_eq!(
            CallFilter::status(CallStatus::Pending).query(),
            "?status=pending"
        );
    }
}
