//! HTTP implementations of the API traits

use std::sync::Arc;

use async_trait::async_trait;
use shared::client::{ListEnvelope, LoginRequest, LoginResponse};
use shared::models::{
    CallRequest, CallRequestCreate, DiningTable, DiningTableUpdate, Order, OrderCreate,
    OrderStatus, OrderStatusUpdate,
};

use super::{AuthApi, CallFilter, CallRequestsApi, OrderFilter, OrdersApi, TablesApi};
use crate::error::ClientResult;
use crate::http::HttpClient;

/// Order endpoints over HTTP
#[derive(Debug)]
pub struct HttpOrdersApi {
    http: Arc<HttpClient>,
}

impl HttpOrdersApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    async fn list(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>> {
        let envelope: ListEnvelope<Order> =
            self.http.get(&format!("orders{}", filter.query())).await?;
        Ok(envelope.data)
    }

    async fn get(&self, order_id: &str) -> ClientResult<Order> {
        self.http.get(&format!("orders/{}", order_id)).await
    }

    async fn create(&self, payload: &OrderCreate) -> ClientResult<Order> {
        self.http.post("orders", payload).await
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order> {
        self.http
            .put(
                &format!("orders/{}/status", order_id),
                &OrderStatusUpdate { status },
            )
            .await
    }

    async fn claim(&self, order_id: &str) -> ClientResult<Order> {
        self.http
            .post_empty(&format!("orders/{}/claim", order_id))
            .await
    }

    async fn release(&self, order_id: &str) -> ClientResult<Order> {
        self.http
            .post_empty(&format!("orders/{}/release", order_id))
            .await
    }
}

/// Call request endpoints over HTTP
#[derive(Debug)]
pub struct HttpCallRequestsApi {
    http: Arc<HttpClient>,
}

impl HttpCallRequestsApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CallRequestsApi for HttpCallRequestsApi {
    async fn list(&self, filter: &CallFilter) -> ClientResult<Vec<CallRequest>> {
        let envelope: ListEnvelope<CallRequest> = self
            .http
            .get(&format!("call-requests{}", filter.query()))
            .await?;
        Ok(envelope.data)
    }

    async fn create(&self, payload: &CallRequestCreate) -> ClientResult<CallRequest> {
        self.http.post("call-requests", payload).await
    }

    async fn claim(&self, call_id: &str) -> ClientResult<CallRequest> {
        self.http
            .post_empty(&format!("call-requests/{}/claim", call_id))
            .await
    }

    async fn release(&self, call_id: &str) -> ClientResult<CallRequest> {
        self.http
            .post_empty(&format!("call-requests/{}/release", call_id))
            .await
    }

    async fn complete(&self, call_id: &str) -> ClientResult<CallRequest> {
        self.http
            .put_empty(&format!("call-requests/{}/complete", call_id))
            .await
    }
}

/// Table endpoints over HTTP
#[derive(Debug)]
pub struct HttpTablesApi {
    http: Arc<HttpClient>,
}

impl HttpTablesApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TablesApi for HttpTablesApi {
    async fn list(&self) -> ClientResult<Vec<DiningTable>> {
        let envelope: ListEnvelope<DiningTable> = self.http.get("tables").await?;
        Ok(envelope.data)
    }

    async fn update(
        &self,
        table_id: &str,
        update: &DiningTableUpdate,
    ) -> ClientResult<DiningTable> {
        self.http.put(&format!("tables/{}", table_id), update).await
    }
}

/// Auth endpoints over HTTP
#[derive(Debug)]
pub struct HttpAuthApi {
    http: Arc<HttpClient>,
}

impl HttpAuthApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.http.post("auth/login", request).await
    }

    async fn logout(&self) -> ClientResult<()> {
        self.http.post_no_content("auth/logout").await
    }
}
