//! Claim and lifecycle coordination
//!
//! Every mutation goes to the server first; the response record comes back
//! through the reconciler like any other update. Nothing is written
//! optimistically, so a lost claim race never shows a phantom "yours" state:
//! the loser gets a conflict error and the winner's record corrects the
//! cache on the next push or poll.

use shared::models::{CallRequest, Order, OrderStatus};

use crate::api::ApiSet;
use crate::error::{ClientError, ClientResult};
use crate::reconciler::Reconciler;

/// Drives claims, releases and lifecycle transitions
#[derive(Debug, Clone)]
pub struct TaskCoordinator {
    apis: ApiSet,
    reconciler: Reconciler,
}

impl TaskCoordinator {
    pub fn new(apis: ApiSet, reconciler: Reconciler) -> Self {
        Self { apis, reconciler }
    }

    // ==================== Claims ====================

    /// Claim an order task. The server arbitrates; on a lost race this
    /// returns the conflict and the cache stays as the winner left it.
    pub async fn claim_order(&self, order_id: &str) -> ClientResult<Order> {
        let order = self.apis.orders.claim(order_id).await?;
        tracing::info!(order_id = %order.id, claimed_by = ?order.claimed_by, "Order claimed");
        self.reconciler.apply_order(order.clone());
        Ok(order)
    }

    /// Release a claimed order back to every waiter's list
    pub async fn release_order(&self, order_id: &str) -> ClientResult<Order> {
        let order = self.apis.orders.release(order_id).await?;
        tracing::info!(order_id = %order.id, "Order released");
        self.reconciler.apply_order(order.clone());
        Ok(order)
    }

    /// Claim a call request
    pub async fn claim_call(&self, call_id: &str) -> ClientResult<CallRequest> {
        let call = self.apis.calls.claim(call_id).await?;
        tracing::info!(call_id = %call.id, claimed_by = ?call.claimed_by, "Call claimed");
        self.reconciler.apply_call(call.clone());
        Ok(call)
    }

    /// Release a claimed call request back to every waiter's list
    pub async fn release_call(&self, call_id: &str) -> ClientResult<CallRequest> {
        let call = self.apis.calls.release(call_id).await?;
        tracing::info!(call_id = %call.id, "Call released");
        self.reconciler.apply_call(call.clone());
        Ok(call)
    }

    /// Complete a call request. Terminal: it leaves every task list.
    pub async fn complete_call(&self, call_id: &str) -> ClientResult<CallRequest> {
        let call = self.apis.calls.complete(call_id).await?;
        tracing::info!(call_id = %call.id, "Call completed");
        self.reconciler.apply_call(call.clone());
        Ok(call)
    }

    // ==================== Order lifecycle ====================

    /// Move an order one step forward.
    ///
    /// The cached copy gates the request: a transition that skips a stage
    /// or goes backwards is refused locally without a round trip. With no
    /// cached copy the server alone arbitrates.
    pub async fn advance_order(&self, order_id: &str, target: OrderStatus) -> ClientResult<Order> {
        if let Some(current) = self.reconciler.store().order(order_id) {
            if !current.status.can_transition_to(target) {
                return Err(ClientError::InvalidTransition {
                    from: current.status,
                    to: target,
                });
            }
        }
        let order = self.apis.orders.update_status(order_id, target).await?;
        tracing::info!(order_id = %order.id, status = %order.status, "Order advanced");
        self.reconciler.apply_order(order.clone());
        Ok(order)
    }

    /// Waiter accepts a pending order
    pub async fn confirm_order(&self, order_id: &str) -> ClientResult<Order> {
        self.advance_order(order_id, OrderStatus::Confirmed).await
    }

    /// Kitchen starts cooking
    pub async fn start_preparing(&self, order_id: &str) -> ClientResult<Order> {
        self.advance_order(order_id, OrderStatus::Preparing).await
    }

    /// Kitchen finished; ready to serve
    pub async fn mark_ready(&self, order_id: &str) -> ClientResult<Order> {
        self.advance_order(order_id, OrderStatus::Ready).await
    }

    /// Waiter delivered the order. Terminal.
    pub async fn complete_order(&self, order_id: &str) -> ClientResult<Order> {
        self.advance_order(order_id, OrderStatus::Completed).await
    }
}
