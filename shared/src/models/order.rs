//! Order Model
//!
//! Lifecycle: `pending → confirmed → preparing → ready → completed`,
//! strictly forward. The server is the authority for every transition;
//! clients hold a cached projection and derive display progress from the
//! observed status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status in fixed forward order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, waiting for a waiter to confirm
    #[default]
    Pending,
    /// Accepted by a waiter, queued for the kitchen
    Confirmed,
    /// Kitchen is working on it
    Preparing,
    /// Plated, waiting to be delivered
    Ready,
    /// Delivered. Terminal
    Completed,
}

impl OrderStatus {
    /// All states in lifecycle order
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];

    /// The states a customer-facing tracker considers "open"
    pub const OPEN: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    /// Position in the lifecycle (0 = pending .. 4 = completed)
    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Display progress: `index / (N - 1)`, 0.0 at pending, 1.0 at completed.
    ///
    /// Pure function of status. Recomputed on every observation, never
    /// accumulated incrementally.
    pub fn progress(&self) -> f32 {
        self.index() as f32 / (Self::ALL.len() - 1) as f32
    }

    /// The only legal successor, or `None` for the terminal state
    pub const fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    /// Whether `target` is the immediate next state
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }

    /// Open set: the order still needs attention from someone
    #[inline]
    pub const fn is_open(&self) -> bool {
        !matches!(self, OrderStatus::Completed)
    }

    /// Wire name (lowercase), used for `?status=` query filters
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order provenance. Does not affect the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderSource {
    /// Placed by a customer from the table QR flow
    #[default]
    Customer,
    /// Entered manually by staff
    Manual,
}

/// Selected customization on an order item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub name: String,
    /// Price delta in currency unit
    pub price: f64,
}

/// Order item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: String,
    pub menu_item_name: String,
    /// Always >= 1
    pub quantity: i32,
    /// Unit price before customizations, in currency unit
    pub base_price: f64,
    #[serde(default)]
    pub customizations: Vec<Customization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,
    /// (base_price + customizations) * quantity, fixed at creation
    pub item_total: f64,
}

impl OrderItem {
    /// Build an item with its total computed from unit price and quantity
    pub fn new(
        menu_item_id: impl Into<String>,
        menu_item_name: impl Into<String>,
        quantity: i32,
        base_price: f64,
        customizations: Vec<Customization>,
        customer_notes: Option<String>,
    ) -> Self {
        let extras: f64 = customizations.iter().map(|c| c.price).sum();
        let item_total = (base_price + extras) * quantity as f64;
        Self {
            menu_item_id: menu_item_id.into(),
            menu_item_name: menu_item_name.into(),
            quantity,
            base_price,
            customizations,
            customer_notes,
            item_total,
        }
    }
}

/// Order entity (server-owned; cached projection on the client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub table_id: String,
    pub table_name: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    /// Kitchen-assigned; meaningful only while status is confirmed/preparing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<i32>,
    /// Sum of item totals in currency unit, fixed at creation
    pub total_amount: f64,
    pub order_source: OrderSource,
    /// Waiter holding the task. Set only while status = pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Display progress for the tracker bar
    pub fn progress(&self) -> f32 {
        self.status.progress()
    }

    /// One-line item summary for task lists: "Paella x2, Agua x1"
    pub fn item_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{} x{}", i.menu_item_name, i.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Create order payload (`POST /orders`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub table_id: String,
    pub table_name: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    /// Sum of item totals, computed when the payload is built
    pub total_amount: f64,
    pub order_source: OrderSource,
}

impl OrderCreate {
    /// Build a creation payload; the total is fixed here, the server does
    /// not recompute it
    pub fn new(
        table_id: impl Into<String>,
        table_name: impl Into<String>,
        customer_name: impl Into<String>,
        customer_email: Option<String>,
        items: Vec<OrderItem>,
        order_source: OrderSource,
    ) -> Self {
        let total_amount = items.iter().map(|i| i.item_total).sum();
        Self {
            table_id: table_id.into(),
            table_name: table_name.into(),
            customer_name: customer_name.into(),
            customer_email,
            items,
            total_amount,
            order_source,
        }
    }
}

/// Status advance payload (`PUT /orders/:id/status`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
