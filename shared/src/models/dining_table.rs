//! Dining Table Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Table occupancy status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
}

/// Someone currently seated at the table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableOccupant {
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

/// Dining table entity (server-owned; cached projection on the client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: String,
    pub name: String,
    pub qr_code_url: String,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_occupants: Vec<TableOccupant>,
    pub created_at: DateTime<Utc>,
}

impl DiningTable {
    pub fn is_available(&self) -> bool {
        self.status == TableStatus::Available
    }
}

/// Update table payload (`PUT /tables/:id`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_occupants: Option<Vec<TableOccupant>>,
}

impl DiningTableUpdate {
    /// Payload for seating an occupant: mark occupied, append to the list
    pub fn occupy(occupants: Vec<TableOccupant>) -> Self {
        Self {
            status: Some(TableStatus::Occupied),
            current_occupants: Some(occupants),
        }
    }

    /// Payload for vacating: available again, nobody seated
    pub fn vacate() -> Self {
        Self {
            status: Some(TableStatus::Available),
            current_occupants: Some(Vec::new()),
        }
    }
}
