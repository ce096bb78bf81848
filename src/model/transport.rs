use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::EntityId;

/// A transportation leg, owned by exactly one planner via `planner_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: EntityId,
    pub planner_id: EntityId,
    /// Free-form, e.g. "Flight" or "Train".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransport {
    pub created_by: EntityId,
    #[serde(rename = "type")]
    pub kind: String,
    pub details: Option<String>,
    pub vehicle_id: Option<String>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransport {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<DateTime<Utc>>,
}

impl Transport {
    pub fn new(planner_id: EntityId, input: CreateTransport) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
            created_by: input.created_by,
            planner_id,
            kind: input.kind,
            details: input.details,
            vehicle_id: input.vehicle_id,
            departure_time: input.departure_time,
            arrival_time: input.arrival_time,
        }
    }
}
