use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::EntityId;

/// A collaboratively edited itinerary. Root of one ownership tree: the
/// planner lists its destinations and transportation legs by id, and the
/// cascade engine keeps those arrays consistent since the store will not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planner {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub ro_users: Vec<EntityId>,
    #[serde(default)]
    pub rw_users: Vec<EntityId>,
    #[serde(default)]
    pub invites: Vec<EntityId>,
    #[serde(default)]
    pub destinations: Vec<EntityId>,
    #[serde(default)]
    pub transportations: Vec<EntityId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanner {
    pub created_by: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub ro_users: Vec<EntityId>,
    #[serde(default)]
    pub rw_users: Vec<EntityId>,
    #[serde(default)]
    pub invites: Vec<EntityId>,
}

/// Field-level patch; only present fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Planner {
    pub fn new(input: CreatePlanner) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
            created_by: input.created_by,
            name: input.name,
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            ro_users: input.ro_users,
            rw_users: input.rw_users,
            invites: input.invites,
            destinations: Vec::new(),
            transportations: Vec::new(),
        }
    }

    /// Read access: the creator and both user lists.
    pub fn can_view(&self, user: &EntityId) -> bool {
        self.created_by == *user || self.ro_users.contains(user) || self.rw_users.contains(user)
    }

    /// Write access: the creator and read-write users.
    pub fn can_edit(&self, user: &EntityId) -> bool {
        self.created_by == *user || self.rw_users.contains(user)
    }
}
