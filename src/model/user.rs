use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_name: String,
    pub preferred_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub user_name: String,
    pub preferred_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_name: Option<String>,
}

impl User {
    pub fn new(input: CreateUser) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
            user_name: input.user_name,
            preferred_name: input.preferred_name,
        }
    }
}
