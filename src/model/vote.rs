use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, ObjectRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// The per-object vote tally: user ids in at most one of the two arrays.
/// One thread per [`ObjectRef`], created lazily, never directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteThread {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub object: ObjectRef,
    #[serde(default)]
    pub up_votes: Vec<EntityId>,
    #[serde(default)]
    pub down_votes: Vec<EntityId>,
}

impl VoteThread {
    pub fn new(object: ObjectRef) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
            object,
            up_votes: Vec::new(),
            down_votes: Vec::new(),
        }
    }
}
