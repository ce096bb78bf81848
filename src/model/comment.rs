use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, ObjectRef};

/// A standalone comment record, referenced by exactly one thread at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: EntityId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub created_by: EntityId,
    pub title: String,
    pub content: String,
}

/// The per-object comment thread: an ordered list of comment ids keyed by
/// one [`ObjectRef`]. At most one thread per ref, created lazily on first
/// comment, never directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub object: ObjectRef,
    #[serde(default)]
    pub comments: Vec<EntityId>,
}

impl Comment {
    pub fn new(input: CreateComment) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
            created_by: input.created_by,
            title: input.title,
            content: input.content,
        }
    }
}

impl CommentThread {
    pub fn new(object: ObjectRef) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
            object,
            comments: Vec::new(),
        }
    }
}
