use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::core::{EntityId, EntityType, ObjectRef, PlanError, Result};

/// A schemaless record exactly as the store keeps it.
pub type Document = serde_json::Value;

/// The collections the service addresses. Entity kinds resolve here through
/// [`Collection::for_entity`]; the comment-thread collection is only
/// reachable from the attachment index and the cascade engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Accommodations,
    Activities,
    Comments,
    CommentThreads,
    Destinations,
    Planners,
    Transports,
    Users,
    VoteThreads,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Self::Accommodations,
        Self::Activities,
        Self::Comments,
        Self::CommentThreads,
        Self::Destinations,
        Self::Planners,
        Self::Transports,
        Self::Users,
        Self::VoteThreads,
    ];

    /// Resolve an entity kind to the collection holding its records.
    pub const fn for_entity(kind: EntityType) -> Self {
        match kind {
            EntityType::Accommodation => Self::Accommodations,
            EntityType::Activity => Self::Activities,
            EntityType::Comment => Self::Comments,
            EntityType::Destination => Self::Destinations,
            EntityType::Planner => Self::Planners,
            EntityType::Transport => Self::Transports,
            EntityType::User => Self::Users,
            EntityType::Vote => Self::VoteThreads,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Accommodations => "accommodations",
            Self::Activities => "activities",
            Self::Comments => "comments",
            Self::CommentThreads => "comment_threads",
            Self::Destinations => "destinations",
            Self::Planners => "planners",
            Self::Transports => "transports",
            Self::Users => "users",
            Self::VoteThreads => "vote_threads",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two lookup shapes the service uses: primary key, or the polymorphic
/// `(id, collection)` join key of the attachment system.
#[derive(Debug, Clone)]
pub enum Query {
    ById(EntityId),
    ByRef(ObjectRef),
}

/// Write shapes. `Set` merges top-level fields; `AddToSet` and `Pull` edit
/// an id array in place. Every applied patch bumps `updatedAt`.
#[derive(Debug, Clone)]
pub enum Patch {
    Set(Document),
    AddToSet { field: &'static str, id: EntityId },
    Pull { field: &'static str, id: EntityId },
}

/// The document store seam. One collection per call, per-document write
/// atomicity only; there are no cross-collection transactions, which is why
/// the cascade engine exists.
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    /// Insert a document. Fails if a document with the same id exists.
    async fn insert(&self, collection: Collection, document: Document) -> Result<Document>;

    async fn find_one(&self, collection: Collection, query: &Query) -> Result<Option<Document>>;

    /// Apply a patch to the first match, returning the updated document.
    async fn find_one_and_update(
        &self,
        collection: Collection,
        query: &Query,
        patch: &Patch,
    ) -> Result<Option<Document>>;

    /// Remove the first match, returning it. Absence is not an error.
    async fn find_one_and_delete(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Option<Document>>;
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    serde_json::to_value(value).map_err(|e| PlanError::Storage(e.to_string()))
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    serde_json::from_value(document).map_err(|e| PlanError::Storage(e.to_string()))
}
