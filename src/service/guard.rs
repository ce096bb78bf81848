use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::core::{EntityId, EntityType, PlanError, Result};
use crate::model::Planner;
use crate::storage::{Collection, EntityStore, Query, from_document};

/// Precondition checks gating every mutation. Identifier shape is enforced
/// by [`EntityId`] at the parse boundary; existence and access are checked
/// here before any cascade step runs, so a failed check has no side effects.
pub struct ConsistencyGuard<S> {
    store: Arc<S>,
}

impl<S: EntityStore> ConsistencyGuard<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Fetch an entity, failing with `RecordNotFound` if it is absent.
    pub async fn existing<T: DeserializeOwned>(&self, kind: EntityType, id: &EntityId) -> Result<T> {
        let document = self
            .store
            .find_one(Collection::for_entity(kind), &Query::ById(id.clone()))
            .await?
            .ok_or_else(|| PlanError::not_found(kind, id))?;
        from_document(document)
    }

    /// Confirm the target exists without decoding it.
    pub async fn ensure_exists(&self, kind: EntityType, id: &EntityId) -> Result<()> {
        self.store
            .find_one(Collection::for_entity(kind), &Query::ById(id.clone()))
            .await?
            .map(drop)
            .ok_or_else(|| PlanError::not_found(kind, id))
    }

    /// Planner plus read access for `actor`. Access failures surface as
    /// `RecordNotFound` so a caller without access cannot tell the planner
    /// apart from a missing one.
    pub async fn viewable_planner(&self, actor: &EntityId, id: &EntityId) -> Result<Planner> {
        let planner: Planner = self.existing(EntityType::Planner, id).await?;
        if planner.can_view(actor) {
            Ok(planner)
        } else {
            Err(PlanError::not_found(EntityType::Planner, id))
        }
    }

    /// Planner plus write access for `actor`; same absence signalling.
    pub async fn editable_planner(&self, actor: &EntityId, id: &EntityId) -> Result<Planner> {
        let planner: Planner = self.existing(EntityType::Planner, id).await?;
        if planner.can_edit(actor) {
            Ok(planner)
        } else {
            Err(PlanError::not_found(EntityType::Planner, id))
        }
    }
}
