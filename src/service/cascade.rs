use std::sync::Arc;

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::comments::CommentService;
use crate::core::{EntityId, EntityType, ObjectRef, PlanError, Result};
use crate::model::{Activity, Destination, Planner, Transport, User};
use crate::storage::{Collection, EntityStore, Patch, Query, from_document};

/// The deletion state machine. Removing an owning entity walks its
/// ownership subtree: purge attachment threads, cascade into children
/// (independent sibling subtrees run concurrently), repair the parent's
/// reference array, then drop the record itself.
///
/// The walk is best-effort, not atomic. A store failure aborts the
/// remaining steps and surfaces as `CascadeFailure` naming the entity at
/// the failing step; nothing already deleted is restored. Because removing
/// an absent record is a no-op at every level, re-issuing the same delete
/// finishes the remainder.
pub struct CascadeEngine<S: EntityStore> {
    store: Arc<S>,
    comments: CommentService<S>,
}

impl<S: EntityStore> CascadeEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            comments: CommentService::new(store.clone()),
            store,
        }
    }

    /// Dispatch for an arbitrary `(entityType, entityId)` pair.
    pub async fn delete(&self, object: &ObjectRef) -> Result<()> {
        match object.collection {
            EntityType::Planner => self.delete_planner(&object.id).await.map(drop),
            EntityType::Destination => self.delete_destination(&object.id).await.map(drop),
            EntityType::Activity => self.delete_activity(&object.id).await.map(drop),
            EntityType::Transport => self.delete_transport(&object.id).await.map(drop),
            EntityType::User => self.delete_user(&object.id).await.map(drop),
            kind @ (EntityType::Accommodation | EntityType::Comment | EntityType::Vote) => {
                Err(PlanError::InvalidCollectionType(kind.to_string()))
            }
        }
    }

    /// Delete a planner and everything it owns: every destination (with its
    /// activities), every transportation leg, and all their attachments.
    /// Top-level call, so there is no parent array to repair.
    pub async fn delete_planner(&self, id: &EntityId) -> Result<Planner> {
        let planner: Planner = self.fetch_required(EntityType::Planner, id).await?;
        debug!(planner = %id, "cascading planner delete");

        let result = async {
            self.comments
                .purge_threads(&ObjectRef::new(EntityType::Planner, planner.id.clone()))
                .await?;
            try_join_all(
                planner
                    .destinations
                    .iter()
                    .map(|child| self.cascade_destination(child)),
            )
            .await?;
            try_join_all(
                planner
                    .transportations
                    .iter()
                    .map(|child| self.cascade_transport(child)),
            )
            .await?;
            self.store
                .find_one_and_delete(Collection::Planners, &Query::ById(planner.id.clone()))
                .await?;
            Ok(())
        }
        .await;

        result.map_err(|err| Self::cascade_error(EntityType::Planner, id, err))?;
        Ok(planner)
    }

    pub async fn delete_destination(&self, id: &EntityId) -> Result<Destination> {
        let destination: Destination = self.fetch_required(EntityType::Destination, id).await?;
        self.cascade_destination_record(&destination).await?;
        Ok(destination)
    }

    pub async fn delete_activity(&self, id: &EntityId) -> Result<Activity> {
        let activity: Activity = self.fetch_required(EntityType::Activity, id).await?;
        self.cascade_activity_record(&activity).await?;
        Ok(activity)
    }

    pub async fn delete_transport(&self, id: &EntityId) -> Result<Transport> {
        let transport: Transport = self.fetch_required(EntityType::Transport, id).await?;
        self.cascade_transport_record(&transport).await?;
        Ok(transport)
    }

    /// Users own nothing, but they can carry attachments of their own.
    pub async fn delete_user(&self, id: &EntityId) -> Result<User> {
        let user: User = self.fetch_required(EntityType::User, id).await?;
        let result = async {
            self.comments
                .purge_threads(&ObjectRef::new(EntityType::User, user.id.clone()))
                .await?;
            self.store
                .find_one_and_delete(Collection::Users, &Query::ById(user.id.clone()))
                .await?;
            Ok(())
        }
        .await;
        result.map_err(|err| Self::cascade_error(EntityType::User, id, err))?;
        Ok(user)
    }

    // ── child entries, used while an ancestor cascade is in flight ──
    // A listed id that no longer resolves was already removed, which is
    // exactly the state a retried cascade sees; tolerate it.

    async fn cascade_destination(&self, id: &EntityId) -> Result<()> {
        let Some(document) = self
            .store
            .find_one(Collection::Destinations, &Query::ById(id.clone()))
            .await?
        else {
            return Ok(());
        };
        let destination: Destination = from_document(document)?;
        self.cascade_destination_record(&destination).await
    }

    async fn cascade_activity(&self, id: &EntityId) -> Result<()> {
        let Some(document) = self
            .store
            .find_one(Collection::Activities, &Query::ById(id.clone()))
            .await?
        else {
            return Ok(());
        };
        let activity: Activity = from_document(document)?;
        self.cascade_activity_record(&activity).await
    }

    async fn cascade_transport(&self, id: &EntityId) -> Result<()> {
        let Some(document) = self
            .store
            .find_one(Collection::Transports, &Query::ById(id.clone()))
            .await?
        else {
            return Ok(());
        };
        let transport: Transport = from_document(document)?;
        self.cascade_transport_record(&transport).await
    }

    // ── per-kind cascade bodies ──
    // Step order everywhere: purge attachments, cascade children, repair
    // the parent's reference array, delete the record. Attachments go
    // first so an abort mid-walk strands at worst an orphaned (and still
    // deletable) thread, never a parent pointing at vanished children.

    async fn cascade_destination_record(&self, destination: &Destination) -> Result<()> {
        let result = async {
            self.comments
                .purge_threads(&ObjectRef::new(
                    EntityType::Destination,
                    destination.id.clone(),
                ))
                .await?;
            try_join_all(
                destination
                    .activities
                    .iter()
                    .map(|child| self.cascade_activity(child)),
            )
            .await?;
            self.store
                .find_one_and_update(
                    Collection::Planners,
                    &Query::ById(destination.planner_id.clone()),
                    &Patch::Pull {
                        field: "destinations",
                        id: destination.id.clone(),
                    },
                )
                .await?;
            self.store
                .find_one_and_delete(
                    Collection::Destinations,
                    &Query::ById(destination.id.clone()),
                )
                .await?;
            Ok(())
        }
        .await;

        result.map_err(|err| Self::cascade_error(EntityType::Destination, &destination.id, err))
    }

    async fn cascade_activity_record(&self, activity: &Activity) -> Result<()> {
        let result = async {
            self.comments
                .purge_threads(&ObjectRef::new(EntityType::Activity, activity.id.clone()))
                .await?;
            self.store
                .find_one_and_update(
                    Collection::Destinations,
                    &Query::ById(activity.destination_id.clone()),
                    &Patch::Pull {
                        field: "activities",
                        id: activity.id.clone(),
                    },
                )
                .await?;
            self.store
                .find_one_and_delete(Collection::Activities, &Query::ById(activity.id.clone()))
                .await?;
            Ok(())
        }
        .await;

        result.map_err(|err| Self::cascade_error(EntityType::Activity, &activity.id, err))
    }

    async fn cascade_transport_record(&self, transport: &Transport) -> Result<()> {
        let result = async {
            self.comments
                .purge_threads(&ObjectRef::new(EntityType::Transport, transport.id.clone()))
                .await?;
            self.store
                .find_one_and_update(
                    Collection::Planners,
                    &Query::ById(transport.planner_id.clone()),
                    &Patch::Pull {
                        field: "transportations",
                        id: transport.id.clone(),
                    },
                )
                .await?;
            self.store
                .find_one_and_delete(Collection::Transports, &Query::ById(transport.id.clone()))
                .await?;
            Ok(())
        }
        .await;

        result.map_err(|err| Self::cascade_error(EntityType::Transport, &transport.id, err))
    }

    async fn fetch_required<T: DeserializeOwned>(
        &self,
        kind: EntityType,
        id: &EntityId,
    ) -> Result<T> {
        self.store
            .find_one(Collection::for_entity(kind), &Query::ById(id.clone()))
            .await?
            .map(from_document::<T>)
            .transpose()?
            .ok_or_else(|| PlanError::not_found(kind, id))
    }

    /// Validation and not-found outcomes pass through untouched; anything
    /// else becomes a `CascadeFailure` naming the step that broke. An
    /// already-wrapped failure keeps its innermost context.
    fn cascade_error(kind: EntityType, id: &EntityId, err: PlanError) -> PlanError {
        match err {
            PlanError::CascadeFailure { .. }
            | PlanError::RecordNotFound { .. }
            | PlanError::InvalidObjectId(_)
            | PlanError::InvalidCollectionType(_)
            | PlanError::MalformedPayload(_) => err,
            other => {
                error!(kind = %kind, id = %id, reason = %other, "cascade aborted");
                PlanError::CascadeFailure {
                    kind,
                    id: id.clone(),
                    reason: other.to_string(),
                }
            }
        }
    }
}
