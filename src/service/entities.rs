//! CRUD operations over the entity graph. Creation wires ownership
//! back-references, reads go through the access checks, and every delete
//! delegates to the cascade engine so nothing is removed in isolation.

use super::TripPlanDb;
use crate::core::{EntityId, EntityType, ObjectRef, PlanError, Result};
use crate::model::{
    Activity, Comment, CreateActivity, CreateComment, CreateDestination, CreatePlanner,
    CreateTransport, CreateUser, Destination, Planner, Transport, UpdateActivity,
    UpdateDestination, UpdatePlanner, UpdateTransport, UpdateUser, User, VoteDirection,
    VoteThread,
};
use crate::storage::{Collection, EntityStore, Patch, Query, from_document, to_document};

impl<S: EntityStore> TripPlanDb<S> {
    // ─────────────────────────────────────────────
    // USERS
    // ─────────────────────────────────────────────

    pub async fn create_user(&self, input: CreateUser) -> Result<User> {
        let user = User::new(input);
        let document = self
            .store
            .insert(Collection::Users, to_document(&user)?)
            .await?;
        from_document(document)
    }

    pub async fn get_user(&self, id: &EntityId) -> Result<User> {
        self.guard.existing(EntityType::User, id).await
    }

    pub async fn update_user(&self, id: &EntityId, patch: UpdateUser) -> Result<User> {
        let document = self
            .store
            .find_one_and_update(
                Collection::Users,
                &Query::ById(id.clone()),
                &Patch::Set(to_document(&patch)?),
            )
            .await?
            .ok_or_else(|| PlanError::not_found(EntityType::User, id))?;
        from_document(document)
    }

    pub async fn delete_user(&self, id: &EntityId) -> Result<User> {
        self.cascade.delete_user(id).await
    }

    // ─────────────────────────────────────────────
    // PLANNERS
    // ─────────────────────────────────────────────

    pub async fn create_planner(&self, input: CreatePlanner) -> Result<Planner> {
        self.guard
            .ensure_exists(EntityType::User, &input.created_by)
            .await?;
        let planner = Planner::new(input);
        let document = self
            .store
            .insert(Collection::Planners, to_document(&planner)?)
            .await?;
        from_document(document)
    }

    pub async fn get_planner(&self, actor: &EntityId, id: &EntityId) -> Result<Planner> {
        self.guard.viewable_planner(actor, id).await
    }

    pub async fn update_planner(
        &self,
        actor: &EntityId,
        id: &EntityId,
        patch: UpdatePlanner,
    ) -> Result<Planner> {
        self.guard.editable_planner(actor, id).await?;
        let document = self
            .store
            .find_one_and_update(
                Collection::Planners,
                &Query::ById(id.clone()),
                &Patch::Set(to_document(&patch)?),
            )
            .await?
            .ok_or_else(|| PlanError::not_found(EntityType::Planner, id))?;
        from_document(document)
    }

    pub async fn delete_planner(&self, actor: &EntityId, id: &EntityId) -> Result<Planner> {
        self.guard.editable_planner(actor, id).await?;
        self.cascade.delete_planner(id).await
    }

    /// Accept a pending invitation: the actor moves from `invites` to
    /// `roUsers`. An actor without a pending invite sees `RecordNotFound`.
    pub async fn accept_invite(&self, actor: &EntityId, planner_id: &EntityId) -> Result<Planner> {
        let planner: Planner = self.guard.existing(EntityType::Planner, planner_id).await?;
        if !planner.invites.contains(actor) {
            return Err(PlanError::not_found(EntityType::Planner, planner_id));
        }

        self.store
            .find_one_and_update(
                Collection::Planners,
                &Query::ById(planner_id.clone()),
                &Patch::Pull {
                    field: "invites",
                    id: actor.clone(),
                },
            )
            .await?;
        let document = self
            .store
            .find_one_and_update(
                Collection::Planners,
                &Query::ById(planner_id.clone()),
                &Patch::AddToSet {
                    field: "roUsers",
                    id: actor.clone(),
                },
            )
            .await?
            .ok_or_else(|| PlanError::not_found(EntityType::Planner, planner_id))?;
        from_document(document)
    }

    // ─────────────────────────────────────────────
    // DESTINATIONS
    // ─────────────────────────────────────────────

    pub async fn create_destination(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        input: CreateDestination,
    ) -> Result<Destination> {
        self.guard.editable_planner(actor, planner_id).await?;

        let destination = Destination::new(planner_id.clone(), input);
        self.store
            .insert(Collection::Destinations, to_document(&destination)?)
            .await?;
        self.store
            .find_one_and_update(
                Collection::Planners,
                &Query::ById(planner_id.clone()),
                &Patch::AddToSet {
                    field: "destinations",
                    id: destination.id.clone(),
                },
            )
            .await?;
        Ok(destination)
    }

    pub async fn get_destination(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        id: &EntityId,
    ) -> Result<Destination> {
        self.guard.viewable_planner(actor, planner_id).await?;
        self.owned_destination(planner_id, id).await
    }

    pub async fn update_destination(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        id: &EntityId,
        patch: UpdateDestination,
    ) -> Result<Destination> {
        self.guard.editable_planner(actor, planner_id).await?;
        self.owned_destination(planner_id, id).await?;

        let document = self
            .store
            .find_one_and_update(
                Collection::Destinations,
                &Query::ById(id.clone()),
                &Patch::Set(to_document(&patch)?),
            )
            .await?
            .ok_or_else(|| PlanError::not_found(EntityType::Destination, id))?;
        from_document(document)
    }

    pub async fn delete_destination(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        id: &EntityId,
    ) -> Result<Destination> {
        self.guard.editable_planner(actor, planner_id).await?;
        self.owned_destination(planner_id, id).await?;
        self.cascade.delete_destination(id).await
    }

    // ─────────────────────────────────────────────
    // ACTIVITIES
    // ─────────────────────────────────────────────

    pub async fn create_activity(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        destination_id: &EntityId,
        input: CreateActivity,
    ) -> Result<Activity> {
        self.guard.editable_planner(actor, planner_id).await?;
        self.owned_destination(planner_id, destination_id).await?;

        let activity = Activity::new(destination_id.clone(), input);
        self.store
            .insert(Collection::Activities, to_document(&activity)?)
            .await?;
        self.store
            .find_one_and_update(
                Collection::Destinations,
                &Query::ById(destination_id.clone()),
                &Patch::AddToSet {
                    field: "activities",
                    id: activity.id.clone(),
                },
            )
            .await?;
        Ok(activity)
    }

    pub async fn get_activity(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        destination_id: &EntityId,
        id: &EntityId,
    ) -> Result<Activity> {
        self.guard.viewable_planner(actor, planner_id).await?;
        self.owned_destination(planner_id, destination_id).await?;
        self.owned_activity(destination_id, id).await
    }

    pub async fn update_activity(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        destination_id: &EntityId,
        id: &EntityId,
        patch: UpdateActivity,
    ) -> Result<Activity> {
        self.guard.editable_planner(actor, planner_id).await?;
        self.owned_destination(planner_id, destination_id).await?;
        self.owned_activity(destination_id, id).await?;

        let document = self
            .store
            .find_one_and_update(
                Collection::Activities,
                &Query::ById(id.clone()),
                &Patch::Set(to_document(&patch)?),
            )
            .await?
            .ok_or_else(|| PlanError::not_found(EntityType::Activity, id))?;
        from_document(document)
    }

    pub async fn delete_activity(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        destination_id: &EntityId,
        id: &EntityId,
    ) -> Result<Activity> {
        self.guard.editable_planner(actor, planner_id).await?;
        self.owned_destination(planner_id, destination_id).await?;
        self.owned_activity(destination_id, id).await?;
        self.cascade.delete_activity(id).await
    }

    // ─────────────────────────────────────────────
    // TRANSPORTATION
    // ─────────────────────────────────────────────

    pub async fn create_transport(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        input: CreateTransport,
    ) -> Result<Transport> {
        self.guard.editable_planner(actor, planner_id).await?;

        let transport = Transport::new(planner_id.clone(), input);
        self.store
            .insert(Collection::Transports, to_document(&transport)?)
            .await?;
        self.store
            .find_one_and_update(
                Collection::Planners,
                &Query::ById(planner_id.clone()),
                &Patch::AddToSet {
                    field: "transportations",
                    id: transport.id.clone(),
                },
            )
            .await?;
        Ok(transport)
    }

    pub async fn get_transport(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        id: &EntityId,
    ) -> Result<Transport> {
        self.guard.viewable_planner(actor, planner_id).await?;
        self.owned_transport(planner_id, id).await
    }

    pub async fn update_transport(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        id: &EntityId,
        patch: UpdateTransport,
    ) -> Result<Transport> {
        self.guard.editable_planner(actor, planner_id).await?;
        self.owned_transport(planner_id, id).await?;

        let document = self
            .store
            .find_one_and_update(
                Collection::Transports,
                &Query::ById(id.clone()),
                &Patch::Set(to_document(&patch)?),
            )
            .await?
            .ok_or_else(|| PlanError::not_found(EntityType::Transport, id))?;
        from_document(document)
    }

    pub async fn delete_transport(
        &self,
        actor: &EntityId,
        planner_id: &EntityId,
        id: &EntityId,
    ) -> Result<Transport> {
        self.guard.editable_planner(actor, planner_id).await?;
        self.owned_transport(planner_id, id).await?;
        self.cascade.delete_transport(id).await
    }

    // ─────────────────────────────────────────────
    // COMMENTS & VOTES
    // ─────────────────────────────────────────────

    pub async fn add_comment(&self, object: &ObjectRef, input: CreateComment) -> Result<Comment> {
        self.guard
            .ensure_exists(object.collection, &object.id)
            .await?;
        self.comments.add_comment(object, input).await
    }

    pub async fn get_comments(&self, object: &ObjectRef) -> Result<Vec<Comment>> {
        self.comments.get_thread(object).await
    }

    pub async fn get_comment(&self, id: &EntityId) -> Result<Comment> {
        self.comments.get_comment(id).await
    }

    pub async fn remove_comment(
        &self,
        object: &ObjectRef,
        comment_id: &EntityId,
        requester: &EntityId,
    ) -> Result<Comment> {
        self.comments
            .remove_comment(object, comment_id, requester)
            .await
    }

    pub async fn cast_vote(
        &self,
        object: &ObjectRef,
        user: &EntityId,
        direction: VoteDirection,
    ) -> Result<VoteThread> {
        self.guard
            .ensure_exists(object.collection, &object.id)
            .await?;
        self.guard.ensure_exists(EntityType::User, user).await?;
        self.votes.cast(object, user, direction).await
    }

    pub async fn retract_vote(&self, object: &ObjectRef, user: &EntityId) -> Result<VoteThread> {
        self.votes.retract(object, user).await
    }

    pub async fn get_votes(&self, object: &ObjectRef) -> Result<VoteThread> {
        self.votes.get_votes(object).await
    }

    // ─────────────────────────────────────────────
    // GENERIC DELETE
    // ─────────────────────────────────────────────

    /// Delete an arbitrary `(entityType, entityId)` pair on behalf of
    /// `actor`, deriving the ownership context the access checks need.
    pub async fn delete_entity(&self, actor: &EntityId, object: &ObjectRef) -> Result<()> {
        match object.collection {
            EntityType::Planner => self.delete_planner(actor, &object.id).await.map(drop),
            EntityType::Destination => {
                let destination: Destination = self
                    .guard
                    .existing(EntityType::Destination, &object.id)
                    .await?;
                self.delete_destination(actor, &destination.planner_id, &object.id)
                    .await
                    .map(drop)
            }
            EntityType::Activity => {
                let activity: Activity =
                    self.guard.existing(EntityType::Activity, &object.id).await?;
                let destination: Destination = self
                    .guard
                    .existing(EntityType::Destination, &activity.destination_id)
                    .await?;
                self.delete_activity(
                    actor,
                    &destination.planner_id,
                    &activity.destination_id,
                    &object.id,
                )
                .await
                .map(drop)
            }
            EntityType::Transport => {
                let transport: Transport =
                    self.guard.existing(EntityType::Transport, &object.id).await?;
                self.delete_transport(actor, &transport.planner_id, &object.id)
                    .await
                    .map(drop)
            }
            EntityType::User => {
                // a user may only remove their own account
                if actor != &object.id {
                    return Err(PlanError::not_found(EntityType::User, &object.id));
                }
                self.delete_user(&object.id).await.map(drop)
            }
            kind @ (EntityType::Accommodation | EntityType::Comment | EntityType::Vote) => {
                Err(PlanError::InvalidCollectionType(kind.to_string()))
            }
        }
    }

    // ─────────────────────────────────────────────
    // OWNERSHIP HELPERS
    // ─────────────────────────────────────────────

    /// Fetch a destination and confirm it belongs to `planner_id`. A
    /// destination under a different planner is reported absent.
    async fn owned_destination(
        &self,
        planner_id: &EntityId,
        id: &EntityId,
    ) -> Result<Destination> {
        let destination: Destination = self.guard.existing(EntityType::Destination, id).await?;
        if destination.planner_id != *planner_id {
            return Err(PlanError::not_found(EntityType::Destination, id));
        }
        Ok(destination)
    }

    async fn owned_activity(&self, destination_id: &EntityId, id: &EntityId) -> Result<Activity> {
        let activity: Activity = self.guard.existing(EntityType::Activity, id).await?;
        if activity.destination_id != *destination_id {
            return Err(PlanError::not_found(EntityType::Activity, id));
        }
        Ok(activity)
    }

    async fn owned_transport(&self, planner_id: &EntityId, id: &EntityId) -> Result<Transport> {
        let transport: Transport = self.guard.existing(EntityType::Transport, id).await?;
        if transport.planner_id != *planner_id {
            return Err(PlanError::not_found(EntityType::Transport, id));
        }
        Ok(transport)
    }
}
