use std::sync::Arc;

use serde_json::json;

use crate::core::{EntityId, ObjectRef, PlanError, Result};
use crate::model::{VoteDirection, VoteThread};
use crate::storage::{Collection, EntityStore, Patch, Query, from_document, to_document};

/// Vote half of the attachment index: one up/down tally per object,
/// created lazily on first access.
pub struct VoteService<S> {
    store: Arc<S>,
}

impl<S: EntityStore> VoteService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Look up the tally for `object`, creating an empty one if absent.
    /// Same check-then-create exposure as the comment threads.
    pub async fn find_or_create_thread(&self, object: &ObjectRef) -> Result<VoteThread> {
        if let Some(document) = self
            .store
            .find_one(Collection::VoteThreads, &Query::ByRef(object.clone()))
            .await?
        {
            return from_document(document);
        }

        let thread = VoteThread::new(object.clone());
        let document = self
            .store
            .insert(Collection::VoteThreads, to_document(&thread)?)
            .await?;
        from_document(document)
    }

    /// Record `user`'s vote. Casting again in the same direction is a
    /// no-op; casting the other way moves the id across.
    pub async fn cast(
        &self,
        object: &ObjectRef,
        user: &EntityId,
        direction: VoteDirection,
    ) -> Result<VoteThread> {
        let mut thread = self.find_or_create_thread(object).await?;
        thread.up_votes.retain(|entry| entry != user);
        thread.down_votes.retain(|entry| entry != user);
        match direction {
            VoteDirection::Up => thread.up_votes.push(user.clone()),
            VoteDirection::Down => thread.down_votes.push(user.clone()),
        }
        self.save(&thread).await
    }

    /// Withdraw `user`'s vote in either direction.
    pub async fn retract(&self, object: &ObjectRef, user: &EntityId) -> Result<VoteThread> {
        let mut thread = self.find_or_create_thread(object).await?;
        thread.up_votes.retain(|entry| entry != user);
        thread.down_votes.retain(|entry| entry != user);
        self.save(&thread).await
    }

    pub async fn get_votes(&self, object: &ObjectRef) -> Result<VoteThread> {
        self.find_or_create_thread(object).await
    }

    async fn save(&self, thread: &VoteThread) -> Result<VoteThread> {
        let patch = Patch::Set(json!({
            "upVotes": thread.up_votes,
            "downVotes": thread.down_votes,
        }));
        let document = self
            .store
            .find_one_and_update(
                Collection::VoteThreads,
                &Query::ById(thread.id.clone()),
                &patch,
            )
            .await?
            .ok_or_else(|| PlanError::not_found(thread.object.collection, &thread.object.id))?;
        from_document(document)
    }
}
