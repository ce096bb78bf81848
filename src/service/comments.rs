use std::sync::Arc;

use async_recursion::async_recursion;
use tracing::debug;

use crate::core::{EntityId, EntityType, ObjectRef, PlanError, Result};
use crate::model::{Comment, CommentThread, CreateComment};
use crate::storage::{Collection, EntityStore, Patch, Query, from_document, to_document};

/// Polymorphic attachment index: gives every entity kind a comment thread
/// keyed by `(id, collection)` without the entities knowing about comments.
pub struct CommentService<S> {
    store: Arc<S>,
}

impl<S: EntityStore> CommentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Look up the thread for `object`, creating an empty one if absent.
    ///
    /// Check-then-create: two concurrent first comments on the same object
    /// can each observe "no thread" and insert one. The store offers no
    /// atomic upsert, so the duplicate-thread outcome is accepted.
    pub async fn find_or_create_thread(&self, object: &ObjectRef) -> Result<CommentThread> {
        if let Some(document) = self
            .store
            .find_one(Collection::CommentThreads, &Query::ByRef(object.clone()))
            .await?
        {
            return from_document(document);
        }

        let thread = CommentThread::new(object.clone());
        let document = self
            .store
            .insert(Collection::CommentThreads, to_document(&thread)?)
            .await?;
        from_document(document)
    }

    /// Create a comment record and append it to `object`'s thread.
    pub async fn add_comment(&self, object: &ObjectRef, input: CreateComment) -> Result<Comment> {
        let thread = self.find_or_create_thread(object).await?;

        let comment = Comment::new(input);
        self.store
            .insert(Collection::Comments, to_document(&comment)?)
            .await?;

        self.store
            .find_one_and_update(
                Collection::CommentThreads,
                &Query::ById(thread.id.clone()),
                &Patch::AddToSet {
                    field: "comments",
                    id: comment.id.clone(),
                },
            )
            .await?
            .ok_or_else(|| PlanError::not_found(object.collection, &object.id))?;

        Ok(comment)
    }

    /// Remove `comment_id` from `object`'s thread and delete the record.
    ///
    /// A missing thread, a missing comment record, and a requester who is
    /// not the author all fail the same way: `RecordNotFound`. Authorship
    /// is deliberately signalled as absence so existence is not leaked.
    pub async fn remove_comment(
        &self,
        object: &ObjectRef,
        comment_id: &EntityId,
        requester: &EntityId,
    ) -> Result<Comment> {
        let thread: CommentThread = self
            .store
            .find_one(Collection::CommentThreads, &Query::ByRef(object.clone()))
            .await?
            .map(from_document)
            .transpose()?
            .ok_or_else(|| PlanError::not_found(EntityType::Comment, comment_id))?;

        if !thread.comments.contains(comment_id) {
            return Err(PlanError::not_found(EntityType::Comment, comment_id));
        }

        let comment: Comment = self
            .store
            .find_one(Collection::Comments, &Query::ById(comment_id.clone()))
            .await?
            .map(from_document)
            .transpose()?
            .ok_or_else(|| PlanError::not_found(EntityType::Comment, comment_id))?;

        if comment.created_by != *requester {
            return Err(PlanError::not_found(EntityType::Comment, comment_id));
        }

        self.store
            .find_one_and_update(
                Collection::CommentThreads,
                &Query::ById(thread.id.clone()),
                &Patch::Pull {
                    field: "comments",
                    id: comment_id.clone(),
                },
            )
            .await?;
        self.store
            .find_one_and_delete(Collection::Comments, &Query::ById(comment_id.clone()))
            .await?;

        // the removed comment may itself carry attachments
        self.purge_threads(&ObjectRef::new(EntityType::Comment, comment_id.clone()))
            .await?;

        Ok(comment)
    }

    /// Resolve the thread to full comment records. An absent thread and an
    /// empty one both yield an empty list; ids that no longer resolve are
    /// skipped rather than failing the read.
    pub async fn get_thread(&self, object: &ObjectRef) -> Result<Vec<Comment>> {
        let Some(document) = self
            .store
            .find_one(Collection::CommentThreads, &Query::ByRef(object.clone()))
            .await?
        else {
            return Ok(Vec::new());
        };
        let thread: CommentThread = from_document(document)?;

        let mut comments = Vec::with_capacity(thread.comments.len());
        for comment_id in &thread.comments {
            if let Some(doc) = self
                .store
                .find_one(Collection::Comments, &Query::ById(comment_id.clone()))
                .await?
            {
                comments.push(from_document(doc)?);
            }
        }
        Ok(comments)
    }

    pub async fn get_comment(&self, comment_id: &EntityId) -> Result<Comment> {
        self.store
            .find_one(Collection::Comments, &Query::ById(comment_id.clone()))
            .await?
            .map(from_document)
            .transpose()?
            .ok_or_else(|| PlanError::not_found(EntityType::Comment, comment_id))
    }

    /// Delete the comment thread, every comment record it lists, and the
    /// vote thread for `object`. Absence at any level is a no-op; the
    /// cascade engine relies on that to stay retry-safe.
    #[async_recursion]
    pub async fn purge_threads(&self, object: &ObjectRef) -> Result<()> {
        if let Some(document) = self
            .store
            .find_one_and_delete(Collection::CommentThreads, &Query::ByRef(object.clone()))
            .await?
        {
            let thread: CommentThread = from_document(document)?;
            debug!(object = %object, comments = thread.comments.len(), "purging comment thread");

            for comment_id in &thread.comments {
                let removed = self
                    .store
                    .find_one_and_delete(Collection::Comments, &Query::ById(comment_id.clone()))
                    .await?;
                if removed.is_some() {
                    // a comment is itself a commentable entity
                    self.purge_threads(&ObjectRef::new(EntityType::Comment, comment_id.clone()))
                        .await?;
                }
            }
        }

        self.store
            .find_one_and_delete(Collection::VoteThreads, &Query::ByRef(object.clone()))
            .await?;
        Ok(())
    }
}
