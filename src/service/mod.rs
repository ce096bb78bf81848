pub mod cascade;
pub mod comments;
pub mod entities;
pub mod guard;
pub mod votes;

pub use cascade::CascadeEngine;
pub use comments::CommentService;
pub use guard::ConsistencyGuard;
pub use votes::VoteService;

use std::sync::Arc;

use crate::storage::EntityStore;

/// High-level entry point wiring the services over one shared store
/// handle. Tests swap the store through the same constructor.
pub struct TripPlanDb<S: EntityStore> {
    store: Arc<S>,
    guard: ConsistencyGuard<S>,
    comments: CommentService<S>,
    votes: VoteService<S>,
    cascade: CascadeEngine<S>,
}

impl<S: EntityStore> TripPlanDb<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            guard: ConsistencyGuard::new(store.clone()),
            comments: CommentService::new(store.clone()),
            votes: VoteService::new(store.clone()),
            cascade: CascadeEngine::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn guard(&self) -> &ConsistencyGuard<S> {
        &self.guard
    }

    pub fn comments(&self) -> &CommentService<S> {
        &self.comments
    }

    pub fn votes(&self) -> &VoteService<S> {
        &self.votes
    }

    pub fn cascade(&self) -> &CascadeEngine<S> {
        &self.cascade
    }
}
