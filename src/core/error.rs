use thiserror::Error;

use super::types::{EntityId, EntityType};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid object id: '{0}'")]
    InvalidObjectId(String),

    #[error("Invalid collection type: '{0}'")]
    InvalidCollectionType(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{kind} '{id}' not found")]
    RecordNotFound { kind: EntityType, id: EntityId },

    #[error("Cascade aborted at {kind} '{id}': {reason}")]
    CascadeFailure {
        kind: EntityType,
        id: EntityId,
        reason: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;

impl PlanError {
    pub fn not_found(kind: EntityType, id: &EntityId) -> Self {
        Self::RecordNotFound {
            kind,
            id: id.clone(),
        }
    }
}
