use thiserror::Error;

use crate::submission::{SubmissionEvent, SubmissionState};

#[derive(Debug, Error)]
pub enum CarebridgeError {
    #[error("State transition error: cannot transition from {from:?} via {event:?}")]
    InvalidStateTransition {
        from: SubmissionState,
        event: SubmissionEvent,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(uuid::Uuid),

    #[error("Profile not found: {0}")]
    ProfileNotFound(uuid::Uuid),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CarebridgeError>;
