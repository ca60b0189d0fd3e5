use serde::{Deserialize, Serialize};

use super::error::CarebridgeError;

/// Lifecycle of a single submission attempt. Terminal states are
/// `VerifiedStored`, `PendingStored` and `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Draft,
    Validated,
    Verifying,
    VerifiedStored,
    PendingStored,
    Rejected,
}

/// Events that drive submission state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionEvent {
    ValidationPassed,
    ValidationFailed,
    AuthenticationMissing,
    VerificationStarted,
    VerificationFailed,
    StoredVerified,
    StoredPending,
    StorageFailed,
}

impl SubmissionState {
    /// Attempt a state transition given an event.
    pub fn transition(self, event: SubmissionEvent) -> super::error::Result<SubmissionState> {
        match (self, event) {
            (SubmissionState::Draft, SubmissionEvent::ValidationPassed) => {
                Ok(SubmissionState::Validated)
            }
            (SubmissionState::Draft, SubmissionEvent::ValidationFailed) => {
                Ok(SubmissionState::Rejected)
            }

            (SubmissionState::Validated, SubmissionEvent::AuthenticationMissing) => {
                Ok(SubmissionState::Rejected)
            }
            (SubmissionState::Validated, SubmissionEvent::VerificationStarted) => {
                Ok(SubmissionState::Verifying)
            }

            // A malformed verifier reply still stores, as pending.
            (SubmissionState::Verifying, SubmissionEvent::StoredVerified) => {
                Ok(SubmissionState::VerifiedStored)
            }
            (SubmissionState::Verifying, SubmissionEvent::StoredPending) => {
                Ok(SubmissionState::PendingStored)
            }
            (SubmissionState::Verifying, SubmissionEvent::VerificationFailed) => {
                Ok(SubmissionState::Rejected)
            }
            (SubmissionState::Verifying, SubmissionEvent::StorageFailed) => {
                Ok(SubmissionState::Rejected)
            }

            (state, event) => Err(CarebridgeError::InvalidStateTransition { from: state, event }),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::VerifiedStored
                | SubmissionState::PendingStored
                | SubmissionState::Rejected
        )
    }
}
