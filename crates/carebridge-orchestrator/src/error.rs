use thiserror::Error;

use carebridge_types::CarebridgeError;
use carebridge_validation::ValidationError;
use carebridge_verification::VerifierError;

/// Why a submission was not posted.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Please sign in to post resources")]
    AuthenticationRequired,

    #[error(transparent)]
    Verification(#[from] VerifierError),

    #[error("Failed to post resource: {0}")]
    Storage(#[source] CarebridgeError),

    /// The submission state machine refused a step. Indicates a bug.
    #[error("Internal error: {0}")]
    Internal(#[source] CarebridgeError),
}

impl SubmissionError {
    /// Message suitable for showing to the submitting user.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation(e) => e.to_string(),
            SubmissionError::AuthenticationRequired => self.to_string(),
            SubmissionError::Verification(e) => e.user_message().to_string(),
            SubmissionError::Storage(_) | SubmissionError::Internal(_) => {
                "Failed to post resource".to_string()
            }
        }
    }
}
