use async_trait::async_trait;
use thiserror::Error;

use carebridge_types::{ResourceSubmission, VerificationReply};

/// Failure to obtain any reply from the verification endpoint.
///
/// A reply that arrives but cannot be parsed is not an error; see
/// [`VerificationReply::Fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    #[error("Verification endpoint rate limited the request (status {0})")]
    RateLimited(u16),

    #[error("Verification endpoint requires payment (status {0})")]
    PaymentRequired(u16),

    #[error("Verification endpoint failed: {0}")]
    Failed(String),
}

impl VerifierError {
    /// Message suitable for showing to the submitting user.
    pub fn user_message(&self) -> &'static str {
        match self {
            VerifierError::RateLimited(_) => "Rate limit exceeded. Please try again later.",
            VerifierError::PaymentRequired(_) => {
                "Payment required. Please add credits to your workspace."
            }
            VerifierError::Failed(_) => "AI verification failed",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            VerifierError::RateLimited(code) | VerifierError::PaymentRequired(code) => Some(*code),
            VerifierError::Failed(_) => None,
        }
    }
}

/// Trait for services that judge whether a listing looks legitimate.
#[async_trait]
pub trait ResourceVerifier: Send + Sync {
    async fn verify(
        &self,
        submission: &ResourceSubmission,
    ) -> Result<VerificationReply, VerifierError>;

    fn name(&self) -> &str;
}
