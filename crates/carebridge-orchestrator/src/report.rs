use serde::Serialize;

use carebridge_types::{PersistedResource, Profile, SubmissionState, VerificationOutcome};

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    /// `VerifiedStored` or `PendingStored`.
    pub state: SubmissionState,
    pub resource: PersistedResource,
    pub outcome: VerificationOutcome,
    /// True when the verifier's reply was unusable and the fallback applied.
    pub fallback: bool,
    /// Submitter's profile after the points were awarded.
    pub profile: Profile,
}

impl SubmissionReport {
    pub fn is_verified(&self) -> bool {
        self.state == SubmissionState::VerifiedStored
    }

    pub fn message(&self) -> &'static str {
        if self.is_verified() {
            "Resource posted and verified!"
        } else {
            "Resource posted! Pending verification."
        }
    }
}
