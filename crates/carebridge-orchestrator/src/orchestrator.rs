use std::sync::Arc;

use carebridge_identity::IdentityProvider;
use carebridge_store::RecordStore;
use carebridge_types::{
    NewResource, POINTS_PER_SUBMISSION, RawSubmission, ResourceSubmission, SubmissionEvent,
    SubmissionState, VerificationReply,
};
use carebridge_validation::validate;
use carebridge_verification::ResourceVerifier;

use crate::error::SubmissionError;
use crate::report::SubmissionReport;

/// Runs the post-a-resource workflow: validate, authenticate, verify,
/// store, award points, recompute the leaderboard.
pub struct SubmissionOrchestrator {
    store: Arc<dyn RecordStore>,
    verifier: Arc<dyn ResourceVerifier>,
}

impl SubmissionOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>, verifier: Arc<dyn ResourceVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Validate raw form fields, then run [`Self::submit`].
    pub async fn submit_raw(
        &self,
        raw: &RawSubmission,
        identity: &dyn IdentityProvider,
    ) -> Result<SubmissionReport, SubmissionError> {
        let submission = match validate(raw) {
            Ok(s) => s,
            Err(e) => {
                advance(SubmissionState::Draft, SubmissionEvent::ValidationFailed)?;
                tracing::info!(field = e.field(), error = %e, "submission rejected by validation");
                return Err(e.into());
            }
        };
        advance(SubmissionState::Draft, SubmissionEvent::ValidationPassed)?;
        self.submit(submission, identity).await
    }

    /// Post an already validated submission on behalf of the current identity.
    pub async fn submit(
        &self,
        submission: ResourceSubmission,
        identity: &dyn IdentityProvider,
    ) -> Result<SubmissionReport, SubmissionError> {
        let state = SubmissionState::Validated;

        // Checked before any call to the verifier.
        let identity = match identity.current_identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                advance(state, SubmissionEvent::AuthenticationMissing)?;
                return Err(SubmissionError::AuthenticationRequired);
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity lookup failed, treating as signed out");
                advance(state, SubmissionEvent::AuthenticationMissing)?;
                return Err(SubmissionError::AuthenticationRequired);
            }
        };

        let state = advance(state, SubmissionEvent::VerificationStarted)?;
        tracing::info!(
            user_id = %identity.id,
            resource_type = %submission.resource_type,
            verifier = self.verifier.name(),
            "verifying submission"
        );

        let reply = match self.verifier.verify(&submission).await {
            Ok(reply) => reply,
            Err(e) => {
                advance(state, SubmissionEvent::VerificationFailed)?;
                tracing::warn!(user_id = %identity.id, error = %e, "AI verification failed, nothing stored");
                return Err(e.into());
            }
        };
        let fallback = reply.is_fallback();
        let outcome = reply.into_outcome();

        let resource = match self
            .store
            .insert_resource(NewResource {
                owner_id: identity.id,
                submission,
                verified: outcome.verified,
                ai_notes: outcome.notes.clone(),
            })
            .await
        {
            Ok(resource) => resource,
            Err(e) => {
                advance(state, SubmissionEvent::StorageFailed)?;
                tracing::error!(user_id = %identity.id, error = %e, "failed to store resource");
                return Err(SubmissionError::Storage(e));
            }
        };

        let profile = match self
            .store
            .increment_points(&identity, POINTS_PER_SUBMISSION)
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                advance(state, SubmissionEvent::StorageFailed)?;
                tracing::error!(
                    user_id = %identity.id,
                    resource_id = %resource.id,
                    error = %e,
                    "resource stored but points were not awarded"
                );
                return Err(SubmissionError::Storage(e));
            }
        };

        if let Err(e) = self.store.recompute_leaderboard().await {
            tracing::warn!(error = %e, "leaderboard recompute failed");
        }

        let event = if outcome.verified {
            SubmissionEvent::StoredVerified
        } else {
            SubmissionEvent::StoredPending
        };
        let state = advance(state, event)?;

        tracing::info!(
            user_id = %identity.id,
            resource_id = %resource.id,
            verified = outcome.verified,
            fallback,
            points = profile.points,
            "resource posted"
        );

        Ok(SubmissionReport {
            state,
            resource,
            outcome,
            fallback,
            profile,
        })
    }

    /// Validate and verify without storing anything or awarding points.
    pub async fn verify_only(
        &self,
        raw: &RawSubmission,
    ) -> Result<VerificationReply, SubmissionError> {
        let submission = validate(raw)?;
        Ok(self.verifier.verify(&submission).await?)
    }
}

fn advance(
    state: SubmissionState,
    event: SubmissionEvent,
) -> Result<SubmissionState, SubmissionError> {
    state.transition(event).map_err(SubmissionError::Internal)
}
