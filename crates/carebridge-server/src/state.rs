use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;

use carebridge_identity::SessionRegistry;
use carebridge_orchestrator::SubmissionOrchestrator;
use carebridge_store::{DEFAULT_LEADERBOARD_LIMIT, RecordStore};
use carebridge_verification::{GatewayVerifier, ResourceVerifier};

use crate::config::CarebridgeConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub sessions: Arc<SessionRegistry>,
    pub orchestrator: Arc<SubmissionOrchestrator>,
    pub leaderboard_limit: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, verifier: Arc<dyn ResourceVerifier>) -> Self {
        let orchestrator = Arc::new(SubmissionOrchestrator::new(store.clone(), verifier));
        Self {
            store,
            sessions: Arc::new(SessionRegistry::new()),
            orchestrator,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }

    /// Build state backed by the configured AI gateway.
    pub fn from_config(config: &CarebridgeConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        if config.gateway.api_key.is_none() {
            tracing::warn!("no AI gateway API key configured; every submission will be rejected");
        }
        let verifier = GatewayVerifier::new(config.gateway.clone())
            .context("Failed to create gateway verifier")?;

        let orchestrator = SubmissionOrchestrator::new(store.clone(), Arc::new(verifier));
        let ttl = Duration::hours(i64::from(config.session_ttl_hours));
        let sessions = SessionRegistry::with_ttl(ttl);

        Ok(Self {
            store,
            sessions: Arc::new(sessions),
            orchestrator: Arc::new(orchestrator),
            leaderboard_limit: config.leaderboard_limit,
        })
    }
}
