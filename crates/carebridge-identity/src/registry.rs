use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::{Rng, distributions::Alphanumeric};
use sha2::{Digest, Sha256};

use carebridge_types::{CarebridgeError, Identity};

use crate::traits::IdentityProvider;

const TOKEN_LEN: usize = 48;

pub const DEFAULT_SESSION_TTL_HOURS: u32 = 24;

#[derive(Debug, Clone)]
struct Session {
    identity: Identity,
    issued_at: DateTime<Utc>,
}

/// Bearer-token sessions. Only token digests are kept.
///
/// A session lives for `ttl` after it was issued. Expired entries are
/// dropped when their token is presented and swept whenever a new session
/// is issued, so abandoned tokens do not accumulate.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(i64::from(DEFAULT_SESSION_TTL_HOURS)))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.issued_at >= self.ttl
    }

    /// Sign in a fresh identity and return its token.
    pub fn issue(&self, display_name: impl Into<String>) -> (String, Identity) {
        let identity = Identity::new(display_name);
        let token = self.issue_for(identity.clone());
        (token, identity)
    }

    /// Start a new session for an existing identity.
    pub fn issue_for(&self, identity: Identity) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let now = Utc::now();
        self.sessions.retain(|_, s| !self.is_expired(s, now));

        tracing::info!(user_id = %identity.id, "session issued");
        self.sessions.insert(
            digest(&token),
            Session {
                identity,
                issued_at: now,
            },
        );
        token
    }

    /// Identity behind `token`, if the session exists and has not expired.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let key = digest(token);
        let now = Utc::now();
        if let Some(session) = self.sessions.get(&key) {
            if !self.is_expired(&session, now) {
                return Some(session.identity.clone());
            }
        }
        if self
            .sessions
            .remove_if(&key, |_, s| self.is_expired(s, now))
            .is_some()
        {
            tracing::debug!("expired session dropped");
        }
        None
    }

    /// End a session. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(&digest(token)).is_some()
    }
}

fn digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Identity provider for one request carrying an optional bearer token.
#[derive(Debug, Clone)]
pub struct BearerSession {
    registry: Arc<SessionRegistry>,
    token: Option<String>,
}

impl BearerSession {
    pub fn new(registry: Arc<SessionRegistry>, token: Option<String>) -> Self {
        Self { registry, token }
    }
}

#[async_trait]
impl IdentityProvider for BearerSession {
    async fn current_identity(&self) -> Result<Option<Identity>, CarebridgeError> {
        Ok(self
            .token
            .as_deref()
            .and_then(|token| self.registry.resolve(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StaticIdentity;

    #[test]
    fn test_issue_and_resolve() {
        let registry = SessionRegistry::new();
        let (token, identity) = registry.issue("asha");
        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(registry.resolve(&token), Some(identity));
        assert!(registry.resolve("not-a-token").is_none());
    }

    #[test]
    fn test_raw_tokens_are_not_stored() {
        let registry = SessionRegistry::new();
        let (token, _) = registry.issue("asha");
        assert!(!registry.sessions.contains_key(&token));
        assert!(registry.sessions.contains_key(&digest(&token)));
    }

    #[test]
    fn test_revoke() {
        let registry = SessionRegistry::new();
        let (token, _) = registry.issue("asha");
        assert!(registry.revoke(&token));
        assert!(!registry.revoke(&token));
        assert!(registry.resolve(&token).is_none());
        assert!(registry.sessions.is_empty());
    }

    #[test]
    fn test_tokens_are_unique() {
        let registry = SessionRegistry::new();
        let identity = Identity::new("asha");
        let a = registry.issue_for(identity.clone());
        let b = registry.issue_for(identity);
        assert_ne!(a, b);
        assert_eq!(registry.sessions.len(), 2);
    }

    #[test]
    fn test_expired_session_is_dropped_on_resolve() {
        let registry = SessionRegistry::with_ttl(Duration::zero());
        let (token, _) = registry.issue("asha");
        assert!(registry.resolve(&token).is_none());
        assert!(!registry.sessions.contains_key(&digest(&token)));
    }

    #[test]
    fn test_expired_sessions_are_swept_on_issue() {
        let registry = SessionRegistry::new();
        let (stale, _) = registry.issue("asha");
        registry
            .sessions
            .get_mut(&digest(&stale))
            .unwrap()
            .issued_at -= Duration::hours(i64::from(DEFAULT_SESSION_TTL_HOURS) + 1);

        let (fresh, identity) = registry.issue("ravi");
        assert_eq!(registry.sessions.len(), 1);
        assert!(registry.resolve(&stale).is_none());
        assert_eq!(registry.resolve(&fresh), Some(identity));
    }

    #[tokio::test]
    async fn test_bearer_session() {
        let registry = Arc::new(SessionRegistry::new());
        let (token, identity) = registry.issue("asha");

        let session = BearerSession::new(registry.clone(), Some(token));
        assert_eq!(session.current_identity().await.unwrap(), Some(identity));

        let anonymous = BearerSession::new(registry.clone(), None);
        assert!(anonymous.current_identity().await.unwrap().is_none());

        let bogus = BearerSession::new(registry, Some("bogus".into()));
        assert!(bogus.current_identity().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_static_identity() {
        let identity = Identity::new("fixed");
        let provider = StaticIdentity::signed_in(identity.clone());
        assert_eq!(provider.current_identity().await.unwrap(), Some(identity));
        assert!(StaticIdentity::anonymous().current_identity().await.unwrap().is_none());
    }
}
