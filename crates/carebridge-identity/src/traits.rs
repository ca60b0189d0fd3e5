use async_trait::async_trait;

use carebridge_types::{CarebridgeError, Identity};

/// Source of the currently authenticated user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means no active session.
    async fn current_identity(&self) -> Result<Option<Identity>, CarebridgeError>;
}

/// Provider that always reports the same identity, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<Identity>);

impl StaticIdentity {
    pub fn signed_in(identity: Identity) -> Self {
        Self(Some(identity))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_identity(&self) -> Result<Option<Identity>, CarebridgeError> {
        Ok(self.0.clone())
    }
}
