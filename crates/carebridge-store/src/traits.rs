use async_trait::async_trait;
use uuid::Uuid;

use carebridge_types::{CarebridgeError, Identity, NewResource, PersistedResource, Profile};

use crate::query::ResourceQuery;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 50;

/// Backing store for listings and reputation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a listing. The store assigns its id and timestamps.
    async fn insert_resource(
        &self,
        resource: NewResource,
    ) -> Result<PersistedResource, CarebridgeError>;

    /// A single listing by id.
    async fn get_resource(&self, id: Uuid) -> Result<Option<PersistedResource>, CarebridgeError>;

    /// Listings matching `query`, most recently updated first.
    async fn list_resources(
        &self,
        query: &ResourceQuery,
    ) -> Result<Vec<PersistedResource>, CarebridgeError>;

    /// Listings posted by one user, newest first.
    async fn resources_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<PersistedResource>, CarebridgeError>;

    /// Fetch the profile for `identity`, creating an empty one if absent.
    async fn upsert_profile(&self, identity: &Identity) -> Result<Profile, CarebridgeError>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, CarebridgeError>;

    /// Add `delta` to a profile's points as one atomic step, creating the
    /// profile if needed. Returns the updated profile.
    async fn increment_points(
        &self,
        identity: &Identity,
        delta: i64,
    ) -> Result<Profile, CarebridgeError>;

    /// Reassign every profile's cached leaderboard rank.
    async fn recompute_leaderboard(&self) -> Result<(), CarebridgeError>;

    /// Top `limit` profiles by points.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<Profile>, CarebridgeError>;
}
