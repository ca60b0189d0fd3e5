use std::cmp::Reverse;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use carebridge_types::{CarebridgeError, Identity, NewResource, PersistedResource, Profile};

use crate::query::ResourceQuery;
use crate::snapshot::{SnapshotFile, StoreSnapshot};
use crate::traits::RecordStore;

/// In-memory record store (default).
///
/// When opened on a snapshot file, every new listing, new profile and
/// points change is mirrored to disk before the call returns.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    resources: Arc<RwLock<Vec<PersistedResource>>>,
    index_by_id: Arc<DashMap<Uuid, usize>>,
    index_by_owner: Arc<DashMap<Uuid, Vec<usize>>>,
    profiles: Arc<DashMap<Uuid, Profile>>,
    snapshot_file: Option<Arc<Mutex<SnapshotFile>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            resources: Arc::new(RwLock::new(Vec::new())),
            index_by_id: Arc::new(DashMap::new()),
            index_by_owner: Arc::new(DashMap::new()),
            profiles: Arc::new(DashMap::new()),
            snapshot_file: None,
        }
    }

    /// Load the store from `path` and keep it in sync with that file.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let file = SnapshotFile::new(path);
        let mut store = Self::from_snapshot(file.read()?);
        tracing::info!(
            path = %file.path().display(),
            resources = store.index_by_id.len(),
            profiles = store.profiles.len(),
            "store snapshot loaded"
        );
        store.snapshot_file = Some(Arc::new(Mutex::new(file)));
        // Ranks are derived, so rebuild them rather than trust the file.
        store.assign_ranks();
        Ok(store)
    }

    /// Rebuild a store from a previously saved snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let index_by_id = DashMap::new();
        let index_by_owner: DashMap<Uuid, Vec<usize>> = DashMap::new();
        for (idx, resource) in snapshot.resources.iter().enumerate() {
            index_by_id.insert(resource.id, idx);
            index_by_owner.entry(resource.owner_id).or_default().push(idx);
        }

        let profiles = DashMap::new();
        for profile in snapshot.profiles {
            profiles.insert(profile.id, profile);
        }

        Self {
            resources: Arc::new(RwLock::new(snapshot.resources)),
            index_by_id: Arc::new(index_by_id),
            index_by_owner: Arc::new(index_by_owner),
            profiles: Arc::new(profiles),
            snapshot_file: None,
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let resources = self.resources.read().await.clone();
        let profiles = self.profiles.iter().map(|p| p.value().clone()).collect();
        StoreSnapshot {
            resources,
            profiles,
            ..StoreSnapshot::default()
        }
    }

    /// Write the current contents to the snapshot file, if there is one.
    ///
    /// The file lock is taken before the contents are read, so writes land
    /// in the order their snapshots were taken.
    pub async fn flush(&self) -> anyhow::Result<()> {
        let Some(file) = &self.snapshot_file else {
            return Ok(());
        };
        let file = file.lock().await;
        let snapshot = self.snapshot().await;
        file.write(&snapshot).await
    }

    /// Flush after a mutation. Memory stays authoritative when the disk
    /// write fails; the next successful flush carries the missed change.
    async fn persist(&self) {
        if let Err(e) = self.flush().await {
            tracing::error!(error = %format!("{e:#}"), "failed to persist store snapshot");
        }
    }

    fn assign_ranks(&self) -> usize {
        let ranked = self.ranked_profiles();
        for (position, profile) in ranked.iter().enumerate() {
            if let Some(mut entry) = self.profiles.get_mut(&profile.id) {
                entry.rank = Some(position as u32 + 1);
            }
        }
        ranked.len()
    }

    /// Profiles in leaderboard order: points descending, then earliest sign-up.
    fn ranked_profiles(&self) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self.profiles.iter().map(|p| p.value().clone()).collect();
        profiles.sort_by_key(|p| (Reverse(p.points), p.created_at, p.id));
        profiles
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first; ties keep the later insertion first.
fn newest_first<'a>(
    rows: impl DoubleEndedIterator<Item = &'a PersistedResource>,
) -> Vec<PersistedResource> {
    let mut out: Vec<PersistedResource> = rows.rev().cloned().collect();
    out.sort_by_key(|r| Reverse(r.last_updated));
    out
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert_resource(
        &self,
        resource: NewResource,
    ) -> Result<PersistedResource, CarebridgeError> {
        let row = resource.into_persisted(Utc::now());

        {
            let mut resources = self.resources.write().await;
            let idx = resources.len();

            self.index_by_id.insert(row.id, idx);
            self.index_by_owner.entry(row.owner_id).or_default().push(idx);

            resources.push(row.clone());
        }
        self.persist().await;
        Ok(row)
    }

    async fn get_resource(&self, id: Uuid) -> Result<Option<PersistedResource>, CarebridgeError> {
        let resources = self.resources.read().await;
        Ok(self
            .index_by_id
            .get(&id)
            .and_then(|idx| resources.get(*idx).cloned()))
    }

    async fn list_resources(
        &self,
        query: &ResourceQuery,
    ) -> Result<Vec<PersistedResource>, CarebridgeError> {
        let resources = self.resources.read().await;
        Ok(newest_first(resources.iter().filter(|r| query.matches(r))))
    }

    async fn resources_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<PersistedResource>, CarebridgeError> {
        let resources = self.resources.read().await;
        let owned: Vec<&PersistedResource> = self
            .index_by_owner
            .get(&owner_id)
            .map(|indices| indices.iter().filter_map(|i| resources.get(*i)).collect())
            .unwrap_or_default();

        let mut out: Vec<PersistedResource> = owned.into_iter().rev().cloned().collect();
        out.sort_by_key(|r| Reverse(r.created_at));
        Ok(out)
    }

    async fn upsert_profile(&self, identity: &Identity) -> Result<Profile, CarebridgeError> {
        let profile = match self.profiles.entry(identity.id) {
            Entry::Occupied(entry) => return Ok(entry.get().clone()),
            Entry::Vacant(entry) => entry.insert(Profile::new(identity)).clone(),
        };
        self.persist().await;
        Ok(profile)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, CarebridgeError> {
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn increment_points(
        &self,
        identity: &Identity,
        delta: i64,
    ) -> Result<Profile, CarebridgeError> {
        let updated = {
            // The entry guard holds the shard lock for the whole read-add-write.
            let mut profile = self
                .profiles
                .entry(identity.id)
                .or_insert_with(|| Profile::new(identity));
            profile.points = profile
                .points
                .checked_add(delta)
                .ok_or_else(|| CarebridgeError::Storage("points overflow".into()))?;
            profile.clone()
        };
        self.persist().await;
        Ok(updated)
    }

    async fn recompute_leaderboard(&self) -> Result<(), CarebridgeError> {
        let ranked = self.assign_ranks();
        tracing::debug!(profiles = ranked, "leaderboard recomputed");
        Ok(())
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<Profile>, CarebridgeError> {
        let mut ranked = self.ranked_profiles();
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebridge_types::{ResourceSubmission, ResourceType};

    fn new_resource(owner: Uuid, name: &str, t: ResourceType) -> NewResource {
        NewResource {
            owner_id: owner,
            submission: ResourceSubmission {
                name: name.into(),
                resource_type: t,
                location: "Mumbai".into(),
                quantity: None,
                description: None,
            },
            verified: true,
            ai_notes: "ok".into(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let row = store
            .insert_resource(new_resource(owner, "Depot", ResourceType::Oxygen))
            .await
            .unwrap();

        let fetched = store.get_resource(row.id).await.unwrap().unwrap();
        assert_eq!(fetched, row);
        assert_eq!(fetched.owner_id, owner);
        assert!(store.get_resource(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filter() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        for (name, t) in [
            ("First Bank", ResourceType::BloodBank),
            ("Depot", ResourceType::Oxygen),
            ("Second Bank", ResourceType::BloodBank),
        ] {
            store.insert_resource(new_resource(owner, name, t)).await.unwrap();
        }

        let all = store.list_resources(&ResourceQuery::all()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Second Bank", "Depot", "First Bank"]);

        let banks = store
            .list_resources(&ResourceQuery::all().with_types([ResourceType::BloodBank]))
            .await
            .unwrap();
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name, "Second Bank");
    }

    #[tokio::test]
    async fn test_resources_by_owner() {
        let store = InMemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.insert_resource(new_resource(alice, "A1", ResourceType::Medicine)).await.unwrap();
        store.insert_resource(new_resource(bob, "B1", ResourceType::Medicine)).await.unwrap();
        store.insert_resource(new_resource(alice, "A2", ResourceType::Medicine)).await.unwrap();

        let mine = store.resources_by_owner(alice).await.unwrap();
        let names: Vec<&str> = mine.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A2", "A1"]);
        assert!(store.resources_by_owner(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_increment_creates_profile() {
        let store = InMemoryStore::new();
        let who = Identity::new("asha");
        let profile = store.increment_points(&who, 5).await.unwrap();
        assert_eq!(profile.points, 5);
        assert_eq!(profile.display_name, "asha");
        let profile = store.increment_points(&who, 5).await.unwrap();
        assert_eq!(profile.points, 10);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryStore::new());
        let who = Identity::new("busy");

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            let who = who.clone();
            handles.push(tokio::spawn(async move {
                store.increment_points(&who, 5).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let profile = store.get_profile(who.id).await.unwrap().unwrap();
        assert_eq!(profile.points, 250);
    }

    #[tokio::test]
    async fn test_leaderboard_and_recompute() {
        let store = InMemoryStore::new();
        let low = Identity::new("low");
        let high = Identity::new("high");
        let mid = Identity::new("mid");
        store.increment_points(&low, 5).await.unwrap();
        store.increment_points(&high, 20).await.unwrap();
        store.increment_points(&mid, 10).await.unwrap();

        let top = store.leaderboard(2).await.unwrap();
        let names: Vec<&str> = top.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid"]);

        assert!(store.get_profile(high.id).await.unwrap().unwrap().rank.is_none());
        store.recompute_leaderboard().await.unwrap();
        assert_eq!(store.get_profile(high.id).await.unwrap().unwrap().rank, Some(1));
        assert_eq!(store.get_profile(mid.id).await.unwrap().unwrap().rank, Some(2));
        assert_eq!(store.get_profile(low.id).await.unwrap().unwrap().rank, Some(3));
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_keeps_indexes() {
        let store = InMemoryStore::new();
        let who = Identity::new("asha");
        let row = store
            .insert_resource(new_resource(who.id, "Depot", ResourceType::Oxygen))
            .await
            .unwrap();
        store.increment_points(&who, 5).await.unwrap();

        let restored = InMemoryStore::from_snapshot(store.snapshot().await);
        assert_eq!(restored.get_resource(row.id).await.unwrap().unwrap().name, "Depot");
        assert_eq!(restored.resources_by_owner(who.id).await.unwrap().len(), 1);
        assert_eq!(restored.get_profile(who.id).await.unwrap().unwrap().points, 5);
    }

    #[tokio::test]
    async fn test_opened_store_survives_without_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carebridge.json");
        let who = Identity::new("asha");
        let row = {
            let store = InMemoryStore::open(&path).await.unwrap();
            store.upsert_profile(&who).await.unwrap();
            let row = store
                .insert_resource(new_resource(who.id, "Depot", ResourceType::Oxygen))
                .await
                .unwrap();
            store.increment_points(&who, 5).await.unwrap();
            // Dropped without flush, as after a crash.
            row
        };

        let reopened = InMemoryStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_resource(row.id).await.unwrap().unwrap().name, "Depot");
        let profile = reopened.get_profile(who.id).await.unwrap().unwrap();
        assert_eq!(profile.points, 5);
        assert_eq!(profile.rank, Some(1));
    }

    #[tokio::test]
    async fn test_store_without_file_flushes_nothing() {
        let store = InMemoryStore::new();
        store.increment_points(&Identity::new("asha"), 5).await.unwrap();
        store.flush().await.unwrap();
    }
}
