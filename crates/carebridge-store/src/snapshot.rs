use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use carebridge_types::{PersistedResource, Profile};

/// Layout version written into every snapshot file.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Listings and profiles as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    #[serde(default)]
    pub resources: Vec<PersistedResource>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            resources: Vec::new(),
            profiles: Vec::new(),
        }
    }
}

/// The JSON file an [`InMemoryStore`](crate::InMemoryStore) mirrors itself into.
///
/// Writes go to a sibling `.partial` file first and are renamed over the
/// target, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. A missing file is an empty store.
    pub fn read(&self) -> Result<StoreSnapshot> {
        if !self.path.exists() {
            return Ok(StoreSnapshot::default());
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read store snapshot {}", self.path.display()))?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("Store snapshot {} is corrupt", self.path.display()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            bail!(
                "Store snapshot {} has version {}, expected {}",
                self.path.display(),
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(snapshot)
    }

    pub async fn write(&self, snapshot: &StoreSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create snapshot directory")?;
        }
        let bytes = serde_json::to_vec(snapshot).context("Failed to encode store snapshot")?;

        let partial = self.partial_path();
        tokio::fs::write(&partial, bytes)
            .await
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        tokio::fs::rename(&partial, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".partial");
        self.path.with_file_name(name)
    }
}
