use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use carebridge_identity::DEFAULT_SESSION_TTL_HOURS;
use carebridge_store::DEFAULT_LEADERBOARD_LIMIT;
use carebridge_verification::GatewaySettings;

/// Environment variable holding the AI gateway API key.
pub const API_KEY_ENV: &str = "CAREBRIDGE_AI_API_KEY";

/// Top-level configuration for the carebridge server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarebridgeConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// AI gateway used to verify submissions.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Hours a sign-in token stays valid.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,

    /// Default number of profiles returned by the leaderboard.
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,

    /// Where to persist the store between runs. In-memory only when unset.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json_logs: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_session_ttl_hours() -> u32 {
    DEFAULT_SESSION_TTL_HOURS
}

fn default_leaderboard_limit() -> usize {
    DEFAULT_LEADERBOARD_LIMIT
}

impl Default for CarebridgeConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            gateway: GatewaySettings::default(),
            session_ttl_hours: default_session_ttl_hours(),
            leaderboard_limit: default_leaderboard_limit(),
            snapshot_path: None,
            json_logs: false,
        }
    }
}

impl CarebridgeConfig {
    /// Load config from disk. Returns default if not found.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Take the gateway API key from `key` when present, else keep the file's.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.gateway.api_key = Some(key.trim().to_string());
        }
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key(std::env::var(API_KEY_ENV).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = CarebridgeConfig::default();
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.leaderboard_limit, 50);
        assert_eq!(config.gateway.timeout_secs, 30);
        assert!(config.gateway.api_key.is_none());
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempdir().unwrap();
        let config = CarebridgeConfig::load(&dir.path().join("carebridge.toml")).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carebridge.toml");
        std::fs::write(
            &path,
            "bind = \"0.0.0.0:9000\"\n\n[gateway]\nmodel = \"small-model\"\n",
        )
        .unwrap();

        let config = CarebridgeConfig::load(&path).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.gateway.model, "small-model");
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.session_ttl_hours, 24);
    }

    #[test]
    fn test_reward_setting_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carebridge.toml");
        std::fs::write(&path, "points_per_submission = -5\n").unwrap();

        let err = CarebridgeConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("points_per_submission"));
    }

    #[test]
    fn test_serialized_config_omits_api_key() {
        let config = CarebridgeConfig::default().with_api_key(Some("secret".into()));
        let written = toml::to_string_pretty(&config).unwrap();
        assert!(!written.contains("secret"));
        assert!(written.contains("session_ttl_hours = 24"));
    }

    #[test]
    fn test_api_key_override() {
        let config = CarebridgeConfig::default().with_api_key(Some("  key-1 ".into()));
        assert_eq!(config.gateway.api_key.as_deref(), Some("key-1"));

        let config = config.with_api_key(Some("   ".into()));
        assert_eq!(config.gateway.api_key.as_deref(), Some("key-1"));

        let config = config.with_api_key(None);
        assert_eq!(config.gateway.api_key.as_deref(), Some("key-1"));
    }
}
