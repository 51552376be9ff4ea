// crates/nucleoid-sync/src/config.rs
//
// Runtime configuration for the sync coordinator.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;
use std::time::Duration;

use serde::Deserialize;

use nucleoid_core::error::NucleoidError;

/// Timeouts and scheduling policy for synchronization rounds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SyncConfig {
    /// Bound on a single-record request/response exchange, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Bound on the full-round metadata (announce) exchange, in seconds.
    #[serde(default = "default_announce_timeout_secs")]
    pub announce_timeout_secs: u64,

    /// Interval between scheduled rounds, in seconds.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_announce_timeout_secs() -> u64 {
    30
}

fn default_sync_interval_secs() -> u64 {
    60
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            announce_timeout_secs: default_announce_timeout_secs(),
            sync_interval_secs: default_sync_interval_secs(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns a `Config` error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, NucleoidError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| NucleoidError::Config(format!("cannot read {}: {}", path, e)))?;
        let config: SyncConfig = toml::from_str(&contents)
            .map_err(|e| NucleoidError::Config(format!("cannot parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Request-phase timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Announce-phase timeout as a `Duration`.
    pub fn announce_timeout(&self) -> Duration {
        Duration::from_secs(self.announce_timeout_secs)
    }

    /// Scheduled-round interval as a `Duration`.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recommended_bounds() {
        let config = SyncConfig::default();
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.announce_timeout_secs, 30);
        assert_eq!(config.sync_interval_secs, 60);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: SyncConfig = toml::from_str("request_timeout_secs = 2\n").unwrap();
        assert_eq!(config.request_timeout_secs, 2);
        assert_eq!(config.announce_timeout_secs, 30);
        assert_eq!(config.sync_interval_secs, 60);
    }

    /// Temporary config file path unique to this test process.
    fn temp_config_path(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("nucleoid_config_{}_{}.toml", label, std::process::id()))
    }

    #[test]
    fn load_reads_a_toml_file() {
        let path = temp_config_path("ok");
        fs::write(&path, "announce_timeout_secs = 5\nsync_interval_secs = 7\n").unwrap();

        let config = SyncConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.announce_timeout_secs, 5);
        assert_eq!(config.sync_interval_secs, 7);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn load_maps_missing_file_to_config_error() {
        let path = temp_config_path("missing");
        let err = SyncConfig::load(path.to_str().unwrap()).unwrap_err();
        match err {
            NucleoidError::Config(msg) => assert!(msg.contains("cannot read")),
            other => panic!("Expected Config, got: {:?}", other),
        }
    }

    #[test]
    fn load_maps_bad_toml_to_config_error() {
        let path = temp_config_path("bad");
        fs::write(&path, "request_timeout_secs = \"fast\"\n").unwrap();

        let err = SyncConfig::load(path.to_str().unwrap()).unwrap_err();
        match err {
            NucleoidError::Config(msg) => assert!(msg.contains("cannot parse")),
            other => panic!("Expected Config, got: {:?}", other),
        }

        fs::remove_file(&path).ok();
    }
}
