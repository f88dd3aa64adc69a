use std::path::PathBuf;
use std::time::Duration;

use cruise_feed::{DownloaderConfig, LineId, LineIdMap, RetryConfig};
use cruise_feed_supplier::SupplierClientConfig;
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub supplier: SupplierConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    /// Explicit local-to-supplier line id overrides. Lines without an
    /// entry pass through unchanged.
    #[serde(default)]
    pub line_overrides: Vec<LineOverride>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupplierConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    /// Days ahead covered by `sync recent`.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: u32,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineOverride {
    pub local: u32,
    pub supplier: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_payload_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_workers() -> usize {
    8
}

fn default_queue_depth() -> usize {
    64
}

fn default_recent_window_days() -> u32 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_depth: default_queue_depth(),
            recent_window_days: default_recent_window_days(),
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl AppConfig {
    pub fn line_map(&self) -> LineIdMap {
        LineIdMap::new(
            self.line_overrides
                .iter()
                .map(|o| (LineId::new(o.local), o.supplier)),
        )
    }

    pub fn supplier_client_config(&self) -> SupplierClientConfig {
        let mut config = SupplierClientConfig::new(self.supplier.base_url.clone());
        config.username = self.supplier.username.clone();
        config.password = self.supplier.password.clone();
        config.timeout = Duration::from_secs(self.supplier.timeout_secs);
        config.max_payload_bytes = self.supplier.max_payload_bytes;
        config
    }

    pub fn downloader_config(&self) -> DownloaderConfig {
        DownloaderConfig {
            workers: self.sync.workers,
            queue_depth: self.sync.queue_depth,
            retry: RetryConfig {
                max_attempts: self.sync.retry.max_attempts,
                base_delay: Duration::from_millis(self.sync.retry.base_delay_ms),
                max_delay: Duration::from_millis(self.sync.retry.max_delay_ms),
            },
        }
    }

    /// Overlay credential env vars on top of the file config. The
    /// supplier account lives in the deploy environment, not on disk.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CRUISEFEED_SUPPLIER_URL")
            && !url.is_empty()
        {
            self.supplier.base_url = url;
        }
        if let Ok(user) = std::env::var("CRUISEFEED_SUPPLIER_USER")
            && !user.is_empty()
        {
            self.supplier.username = Some(user);
        }
        if let Ok(password) = std::env::var("CRUISEFEED_SUPPLIER_PASSWORD")
            && !password.is_empty()
        {
            self.supplier.password = Some(password);
        }
    }
}

/// Config file path: `~/.config/cruise-feed/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cruise-feed").join("config.toml"))
}

/// Load config from an explicit path or the default location, falling
/// back to defaults if missing, then apply env overrides.
pub fn load_config(explicit: Option<&PathBuf>) -> AppConfig {
    let path = explicit.cloned().or_else(config_path);

    let mut config = AppConfig::default();
    if let Some(path) = path
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(parsed) => config = parsed,
            Err(e) => {
                eprintln!(
                    "warning: failed to parse config at {}: {e}; using defaults",
                    path.display()
                );
            }
        }
    }

    config.apply_env_overrides();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[supplier]
base_url = "https://feeds.example.com"
"#,
        )
        .unwrap();

        assert_eq!(config.supplier.base_url, "https://feeds.example.com");
        assert_eq!(config.supplier.timeout_secs, 30);
        assert_eq!(config.sync.workers, 8);
        assert_eq!(config.sync.queue_depth, 64);
        assert_eq!(config.sync.recent_window_days, 30);
        assert_eq!(config.sync.retry.max_attempts, 3);
        assert!(config.line_overrides.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let config: AppConfig = toml::from_str(
            r#"
[supplier]
base_url = "https://feeds.example.com"
username = "feed-user"
password = "feed-pass"
timeout_secs = 45

[sync]
workers = 4
queue_depth = 16
recent_window_days = 14

[sync.retry]
max_attempts = 5
base_delay_ms = 250
max_delay_ms = 4000

[[line_overrides]]
local = 15
supplier = 3

[[line_overrides]]
local = 22
supplier = 8
"#,
        )
        .unwrap();

        assert_eq!(config.supplier.username.as_deref(), Some("feed-user"));
        assert_eq!(config.supplier.timeout_secs, 45);
        assert_eq!(config.sync.workers, 4);
        assert_eq!(config.sync.retry.max_attempts, 5);
        assert_eq!(config.line_overrides.len(), 2);
    }

    #[test]
    fn line_map_applies_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
[supplier]
base_url = "https://feeds.example.com"

[[line_overrides]]
local = 15
supplier = 3
"#,
        )
        .unwrap();

        let map = config.line_map();
        assert_eq!(map.resolve(LineId::new(15)), 3);
        assert_eq!(map.resolve(LineId::new(7)), 7);
        assert_eq!(map.invert(3), LineId::new(15));
    }

    #[test]
    fn downloader_config_converts_durations() {
        let config = AppConfig::default();
        let downloader = config.downloader_config();
        assert_eq!(downloader.retry.base_delay, Duration::from_millis(500));
        assert_eq!(downloader.retry.max_delay, Duration::from_millis(8000));
    }

    #[test]
    fn missing_config_uses_defaults() {
        let config = AppConfig::default();
        assert!(config.supplier.base_url.is_empty());
        assert_eq!(config.sync.workers, 8);
    }
}
