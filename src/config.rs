use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Minimum commit interval the scheduler will accept
pub const MIN_COMMIT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub realtime: RealtimeSettings,
    pub relay: RelaySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,

    /// Comma-separated list of allowed CORS origins (empty disables CORS)
    #[serde(default)]
    pub cors_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Connection settings for the remote realtime transcription service
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeSettings {
    /// WebSocket endpoint URL (wss://...)
    pub url: String,

    /// Bearer credential for the handshake
    #[serde(default)]
    pub api_key: String,

    /// Request the beta protocol variant via a header flag
    #[serde(default)]
    pub beta_header: bool,

    /// Transcription language passed in the initial control event
    #[serde(default = "default_language")]
    pub language: String,
}

/// Tuning knobs for the duplex relay core
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    /// How often buffered audio is committed upstream (clamped to 50ms)
    #[serde(default = "default_commit_interval_ms")]
    pub commit_interval_ms: u64,

    /// Gap between audio chunks after which a session counts as idle
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_commit_interval_ms() -> u64 {
    1000
}

fn default_idle_timeout_secs() -> u64 {
    10
}

impl ServiceConfig {
    /// Parsed CORS origin list (trimmed, empty entries dropped)
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl RelaySettings {
    pub fn commit_interval(&self) -> Duration {
        Duration::from_millis(self.commit_interval_ms.max(MIN_COMMIT_INTERVAL_MS))
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Config {
    /// Load configuration from a file, with `STT_RELAY_*` environment
    /// variables layered on top (e.g. `STT_RELAY_REALTIME__API_KEY`)
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("STT_RELAY").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
