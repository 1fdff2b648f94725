//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (VOLTA_*, nested keys split on `__`)
//! 2. TOML config file (if VOLTA_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The worker section is read once at startup and shared immutably; a new
//! cache generation is started by changing `worker.version_tag`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache store.
    ///
    /// Set via VOLTA_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    ///
    /// Set via VOLTA_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum response body size accepted from the network.
    ///
    /// Set via VOLTA_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Optional network timeout in milliseconds. Unset means requests wait
    /// for the transport to give up on its own.
    ///
    /// Set via VOLTA_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Whether the host can deliver periodic sync events.
    ///
    /// Set via VOLTA_PERIODIC_SYNC environment variable.
    #[serde(default)]
    pub periodic_sync: bool,

    /// Worker policy settings.
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Immutable worker settings: the cache generation and what it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the current cache partition. Changing it triggers a re-install
    /// and eviction of every other partition on activation.
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Base URL the worker controls. Relative manifest entries resolve against it.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Page root focused or opened on notification interaction.
    #[serde(default = "default_root")]
    pub root: String,

    /// Assets fetched and stored during install.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Cached document served to HTML requests when the network is down.
    #[serde(default = "default_offline_document")]
    pub offline_document: String,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

/// Push notification presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Body used when a push arrives without a payload.
    #[serde(default = "default_body")]
    pub default_body: String,

    #[serde(default = "default_logo")]
    pub icon: String,

    #[serde(default = "default_logo")]
    pub badge: String,

    /// Vibration pattern in milliseconds (on, off, on, ...).
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,

    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    #[serde(default = "default_open_action")]
    pub open_action: ActionConfig,

    #[serde(default = "default_dismiss_action")]
    pub dismiss_action: ActionConfig,
}

/// A notification button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub action: String,
    pub title: String,
}

/// Background sync tags the worker reacts to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_data_tag")]
    pub data_tag: String,

    #[serde(default = "default_periodic_tag")]
    pub periodic_tag: String,
}

const LOGO_URL: &str = "https://raw.githubusercontent.com/Samday68/Foto-raflar/refs/heads/main/D354DBAF-3EC7-4B5F-ABC1-8EF876797DAA.jpeg";

fn default_db_path() -> PathBuf {
    PathBuf::from("./volta-cache.sqlite")
}

fn default_user_agent() -> String {
    "volta/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_version_tag() -> String {
    "volatility-analyzer-v3".into()
}

fn default_scope() -> String {
    "http://localhost:8080/".into()
}

fn default_root() -> String {
    "./".into()
}

fn default_manifest() -> Vec<String> {
    vec![
        "./".into(),
        "./index.html".into(),
        "https://cdn.jsdelivr.net/npm/chart.js".into(),
        "https://cdnjs.cloudflare.com/ajax/libs/html2canvas/1.4.1/html2canvas.min.js".into(),
        LOGO_URL.into(),
        "https://raw.githubusercontent.com/Samday68/Foto-raflar/refs/heads/main/B3F65E6D-3FB0-45E3-A46A-7E788A46DEC7.jpeg"
            .into(),
    ]
}

fn default_offline_document() -> String {
    "./index.html".into()
}

fn default_title() -> String {
    "Volatility Analyzer".into()
}

fn default_body() -> String {
    "New market data available".into()
}

fn default_logo() -> String {
    LOGO_URL.into()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

fn default_primary_key() -> String {
    "1".into()
}

fn default_open_action() -> ActionConfig {
    ActionConfig { action: "explore".into(), title: "Open Analyzer".into() }
}

fn default_dismiss_action() -> ActionConfig {
    ActionConfig { action: "close".into(), title: "Close".into() }
}

fn default_data_tag() -> String {
    "sync-data".into()
}

fn default_periodic_tag() -> String {
    "update-market-data".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
            periodic_sync: false,
            worker: WorkerConfig::default(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            version_tag: default_version_tag(),
            scope: default_scope(),
            root: default_root(),
            manifest: default_manifest(),
            offline_document: default_offline_document(),
            notification: NotificationConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_body: default_body(),
            icon: default_logo(),
            badge: default_logo(),
            vibrate: default_vibrate(),
            primary_key: default_primary_key(),
            open_action: default_open_action(),
            dismiss_action: default_dismiss_action(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { data_tag: default_data_tag(), periodic_tag: default_periodic_tag() }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `VOLTA_`
    /// 2. TOML file from `VOLTA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `VOLTA_CONFIG_FILE` names a file that does not exist
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("VOLTA_CONFIG_FILE") {
            if !Path::new(&config_path).is_file() {
                return Err(ConfigError::Missing {
                    field: "VOLTA_CONFIG_FILE".into(),
                    hint: format!("{config_path} is not a readable file"),
                });
            }
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("VOLTA_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
