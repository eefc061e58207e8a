//! TOML configuration for the status relay.
//!
//! Lookup order: an explicit path, then the `APP_STATUS_CONFIG` environment
//! variable, then the system location, and finally compiled-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::pins::MAX_RUNS;

pub const CONFIG_ENV_VAR: &str = "APP_STATUS_CONFIG";
pub const SYSTEM_CONFIG_PATH: &str = "/etc/app-status/app-status.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppStatusConfig {
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppStatusConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        info!(path = %path.display(), "loaded app-status configuration");
        Ok(config)
    }

    /// Try `APP_STATUS_CONFIG`, then [`SYSTEM_CONFIG_PATH`], then defaults.
    ///
    /// A candidate that exists but fails to load is skipped with a warning.
    pub fn load_or_default() -> Self {
        let candidates = std::env::var(CONFIG_ENV_VAR)
            .ok()
            .map(PathBuf::from)
            .into_iter()
            .chain(Some(PathBuf::from(SYSTEM_CONFIG_PATH)).filter(|p| p.exists()));

        for path in candidates {
            match Self::load(&path) {
                Ok(cfg) => return cfg,
                Err(e) => warn!(
                    path = %path.display(),
                    error = %format!("{:#}", e),
                    "config file could not be loaded, falling back"
                ),
            }
        }

        debug!("no usable config file, using compiled-in defaults");
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.dashboard.server_url.trim().is_empty() {
            bail!("dashboard.server_url must not be empty");
        }
        if self.dashboard.request_timeout_secs == 0 {
            bail!("dashboard.request_timeout_secs must be greater than 0");
        }
        if self.tracker.run_slots == 0 || self.tracker.run_slots > MAX_RUNS {
            bail!("tracker.run_slots must be between 1 and {}", MAX_RUNS);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Blynk device auth token. Usually supplied on the command line or via
    /// `BLYNK_AUTH` instead of being written to disk.
    pub auth_token: Option<String>,
    /// Base URL of the Blynk server.
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            server_url: "https://blynk.cloud".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Number of concurrently tracked runs.
    pub run_slots: usize,
    /// Reject `add_*_by(run, 0)` with an error instead of pushing a no-op.
    pub reject_zero_increment: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            run_slots: 4,
            reject_zero_increment: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}
