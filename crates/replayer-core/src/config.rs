use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::request::{DEFAULT_LABEL_WIDTH, DEFAULT_SUCCESS_MARKER};

/// Which error classification policy the engines use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicyKind {
    /// Every failed attempt is retried (historical behaviour).
    #[default]
    AlwaysRetry,
    /// Stop an engine on errors that cannot heal by retrying (bad URL, unknown host).
    FailOnPermanent,
}

/// Global configuration loaded from `~/.config/replayer/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayerConfig {
    /// JSON file with the `{name, url, content}` target records.
    pub targets_file: PathBuf,
    /// Fixed delay between attempts, in milliseconds.
    pub delay_ms: u64,
    /// Upper bound for one send/receive, in seconds.
    pub attempt_timeout_secs: u64,
    /// Optional TCP/TLS connect timeout in seconds (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Substring of the first response line that means the target accepted the request.
    #[serde(default = "default_success_marker")]
    pub success_marker: String,
    /// Column width the target label is padded/truncated to in log lines.
    #[serde(default = "default_label_width")]
    pub label_width: usize,
    #[serde(default)]
    pub error_policy: ErrorPolicyKind,
}

fn default_success_marker() -> String {
    DEFAULT_SUCCESS_MARKER.to_string()
}

fn default_label_width() -> usize {
    DEFAULT_LABEL_WIDTH
}

impl Default for ReplayerConfig {
    fn default() -> Self {
        Self {
            targets_file: PathBuf::from("courses.json"),
            delay_ms: 1000,
            attempt_timeout_secs: 600,
            connect_timeout_secs: None,
            success_marker: default_success_marker(),
            label_width: default_label_width(),
            error_policy: ErrorPolicyKind::default(),
        }
    }
}

impl ReplayerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("replayer")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ReplayerConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<ReplayerConfig> {
    if !path.exists() {
        let default_cfg = ReplayerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("writing default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ReplayerConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
