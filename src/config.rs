use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::frame::FrameSourceConfig;
use crate::presence::PresenceWindow;
use crate::recorder::RecorderConfig;

/// Environment variables override file settings, e.g.
/// `TRIGGER_RECORDER__RECORDER__HOLD_SECS=5`
pub const ENV_PREFIX: &str = "TRIGGER_RECORDER";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub recorder: RecorderConfig,
    pub source: FrameSourceConfig,
    pub presence: PresenceConfig,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    /// Used when RUST_LOG is unset
    pub log_level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Time windows during which presence is reported
    pub windows: Vec<PresenceWindow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// JSON-lines log of closed clips (None = log only)
    pub jsonl_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "trigger-recorder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `path` (extension optional, file optional) layered under the environment
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
