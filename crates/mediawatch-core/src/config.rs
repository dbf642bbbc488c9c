use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::descriptor::{DescriptorKey, DescriptorTable, ErrorDescriptor};

/// Default polling period in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MILLIS: u64 = 1000;

/// Invalid plugin options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pollIntervalMillis must be greater than zero")]
    ZeroPollInterval,
    #[error("invalid error descriptor key {0:?} (expected an integer code or \"unknown\")")]
    InvalidDescriptorKey(String),
    #[error("invalid probe URL {url:?}: {source}")]
    InvalidProbeUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid plugin options JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Options supplied when the watchdog is attached (JSON registration payload or
/// `config.toml`). Every key is optional; absent keys keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPluginOptions")]
pub struct PluginOptions {
    /// Polling period in milliseconds. `timeout` is accepted for older embeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_millis: Option<u64>,
    /// URL to probe instead of the player source. `testUrl` is accepted for older embeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_url_override: Option<String>,
    /// Descriptor overrides keyed by code (`"2"`, `"-1"`) or `"unknown"`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub error_descriptors: BTreeMap<String, ErrorDescriptor>,
}

/// Wire form of [`PluginOptions`]: legacy names are separate keys, and the
/// current name wins when both are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPluginOptions {
    #[serde(default)]
    poll_interval_millis: Option<u64>,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    probe_url_override: Option<String>,
    #[serde(default)]
    test_url: Option<String>,
    #[serde(default)]
    error_descriptors: BTreeMap<String, ErrorDescriptor>,
}

impl From<RawPluginOptions> for PluginOptions {
    fn from(raw: RawPluginOptions) -> Self {
        Self {
            poll_interval_millis: raw.poll_interval_millis.or(raw.timeout),
            probe_url_override: raw.probe_url_override.or(raw.test_url),
            error_descriptors: raw.error_descriptors,
        }
    }
}

impl PluginOptions {
    /// Parse a JSON registration payload.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }
}

/// Effective watchdog configuration after merging options over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchdogConfig {
    /// Polling period in milliseconds (> 0).
    pub poll_interval_millis: u64,
    /// URL probed instead of the player source, if set.
    pub probe_url_override: Option<String>,
    pub error_descriptors: DescriptorTable,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval_millis: DEFAULT_POLL_INTERVAL_MILLIS,
            probe_url_override: None,
            error_descriptors: DescriptorTable::default(),
        }
    }
}

impl WatchdogConfig {
    /// Merge `options` over the defaults.
    pub fn from_options(options: PluginOptions) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply(options)?;
        Ok(cfg)
    }

    /// Merge a JSON registration payload over the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_options(PluginOptions::from_json(json)?)
    }

    /// Merge `options` over this config. Caller-supplied keys win; on error
    /// the config is left unchanged.
    pub fn apply(&mut self, options: PluginOptions) -> Result<(), ConfigError> {
        let poll_interval_millis = match options.poll_interval_millis {
            Some(0) => return Err(ConfigError::ZeroPollInterval),
            Some(ms) => ms,
            None => self.poll_interval_millis,
        };

        let probe_url_override = match options.probe_url_override {
            Some(url) => {
                url::Url::parse(&url).map_err(|source| ConfigError::InvalidProbeUrl {
                    url: url.clone(),
                    source,
                })?;
                Some(url)
            }
            None => self.probe_url_override.clone(),
        };

        let mut overrides = Vec::with_capacity(options.error_descriptors.len());
        for (key, descriptor) in options.error_descriptors {
            let parsed = key
                .parse::<DescriptorKey>()
                .map_err(|_| ConfigError::InvalidDescriptorKey(key.clone()))?;
            overrides.push((parsed, descriptor));
        }

        self.error_descriptors = self.error_descriptors.merged(overrides);
        self.poll_interval_millis = poll_interval_millis;
        self.probe_url_override = probe_url_override;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    /// Full options equivalent to this config (used to seed `config.toml`).
    pub fn to_options(&self) -> PluginOptions {
        PluginOptions {
            poll_interval_millis: Some(self.poll_interval_millis),
            probe_url_override: self.probe_url_override.clone(),
            error_descriptors: self
                .error_descriptors
                .iter()
                .map(|(key, d)| (key.to_string(), d.clone()))
                .collect(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mediawatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WatchdogConfig> {
    let path = config_path()?;
    load_at(&path)
}

/// Load configuration from `path`, writing the defaults there first if it is missing.
pub fn load_at(path: &Path) -> Result<WatchdogConfig> {
    if !path.exists() {
        let default_cfg = WatchdogConfig::default();
        let toml = toml::to_string_pretty(&default_cfg.to_options())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let options = PluginOptions::from_toml(&data)?;
    let cfg = WatchdogConfig::from_options(options)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
