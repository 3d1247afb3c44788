//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub mod cli;

pub use cli::{CliArgs, Command, StoreOverrides};

const LOCAL_CONFIG_BASENAME: &str = "bike-bazaar";
const ENV_PREFIX: &str = "BIKE_BAZAAR";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";
const DEFAULT_STALE_SECS: u64 = 300;
const DEFAULT_LIVE_STALE_SECS: u64 = 30;
const DEFAULT_LIVE_REFETCH_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub caller_token: Option<String>,
    /// `None` leaves requests without a local deadline
    pub timeout: Option<Duration>,
}

/// Freshness windows for cached reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Catalogue, profiles and site content
    pub stale_time: Duration,
    /// Messages, analytics and dashboard numbers
    pub live_stale_time: Duration,
    /// Poll interval for live reads
    pub live_refetch_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
            live_stale_time: Duration::from_secs(DEFAULT_LIVE_STALE_SECS),
            live_refetch_interval: Duration::from_secs(DEFAULT_LIVE_REFETCH_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(config_file: Option<&Path>, overrides: &StoreOverrides) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(overrides);
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    store: RawStoreSettings,
    cache: RawCacheSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    base_url: Option<String>,
    caller_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    stale_secs: Option<u64>,
    live_stale_secs: Option<u64>,
    live_refetch_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &StoreOverrides) {
        if let Some(url) = overrides.base_url.as_ref() {
            self.store.base_url = Some(url.clone());
        }
        if let Some(token) = overrides.caller_token.as_ref() {
            self.store.caller_token = Some(token.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let base_url = raw
            .store
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|err| LoadError::invalid("store.base_url", err.to_string()))?;

        let timeout = match raw.store.timeout_secs {
            Some(0) => return Err(LoadError::invalid("store.timeout_secs", "must be positive")),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let cache = CacheSettings {
            stale_time: seconds("cache.stale_secs", raw.cache.stale_secs, DEFAULT_STALE_SECS)?,
            live_stale_time: seconds(
                "cache.live_stale_secs",
                raw.cache.live_stale_secs,
                DEFAULT_LIVE_STALE_SECS,
            )?,
            live_refetch_interval: seconds(
                "cache.live_refetch_secs",
                raw.cache.live_refetch_secs,
                DEFAULT_LIVE_REFETCH_SECS,
            )?,
        };

        let level = raw.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        let level = LevelFilter::from_str(level).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?;

        Ok(Self {
            store: StoreSettings {
                base_url,
                caller_token: raw.store.caller_token.filter(|t| !t.is_empty()),
                timeout,
            },
            cache,
            logging: LoggingSettings { level },
        })
    }
}

fn seconds(key: &'static str, value: Option<u64>, default: u64) -> Result<Duration, LoadError> {
    match value.unwrap_or(default) {
        0 => Err(LoadError::invalid(key, "must be positive")),
        secs => Ok(Duration::from_secs(secs)),
    }
}

#[cfg(test)]
mod tests;
