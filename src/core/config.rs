//! Configuration for tile fetching and rendering.
//!
//! Configurations can be built from presets or loaded from JSON. Every field
//! has a default, so a partial JSON document only overrides what it names.

use crate::core::constants::{DEFAULT_USER_AGENT, MAX_ZOOM, OSM_URL_TEMPLATE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Resampling filter used when tiles are scaled for high-density displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::CatmullRom => Self::CatmullRom,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// How tiles are fetched from the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum concurrent tile fetches during one render
    pub max_concurrent: usize,
    /// Retries after the first failed attempt
    pub max_retries: usize,
    /// Delay between retry attempts
    pub retry_delay_ms: u64,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_retries: 1,
            retry_delay_ms: 100,
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            url_template: OSM_URL_TEMPLATE.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Top-level viewport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub fetch: FetchConfig,
    /// Decoded tiles kept in memory; 0 disables caching
    pub cache_capacity: usize,
    pub resize_filter: ResizeFilter,
    /// Zoom ceiling for zoom-in actions
    pub max_zoom: u8,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            cache_capacity: 256,
            resize_filter: ResizeFilter::default(),
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Configuration presets
impl ViewportConfig {
    pub fn low_resource() -> Self {
        Self {
            fetch: FetchConfig {
                max_concurrent: 1,
                max_retries: 1,
                retry_delay_ms: 250,
                ..FetchConfig::default()
            },
            cache_capacity: 64,
            resize_filter: ResizeFilter::Nearest,
            ..Self::default()
        }
    }

    pub fn high_performance() -> Self {
        Self {
            fetch: FetchConfig {
                max_concurrent: 8,
                max_retries: 3,
                retry_delay_ms: 50,
                ..FetchConfig::default()
            },
            cache_capacity: 1024,
            ..Self::default()
        }
    }

    pub fn for_testing() -> Self {
        Self {
            fetch: FetchConfig {
                max_concurrent: 2,
                max_retries: 0,
                retry_delay_ms: 0,
                request_timeout_secs: 1,
                ..FetchConfig::default()
            },
            cache_capacity: 0,
            resize_filter: ResizeFilter::Nearest,
            ..Self::default()
        }
    }

    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.max_concurrent == 0 {
            return Err(Error::InvalidConfig("fetch.max_concurrent must be at least 1".into()));
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.fetch.url_template.contains(placeholder) {
                return Err(Error::InvalidConfig(format!(
                    "fetch.url_template is missing {placeholder}"
                )));
            }
        }
        if self.max_zoom > MAX_ZOOM {
            return Err(Error::InvalidConfig(format!(
                "max_zoom {} exceeds {MAX_ZOOM}",
                self.max_zoom
            )));
        }
        Ok(())
    }
}
