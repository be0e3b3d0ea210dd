//! Client configuration
//!
//! A `Config` can be built in code, parsed from JSON, and adjusted from
//! `SAMSARA_*` environment variables. Nothing is checked until `validate`,
//! which `Client` calls on construction.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Samsara specific HTTP header carrying the send time
pub const PUBLISHED_TIMESTAMP_HEADER: &str = "X-Samsara-publishedTimestamp";

/// Ingestion API endpoint path
pub const API_PATH: &str = "/v1/events";

/// Payload compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Gzip,
    None,
}

impl Compression {
    /// Value for the `Content-Encoding` header
    pub fn content_encoding(self) -> &'static str {
        match self {
            Compression::Gzip => "gzip",
            Compression::None => "identity",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Gzip => write!(f, "gzip"),
            Compression::None => write!(f, "none"),
        }
    }
}

impl FromStr for Compression {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" => Ok(Compression::Gzip),
            "none" => Ok(Compression::None),
            _ => Err(ConfigError::InvalidValue {
                key: "compression".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for a Samsara client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ingestion API base URL, e.g. `http://samsara-ingestion.local/`
    pub url: String,
    /// Default `sourceId` for recorded events
    #[serde(alias = "sourceId", skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Start the background publishing worker on construction
    pub start_publishing_thread: bool,
    /// Interval between publish attempts
    pub publish_interval_ms: u64,
    /// Buffer capacity; older events are dropped when full
    pub max_buffer_size: usize,
    /// Minimum number of buffered events before a periodic publish
    pub min_buffer_size: usize,
    /// Network timeout for a single POST
    pub send_timeout_ms: u64,
    pub compression: Compression,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            source_id: None,
            start_publishing_thread: true,
            publish_interval_ms: 30_000,
            max_buffer_size: 10_000,
            min_buffer_size: 100,
            send_timeout_ms: 30_000,
            compression: Compression::Gzip,
        }
    }
}

impl Config {
    /// Default configuration pointing at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Parse configuration from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Configuration built from defaults and environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env_overrides()
    }

    /// Override fields from `SAMSARA_*` environment variables
    pub fn apply_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Override fields from any key lookup (environment-style names)
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SAMSARA_URL") {
            self.url = url;
        }
        if let Some(source_id) = lookup("SAMSARA_SOURCE_ID") {
            self.source_id = Some(source_id);
        }
        if let Some(v) = lookup("SAMSARA_START_PUBLISHING_THREAD") {
            self.start_publishing_thread = parse_value("SAMSARA_START_PUBLISHING_THREAD", &v)?;
        }
        if let Some(v) = lookup("SAMSARA_PUBLISH_INTERVAL_MS") {
            self.publish_interval_ms = parse_value("SAMSARA_PUBLISH_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("SAMSARA_MAX_BUFFER_SIZE") {
            self.max_buffer_size = parse_value("SAMSARA_MAX_BUFFER_SIZE", &v)?;
        }
        if let Some(v) = lookup("SAMSARA_MIN_BUFFER_SIZE") {
            self.min_buffer_size = parse_value("SAMSARA_MIN_BUFFER_SIZE", &v)?;
        }
        if let Some(v) = lookup("SAMSARA_SEND_TIMEOUT_MS") {
            self.send_timeout_ms = parse_value("SAMSARA_SEND_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("SAMSARA_COMPRESSION") {
            self.compression = v.parse()?;
        }
        Ok(self)
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_publishing_thread(mut self, start: bool) -> Self {
        self.start_publishing_thread = start;
        self
    }

    pub fn with_publish_interval_ms(mut self, ms: u64) -> Self {
        self.publish_interval_ms = ms;
        self
    }

    pub fn with_buffer_sizes(mut self, min: usize, max: usize) -> Self {
        self.min_buffer_size = min;
        self.max_buffer_size = max;
        self
    }

    pub fn with_send_timeout_ms(mut self, ms: u64) -> Self {
        self.send_timeout_ms = ms;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Check every option; the first problem found is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if self.publish_interval_ms == 0 {
            return Err(ConfigError::InvalidPublishInterval);
        }
        if self.send_timeout_ms == 0 {
            return Err(ConfigError::InvalidSendTimeout);
        }
        if self.max_buffer_size < self.min_buffer_size {
            return Err(ConfigError::BufferSizeMismatch {
                max: self.max_buffer_size,
                min: self.min_buffer_size,
            });
        }
        Ok(())
    }

    /// Full URL of the events endpoint
    pub fn events_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), API_PATH)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
