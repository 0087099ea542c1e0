//! Configuration schema types
//!
//! This module defines the configuration structure for Cubex.

use crate::config::SecretString;
use crate::core::state::checkpoint::parse_timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Upper bound the load endpoint accepts for `limit`
pub const MAX_PAGE_SIZE: usize = 50_000;

/// Main Cubex configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CubexConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Reporting API connection and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CubexConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry policy for "Continue wait" responses
///
/// The defaults retry forever without delay, matching how the reporting
/// service expects clients to poll a query that is still being prepared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per request; unset means retry until the service answers
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Delay before the first retry in milliseconds (0 = retry immediately)
    #[serde(default)]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == Some(0) {
            return Err("api.retry.max_attempts must be >= 1 when set".to_string());
        }

        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "api.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "api.retry.initial_delay_ms ({}) cannot exceed api.retry.max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_delay_ms: 0,
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Reporting API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reporting service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the login endpoint, relative to `base_url`
    #[serde(default = "default_auth_path")]
    pub auth_path: String,

    /// Path of the catalog endpoint
    #[serde(default = "default_meta_path")]
    pub meta_path: String,

    /// Path of the query endpoint
    #[serde(default = "default_load_path")]
    pub load_path: String,

    /// Account email
    #[serde(default)]
    pub email: Option<String>,

    /// Account password
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Request timeout in seconds, 0 for no timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry policy for queries the service is still processing
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        if url::Url::parse(&self.base_url).is_err()
            || (!self.base_url.starts_with("http://") && !self.base_url.starts_with("https://"))
        {
            return Err(format!(
                "api.base_url must be an http:// or https:// URL, got '{}'",
                self.base_url
            ));
        }

        for (key, path) in [
            ("auth_path", &self.auth_path),
            ("meta_path", &self.meta_path),
            ("load_path", &self.load_path),
        ] {
            if !path.starts_with('/') {
                return Err(format!("api.{key} must start with '/', got '{path}'"));
            }
        }

        if self.email.as_ref().map(|s| s.trim().is_empty()).unwrap_or(true) {
            return Err("api.email is required".to_string());
        }

        if self
            .password
            .as_ref()
            .map(|s| s.expose_secret().is_empty())
            .unwrap_or(true)
        {
            return Err("api.password is required".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }

    /// Per-request timeout, `None` when `timeout_seconds` is 0
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    /// Absolute URL for one of the configured endpoint paths
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_path: default_auth_path(),
            meta_path: default_meta_path(),
            load_path: default_load_path(),
            email: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root directory; each cube gets `<output_dir>/<Cube>/`
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Checkpoint used for incremental cubes that have never been exported
    /// (`yyyy-MM-ddTHH:mm:ss`)
    #[serde(default = "default_fallback_start")]
    pub fallback_start: String,

    /// Cubes exported incrementally on `updatedAt`; every other cube is a full snapshot
    #[serde(default)]
    pub transactional_cubes: Vec<String>,

    /// Only export these cubes (empty = all cubes in the catalog)
    #[serde(default)]
    pub include_cubes: Vec<String>,

    /// Never export these cubes
    #[serde(default)]
    pub exclude_cubes: Vec<String>,

    /// Plan the export without querying data or writing files
    #[serde(default)]
    pub dry_run: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(format!(
                "export.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            ));
        }

        parse_timestamp(&self.fallback_start).map_err(|e| {
            format!(
                "Invalid export.fallback_start '{}': {e}",
                self.fallback_start
            )
        })?;

        let excluded: HashSet<&str> = self.exclude_cubes.iter().map(String::as_str).collect();
        if let Some(both) = self
            .include_cubes
            .iter()
            .find(|name| excluded.contains(name.as_str()))
        {
            return Err(format!(
                "Cube '{both}' is listed in both export.include_cubes and export.exclude_cubes"
            ));
        }

        Ok(())
    }

    /// Transactional cube names as a lookup set
    pub fn transactional_set(&self) -> HashSet<String> {
        self.transactional_cubes.iter().cloned().collect()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            page_size: default_page_size(),
            fallback_start: default_fallback_start(),
            transactional_cubes: Vec::new(),
            include_cubes: Vec::new(),
            exclude_cubes: Vec::new(),
            dry_run: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".into());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_auth_path() -> String {
    "/auth/login".to_string()
}

fn default_meta_path() -> String {
    "/cubejs-api/v1/meta".to_string()
}

fn default_load_path() -> String {
    "/cubejs-api/v1/load".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_output_dir() -> String {
    "Output".to_string()
}

fn default_page_size() -> usize {
    10_000
}

fn default_fallback_start() -> String {
    "2025-02-26T16:25:00".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
