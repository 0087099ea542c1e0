//! Configuration management for Cubex.
//!
//! Cubex reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CUBEX_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Per-section validation
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`ApiConfig`] - reporting API endpoints, credentials and retry policy
//! - [`ExportConfig`] - output directory, page size, checkpoints, cube selection
//! - [`LoggingConfig`] - optional JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://reports.example.com"
//! email = "exporter@example.com"
//! password = "${CUBEX_PASSWORD}"
//!
//! [api.retry]
//! max_attempts = 120
//! initial_delay_ms = 500
//!
//! [export]
//! output_dir = "Output"
//! page_size = 10000
//! fallback_start = "2025-02-26T16:25:00"
//! transactional_cubes = ["Orders", "LineItems"]
//! exclude_cubes = ["Sandbox"]
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, read_config, read_config_or_default};
pub use schema::{
    ApiConfig, ApplicationConfig, CubexConfig, ExportConfig, LoggingConfig, RetryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
