//! External system integrations for Cubex.
//!
//! - [`cube`] - Cube.js reporting API (auth, catalog, paged load queries)
//!
//! # Design Pattern
//!
//! The exporter talks to the reporting service only through the
//! [`cube::ReportingApi`] trait, so tests can drive it with scripted pages.
//!
//! ```rust,no_run
//! use cubex::adapters::cube::{CubeApiClient, ReportingApi};
//! use cubex::config::{secret_string, ApiConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig {
//!     base_url: "https://reports.example.com".to_string(),
//!     email: Some("reports@example.com".to_string()),
//!     password: Some(secret_string("secret".to_string())),
//!     ..Default::default()
//! };
//!
//! let client = CubeApiClient::from_config(&config)?;
//! let cubes = client.fetch_catalog().await?;
//! # Ok(())
//! # }
//! ```

pub mod cube;
