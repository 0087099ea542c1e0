//! Reporting API abstraction
//!
//! The exporter only needs two calls from the reporting service: the cube
//! catalog and one page of query results. Keeping them behind a trait lets
//! the export state machine run against scripted responses in tests.

use crate::core::export::QuerySpec;
use crate::domain::{CubeMetadata, Page, Result};
use async_trait::async_trait;

/// Calls the exporter makes against the reporting service
///
/// # Example
///
/// ```no_run
/// use cubex::adapters::cube::{CubeApiClient, ReportingApi};
/// use cubex::config::ApiConfig;
///
/// # async fn example(config: ApiConfig) -> cubex::domain::Result<()> {
/// let client = CubeApiClient::from_config(&config)?;
/// for cube in client.fetch_catalog().await? {
///     println!("{} ({} dimensions)", cube.name, cube.dimensions.len());
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ReportingApi: Send + Sync {
    /// Fetch metadata for every cube the service exposes
    async fn fetch_catalog(&self) -> Result<Vec<CubeMetadata>>;

    /// Run one load query and return its rows
    ///
    /// Implementations absorb the still-processing signal according to their
    /// retry policy; callers only ever see a final page or an error.
    async fn run_query(&self, query: &QuerySpec) -> Result<Page>;
}
