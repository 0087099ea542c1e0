//! Export coordinator - main orchestrator for the export process
//!
//! Fetches the cube catalog once, then exports the selected cubes one at a
//! time. A failing cube is recorded and the run moves on, except for
//! authentication failures, which end the run. The shutdown signal is checked
//! between cubes so a cube in flight always finishes.

use super::catalog::{CubeFilter, MetadataFetcher};
use super::exporter::CubeExporter;
use super::summary::ExportSummary;
use crate::adapters::cube::{CubeApiClient, ReportingApi};
use crate::config::CubexConfig;
use crate::core::state::CheckpointStore;
use crate::domain::{CubexError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Export coordinator
pub struct ExportCoordinator {
    config: CubexConfig,
    api: Arc<dyn ReportingApi>,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a coordinator talking to the configured reporting API
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the HTTP client cannot
    /// be built.
    pub fn new(config: CubexConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        let api = Arc::new(CubeApiClient::from_config(&config.api)?);
        Ok(Self::with_api(config, api, shutdown_signal))
    }

    /// Create a coordinator over any reporting API implementation
    pub fn with_api(
        config: CubexConfig,
        api: Arc<dyn ReportingApi>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            api,
            shutdown_signal,
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    fn exporter(&self) -> Result<CubeExporter> {
        let export = &self.config.export;
        let store = CheckpointStore::with_fallback_str(&export.output_dir, &export.fallback_start)?;

        Ok(CubeExporter::new(
            self.api.clone(),
            store,
            export.transactional_set(),
            export.page_size,
        ))
    }

    /// Execute the export
    ///
    /// 1. Fetch the catalog and apply the include/exclude filter
    /// 2. For each selected cube, in catalog order:
    ///    - stop if shutdown was requested
    ///    - export it (or only plan it in dry-run mode)
    ///    - record the result; stop after an authentication failure
    /// 3. Log the summary
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be fetched. Per-cube failures
    /// are reported in the summary instead.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();
        summary.dry_run = self.config.export.dry_run;

        tracing::info!(
            output_dir = %self.config.export.output_dir,
            page_size = self.config.export.page_size,
            dry_run = summary.dry_run,
            "Starting export process"
        );

        let exporter = self.exporter()?;
        let fetcher = MetadataFetcher::new(
            self.api.clone(),
            CubeFilter::from_config(&self.config.export),
        );
        let cubes = fetcher.list_cubes().await?;
        summary.total_cubes = cubes.len();
        summary.incremental_cubes = cubes
            .iter()
            .filter(|cube| exporter.mode_for(&cube.name).is_incremental())
            .count();

        if summary.incremental_cubes == 0 && !cubes.is_empty() {
            tracing::warn!(
                transactional_cubes = ?self.config.export.transactional_cubes,
                "No selected cube is transactional, every cube is exported as a full snapshot"
            );
        }

        for cube in &cubes {
            if self.shutdown_requested() {
                tracing::warn!(
                    remaining = summary.total_cubes
                        - summary.cubes_succeeded
                        - summary.cubes_failed,
                    "Shutdown requested, not starting further cubes"
                );
                summary.interrupted = true;
                break;
            }

            if summary.dry_run {
                match exporter.plan(cube).await {
                    Ok(plan) => {
                        tracing::info!(
                            cube = %plan.cube,
                            mode = %plan.mode,
                            checkpoint = ?plan.checkpoint.as_ref().map(|c| c.formatted()),
                            next_index = plan.next_index,
                            "Dry run: would export cube"
                        );
                        summary.plans.push(plan);
                        summary.cubes_succeeded += 1;
                    }
                    Err(e) => {
                        crate::log_error_with_context!(&e, format!("planning cube {}", cube.name));
                        summary.record_failure(&cube.name, &e);
                    }
                }
                continue;
            }

            match exporter.export(cube).await {
                Ok(result) => summary.record_success(result),
                Err(e) => {
                    crate::log_error_with_context!(&e, format!("exporting cube {}", cube.name));
                    summary.record_failure(&cube.name, &e);

                    if e.is_authentication() {
                        tracing::error!("Authentication failed, aborting remaining cubes");
                        break;
                    }
                }
            }
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }
}

/// Whether an error should be reported as a connectivity problem
pub fn is_connection_error(error: &CubexError) -> bool {
    use crate::domain::CubeApiError;

    matches!(
        error,
        CubexError::CubeApi(
            CubeApiError::ConnectionFailed(_)
                | CubeApiError::AuthenticationFailed(_)
                | CubeApiError::Timeout(_)
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::QuerySpec;
    use crate::domain::{CubeApiError, CubeMetadata, CubeName, Page};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Catalog of empty cubes; fails queries for the named cube
    struct FlakyApi {
        cubes: Vec<&'static str>,
        failing: Option<&'static str>,
        auth_failure: bool,
        queried: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReportingApi for FlakyApi {
        async fn fetch_catalog(&self) -> Result<Vec<CubeMetadata>> {
            Ok(self
                .cubes
                .iter()
                .map(|name| {
                    CubeMetadata::new(
                        CubeName::new(*name).unwrap(),
                        vec![format!("{name}.id")],
                        vec![],
                    )
                })
                .collect())
        }

        async fn run_query(&self, query: &QuerySpec) -> Result<Page> {
            let cube = query.dimensions[0]
                .split('.')
                .next()
                .unwrap()
                .to_string();
            self.queried.lock().unwrap().push(cube.clone());

            if self.failing == Some(cube.as_str()) {
                let error = if self.auth_failure {
                    CubeApiError::AuthenticationFailed("expired".into())
                } else {
                    CubeApiError::QueryFailed("boom".into())
                };
                return Err(error.into());
            }
            Ok(Page::default())
        }
    }

    fn config(dir: &TempDir) -> CubexConfig {
        let mut config = CubexConfig::default();
        config.export.output_dir = dir.path().display().to_string();
        config
    }

    fn api(failing: Option<&'static str>, auth_failure: bool) -> Arc<FlakyApi> {
        Arc::new(FlakyApi {
            cubes: vec!["Orders", "Stores", "LineItems"],
            failing,
            auth_failure,
            queried: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_failed_cube_does_not_stop_run() {
        let dir = TempDir::new().unwrap();
        let api = api(Some("Stores"), false);
        let (_tx, rx) = watch::channel(false);

        let summary = ExportCoordinator::with_api(config(&dir), api.clone(), rx)
            .execute_export()
            .await
            .unwrap();

        assert_eq!(summary.total_cubes, 3);
        assert_eq!(summary.incremental_cubes, 0);
        assert_eq!(summary.cubes_succeeded, 2);
        assert_eq!(summary.cubes_failed, 1);
        assert_eq!(*api.queried.lock().unwrap(), vec!["Orders", "Stores", "LineItems"]);
    }

    #[tokio::test]
    async fn test_authentication_failure_stops_run() {
        let dir = TempDir::new().unwrap();
        let api = api(Some("Orders"), true);
        let (_tx, rx) = watch::channel(false);

        let summary = ExportCoordinator::with_api(config(&dir), api.clone(), rx)
            .execute_export()
            .await
            .unwrap();

        assert!(summary.has_authentication_error());
        assert_eq!(summary.cubes_succeeded, 0);
        assert_eq!(*api.queried.lock().unwrap(), vec!["Orders"]);
    }

    #[tokio::test]
    async fn test_shutdown_before_first_cube() {
        let dir = TempDir::new().unwrap();
        let api = api(None, false);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let summary = ExportCoordinator::with_api(config(&dir), api.clone(), rx)
            .execute_export()
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.cubes_succeeded, 0);
        assert!(api.queried.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_queries() {
        let dir = TempDir::new().unwrap();
        let api = api(None, false);
        let (_tx, rx) = watch::channel(false);
        let mut config = config(&dir);
        config.export.dry_run = true;
        config.export.transactional_cubes = vec!["Orders".to_string()];

        let summary = ExportCoordinator::with_api(config, api.clone(), rx)
            .execute_export()
            .await
            .unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.incremental_cubes, 1);
        assert_eq!(summary.plans.len(), 3);
        assert!(summary.plans[0].checkpoint.is_some());
        assert!(summary.plans[1].checkpoint.is_none());
        assert!(api.queried.lock().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_is_connection_error() {
        assert!(is_connection_error(&CubeApiError::Timeout("t".into()).into()));
        assert!(is_connection_error(
            &CubeApiError::AuthenticationFailed("a".into()).into()
        ));
        assert!(!is_connection_error(&CubexError::Filesystem("f".into())));
    }
}
