//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use super::exporter::CubePlan;
use crate::domain::{CubeApiError, CubeName, CubexError, ExportMode};
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of exporting a single cube
#[derive(Debug, Clone)]
pub struct CubeExportResult {
    pub cube: CubeName,
    pub mode: ExportMode,

    /// Load queries issued, including the final short page
    pub pages_fetched: usize,

    pub rows_exported: usize,

    /// Page files written, in index order
    pub files: Vec<PathBuf>,

    /// Checkpoint saved at the end of an incremental run
    pub checkpoint: Option<NaiveDateTime>,

    pub duration: Duration,
}

impl CubeExportResult {
    pub fn new(cube: CubeName, mode: ExportMode) -> Self {
        Self {
            cube,
            mode,
            pages_fetched: 0,
            rows_exported: 0,
            files: Vec::new(),
            checkpoint: None,
            duration: Duration::ZERO,
        }
    }
}

/// Summary of an export run
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Cubes selected for export after include/exclude filtering
    pub total_cubes: usize,

    /// Selected cubes exported incrementally
    pub incremental_cubes: usize,

    /// Cubes exported without error
    pub cubes_succeeded: usize,

    pub cubes_failed: usize,

    pub pages_fetched: usize,
    pub rows_exported: usize,
    pub files_written: usize,

    pub results: Vec<CubeExportResult>,

    /// Dry-run plans, one per selected cube
    pub plans: Vec<CubePlan>,

    pub duration: Duration,

    pub errors: Vec<ExportError>,

    /// The run stopped early on a shutdown signal
    pub interrupted: bool,

    /// Dry run: nothing was fetched or written
    pub dry_run: bool,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Fold a finished cube into the totals
    pub fn record_success(&mut self, result: CubeExportResult) {
        self.cubes_succeeded += 1;
        self.pages_fetched += result.pages_fetched;
        self.rows_exported += result.rows_exported;
        self.files_written += result.files.len();
        self.results.push(result);
    }

    /// Record a cube that aborted
    pub fn record_failure(&mut self, cube: &CubeName, error: &CubexError) {
        self.cubes_failed += 1;
        self.add_error(
            ExportError::new(ExportErrorType::from(error), error.to_string())
                .with_context(format!("cube={cube}")),
        );
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.cubes_failed == 0 && self.errors.is_empty()
    }

    /// Whether any error was an authentication failure
    pub fn has_authentication_error(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.error_type == ExportErrorType::Authentication)
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.cubes_succeeded + self.cubes_failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.cubes_succeeded as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_cubes = self.total_cubes,
            incremental = self.incremental_cubes,
            succeeded = self.cubes_succeeded,
            failed = self.cubes_failed,
            pages = self.pages_fetched,
            rows = self.rows_exported,
            files = self.files_written,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = ?error.context,
                    "Export error"
                );
            }
        }
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Transport failure reaching the reporting API
    Connection,
    /// Credentials or token rejected
    Authentication,
    /// Upstream rejected or failed the query
    Query,
    /// Page or checkpoint file could not be written
    Storage,
    /// Checkpoint file unreadable
    State,
    Configuration,
    Unknown,
}

impl From<&CubexError> for ExportErrorType {
    fn from(error: &CubexError) -> Self {
        match error {
            CubexError::CubeApi(api) => match api {
                CubeApiError::AuthenticationFailed(_) => Self::Authentication,
                CubeApiError::ConnectionFailed(_) | CubeApiError::Timeout(_) => Self::Connection,
                CubeApiError::StillProcessing { .. }
                | CubeApiError::QueryFailed(_)
                | CubeApiError::InvalidResponse(_)
                | CubeApiError::ServerError { .. }
                | CubeApiError::ClientError { .. } => Self::Query,
            },
            CubexError::Filesystem(_) | CubexError::Serialization(_) => Self::Storage,
            CubexError::Checkpoint(_) => Self::State,
            CubexError::Configuration(_) | CubexError::Validation(_) => Self::Configuration,
            CubexError::Export(_) | CubexError::Other(_) => Self::Unknown,
        }
    }
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g. the cube name)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(name: &str) -> CubeName {
        CubeName::new(name).unwrap()
    }

    fn result(name: &str, rows: usize, files: usize) -> CubeExportResult {
        let mut result = CubeExportResult::new(cube(name), ExportMode::FullSnapshot);
        result.pages_fetched = files + 1;
        result.rows_exported = rows;
        result.files = (1..=files)
            .map(|i| PathBuf::from(format!("{name}/{i:07}.json")))
            .collect();
        result
    }

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new();

        assert_eq!(summary.total_cubes, 0);
        assert_eq!(summary.cubes_succeeded, 0);
        assert_eq!(summary.cubes_failed, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.errors.is_empty());
        assert!(!summary.interrupted);
        assert!(summary.is_successful());
    }

    #[test]
    fn test_record_success_accumulates() {
        let mut summary = ExportSummary::new();
        summary.record_success(result("Stores", 5, 1));
        summary.record_success(result("Orders", 3, 2));

        assert_eq!(summary.cubes_succeeded, 2);
        assert_eq!(summary.rows_exported, 8);
        assert_eq!(summary.files_written, 3);
        assert_eq!(summary.pages_fetched, 5);
        assert_eq!(summary.results.len(), 2);
    }

    #[test]
    fn test_record_failure() {
        let mut summary = ExportSummary::new();
        summary.record_success(result("Stores", 5, 1));
        summary.record_failure(
            &cube("Orders"),
            &CubexError::Filesystem("disk full".to_string()),
        );

        assert!(!summary.is_successful());
        assert_eq!(summary.success_rate(), 50.0);
        assert_eq!(summary.errors[0].error_type, ExportErrorType::Storage);
        assert_eq!(summary.errors[0].context.as_deref(), Some("cube=Orders"));
        assert!(!summary.has_authentication_error());
    }

    #[test]
    fn test_error_classification() {
        let auth = CubexError::from(CubeApiError::AuthenticationFailed("no".into()));
        assert_eq!(ExportErrorType::from(&auth), ExportErrorType::Authentication);

        let timeout = CubexError::from(CubeApiError::Timeout("slow".into()));
        assert_eq!(ExportErrorType::from(&timeout), ExportErrorType::Connection);

        let waiting = CubexError::from(CubeApiError::StillProcessing { attempts: 3 });
        assert_eq!(ExportErrorType::from(&waiting), ExportErrorType::Query);

        let checkpoint = CubexError::Checkpoint("bad".into());
        assert_eq!(ExportErrorType::from(&checkpoint), ExportErrorType::State);
    }

    #[test]
    fn test_export_error_with_context() {
        let error = ExportError::new(ExportErrorType::Query, "Query failed".to_string())
            .with_context("cube=Orders".to_string());

        assert_eq!(error.error_type, ExportErrorType::Query);
        assert_eq!(error.context, Some("cube=Orders".to_string()));
    }
}
