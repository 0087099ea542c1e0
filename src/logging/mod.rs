//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output with configurable level
//! - Optional JSON log file with rotation
//!
//! # Example
//!
//! ```no_run
//! use cubex::logging::init_logging;
//! use cubex::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(cube = "Orders", "Exporting cube");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a cube export
///
/// # Example
///
/// ```no_run
/// use cubex::log_cube_start;
/// use cubex::domain::{CubeName, ExportMode};
///
/// let cube = CubeName::new("Orders").unwrap();
/// log_cube_start!(&cube, ExportMode::Incremental, "2025-02-26T16:25:00", 1);
/// ```
#[macro_export]
macro_rules! log_cube_start {
    ($cube:expr, $mode:expr, $since:expr, $first_index:expr) => {
        tracing::info!(
            cube = %$cube,
            mode = %$mode,
            since = %$since,
            first_index = $first_index,
            "Exporting cube"
        );
    };
}

/// Log the completion of a cube export
///
/// # Example
///
/// ```no_run
/// use cubex::log_cube_complete;
/// use std::time::Duration;
///
/// log_cube_complete!("Orders", 3, 25_000, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_cube_complete {
    ($cube:expr, $files:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            cube = %$cube,
            files = $files,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Cube exported"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cubex::log_error_with_context;
/// use cubex::domain::CubexError;
///
/// let error = CubexError::Filesystem("disk full".to_string());
/// log_error_with_context!(&error, "Failed to export cube");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
