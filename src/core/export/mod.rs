//! Cube export orchestration
//!
//! This module provides the core export logic for Cubex, including:
//! - Query construction for paged load requests
//! - The per-cube export state machine and page writer
//! - Catalog selection and run coordination
//! - Summary and reporting

pub mod catalog;
pub mod coordinator;
pub mod exporter;
pub mod query;
pub mod summary;
pub mod writer;

pub use catalog::{CubeFilter, MetadataFetcher};
pub use coordinator::{is_connection_error, ExportCoordinator};
pub use exporter::{CubeExporter, CubePlan, ExportPhase};
pub use query::{Filter, Order, QueryBuilder, QuerySpec, SortDirection};
pub use summary::{CubeExportResult, ExportError, ExportErrorType, ExportSummary};
pub use writer::{page_file_name, PageWriter};
