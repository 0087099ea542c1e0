//! Core business logic for Cubex.
//!
//! # Modules
//!
//! - [`export`] - Query construction, the per-cube state machine, page files
//!   and run coordination
//! - [`state`] - Checkpoints for incremental exports
//!
//! # Export Workflow
//!
//! 1. **Catalog**: Fetch cube metadata once and apply include/exclude lists
//! 2. **Mode**: Transactional cubes export incrementally, the rest as full
//!    snapshots
//! 3. **Page**: Query with a fixed shape and moving offset until a short page
//! 4. **Write**: Each non-empty page becomes `<Cube>/<0000001>.json`
//! 5. **Checkpoint**: Incremental cubes persist the latest `updatedAt` seen
//! 6. **Report**: Generate export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use cubex::config::load_config;
//! use cubex::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cubex.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(config, shutdown_rx)?;
//!
//! let summary = coordinator.execute_export().await?;
//!
//! println!("Cubes: {}", summary.total_cubes);
//! println!("Rows: {}", summary.rows_exported);
//! println!("Files: {}", summary.files_written);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod state;
