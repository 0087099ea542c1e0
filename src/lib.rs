// Cubex - Reporting API Cube Exporter
// Copyright (c) 2025 Cubex Contributors
// Licensed under the MIT License

//! # Cubex - Reporting API Cube Exporter
//!
//! Cubex pulls every cube exposed by a Cube.js-style reporting API and writes
//! the rows to numbered JSON page files, one directory per cube.
//!
//! ## Overview
//!
//! - **Authenticating** with email and password, caching the returned token
//! - **Discovering** cubes through the metadata endpoint
//! - **Paging** through the load endpoint with `limit`/`offset`, repeating
//!   queries the service answers with "Continue wait"
//! - **Checkpointing** transactional cubes by their latest `updatedAt`, so the
//!   next run only fetches newer rows
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export pipeline and checkpoint state
//! - [`adapters`] - Reporting API client
//! - [`domain`] - Cube, page and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cubex::config::load_config;
//! use cubex::core::export::ExportCoordinator;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cubex.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let coordinator = ExportCoordinator::new(config, shutdown_rx)?;
//!     let summary = coordinator.execute_export().await?;
//!
//!     println!("Exported {} rows", summary.rows_exported);
//!     Ok(())
//! }
//! ```
//!
//! ## Export Modes
//!
//! Cubes listed in `export.transactional_cubes` are exported incrementally:
//! rows with `<Cube>.updatedAt` after the stored checkpoint, appended as new
//! page files. Every other cube is a full snapshot, rewritten from
//! `0000001.json` on each run.
//!
//! ```rust,no_run
//! use cubex::core::state::CheckpointStore;
//! use cubex::domain::CubeName;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CheckpointStore::with_fallback_str("Output", "2025-02-26T16:25:00")?;
//! let checkpoint = store.load(&CubeName::new("Orders")?).await?;
//! println!("Orders resumes after {}", checkpoint.formatted());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::CubexError`]. Reporting API failures are wrapped as
//! [`domain::CubeApiError`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
