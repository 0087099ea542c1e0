//! Export command implementation
//!
//! This module implements the `export` command, which pulls every selected
//! cube from the reporting API into numbered JSON page files.

use crate::config::{read_config_or_default, secret_string, CubexConfig};
use crate::core::export::{is_connection_error, ExportCoordinator, ExportSummary};
use crate::domain::CubexError;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Reporting API login email
    #[arg(long, env = "CUBEX_API_EMAIL")]
    pub email: Option<String>,

    /// Reporting API login password
    #[arg(long, env = "CUBEX_API_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Checkpoint for incremental cubes exported for the first time
    /// (yyyy-MM-ddTHH:mm:ss)
    #[arg(long, value_name = "TIMESTAMP")]
    pub start_date: Option<String>,

    /// Root output directory
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Rows requested per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Only export these cubes (repeatable or comma-separated)
    #[arg(long = "cube", value_delimiter = ',')]
    pub cubes: Vec<String>,

    /// Skip these cubes (repeatable or comma-separated)
    #[arg(long = "exclude-cube", value_delimiter = ',')]
    pub exclude_cubes: Vec<String>,

    /// List cubes, modes and checkpoints without fetching data or writing files
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Apply command-line overrides on top of file and environment settings
    pub fn apply_to(&self, config: &mut CubexConfig) {
        if let Some(email) = &self.email {
            config.api.email = Some(email.clone());
        }

        if let Some(password) = &self.password {
            config.api.password = Some(secret_string(password.clone()));
        }

        if let Some(start_date) = &self.start_date {
            tracing::info!(start_date = %start_date, "Overriding fallback start from CLI");
            config.export.fallback_start = start_date.clone();
        }

        if let Some(output_dir) = &self.output_dir {
            tracing::info!(output_dir = %output_dir, "Overriding output directory from CLI");
            config.export.output_dir = output_dir.clone();
        }

        if let Some(page_size) = self.page_size {
            tracing::info!(page_size = page_size, "Overriding page size from CLI");
            config.export.page_size = page_size;
        }

        if !self.cubes.is_empty() {
            let cubes = trimmed(&self.cubes);
            tracing::info!(cubes = ?cubes, "Overriding included cubes from CLI");
            config.export.include_cubes = cubes;
        }

        if !self.exclude_cubes.is_empty() {
            let cubes = trimmed(&self.exclude_cubes);
            tracing::info!(cubes = ?cubes, "Overriding excluded cubes from CLI");
            config.export.exclude_cubes = cubes;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match read_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.apply_to(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.export.dry_run {
            println!("🔍 DRY RUN MODE - no data will be fetched or written");
            println!();
        }

        let coordinator = match ExportCoordinator::new(config, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(match e {
                    CubexError::Configuration(_) => 2,
                    _ => 4,
                });
            }
        };

        println!("🚀 Starting export...");
        println!();

        let summary = match coordinator.execute_export().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(if is_connection_error(&e) { 4 } else { 5 });
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn print_summary(summary: &ExportSummary) {
    println!();

    if summary.dry_run {
        println!("📋 Export Plan:");
        for plan in &summary.plans {
            let since = plan
                .checkpoint
                .as_ref()
                .map(|c| c.formatted())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<30} {:<14} since {:<20} first file {:07}.json",
                plan.cube.as_str(),
                plan.mode.to_string(),
                since,
                plan.next_index
            );
        }
        println!();
    } else {
        println!("📊 Export Summary:");
        println!("  Cubes: {}", summary.total_cubes);
        println!("  Succeeded: {}", summary.cubes_succeeded);
        println!("  Failed: {}", summary.cubes_failed);
        println!("  Rows: {}", summary.rows_exported);
        println!("  Files Written: {}", summary.files_written);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }

    if summary.interrupted {
        println!("⚠️  Export interrupted gracefully. Completed cubes are checkpointed.");
        println!("   Run the same command to resume.");
    } else if summary.is_successful() {
        println!("✅ Export completed successfully!");
    } else {
        println!("⚠️  Export completed with failures");
    }
}

/// Process exit code for a finished run
pub fn exit_code(summary: &ExportSummary) -> i32 {
    if summary.interrupted {
        130
    } else if summary.has_authentication_error() {
        4
    } else if summary.is_successful() {
        0
    } else {
        1
    }
}
