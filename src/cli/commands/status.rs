//! Status command implementation
//!
//! This module implements the `status` command, which lists the checkpoint
//! and page count of every cube found under the output directory.

use crate::config::read_config_or_default;
use crate::core::export::writer::max_page_index;
use crate::core::state::CheckpointStore;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Output directory to inspect (defaults to export.output_dir)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Only show this cube
    #[arg(long)]
    pub cube: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        let config = match read_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or(config.export.output_dir.clone());

        let store =
            match CheckpointStore::with_fallback_str(&output_dir, &config.export.fallback_start) {
                Ok(s) => s,
                Err(e) => {
                    println!("❌ {e}");
                    return Ok(2);
                }
            };

        println!("📊 Export Status ({output_dir})");
        println!();

        let checkpoints = match store.list().await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to read checkpoints");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        let checkpoints: Vec<_> = checkpoints
            .into_iter()
            .filter(|c| self.cube.as_deref().map_or(true, |cube| c.cube.as_str() == cube))
            .collect();

        if checkpoints.is_empty() {
            println!("No checkpoints found.");
            println!("Run 'cubex export' to start exporting data.");
            return Ok(0);
        }

        println!("Found {} checkpoint(s):", checkpoints.len());
        println!();
        println!("{:<30} {:<22} {:<10}", "Cube", "Checkpoint", "Last File");
        println!("{}", "-".repeat(64));

        for checkpoint in &checkpoints {
            let last_file = match max_page_index(&store.cube_dir(&checkpoint.cube)).await {
                Ok(Some(index)) => format!("{index:07}"),
                Ok(None) => "-".to_string(),
                Err(e) => {
                    tracing::warn!(cube = %checkpoint.cube, error = %e, "Failed to list pages");
                    "?".to_string()
                }
            };

            println!(
                "{:<30} {:<22} {:<10}",
                checkpoint.cube.as_str(),
                checkpoint.formatted(),
                last_file
            );
        }
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_on_empty_output_dir() {
        let dir = TempDir::new().unwrap();
        let args = StatusArgs {
            output_dir: Some(dir.path().display().to_string()),
            cube: None,
        };

        let code = args
            .execute(&dir.path().join("missing.toml").display().to_string())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_status_with_malformed_checkpoint() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Orders")).unwrap();
        std::fs::write(
            dir.path().join("Orders").join("latest-data-date-time.txt"),
            "not a timestamp",
        )
        .unwrap();

        let args = StatusArgs {
            output_dir: Some(dir.path().display().to_string()),
            cube: None,
        };
        let code = args
            .execute(&dir.path().join("missing.toml").display().to_string())
            .await
            .unwrap();
        assert_eq!(code, 5);
    }
}
