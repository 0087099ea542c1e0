//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Cubex configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well as parses
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let list = |cubes: &[String]| {
            if cubes.is_empty() {
                "-".to_string()
            } else {
                cubes.join(", ")
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Reporting API: {}", config.api.base_url);
        println!("  Login: {}", config.api.email.as_deref().unwrap_or("-"));
        println!(
            "  Retry: {}",
            config
                .api
                .retry
                .max_attempts
                .map_or("unbounded".to_string(), |n| format!("{n} attempts"))
        );
        println!("  Output Directory: {}", config.export.output_dir);
        println!("  Page Size: {}", config.export.page_size);
        println!("  Fallback Start: {}", config.export.fallback_start);
        println!(
            "  Transactional Cubes: {}",
            list(&config.export.transactional_cubes)
        );
        println!("  Included Cubes: {}", list(&config.export.include_cubes));
        println!("  Excluded Cubes: {}", list(&config.export.exclude_cubes));
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cubex.toml");

        let code = ValidateArgs {}
            .execute(&path.display().to_string())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cubex.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://reports.example.com"
email = "reports@example.com"
password = "pw"

[export]
transactional_cubes = ["Orders"]
"#,
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(&path.display().to_string())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
