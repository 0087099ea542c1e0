//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Cubex using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Cubex - reporting API cube exporter
#[derive(Parser, Debug)]
#[command(name = "cubex")]
#[command(version, about, long_about = None)]
#[command(author = "Cubex Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cubex.toml", env = "CUBEX_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CUBEX_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every selected cube to numbered JSON page files
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show cube checkpoints and written pages
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["cubex", "export"]);
        assert_eq!(cli.config, "cubex.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cubex", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cubex", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_flags() {
        let cli = Cli::parse_from([
            "cubex",
            "export",
            "--cube",
            "Orders,Stores",
            "--exclude-cube",
            "Audit",
            "--page-size",
            "500",
            "--start-date",
            "2025-01-01T00:00:00",
            "--dry-run",
        ]);

        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.cubes, vec!["Orders", "Stores"]);
        assert_eq!(args.exclude_cubes, vec!["Audit"]);
        assert_eq!(args.page_size, Some(500));
        assert_eq!(args.start_date.as_deref(), Some("2025-01-01T00:00:00"));
        assert!(args.dry_run);
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["cubex", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["cubex", "status", "--cube", "Orders"]);
        let Commands::Status(args) = cli.command else {
            panic!("expected status command");
        };
        assert_eq!(args.cube.as_deref(), Some("Orders"));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["cubex", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
