//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cubex.toml")]
    pub output: String,

    /// Include commented-out optional settings
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Cubex configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your reporting API URL", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set CUBEX_API_EMAIL and CUBEX_API_PASSWORD");
                println!("  3. List incremental cubes under export.transactional_cubes");
                println!("  4. Validate configuration: cubex validate-config");
                println!("  5. Preview the run: cubex export --dry-run");
                println!("  6. Run export: cubex export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Cubex Configuration File
# Reporting API to JSON file exporter

[application]
log_level = "info"

[api]
base_url = "https://reports.example.com"
email = "${CUBEX_API_EMAIL}"
password = "${CUBEX_API_PASSWORD}"

[export]
output_dir = "Output"
page_size = 10000
fallback_start = "2025-02-26T16:25:00"

# Cubes exported incrementally by <Cube>.updatedAt; all others are full snapshots
# transactional_cubes = ["Orders", "LineItems"]
transactional_cubes = []

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Cubex Configuration File
# Reporting API to JSON file exporter

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

[api]
# Base URL of the reporting service
base_url = "https://reports.example.com"

# Endpoint paths, relative to base_url
# auth_path = "/auth/login"
# meta_path = "/cubejs-api/v1/meta"
# load_path = "/cubejs-api/v1/load"

# Credentials, resolved from the environment
email = "${CUBEX_API_EMAIL}"
password = "${CUBEX_API_PASSWORD}"

# Per-request timeout in seconds, 0 waits indefinitely
timeout_seconds = 120

[api.retry]
# Queries the service is still processing are repeated.
# Leave max_attempts unset to wait indefinitely.
# max_attempts = 120
initial_delay_ms = 0
max_delay_ms = 30000
backoff_multiplier = 2.0

[export]
# Each cube is written to <output_dir>/<Cube>/0000001.json, 0000002.json, ...
output_dir = "Output"

# Rows requested per load query
page_size = 10000

# Checkpoint used the first time an incremental cube is exported
fallback_start = "2025-02-26T16:25:00"

# Cubes exported incrementally by <Cube>.updatedAt.
# Every other cube is re-exported in full on each run.
transactional_cubes = ["Orders", "LineItems"]

# Restrict the run to these cubes (empty = all)
include_cubes = []

# Never export these cubes
exclude_cubes = []

# List cubes, modes and checkpoints without fetching or writing anything
dry_run = false

[logging]
# JSON log files next to the console output
local_enabled = true
local_path = "logs"
# Rotation: hourly, daily, never
local_rotation = "daily"
"#
        .to_string()
    }
}
