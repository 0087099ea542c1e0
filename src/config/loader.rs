//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CubexConfig;
use super::secret::secret_string;
use crate::domain::errors::CubexError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads and validates configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CubexConfig
/// 4. Applies environment variable overrides (CUBEX_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, parsing or
/// substitution fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use cubex::config::loader::load_config;
///
/// let config = load_config("cubex.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CubexConfig> {
    let config = read_config(path)?;

    config.validate().map_err(|e| {
        CubexError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Reads configuration without validating it
///
/// Used by commands that layer CLI overrides on top of the file before
/// validating the result.
pub fn read_config(path: impl AsRef<Path>) -> Result<CubexConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CubexError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CubexError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CubexConfig = toml::from_str(&contents)
        .map_err(|e| CubexError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Reads configuration, falling back to defaults when the file is absent
///
/// Lets `cubex export --email ... --password ...` run without any file.
/// Environment overrides apply in both cases.
pub fn read_config_or_default(path: impl AsRef<Path>) -> Result<CubexConfig> {
    let path = path.as_ref();
    if path.exists() {
        return read_config(path);
    }

    tracing::warn!(
        config_path = %path.display(),
        "Configuration file not found, using defaults"
    );
    let mut config = CubexConfig::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CubexError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        // Comments are copied untouched
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CubexError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Applies environment variable overrides using the CUBEX_* prefix
///
/// Environment variables follow the pattern: CUBEX_<SECTION>_<KEY>
/// For example: CUBEX_API_BASE_URL, CUBEX_EXPORT_PAGE_SIZE
fn apply_env_overrides(config: &mut CubexConfig) {
    if let Ok(val) = std::env::var("CUBEX_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // API overrides
    if let Ok(val) = std::env::var("CUBEX_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CUBEX_API_EMAIL") {
        config.api.email = Some(val);
    }
    if let Ok(val) = std::env::var("CUBEX_API_PASSWORD") {
        config.api.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("CUBEX_API_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.api.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("CUBEX_API_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.api.retry.max_attempts = Some(attempts);
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("CUBEX_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Ok(val) = std::env::var("CUBEX_EXPORT_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.export.page_size = size;
        }
    }
    if let Ok(val) = std::env::var("CUBEX_EXPORT_FALLBACK_START") {
        config.export.fallback_start = val;
    }
    if let Ok(val) = std::env::var("CUBEX_EXPORT_TRANSACTIONAL_CUBES") {
        config.export.transactional_cubes = split_list(&val);
    }
    if let Ok(val) = std::env::var("CUBEX_EXPORT_INCLUDE_CUBES") {
        config.export.include_cubes = split_list(&val);
    }
    if let Ok(val) = std::env::var("CUBEX_EXPORT_EXCLUDE_CUBES") {
        config.export.exclude_cubes = split_list(&val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CUBEX_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CUBEX_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CUBEX_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${CUBEX_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("CUBEX_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CUBEX_LOADER_MISSING_VAR");
        let input = "password = \"${CUBEX_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${CUBEX_LOADER_COMMENTED_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${CUBEX_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("Orders, LineItems,,"),
            vec!["Orders".to_string(), "LineItems".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-cubex.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[api]
base_url = "https://reports.example.com"
email = "reports@example.com"
password = "pass"

[export]
page_size = 500
transactional_cubes = ["Orders"]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://reports.example.com");
        assert_eq!(config.export.page_size, 500);
        assert_eq!(config.export.transactional_cubes, vec!["Orders".to_string()]);
        assert_eq!(config.export.output_dir, "Output");
    }
}
