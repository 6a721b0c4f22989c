//! Configuration loader with TOML parsing and environment variable overrides
//!
//! Order of precedence, lowest first: built-in defaults, the TOML file,
//! `CONFLUENCE_DUMP_*` environment overrides, the Atlassian credential
//! variables. CLI flags are applied afterwards by the caller.

use super::schema::DumpConfig;
use super::secret::secret_string;
use crate::domain::errors::DumpError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "confluence-dump.toml";

/// Environment variable holding the account e-mail
pub const ENV_USER_EMAIL: &str = "atlassianUserEmail";

/// Environment variable holding the API token
pub const ENV_API_TOKEN: &str = "atlassianAPIToken";

/// Loads configuration from a TOML file that must exist
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`DumpConfig`]
/// 4. Applies environment variable overrides
/// 5. Validates the configuration
///
/// # Examples
///
/// ```no_run
/// use confluence_dump::config::load_config;
///
/// let config = load_config("confluence-dump.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DumpConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DumpError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DumpError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: DumpConfig = toml::from_str(&contents)
        .map_err(|e| DumpError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(config)
}

/// Loads the configuration file if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply either way.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<DumpConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "No configuration file, using defaults");
        finish(DumpConfig::default())
    }
}

fn finish(mut config: DumpConfig) -> Result<DumpConfig> {
    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        DumpError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. A referenced variable that is not set
/// is an error listing every missing name.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| DumpError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
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
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DumpError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies `CONFLUENCE_DUMP_*` overrides and the Atlassian credentials
fn apply_env_overrides(config: &mut DumpConfig) {
    if let Ok(val) = std::env::var("CONFLUENCE_DUMP_BASE_URL") {
        config.confluence.base_url = Some(val);
    }
    if let Ok(val) = std::env::var("CONFLUENCE_DUMP_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.confluence.timeout_seconds = timeout;
        }
    }

    if let Ok(val) = std::env::var("CONFLUENCE_DUMP_OUTDIR") {
        config.export.outdir = val;
    }
    if let Ok(val) = std::env::var("CONFLUENCE_DUMP_WORKERS") {
        if let Ok(workers) = val.parse() {
            config.export.workers = workers;
        }
    }
    if let Ok(val) = std::env::var("CONFLUENCE_DUMP_LOG_INTERVAL_SECS") {
        if let Ok(interval) = val.parse() {
            config.export.log_interval_secs = interval;
        }
    }

    if let Ok(val) = std::env::var("CONFLUENCE_DUMP_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CONFLUENCE_DUMP_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    if let Ok(val) = std::env::var(ENV_USER_EMAIL) {
        config.confluence.username = Some(val);
    }
    if let Ok(val) = std::env::var(ENV_API_TOKEN) {
        config.confluence.api_token = Some(secret_string(val));
    }
}
