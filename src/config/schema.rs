//! Configuration schema types
//!
//! Every section has defaults so the tool runs without a config file; the
//! CLI flags are layered on top by `cli::export`.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Root configuration, mapping to `confluence-dump.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Confluence connection settings
    #[serde(default)]
    pub confluence: ConfluenceConfig,

    /// Export defaults
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DumpConfig {
    /// Validates the configuration
    ///
    /// Credentials are checked separately by [`ConfluenceConfig::validate_credentials`]
    /// because `validate-config`-style checks should not require them.
    pub fn validate(&self) -> Result<(), String> {
        self.confluence.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Retry configuration for Confluence requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Confluence connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfluenceConfig {
    /// Atlassian site name (`<site>.atlassian.net`)
    #[serde(default)]
    pub site: Option<String>,

    /// Full base URL, overriding the one derived from `site`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Account e-mail, normally taken from `atlassianUserEmail`
    #[serde(default)]
    pub username: Option<String>,

    /// API token, normally taken from `atlassianAPIToken`
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Page size for paginated listings
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ConfluenceConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(base_url) = &self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("confluence.base_url must start with http:// or https://".to_string());
            }
        }

        if self.timeout_seconds == 0 {
            return Err("confluence.timeout_seconds must be greater than 0".to_string());
        }

        if !(1..=250).contains(&self.page_limit) {
            return Err(format!(
                "confluence.page_limit must be between 1 and 250, got {}",
                self.page_limit
            ));
        }

        if self.retry.max_retries == 0 || self.retry.max_retries > 10 {
            return Err(format!(
                "confluence.retry.max_retries must be between 1 and 10, got {}",
                self.retry.max_retries
            ));
        }

        Ok(())
    }

    /// Checks that both credentials are present and non-blank
    pub fn validate_credentials(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self
            .username
            .as_ref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
        {
            return Err(
                "Missing Confluence user e-mail: set the atlassianUserEmail environment variable"
                    .to_string(),
            );
        }

        if self
            .api_token
            .as_ref()
            .map(|s| s.expose_secret().is_blank())
            .unwrap_or(true)
        {
            return Err(
                "Missing Confluence API token: set the atlassianAPIToken environment variable"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Resolve the base URL for API calls
    ///
    /// `base_url` wins over `site`; a bare site name expands to
    /// `https://<site>.atlassian.net`.
    pub fn resolved_base_url(&self) -> Option<String> {
        if let Some(base_url) = &self.base_url {
            return Some(base_url.trim_end_matches('/').to_string());
        }

        self.site.as_deref().map(|site| {
            let site = site.trim().trim_end_matches('/');
            if site.starts_with("http://") || site.starts_with("https://") {
                site.to_string()
            } else if site.contains('.') {
                format!("https://{site}")
            } else {
                format!("https://{site}.atlassian.net")
            }
        })
    }
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            site: None,
            base_url: None,
            username: None,
            api_token: None,
            timeout_seconds: default_timeout_seconds(),
            page_limit: default_page_limit(),
            retry: RetryConfig::default(),
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output directory
    #[serde(default = "default_outdir")]
    pub outdir: String,

    /// Width of the date-filter worker pool
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Seconds between progress log lines
    #[serde(default = "default_log_interval_secs")]
    pub log_interval_secs: u64,

    /// Lower modification-date bound (RFC 3339 or YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Upper modification-date bound (RFC 3339 or YYYY-MM-DD)
    #[serde(default)]
    pub end_date: Option<String>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.outdir.trim().is_empty() {
            return Err("export.outdir cannot be empty".to_string());
        }

        if self.workers == 0 || self.workers > 64 {
            return Err(format!(
                "export.workers must be between 1 and 64, got {}",
                self.workers
            ));
        }

        if self.log_interval_secs == 0 {
            return Err("export.log_interval_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            outdir: default_outdir(),
            workers: default_workers(),
            log_interval_secs: default_log_interval_secs(),
            start_date: None,
            end_date: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_page_limit() -> usize {
    250
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_outdir() -> String {
    "output".to_string()
}

fn default_workers() -> usize {
    8
}

fn default_log_interval_secs() -> u64 {
    10
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
