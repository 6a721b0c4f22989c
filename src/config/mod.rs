//! Configuration management for confluence-dump.
//!
//! The tool runs from CLI flags alone; a TOML file is optional and supplies
//! defaults that rarely change between runs (timeouts, retries, worker pool
//! width, logging). Credentials come from the environment.
//!
//! # Example Configuration
//!
//! ```toml
//! [confluence]
//! site = "acme"
//! timeout_seconds = 60
//!
//! [confluence.retry]
//! max_retries = 3
//! initial_delay_ms = 1000
//!
//! [export]
//! outdir = "output"
//! workers = 8
//! log_interval_secs = 10
//! start_date = "2024-01-01"
//!
//! [logging]
//! level = "info"
//! local_enabled = true
//! local_path = "logs"
//! ```
//!
//! # Environment Variables
//!
//! ```bash
//! export atlassianUserEmail="me@acme.com"
//! export atlassianAPIToken="..."
//! ```
//!
//! `${VAR_NAME}` placeholders in the file are substituted on load.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_PATH};
pub use schema::{ConfluenceConfig, DumpConfig, ExportConfig, LoggingConfig, RetryConfig};
pub use secret::{secret_string, SecretString, SecretValue};
