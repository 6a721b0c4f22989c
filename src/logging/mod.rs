//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable console output
//! - optional JSON file logs with rotation
//!
//! # Example
//!
//! ```no_run
//! use confluence_dump::logging::init_logging;
//! use confluence_dump::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(page_id = "123", "Exporting page");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a page that was skipped or failed, with its id and reason
///
/// # Example
///
/// ```no_run
/// use confluence_dump::log_page_failure;
///
/// let error = "connection reset";
/// log_page_failure!("123", &error, "Failed to export page");
/// ```
#[macro_export]
macro_rules! log_page_failure {
    ($page_id:expr, $error:expr, $message:literal) => {
        tracing::error!(
            page_id = %$page_id,
            error = %$error,
            $message
        );
    };
}

/// Log export progress with the fraction complete and time remaining
///
/// # Example
///
/// ```no_run
/// use confluence_dump::log_progress;
/// use std::time::Duration;
///
/// log_progress!("Exporting pages", 5, 20, Duration::from_secs(30));
/// ```
#[macro_export]
macro_rules! log_progress {
    ($stage:expr, $done:expr, $total:expr, $remaining:expr) => {
        tracing::info!(
            done = $done,
            total = $total,
            progress_pct = format!("{:.1}%", $done as f64 / ($total as f64).max(1.0) * 100.0),
            remaining_secs = format!("{:.2}", $remaining.as_secs_f64()),
            "{} {}/{} - estimated time remaining: {:.2} seconds",
            $stage,
            $done,
            $total,
            $remaining.as_secs_f64()
        );
    };
}
