//! Core business logic for confluence-dump.
//!
//! # Modules
//!
//! - [`export`] - Export orchestration, date filtering, progress and reporting
//!
//! # Export Workflow
//!
//! 1. **Enumerate**: find the space, label matches or report children
//! 2. **Filter**: fetch modification dates concurrently and drop pages
//!    outside the configured range
//! 3. **Convert**: write each surviving page to HTML and/or RST, one at a time
//! 4. **Report**: collect exported pages, failures and skips
//!
//! # Example
//!
//! ```rust,no_run
//! use confluence_dump::adapters::confluence::ConfluenceClient;
//! use confluence_dump::adapters::converter::FileConverter;
//! use confluence_dump::config::load_config_or_default;
//! use confluence_dump::core::export::{ExportCoordinator, ExportJob, ExportMode};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("confluence-dump.toml")?;
//! let client = Arc::new(ConfluenceClient::new(&config.confluence)?);
//! let converter = Arc::new(FileConverter::new(client.clone()));
//!
//! let mut job = ExportJob::new(ExportMode::Space, "acme");
//! job.space = Some("DOCS".to_string());
//!
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::new(client, converter, job, shutdown_rx);
//! let report = coordinator.run().await?;
//!
//! println!("Exported: {}", report.exported_count());
//! println!("Failed: {}", report.failures.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
