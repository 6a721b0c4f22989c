// Confluence Dump - Confluence Cloud to HTML/RST exporter
// Copyright (c) 2025 Confluence Dump Contributors
// Licensed under the MIT License

//! # Confluence Dump - Confluence Cloud to HTML/RST
//!
//! confluence-dump exports pages from a Confluence Cloud site to local files,
//! as standalone HTML and as reStructuredText converted by `pandoc`, ready to
//! drop into a Sphinx project.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Exporting** a single page, a whole space, every page carrying a label,
//!   or a page-properties report with its children
//! - **Filtering** pages by modification date, checking dates concurrently
//! - **Downloading** embedded images next to the exported pages
//! - **Reporting** which pages were exported, skipped or failed
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export orchestration, date filtering, progress, reporting
//! - [`adapters`] - External integrations (Confluence REST API, filesystem + pandoc)
//! - [`domain`] - Core domain types, title normalization and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confluence_dump::adapters::confluence::ConfluenceClient;
//! use confluence_dump::adapters::converter::FileConverter;
//! use confluence_dump::config::load_config_or_default;
//! use confluence_dump::core::export::{ExportCoordinator, ExportJob, ExportMode};
//! use confluence_dump::domain::PageId;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = load_config_or_default("confluence-dump.toml")?;
//!     config.confluence.site = Some("acme".to_string());
//!
//!     let client = Arc::new(ConfluenceClient::new(&config.confluence)?);
//!     let converter = Arc::new(FileConverter::new(client.clone()));
//!
//!     let mut job = ExportJob::new(ExportMode::Single, "acme");
//!     job.page = Some(PageId::from(123456u64));
//!
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!     let report = ExportCoordinator::new(client, converter, job, shutdown)
//!         .run()
//!         .await?;
//!
//!     for (title, page) in &report.pages {
//!         println!("{title} -> {}", page.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::DumpError`]. Errors on a single page are
//! recorded in the [`core::export::ExportReport`] and never stop a run;
//! configuration errors stop it before any request is made.
//!
//! ## Logging
//!
//! Structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! tracing::info!(page_id = "123456", "Exporting a single page");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
