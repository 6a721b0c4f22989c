//! External system integrations for confluence-dump.
//!
//! - [`confluence`] - Confluence Cloud REST API (trait + reqwest client)
//! - [`converter`] - writing pages to HTML/RST on disk
//!
//! # Design Pattern
//!
//! Both adapters sit behind traits ([`confluence::ConfluenceApi`],
//! [`converter::DocumentConverter`]) so the export coordinator can be driven
//! by in-memory fakes in tests.
//!
//! ```rust,no_run
//! use confluence_dump::adapters::confluence::ConfluenceClient;
//! use confluence_dump::adapters::converter::FileConverter;
//! use confluence_dump::config::{secret_string, ConfluenceConfig};
//! use std::sync::Arc;
//!
//! # fn example() -> confluence_dump::domain::Result<()> {
//! let config = ConfluenceConfig {
//!     site: Some("acme".to_string()),
//!     username: Some("me@acme.com".to_string()),
//!     api_token: Some(secret_string("token".to_string())),
//!     ..Default::default()
//! };
//!
//! let client = Arc::new(ConfluenceClient::new(&config)?);
//! let converter = FileConverter::new(client.clone());
//! # Ok(())
//! # }
//! ```

pub mod confluence;
pub mod converter;
