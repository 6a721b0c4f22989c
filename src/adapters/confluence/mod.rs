//! Confluence Cloud adapter
//!
//! This module provides the [`ConfluenceApi`] trait the export coordinator
//! depends on, the REST implementation, and the wire models it decodes.

pub mod api;
pub mod client;
pub mod models;

pub use api::ConfluenceApi;
pub use client::{is_same_origin, ConfluenceClient};
