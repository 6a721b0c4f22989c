//! Confluence API trait definition
//!
//! The export coordinator only talks to Confluence through [`ConfluenceApi`],
//! so the REST client can be swapped for an in-memory fake in tests.

use crate::domain::{PageContent, PageId, PageSummary, Result, SpaceId, SpaceSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only operations the exporter needs from a Confluence Cloud site
///
/// # Example
///
/// ```no_run
/// use confluence_dump::adapters::confluence::{ConfluenceApi, ConfluenceClient};
/// use confluence_dump::config::ConfluenceConfig;
/// use confluence_dump::domain::PageId;
///
/// # async fn example() -> confluence_dump::domain::Result<()> {
/// let client = ConfluenceClient::new(&ConfluenceConfig::default())?;
/// let title = client.page_title(&PageId::from(123456u64)).await?;
/// println!("{title}");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ConfluenceApi: Send + Sync {
    /// Base URL of the site, e.g. `https://acme.atlassian.net`
    fn base_url(&self) -> &str;

    /// Creation time of the page's current version
    async fn page_last_modified(&self, page_id: &PageId) -> Result<DateTime<Utc>>;

    /// Raw page title
    async fn page_title(&self, page_id: &PageId) -> Result<String>;

    /// Parent page id, `None` for top-level pages
    async fn page_parent(&self, page_id: &PageId) -> Result<Option<PageId>>;

    /// Export-view HTML, title and browser URL of a page
    async fn page_export_view(&self, page_id: &PageId) -> Result<PageContent>;

    /// Label names attached to a page
    async fn page_labels(&self, page_id: &PageId) -> Result<Vec<String>>;

    /// Every space visible to the account
    async fn list_spaces(&self) -> Result<Vec<SpaceSummary>>;

    /// Display name of a space
    async fn space_title(&self, space_id: &SpaceId) -> Result<String>;

    /// Every page of a space
    async fn list_pages(&self, space_id: &SpaceId) -> Result<Vec<PageSummary>>;

    /// Every page carrying `label`
    async fn search_by_label(&self, label: &str) -> Result<Vec<PageSummary>>;

    /// Download an attachment; relative URLs are resolved against the site
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
