//! Space and page models
//!
//! These are the orchestrator's view of Confluence content. The client maps
//! the wire format (see `adapters::confluence::models`) into these types.

use super::ids::{PageId, SpaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A space as returned by the space listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceSummary {
    /// Space key (e.g. `DOCS`)
    pub key: String,

    /// Numeric space id
    pub id: SpaceId,

    /// Display name
    pub name: String,

    /// Homepage page id, if the space has one
    pub homepage_id: Option<PageId>,

    /// Plain-text description, if any
    pub description: Option<String>,
}

impl SpaceSummary {
    /// Case-insensitive match against a user-supplied space key
    pub fn matches_key(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key.trim())
    }
}

/// A page as returned by a space listing or label search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Page id
    pub id: PageId,

    /// Raw page title
    pub title: String,

    /// Parent page id (top-level pages have none)
    pub parent_id: Option<PageId>,

    /// Owning space id, when the listing reports it
    pub space_id: Option<SpaceId>,

    /// Last modification time, filled lazily by the date filter
    pub last_modified: Option<DateTime<Utc>>,
}

impl PageSummary {
    /// Create a summary with only id and title set
    pub fn new(id: PageId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            parent_id: None,
            space_id: None,
            last_modified: None,
        }
    }

    /// Set the parent id
    pub fn with_parent(mut self, parent_id: PageId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the owning space id
    pub fn with_space(mut self, space_id: SpaceId) -> Self {
        self.space_id = Some(space_id);
        self
    }
}

/// Rendered page body fetched through the export-view representation
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// Raw page title
    pub title: String,

    /// Export-view HTML
    pub html: String,

    /// Browser URL of the page (`_links.base` + `_links.webui`)
    pub url: String,
}

/// One child of a page-properties report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    /// Link text in the report table
    pub name: String,

    /// Child page id
    pub id: PageId,

    /// Output filename, set once the child has been exported
    pub filename: Option<String>,
}

impl ChildRecord {
    /// Create a record without a filename
    pub fn new(name: impl Into<String>, id: PageId) -> Self {
        Self {
            name: name.into(),
            id,
            filename: None,
        }
    }
}
