//! Confluence REST wire models
//!
//! Only the fields the exporter reads are modelled; everything else in the
//! responses is ignored by serde.

use crate::domain::{ConfluenceError, PageId, PageSummary, SpaceId, SpaceSummary};
use serde::Deserialize;

/// Cursor-paginated list (v2 API and v1 search)
#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,

    #[serde(rename = "_links", default)]
    pub links: Option<PaginationLinks>,
}

impl<T> Paginated<T> {
    /// Relative or absolute URL of the next page, if any
    pub fn next(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.next.as_deref())
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// `GET /wiki/api/v2/pages/{id}`
#[derive(Debug, Deserialize)]
pub struct PageV2 {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,

    #[serde(rename = "spaceId", default)]
    pub space_id: Option<String>,

    #[serde(default)]
    pub version: Option<VersionV2>,
}

#[derive(Debug, Deserialize)]
pub struct VersionV2 {
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl PageV2 {
    /// Map to the domain summary; ids that fail validation are reported as
    /// invalid responses
    pub fn into_summary(self) -> Result<PageSummary, ConfluenceError> {
        let id = PageId::new(self.id).map_err(ConfluenceError::InvalidResponse)?;
        let mut summary = PageSummary::new(id, self.title);

        summary.parent_id = parse_optional_page_id(self.parent_id)?;
        summary.space_id = match self.space_id {
            Some(s) if !s.is_empty() => {
                Some(SpaceId::new(s).map_err(ConfluenceError::InvalidResponse)?)
            }
            _ => None,
        };

        Ok(summary)
    }
}

/// Parent ids come back as `null`, `""` or a numeric string
pub fn parse_optional_page_id(id: Option<String>) -> Result<Option<PageId>, ConfluenceError> {
    match id {
        Some(s) if !s.is_empty() => Ok(Some(
            PageId::new(s).map_err(ConfluenceError::InvalidResponse)?,
        )),
        _ => Ok(None),
    }
}

/// `GET /wiki/api/v2/spaces`
#[derive(Debug, Deserialize)]
pub struct SpaceV2 {
    pub id: String,
    pub key: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "homepageId", default)]
    pub homepage_id: Option<String>,

    /// Either absent, `null`, or `{"plain": {"value": "..."}}`
    #[serde(default)]
    pub description: Option<serde_json::Value>,
}

impl SpaceV2 {
    pub fn into_summary(self) -> Result<SpaceSummary, ConfluenceError> {
        let description = self.description.as_ref().and_then(|d| {
            d.pointer("/plain/value")
                .or_else(|| d.pointer("/view/value"))
                .and_then(|v| v.as_str())
                .or_else(|| d.as_str())
                .map(str::to_string)
        });

        Ok(SpaceSummary {
            key: self.key,
            id: SpaceId::new(self.id).map_err(ConfluenceError::InvalidResponse)?,
            name: self.name,
            homepage_id: parse_optional_page_id(self.homepage_id)?,
            description,
        })
    }
}

/// `GET /wiki/api/v2/pages/{id}/labels`
#[derive(Debug, Deserialize)]
pub struct LabelV2 {
    pub name: String,
}

/// `GET /wiki/rest/api/content/{id}?expand=body.export_view`
#[derive(Debug, Deserialize)]
pub struct ContentV1 {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub body: Option<BodyV1>,

    #[serde(rename = "_links", default)]
    pub links: Option<ContentLinksV1>,
}

#[derive(Debug, Deserialize)]
pub struct BodyV1 {
    #[serde(default)]
    pub export_view: Option<RepresentationV1>,
}

#[derive(Debug, Deserialize)]
pub struct RepresentationV1 {
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentLinksV1 {
    #[serde(default)]
    pub base: Option<String>,

    #[serde(default)]
    pub webui: Option<String>,
}

/// Item of `GET /wiki/rest/api/content/search`
#[derive(Debug, Deserialize)]
pub struct ContentSummaryV1 {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub space: Option<SpaceRefV1>,
}

#[derive(Debug, Deserialize)]
pub struct SpaceRefV1 {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl ContentSummaryV1 {
    pub fn into_summary(self) -> Result<PageSummary, ConfluenceError> {
        let id = PageId::new(self.id).map_err(ConfluenceError::InvalidResponse)?;
        let mut summary = PageSummary::new(id, self.title);

        // v1 reports the space id as a number
        summary.space_id = self
            .space
            .and_then(|s| s.id)
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .and_then(|s| SpaceId::new(s).ok());

        Ok(summary)
    }
}
