//! In-memory fakes shared by the workflow tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use confluence_dump::adapters::confluence::ConfluenceApi;
use confluence_dump::adapters::converter::{DocumentConverter, DumpOutput, DumpRequest, PageType};
use confluence_dump::domain::{
    ConfluenceError, ConvertError, DumpError, PageContent, PageId, PageSummary, Result, SpaceId,
    SpaceSummary,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub id: PageId,
    pub title: String,
    pub parent: Option<PageId>,
    pub space_id: SpaceId,
    pub modified: DateTime<Utc>,
    pub html: String,
    pub labels: Vec<String>,
}

impl FakePage {
    pub fn new(id: u64, title: &str, modified: DateTime<Utc>) -> Self {
        Self {
            id: PageId::from(id),
            title: title.to_string(),
            parent: None,
            space_id: SpaceId::new("1").unwrap(),
            modified,
            html: format!("<p>{title}</p>"),
            labels: Vec::new(),
        }
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.html = html.to_string();
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = Some(PageId::from(parent));
        self
    }
}

/// Confluence site held in memory
#[derive(Default)]
pub struct FakeConfluence {
    pub spaces: Vec<SpaceSummary>,
    pub pages: Vec<FakePage>,

    /// Pages whose export view fails with a server error
    pub broken: HashSet<PageId>,

    /// Pages whose modification date cannot be fetched
    pub broken_dates: HashSet<PageId>,

    pub date_calls: AtomicUsize,
    pub export_calls: Mutex<Vec<PageId>>,
}

impl FakeConfluence {
    pub fn with_space(key: &str, id: &str, name: &str) -> Self {
        Self {
            spaces: vec![SpaceSummary {
                key: key.to_string(),
                id: SpaceId::new(id).unwrap(),
                name: name.to_string(),
                homepage_id: None,
                description: None,
            }],
            ..Default::default()
        }
    }

    pub fn add_page(mut self, page: FakePage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn break_page(mut self, id: u64) -> Self {
        self.broken.insert(PageId::from(id));
        self
    }

    pub fn break_date(mut self, id: u64) -> Self {
        self.broken_dates.insert(PageId::from(id));
        self
    }

    pub fn exported_ids(&self) -> Vec<PageId> {
        self.export_calls.lock().unwrap().clone()
    }

    fn page(&self, id: &PageId) -> Result<&FakePage> {
        self.pages
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| ConfluenceError::NotFound(format!("page {id}")).into())
    }

    fn summary(page: &FakePage) -> PageSummary {
        let mut summary =
            PageSummary::new(page.id.clone(), page.title.clone()).with_space(page.space_id.clone());
        summary.parent_id = page.parent.clone();
        summary
    }
}

#[async_trait]
impl ConfluenceApi for FakeConfluence {
    fn base_url(&self) -> &str {
        "https://acme.atlassian.net"
    }

    async fn page_last_modified(&self, page_id: &PageId) -> Result<DateTime<Utc>> {
        self.date_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_dates.contains(page_id) {
            return Err(ConfluenceError::ServerError {
                status: 502,
                message: "bad gateway".to_string(),
            }
            .into());
        }
        Ok(self.page(page_id)?.modified)
    }

    async fn page_title(&self, page_id: &PageId) -> Result<String> {
        Ok(self.page(page_id)?.title.clone())
    }

    async fn page_parent(&self, page_id: &PageId) -> Result<Option<PageId>> {
        Ok(self.page(page_id)?.parent.clone())
    }

    async fn page_export_view(&self, page_id: &PageId) -> Result<PageContent> {
        self.export_calls.lock().unwrap().push(page_id.clone());
        if self.broken.contains(page_id) {
            return Err(ConfluenceError::ServerError {
                status: 500,
                message: "boom".to_string(),
            }
            .into());
        }
        let page = self.page(page_id)?;
        Ok(PageContent {
            title: page.title.clone(),
            html: page.html.clone(),
            url: format!("https://acme.atlassian.net/wiki/pages/{}", page.id),
        })
    }

    async fn page_labels(&self, page_id: &PageId) -> Result<Vec<String>> {
        Ok(self.page(page_id)?.labels.clone())
    }

    async fn list_spaces(&self) -> Result<Vec<SpaceSummary>> {
        Ok(self.spaces.clone())
    }

    async fn space_title(&self, space_id: &SpaceId) -> Result<String> {
        self.spaces
            .iter()
            .find(|s| &s.id == space_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| ConfluenceError::NotFound(format!("space {space_id}")).into())
    }

    async fn list_pages(&self, space_id: &SpaceId) -> Result<Vec<PageSummary>> {
        Ok(self
            .pages
            .iter()
            .filter(|p| &p.space_id == space_id)
            .map(Self::summary)
            .collect())
    }

    async fn search_by_label(&self, label: &str) -> Result<Vec<PageSummary>> {
        Ok(self
            .pages
            .iter()
            .filter(|p| p.labels.iter().any(|l| l == label))
            .map(|p| {
                let mut summary = Self::summary(p);
                // Label search does not report parents
                summary.parent_id = None;
                summary
            })
            .collect())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        Err(ConfluenceError::NotFound(url.to_string()).into())
    }
}

/// What the converter was asked to write
#[derive(Debug, Clone)]
pub struct Recorded {
    pub page_id: PageId,
    pub title: String,
    pub labels: Vec<String>,
    pub parent_id: Option<PageId>,
    pub outdir: std::path::PathBuf,
    pub page_type: PageType,
}

/// Converter that records requests instead of writing files
#[derive(Default)]
pub struct RecordingConverter {
    pub requests: Mutex<Vec<Recorded>>,

    /// Pages whose conversion fails
    pub failing: HashSet<PageId>,

    /// Flip the shutdown flag after this many conversions
    pub interrupt_after: Option<(usize, watch::Sender<bool>)>,
}

impl RecordingConverter {
    pub fn failing_on(id: u64) -> Self {
        let mut failing = HashSet::new();
        failing.insert(PageId::from(id));
        Self {
            failing,
            ..Default::default()
        }
    }

    pub fn interrupting_after(count: usize, tx: watch::Sender<bool>) -> Self {
        Self {
            interrupt_after: Some((count, tx)),
            ..Default::default()
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.recorded().into_iter().map(|r| r.title).collect()
    }
}

#[async_trait]
impl DocumentConverter for RecordingConverter {
    async fn dump(&self, request: DumpRequest) -> Result<DumpOutput> {
        if self.failing.contains(&request.page_id) {
            return Err(DumpError::Conversion(ConvertError::PandocFailed(
                "exit status: 64".to_string(),
            )));
        }

        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(Recorded {
                page_id: request.page_id.clone(),
                title: request.title.clone(),
                labels: request.labels.clone(),
                parent_id: request.parent_id.clone(),
                outdir: request.outdir_content.clone(),
                page_type: request.page_type.clone(),
            });
            requests.len()
        };

        if let Some((after, tx)) = &self.interrupt_after {
            if count >= *after {
                let _ = tx.send(true);
            }
        }

        Ok(DumpOutput {
            url: request.page_url,
            path: request.outdir_content.join(format!("{}.rst", request.title)),
        })
    }
}
