//! Document conversion
//!
//! Turns a page's export-view HTML into files on disk: local copies of the
//! embedded images, an optional standalone HTML file and an optional RST file
//! produced by `pandoc`.

pub mod file;
pub mod properties;

pub use file::{prepare_outdir, FileConverter, ASSET_DIRS};
pub use properties::page_properties_children;

use crate::domain::{ChildRecord, PageId, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format and layout switches, fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Write `{title}.html`
    pub html: bool,

    /// Write `{title}.rst` through pandoc
    pub rst: bool,

    /// Sphinx layout: images go to `_images/` instead of `attachments/`
    pub sphinx: bool,

    /// Emit a `.. tags::` directive from the page labels
    pub tags: bool,

    /// Append the labels as a footer to the RST output
    pub show_labels: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            html: false,
            rst: true,
            sphinx: false,
            tags: false,
            show_labels: false,
        }
    }
}

/// Role of a page in the export, which decides extra content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageType {
    /// Regular page
    Common,

    /// Child of a page-properties report
    ReportChild,

    /// Page-properties report; an index of the children is appended
    Report { children: Vec<ChildRecord> },
}

/// Everything needed to write one page
#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub site: String,
    pub html: String,

    /// Normalized title, also the output file stem
    pub title: String,

    pub page_id: PageId,
    pub page_url: String,

    /// Directory holding the asset subdirectories
    pub outdir_base: PathBuf,

    /// Directory the page files are written to
    pub outdir_content: PathBuf,

    pub labels: Vec<String>,
    pub parent_id: Option<PageId>,
    pub options: OutputOptions,
    pub page_type: PageType,
}

/// Where a page ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOutput {
    /// Source URL of the page
    pub url: String,

    /// RST file when produced, the HTML file otherwise
    pub path: PathBuf,
}

/// Writes pages to their output format
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn dump(&self, request: DumpRequest) -> Result<DumpOutput>;
}
