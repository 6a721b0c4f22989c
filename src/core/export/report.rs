//! Export results
//!
//! Every page yields a [`PageOutcome`]; outcomes are folded into an
//! [`ExportReport`], which only ever grows during a run.

use crate::domain::{DumpError, PageId};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// A page written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedPage {
    pub page_id: PageId,

    /// Source URL in Confluence
    pub url: String,

    /// Written file (RST when produced, otherwise HTML)
    pub path: PathBuf,

    /// Space key the page was exported under, if known
    pub space_key: Option<String>,

    pub site: String,
}

/// A page that could not be exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub page_id: PageId,
    pub error: String,
}

impl PageFailure {
    pub fn new(page_id: PageId, error: impl Into<String>) -> Self {
        Self {
            page_id,
            error: error.into(),
        }
    }
}

/// Result of processing one page
#[derive(Debug)]
pub enum PageOutcome {
    /// Written; keyed by normalized title
    Exported(String, ExportedPage),

    /// Left out by the date filter
    Skipped { page_id: PageId, reason: String },

    /// Client or converter error
    Failed { page_id: PageId, error: DumpError },
}

/// Aggregated result of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    /// Normalized title -> exported page
    pub pages: BTreeMap<String, ExportedPage>,

    pub failures: Vec<PageFailure>,

    /// Pages left out by the date filter
    pub skipped: usize,

    /// The run stopped early on a shutdown signal
    pub interrupted: bool,

    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
}

fn serialize_secs<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

impl ExportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Fold one page outcome into the report
    pub fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Exported(title, page) => {
                if let Some(previous) = self.pages.insert(title.clone(), page) {
                    tracing::warn!(
                        title = %title,
                        previous_page_id = %previous.page_id,
                        "Two pages normalize to the same title; keeping the later one"
                    );
                }
            }
            PageOutcome::Skipped { page_id, reason } => {
                tracing::debug!(page_id = %page_id, reason = %reason, "Page skipped");
                self.skipped += 1;
            }
            PageOutcome::Failed { page_id, error } => {
                self.failures.push(PageFailure::new(page_id, error.to_string()));
            }
        }
    }

    pub fn exported_count(&self) -> usize {
        self.pages.len()
    }

    /// No page failed and the run was not interrupted
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            exported = self.exported_count(),
            skipped = self.skipped,
            failed = self.failures.len(),
            interrupted = self.interrupted,
            duration_secs = format!("{:.2}", self.duration.as_secs_f64()),
            "Export completed"
        );

        if !self.failures.is_empty() {
            tracing::warn!(
                failure_count = self.failures.len(),
                "Export completed with failures"
            );
            for failure in &self.failures {
                tracing::warn!(page_id = %failure.page_id, error = %failure.error, "Failed page");
            }
        }
    }
}
