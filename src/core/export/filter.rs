//! Modification-date filtering
//!
//! Bounds are inclusive and each is optional. The pre-pass fetches every
//! page's last-modified timestamp with at most `workers` requests in flight.

use super::progress::ProgressTracker;
use super::report::PageFailure;
use crate::adapters::confluence::ConfluenceApi;
use crate::domain::{DumpError, PageSummary, Result};
use crate::log_page_failure;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;

/// Optional inclusive `[start, end]` range of modification times
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Where a timestamp falls relative to a [`DateRange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCheck {
    Within,
    BeforeStart(DateTime<Utc>),
    AfterEnd(DateTime<Utc>),
}

impl fmt::Display for DateCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateCheck::Within => write!(f, "within the date range"),
            DateCheck::BeforeStart(start) => write!(f, "before the start date {start}"),
            DateCheck::AfterEnd(end) => write!(f, "after the end date {end}"),
        }
    }
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(DumpError::Validation(format!(
                    "Start date {s} is after end date {e}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Range with no bounds; every timestamp is within it
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn check(&self, timestamp: DateTime<Utc>) -> DateCheck {
        match (self.start, self.end) {
            (Some(start), _) if timestamp < start => DateCheck::BeforeStart(start),
            (_, Some(end)) if timestamp > end => DateCheck::AfterEnd(end),
            _ => DateCheck::Within,
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.check(timestamp) == DateCheck::Within
    }
}

/// Result of the date pre-pass
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Pages within the range, in listing order, with `last_modified` set
    pub kept: Vec<PageSummary>,

    /// Pages outside the range
    pub skipped: usize,

    /// Pages whose timestamp could not be fetched
    pub failures: Vec<PageFailure>,

    /// Interruption was observed before every page was checked
    pub interrupted: bool,
}

enum DateLookup {
    Fetched(PageSummary, Result<DateTime<Utc>>),
    NotStarted,
}

/// Keep the pages modified within `range`
///
/// Without bounds no timestamps are fetched and every page is kept.
pub async fn filter_by_date(
    api: &dyn ConfluenceApi,
    pages: Vec<PageSummary>,
    range: DateRange,
    workers: usize,
    log_interval: Duration,
    shutdown: &watch::Receiver<bool>,
) -> FilterOutcome {
    if !range.is_bounded() {
        return FilterOutcome {
            kept: pages,
            ..Default::default()
        };
    }

    tracing::info!(
        pages = pages.len(),
        workers = workers,
        start = ?range.start,
        end = ?range.end,
        "Checking page modification dates"
    );

    let tracker = ProgressTracker::new("Checking page", pages.len(), log_interval);
    let tracker = &tracker;

    let mut lookups = stream::iter(pages.into_iter().enumerate())
        .map(|(index, page)| async move {
            let stop = *shutdown.borrow();
            if stop {
                return (index, DateLookup::NotStarted);
            }

            let result = api.page_last_modified(&page.id).await;
            tracker.record();
            (index, DateLookup::Fetched(page, result))
        })
        .buffer_unordered(workers.max(1))
        .collect::<Vec<_>>()
        .await;

    lookups.sort_by_key(|(index, _)| *index);

    let mut outcome = FilterOutcome::default();
    for (_, lookup) in lookups {
        match lookup {
            DateLookup::NotStarted => outcome.interrupted = true,
            DateLookup::Fetched(mut page, Ok(modified)) => match range.check(modified) {
                DateCheck::Within => {
                    page.last_modified = Some(modified);
                    outcome.kept.push(page);
                }
                miss => {
                    tracing::info!(
                        page_id = %page.id,
                        last_modified = %modified,
                        "Page {} was last modified on {}, which is {}. Skipping.",
                        page.id,
                        modified,
                        miss
                    );
                    outcome.skipped += 1;
                }
            },
            DateLookup::Fetched(page, Err(e)) => {
                log_page_failure!(page.id, e, "Failed to fetch page modification date");
                outcome
                    .failures
                    .push(PageFailure::new(page.id, format!("modification date: {e}")));
            }
        }
    }

    tracing::info!(
        kept = outcome.kept.len(),
        skipped = outcome.skipped,
        failed = outcome.failures.len(),
        elapsed_secs = format!("{:.2}", tracker.elapsed().as_secs_f64()),
        "Date filter finished"
    );

    outcome
}
