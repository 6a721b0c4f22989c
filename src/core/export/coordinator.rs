//! Export coordinator - main orchestrator for the export process
//!
//! Enumerates spaces and pages through the Confluence API, applies the date
//! filter, and hands every surviving page to the document converter. Pages
//! are processed one at a time; only the date pre-pass runs concurrently.

use super::filter::{filter_by_date, DateCheck};
use super::job::{ExportJob, ExportMode};
use super::progress::ProgressTracker;
use super::report::{ExportReport, ExportedPage, PageOutcome};
use crate::adapters::confluence::ConfluenceApi;
use crate::adapters::converter::{
    page_properties_children, prepare_outdir, DocumentConverter, DumpRequest, PageType,
};
use crate::domain::title::{child_filename, normalize_space_title, normalize_title};
use crate::domain::{ChildRecord, DumpError, PageId, PageSummary, Result};
use crate::log_page_failure;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Where a batch of listed pages came from
#[derive(Debug, Clone)]
enum PageSource {
    /// Space listing; parent ids are part of the listing
    Space { key: String },
    /// Label search; parents have to be fetched per page
    Label,
}

/// Normalized titles already handed out in one output directory
///
/// Distinct pages can normalize to the same title (`Q&A` and `QAndA`); the
/// later one gets its page id appended so neither the report entry nor the
/// written file is lost.
#[derive(Debug, Default)]
struct TitleRegistry {
    used: HashSet<String>,
}

impl TitleRegistry {
    fn claim(&mut self, title: String, page_id: &PageId) -> String {
        // Titles made only of stripped characters would leave a bare extension
        let title = if title.is_empty() {
            page_id.to_string()
        } else {
            title
        };
        if self.used.insert(title.clone()) {
            return title;
        }

        let mut unique = format!("{title}_{page_id}");
        let mut n = 2;
        while !self.used.insert(unique.clone()) {
            unique = format!("{title}_{page_id}_{n}");
            n += 1;
        }

        tracing::warn!(
            page_id = %page_id,
            title = %title,
            renamed = %unique,
            "Title already used in this export, renaming"
        );
        unique
    }
}

/// Export coordinator
pub struct ExportCoordinator {
    api: Arc<dyn ConfluenceApi>,
    converter: Arc<dyn DocumentConverter>,
    job: ExportJob,
    shutdown: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    ///
    /// `shutdown` flips to `true` once when the run should stop; it is only
    /// observed between pages.
    pub fn new(
        api: Arc<dyn ConfluenceApi>,
        converter: Arc<dyn DocumentConverter>,
        job: ExportJob,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            api,
            converter,
            job,
            shutdown,
        }
    }

    pub fn job(&self) -> &ExportJob {
        &self.job
    }

    fn is_interrupted(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run the export selected by the job's mode
    pub async fn run(&self) -> Result<ExportReport> {
        let start_time = Instant::now();

        tracing::info!(
            mode = %self.job.mode,
            site = %self.job.site,
            outdir = %self.job.outdir.display(),
            sphinx = self.job.options.sphinx,
            "Starting export"
        );

        let report = match self.job.mode {
            ExportMode::Single => {
                let page_id = self.required_page()?;
                let mut report = ExportReport::new();
                report.record(self.export_single_page(page_id).await);
                report
            }
            ExportMode::Space => {
                let key = required(&self.job.space, "space")?;
                self.export_space(key).await?
            }
            ExportMode::ByLabel => {
                let label = required(&self.job.label, "label")?;
                self.export_by_label(label).await?
            }
            ExportMode::PageProps => {
                let page_id = self.required_page()?;
                self.export_page_properties(page_id).await?
            }
        };

        let report = report.with_duration(start_time.elapsed());
        report.log_summary();
        Ok(report)
    }

    fn required_page(&self) -> Result<&PageId> {
        self.job.page.as_ref().ok_or_else(|| {
            DumpError::Validation(format!("--page is required in {} mode", self.job.mode))
        })
    }

    /// Export one page into `{outdir}/{page_id}-{title}`
    ///
    /// Never fails: errors are logged and returned as [`PageOutcome::Failed`].
    pub async fn export_single_page(&self, page_id: &PageId) -> PageOutcome {
        let start_time = Instant::now();
        tracing::info!(page_id = %page_id, sphinx = self.job.options.sphinx, "Exporting a single page");

        match self.try_export_single_page(page_id).await {
            Ok(outcome) => {
                tracing::info!(
                    page_id = %page_id,
                    elapsed_secs = format!("{:.2}", start_time.elapsed().as_secs_f64()),
                    "Done exporting single page"
                );
                outcome
            }
            Err(error) => {
                log_page_failure!(page_id, error, "Failed to export page");
                PageOutcome::Failed {
                    page_id: page_id.clone(),
                    error,
                }
            }
        }
    }

    async fn try_export_single_page(&self, page_id: &PageId) -> Result<PageOutcome> {
        let range = self.job.date_range;
        if range.is_bounded() {
            let modified = self.api.page_last_modified(page_id).await?;
            let check = range.check(modified);
            if check != DateCheck::Within {
                let reason = format!("last modified on {modified}, which is {check}");
                tracing::info!(page_id = %page_id, "Page {} was {}. Skipping.", page_id, reason);
                return Ok(PageOutcome::Skipped {
                    page_id: page_id.clone(),
                    reason,
                });
            }
        }

        let content = self.api.page_export_view(page_id).await?;
        let labels = self.api.page_labels(page_id).await?;
        let parent_id = self.api.page_parent(page_id).await?;

        let title = normalize_title(&content.title);
        let outdir = self.job.outdir.join(format!("{page_id}-{title}"));
        prepare_outdir(&outdir).await?;

        tracing::info!(
            page_id = %page_id,
            outdir = %outdir.display(),
            "Base export folder is \"{}\"",
            outdir.display()
        );

        let output = self
            .converter
            .dump(DumpRequest {
                site: self.job.site.clone(),
                html: content.html,
                title: title.clone(),
                page_id: page_id.clone(),
                page_url: content.url,
                outdir_base: outdir.clone(),
                outdir_content: outdir,
                labels,
                parent_id,
                options: self.job.options,
                page_type: PageType::Common,
            })
            .await?;

        Ok(PageOutcome::Exported(
            title,
            ExportedPage {
                page_id: page_id.clone(),
                url: output.url,
                path: output.path,
                space_key: self.job.space.clone(),
                site: self.job.site.clone(),
            },
        ))
    }

    /// Export every page of the space with key `space_key`
    ///
    /// An unknown key is a configuration error; nothing is written then.
    pub async fn export_space(&self, space_key: &str) -> Result<ExportReport> {
        let start_time = Instant::now();
        let mut report = ExportReport::new();

        tracing::info!(space_key = %space_key, sphinx = self.job.options.sphinx, "Exporting a whole space");

        let spaces = self.api.list_spaces().await?;
        let mut found = None;
        for space in spaces {
            if self.is_interrupted() {
                tracing::warn!("Interrupted while enumerating spaces");
                report.interrupted = true;
                return Ok(report);
            }
            if space.matches_key(space_key) {
                tracing::info!(space_key = %space.key, space_id = %space.id, "Found space");
                found = Some(space);
                break;
            }
        }

        let space = found.ok_or_else(|| {
            DumpError::Configuration(format!(
                "Could not find space '{}' on site {}",
                space_key, self.job.site
            ))
        })?;

        let outdir = self
            .job
            .outdir
            .join(format!("{}-{}", space.id, normalize_title(&space.name)));
        prepare_outdir(&outdir).await?;

        match self.api.space_title(&space.id).await {
            Ok(title) => tracing::info!(space_id = %space.id, title = %title, "Space title"),
            Err(e) => tracing::warn!(space_id = %space.id, error = %e, "Could not fetch space title"),
        }

        let listed = self.api.list_pages(&space.id).await?;
        let mut pages = Vec::with_capacity(listed.len());
        for page in listed {
            if self.is_interrupted() {
                tracing::warn!("Interrupted while enumerating pages");
                report.interrupted = true;
                return Ok(report);
            }
            pages.push(page);
        }

        self.process_pages(
            pages,
            &outdir,
            PageSource::Space { key: space.key },
            &mut report,
        )
        .await;

        tracing::info!(
            space_key = %space_key,
            elapsed_secs = format!("{:.2}", start_time.elapsed().as_secs_f64()),
            "Done exporting space"
        );
        Ok(report)
    }

    /// Export every page carrying `label` into `{outdir}/label-{label}`
    pub async fn export_by_label(&self, label: &str) -> Result<ExportReport> {
        let start_time = Instant::now();
        let mut report = ExportReport::new();

        tracing::info!(label = %label, "Exporting pages by label");

        let outdir = self
            .job
            .outdir
            .join(format!("label-{}", normalize_space_title(label.trim())));
        prepare_outdir(&outdir).await?;

        let pages = self.api.search_by_label(label.trim()).await?;
        if pages.is_empty() {
            tracing::warn!(label = %label, "No pages carry this label");
        }

        self.process_pages(pages, &outdir, PageSource::Label, &mut report)
            .await;

        tracing::info!(
            label = %label,
            elapsed_secs = format!("{:.2}", start_time.elapsed().as_secs_f64()),
            "Done exporting label"
        );
        Ok(report)
    }

    /// Date pre-pass, then sequential export of the surviving pages
    async fn process_pages(
        &self,
        pages: Vec<PageSummary>,
        outdir: &Path,
        source: PageSource,
        report: &mut ExportReport,
    ) {
        let filtered = filter_by_date(
            self.api.as_ref(),
            pages,
            self.job.date_range,
            self.job.workers,
            self.job.log_interval,
            &self.shutdown,
        )
        .await;

        report.skipped += filtered.skipped;
        report.failures.extend(filtered.failures);
        if filtered.interrupted {
            tracing::warn!("Interrupted during the date filter");
            report.interrupted = true;
            return;
        }

        let pages = filtered.kept;
        tracing::info!(count = pages.len(), "{} pages to export", pages.len());

        let tracker = ProgressTracker::new("Exporting page", pages.len(), self.job.log_interval);
        let mut titles = TitleRegistry::default();
        for page in &pages {
            if self.is_interrupted() {
                tracing::warn!(
                    done = tracker.done(),
                    total = tracker.total(),
                    "Interrupted, stopping export"
                );
                report.interrupted = true;
                break;
            }

            let title = titles.claim(normalize_space_title(&page.title), &page.id);
            let outcome = match self.export_listed_page(page, title, outdir, &source).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    log_page_failure!(page.id, error, "Failed to export page");
                    PageOutcome::Failed {
                        page_id: page.id.clone(),
                        error,
                    }
                }
            };
            report.record(outcome);
            tracker.record();
        }
    }

    async fn export_listed_page(
        &self,
        page: &PageSummary,
        title: String,
        outdir: &Path,
        source: &PageSource,
    ) -> Result<PageOutcome> {
        tracing::debug!(page_id = %page.id, title = %title, "Getting page");

        let content = self.api.page_export_view(&page.id).await?;
        let labels = self.api.page_labels(&page.id).await?;

        let (parent_id, space_key) = match source {
            PageSource::Space { key } => (page.parent_id.clone(), Some(key.clone())),
            PageSource::Label => (
                self.api.page_parent(&page.id).await?,
                page.space_id.as_ref().map(|id| id.to_string()),
            ),
        };

        let output = self
            .converter
            .dump(DumpRequest {
                site: self.job.site.clone(),
                html: content.html,
                title: title.clone(),
                page_id: page.id.clone(),
                page_url: content.url,
                outdir_base: outdir.to_path_buf(),
                outdir_content: outdir.to_path_buf(),
                labels,
                parent_id,
                options: self.job.options,
                page_type: PageType::Common,
            })
            .await?;

        Ok(PageOutcome::Exported(
            title,
            ExportedPage {
                page_id: page.id.clone(),
                url: output.url,
                path: output.path,
                space_key,
                site: self.job.site.clone(),
            },
        ))
    }

    /// Export a page-properties report: every child, then the report itself
    /// with an index linking to the children
    ///
    /// A failure on the report page is recorded like any page failure.
    pub async fn export_page_properties(&self, page_id: &PageId) -> Result<ExportReport> {
        let start_time = Instant::now();
        let mut report = ExportReport::new();

        tracing::info!(page_id = %page_id, "Exporting page-properties report");

        let fetched = async {
            let content = self.api.page_export_view(page_id).await?;
            let labels = self.api.page_labels(page_id).await?;
            let parent_id = self.api.page_parent(page_id).await?;
            let title = normalize_title(&content.title);
            let outdir = self.job.outdir.join(format!("{page_id}-{title}"));
            prepare_outdir(&outdir).await?;
            Ok::<_, DumpError>((content, labels, parent_id, title, outdir))
        }
        .await;

        let (content, labels, parent_id, title, outdir) = match fetched {
            Ok(parts) => parts,
            Err(error) => {
                log_page_failure!(page_id, error, "Failed to fetch page-properties report");
                report.record(PageOutcome::Failed {
                    page_id: page_id.clone(),
                    error,
                });
                return Ok(report);
            }
        };

        let mut children = page_properties_children(&content.html);
        tracing::info!(page_id = %page_id, children = children.len(), "Found report children");

        let tracker =
            ProgressTracker::new("Exporting report child", children.len(), self.job.log_interval);
        let mut titles = TitleRegistry::default();
        // The report itself is written as `{title}.html` in the same directory
        titles.used.insert(title.clone());
        for child in children.iter_mut() {
            if self.is_interrupted() {
                tracing::warn!("Interrupted, stopping report export");
                report.interrupted = true;
                return Ok(report);
            }

            let child_title = titles.claim(normalize_space_title(&child.name), &child.id);
            child.filename = Some(child_filename(&child_title));
            match self.export_report_child(child, child_title, &outdir).await {
                Ok(outcome) => report.record(outcome),
                Err(error) => {
                    log_page_failure!(child.id, error, "Failed to export report child");
                    child.filename = None;
                    report.record(PageOutcome::Failed {
                        page_id: child.id.clone(),
                        error,
                    });
                }
            }
            tracker.record();
        }

        let dumped = self
            .converter
            .dump(DumpRequest {
                site: self.job.site.clone(),
                html: content.html,
                title: title.clone(),
                page_id: page_id.clone(),
                page_url: content.url,
                outdir_base: outdir.clone(),
                outdir_content: outdir,
                labels,
                parent_id,
                options: self.job.options,
                page_type: PageType::Report { children },
            })
            .await;

        match dumped {
            Ok(output) => report.record(PageOutcome::Exported(
                title,
                ExportedPage {
                    page_id: page_id.clone(),
                    url: output.url,
                    path: output.path,
                    space_key: self.job.space.clone(),
                    site: self.job.site.clone(),
                },
            )),
            Err(error) => {
                log_page_failure!(page_id, error, "Failed to write page-properties report");
                report.record(PageOutcome::Failed {
                    page_id: page_id.clone(),
                    error,
                });
            }
        }

        tracing::info!(
            page_id = %page_id,
            elapsed_secs = format!("{:.2}", start_time.elapsed().as_secs_f64()),
            "Done exporting page-properties report"
        );
        Ok(report)
    }

    async fn export_report_child(
        &self,
        child: &ChildRecord,
        title: String,
        outdir: &Path,
    ) -> Result<PageOutcome> {
        let content = self.api.page_export_view(&child.id).await?;
        let labels = self.api.page_labels(&child.id).await?;
        let parent_id = self.api.page_parent(&child.id).await?;

        let output = self
            .converter
            .dump(DumpRequest {
                site: self.job.site.clone(),
                html: content.html,
                title: title.clone(),
                page_id: child.id.clone(),
                page_url: content.url,
                outdir_base: outdir.to_path_buf(),
                outdir_content: outdir.to_path_buf(),
                labels,
                parent_id,
                options: self.job.options,
                page_type: PageType::ReportChild,
            })
            .await?;

        Ok(PageOutcome::Exported(
            title,
            ExportedPage {
                page_id: child.id.clone(),
                url: output.url,
                path: output.path,
                space_key: self.job.space.clone(),
                site: self.job.site.clone(),
            },
        ))
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DumpError::Validation(format!("--{name} is required")))
}
