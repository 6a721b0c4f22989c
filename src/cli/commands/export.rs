//! Export command implementation
//!
//! Layers the command-line flags over the loaded configuration, builds the
//! [`ExportJob`], runs it and prints the summary.

use crate::adapters::confluence::ConfluenceClient;
use crate::adapters::converter::{FileConverter, OutputOptions};
use crate::config::DumpConfig;
use crate::core::export::{
    parse_date_bound, DateRange, ExportCoordinator, ExportJob, ExportMode, ExportReport,
};
use crate::domain::{ConfluenceError, DumpError, PageId, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Export mode as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Export one page (--page)
    Single,
    /// Export a whole space (--space)
    Space,
    /// Export every page carrying a label (--label)
    #[value(name = "bylabel")]
    ByLabel,
    /// Export a page-properties report and its children (--page)
    #[value(name = "pageprops")]
    PageProps,
}

impl From<ModeArg> for ExportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => ExportMode::Single,
            ModeArg::Space => ExportMode::Space,
            ModeArg::ByLabel => ExportMode::ByLabel,
            ModeArg::PageProps => ExportMode::PageProps,
        }
    }
}

/// Arguments for the export
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export mode
    #[arg(short, long, value_enum)]
    pub mode: ModeArg,

    /// Atlassian site name (<site>.atlassian.net)
    #[arg(short = 'S', long)]
    pub site: String,

    /// Space key (space mode)
    #[arg(short, long)]
    pub space: Option<String>,

    /// Page id (single and pageprops modes)
    #[arg(short, long)]
    pub page: Option<PageId>,

    /// Label (bylabel mode)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Output directory [default: output]
    #[arg(short, long)]
    pub outdir: Option<String>,

    /// Sphinx-compatible layout (images in _images/)
    #[arg(short = 'x', long)]
    pub sphinx: bool,

    /// Add a `.. tags::` directive from the page labels
    #[arg(long)]
    pub tags: bool,

    /// Also write HTML files
    #[arg(long)]
    pub html: bool,

    /// Do not write RST files
    #[arg(long)]
    pub no_rst: bool,

    /// Append page labels to the RST output
    #[arg(long)]
    pub showlabels: bool,

    /// Only export pages modified on or after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// Only export pages modified on or before this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Concurrent requests while checking modification dates [default: 8]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Seconds between progress lines [default: 10]
    #[arg(long, value_name = "SECONDS")]
    pub log_interval: Option<u64>,

    /// Write the export report as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

impl ExportArgs {
    /// Apply the flags that override configuration values
    pub fn apply_overrides(&self, config: &mut DumpConfig) {
        config.confluence.site = Some(self.site.clone());

        if let Some(outdir) = &self.outdir {
            tracing::debug!(outdir = %outdir, "Overriding output directory from CLI");
            config.export.outdir = outdir.clone();
        }
        if let Some(workers) = self.workers {
            config.export.workers = workers;
        }
        if let Some(interval) = self.log_interval {
            config.export.log_interval_secs = interval;
        }
        if let Some(start) = &self.start_date {
            config.export.start_date = Some(start.clone());
        }
        if let Some(end) = &self.end_date {
            config.export.end_date = Some(end.clone());
        }
    }

    /// Build and validate the job from the flags and the merged configuration
    pub fn build_job(&self, config: &DumpConfig) -> Result<ExportJob> {
        let start = config
            .export
            .start_date
            .as_deref()
            .map(parse_date_bound)
            .transpose()?;
        let end = config
            .export
            .end_date
            .as_deref()
            .map(parse_date_bound)
            .transpose()?;

        let job = ExportJob {
            mode: self.mode.into(),
            site: self.site.clone(),
            space: self.space.clone(),
            page: self.page.clone(),
            label: self.label.clone(),
            outdir: PathBuf::from(&config.export.outdir),
            options: OutputOptions {
                html: self.html,
                rst: !self.no_rst,
                sphinx: self.sphinx,
                tags: self.tags,
                show_labels: self.showlabels,
            },
            date_range: DateRange::new(start, end)?,
            workers: config.export.workers,
            log_interval: Duration::from_secs(config.export.log_interval_secs),
        };

        job.validate()?;
        Ok(job)
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        mut config: DumpConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let job = match self.build_job(&config) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(error = %e, "Invalid export options");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        // Credentials are checked here so nothing touches the network without them
        if let Err(e) = config.confluence.validate_credentials() {
            tracing::error!(error = %e, "Missing credentials");
            eprintln!("{e}");
            return Ok(2);
        }

        let client = match ConfluenceClient::new(&config.confluence) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Confluence client");
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        let converter = Arc::new(FileConverter::new(client.clone()));

        let coordinator = ExportCoordinator::new(client, converter, job, shutdown_signal);

        let report = match coordinator.run().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&report);

        if let Some(path) = &self.report_json {
            let json = serde_json::to_string_pretty(&report)?;
            if let Err(e) = std::fs::write(path, json) {
                tracing::error!(path = %path.display(), error = %e, "Failed to write report");
                eprintln!("Failed to write report to {}: {e}", path.display());
                return Ok(5);
            }
            tracing::info!(path = %path.display(), "Wrote export report");
        }

        Ok(0)
    }
}

/// Exit code for an error that stopped the run
pub fn exit_code_for(error: &DumpError) -> i32 {
    match error {
        DumpError::Configuration(_) | DumpError::Validation(_) => 2,
        DumpError::Confluence(
            ConfluenceError::ConnectionFailed(_)
            | ConfluenceError::Authentication(_)
            | ConfluenceError::Timeout(_)
            | ConfluenceError::NotFound(_)
            | ConfluenceError::RateLimited(_)
            | ConfluenceError::ServerError { .. }
            | ConfluenceError::ClientError { .. },
        ) => 4,
        _ => 5,
    }
}

fn print_summary(report: &ExportReport) {
    println!();
    println!("Export Summary:");
    println!("  Exported: {}", report.exported_count());
    println!("  Skipped (date filter): {}", report.skipped);
    println!("  Failed: {}", report.failures.len());
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    println!();

    if !report.failures.is_empty() {
        println!("Failed pages:");
        for (i, failure) in report.failures.iter().enumerate() {
            if i < 10 {
                println!("  - {}: {}", failure.page_id, failure.error);
            }
        }
        if report.failures.len() > 10 {
            println!("  ... and {} more failures", report.failures.len() - 10);
        }
        println!();
    }

    if report.interrupted {
        println!("Export interrupted; partial results are listed above.");
        tracing::info!("Export interrupted by user signal");
    } else if report.is_successful() {
        println!("Export completed successfully!");
    } else {
        println!("Export completed with failures");
    }
}
