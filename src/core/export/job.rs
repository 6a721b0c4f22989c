//! Export job definition
//!
//! One [`ExportJob`] is built per run from the CLI flags and the config file
//! and is never modified afterwards.

use super::filter::DateRange;
use crate::adapters::converter::OutputOptions;
use crate::domain::{DumpError, PageId, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// One page by id
    Single,
    /// Every page of a space
    Space,
    /// Every page carrying a label
    ByLabel,
    /// A page-properties report and its children
    PageProps,
}

impl ExportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Single => "single",
            ExportMode::Space => "space",
            ExportMode::ByLabel => "bylabel",
            ExportMode::PageProps => "pageprops",
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a run
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub mode: ExportMode,

    /// Atlassian site name as given on the command line
    pub site: String,

    pub space: Option<String>,
    pub page: Option<PageId>,
    pub label: Option<String>,
    pub outdir: PathBuf,
    pub options: OutputOptions,
    pub date_range: DateRange,

    /// Concurrency of the date pre-pass
    pub workers: usize,

    /// Minimum time between progress lines
    pub log_interval: Duration,
}

impl ExportJob {
    /// Job with default settings for `mode` on `site`
    pub fn new(mode: ExportMode, site: impl Into<String>) -> Self {
        Self {
            mode,
            site: site.into(),
            space: None,
            page: None,
            label: None,
            outdir: PathBuf::from("output"),
            options: OutputOptions::default(),
            date_range: DateRange::unbounded(),
            workers: 8,
            log_interval: Duration::from_secs(10),
        }
    }

    /// Check the job before any network I/O
    pub fn validate(&self) -> Result<()> {
        if self.site.trim().is_empty() {
            return Err(DumpError::Validation("site must not be empty".to_string()));
        }

        if !(1..=64).contains(&self.workers) {
            return Err(DumpError::Validation(format!(
                "workers must be between 1 and 64, got {}",
                self.workers
            )));
        }

        if self.log_interval.is_zero() {
            return Err(DumpError::Validation(
                "log interval must be greater than 0".to_string(),
            ));
        }

        if !self.options.html && !self.options.rst {
            return Err(DumpError::Validation(
                "No output format selected: --no-rst requires --html".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.date_range.start, self.date_range.end) {
            if start > end {
                return Err(DumpError::Validation(format!(
                    "Start date {start} is after end date {end}"
                )));
            }
        }

        let blank = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").is_empty();
        match self.mode {
            ExportMode::Space if blank(&self.space) => Err(DumpError::Validation(
                "--space is required in space mode".to_string(),
            )),
            ExportMode::ByLabel if blank(&self.label) => Err(DumpError::Validation(
                "--label is required in bylabel mode".to_string(),
            )),
            ExportMode::Single | ExportMode::PageProps if self.page.is_none() => {
                Err(DumpError::Validation(format!(
                    "--page is required in {} mode",
                    self.mode
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Parse a date bound given as RFC 3339 or `YYYY-MM-DD` (UTC midnight)
pub fn parse_date_bound(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(DumpError::Validation(format!(
        "Invalid date '{value}': expected RFC 3339 (2024-03-01T00:00:00Z) or YYYY-MM-DD"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn job(mode: ExportMode) -> ExportJob {
        let mut job = ExportJob::new(mode, "acme");
        job.space = Some("DOCS".to_string());
        job.page = Some(PageId::from(1u64));
        job.label = Some("runbook".to_string());
        job
    }

    #[test_case("2024-03-01", "2024-03-01T00:00:00+00:00"; "date only")]
    #[test_case("2024-03-01T12:30:00Z", "2024-03-01T12:30:00+00:00"; "rfc3339 utc")]
    #[test_case("2024-03-01T12:30:00+02:00", "2024-03-01T10:30:00+00:00"; "rfc3339 offset")]
    #[test_case(" 2024-03-01 ", "2024-03-01T00:00:00+00:00"; "surrounding whitespace")]
    fn test_parse_date_bound(input: &str, expected: &str) {
        assert_eq!(parse_date_bound(input).unwrap().to_rfc3339(), expected);
    }

    #[test_case("yesterday"; "word")]
    #[test_case("2024-13-01"; "bad month")]
    #[test_case("01/03/2024"; "slashes")]
    fn test_parse_date_bound_invalid(input: &str) {
        assert!(matches!(
            parse_date_bound(input),
            Err(DumpError::Validation(_))
        ));
    }

    #[test]
    fn test_valid_jobs() {
        for mode in [
            ExportMode::Single,
            ExportMode::Space,
            ExportMode::ByLabel,
            ExportMode::PageProps,
        ] {
            assert!(job(mode).validate().is_ok(), "{mode} should validate");
        }
    }

    #[test]
    fn test_mode_requirements() {
        let mut j = job(ExportMode::Space);
        j.space = None;
        assert!(j.validate().unwrap_err().to_string().contains("--space"));

        let mut j = job(ExportMode::Single);
        j.page = None;
        assert!(j.validate().unwrap_err().to_string().contains("--page"));

        let mut j = job(ExportMode::PageProps);
        j.page = None;
        assert!(j.validate().is_err());

        let mut j = job(ExportMode::ByLabel);
        j.label = Some("  ".to_string());
        assert!(j.validate().unwrap_err().to_string().contains("--label"));
    }

    #[test_case(0; "zero")]
    #[test_case(65; "too many")]
    fn test_workers_out_of_range(workers: usize) {
        let mut j = job(ExportMode::Space);
        j.workers = workers;
        assert!(j.validate().is_err());
    }

    #[test]
    fn test_zero_log_interval() {
        let mut j = job(ExportMode::Space);
        j.log_interval = Duration::ZERO;
        assert!(j.validate().is_err());
    }

    #[test]
    fn test_no_output_format() {
        let mut j = job(ExportMode::Space);
        j.options.rst = false;
        j.options.html = false;
        assert!(j.validate().is_err());

        j.options.html = true;
        assert!(j.validate().is_ok());
    }

    #[test]
    fn test_inverted_date_range() {
        let mut j = job(ExportMode::Space);
        j.date_range = DateRange {
            start: Some(parse_date_bound("2024-06-01").unwrap()),
            end: Some(parse_date_bound("2024-03-01").unwrap()),
        };
        assert!(j.validate().is_err());
    }
}
