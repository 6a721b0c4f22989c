//! Export orchestration
//!
//! This module provides the core export logic, including:
//! - the immutable job description and date parsing
//! - the modification-date filter and its concurrent pre-pass
//! - progress reporting
//! - export coordination for the four modes
//! - per-page outcomes and the run report

pub mod coordinator;
pub mod filter;
pub mod job;
pub mod progress;
pub mod report;

pub use coordinator::ExportCoordinator;
pub use filter::{filter_by_date, DateCheck, DateRange, FilterOutcome};
pub use job::{parse_date_bound, ExportJob, ExportMode};
pub use progress::{estimate_remaining, ProgressTracker};
pub use report::{ExportReport, ExportedPage, PageFailure, PageOutcome};
