//! Domain models and types for confluence-dump.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PageId`], [`SpaceId`])
//! - **Content models** ([`SpaceSummary`], [`PageSummary`], [`PageContent`], [`ChildRecord`])
//! - **Title normalization** ([`title`])
//! - **Error types** ([`DumpError`], [`ConfluenceError`], [`ConvertError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use confluence_dump::domain::{PageId, SpaceId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let page_id = PageId::new("123")?;
//! let space_id = SpaceId::new("65539")?;
//!
//! // This won't compile - the id types don't mix
//! // let wrong: PageId = space_id;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod errors;
pub mod ids;
pub mod page;
pub mod result;
pub mod title;

pub use errors::{ConfluenceError, ConvertError, DumpError};
pub use ids::{PageId, SpaceId};
pub use page::{ChildRecord, PageContent, PageSummary, SpaceSummary};
pub use result::Result;
