//! Result type alias
//!
//! Convenience alias that uses [`DumpError`] as the error type.

use super::errors::DumpError;

/// Result type alias for confluence-dump operations
///
/// # Examples
///
/// ```
/// use confluence_dump::domain::result::Result;
/// use confluence_dump::domain::errors::DumpError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DumpError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DumpError>;
