//! Domain identifier types with validation
//!
//! Newtype wrappers for Confluence identifiers. Confluence Cloud uses numeric
//! ids for pages and spaces, transported as strings by the v2 API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn validate_numeric(kind: &str, id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{kind} must be numeric, got: {id}"));
    }
    Ok(())
}

/// Page identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use confluence_dump::domain::ids::PageId;
/// use std::str::FromStr;
///
/// let page_id = PageId::from_str("123456").unwrap();
/// assert_eq!(page_id.as_str(), "123456");
/// assert!(PageId::from_str("abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageId(String);

impl PageId {
    /// Creates a new PageId, rejecting empty and non-numeric values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_numeric("Page ID", &id)?;
        Ok(Self(id))
    }

    /// Returns the page ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PageId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageId> for String {
    fn from(id: PageId) -> Self {
        id.0
    }
}

impl From<u64> for PageId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Space identifier newtype wrapper
///
/// Not to be confused with the space *key* (e.g. `DOCS`), which is what
/// users type on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpaceId(String);

impl SpaceId {
    /// Creates a new SpaceId, rejecting empty and non-numeric values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_numeric("Space ID", &id)?;
        Ok(Self(id))
    }

    /// Returns the space ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SpaceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SpaceId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpaceId> for String {
    fn from(id: SpaceId) -> Self {
        id.0
    }
}
