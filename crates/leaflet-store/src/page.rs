//! Pages and their validated titles.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Maximum length of a page title in bytes.
///
/// Leaves room for the file suffix and the temporary-file decoration
/// within the common 255-byte filename limit.
pub const MAX_TITLE_LEN: usize = 200;

/// A page title that is safe to use as a file name.
///
/// Construct with [`PageTitle::parse`]. A valid title is non-empty, at most
/// [`MAX_TITLE_LEN`] bytes, does not start with `.`, and contains no path
/// separators (`/`, `\`) and no control characters. Together these rules
/// guarantee that `<root>/<title>.txt` always names a file directly inside
/// the store's root directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageTitle(String);

impl PageTitle {
    /// Validate `raw` and wrap it as a title.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTitle`] describing the first rule the
    /// title breaks.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let reject = |reason: &'static str| StoreError::InvalidTitle {
            title: raw.to_owned(),
            reason,
        };

        if raw.is_empty() {
            return Err(reject("title is empty"));
        }
        if raw.len() > MAX_TITLE_LEN {
            return Err(reject("title is too long"));
        }
        if raw.starts_with('.') {
            return Err(reject("title must not start with '.'"));
        }
        if raw.contains(['/', '\\']) {
            return Err(reject("title must not contain path separators"));
        }
        if raw.chars().any(char::is_control) {
            return Err(reject("title must not contain control characters"));
        }

        Ok(Self(raw.to_owned()))
    }

    /// The title as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PageTitle {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A titled document.
///
/// The body is raw bytes; the store imposes no encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The page's key.
    pub title: PageTitle,
    /// The page contents.
    pub body: Vec<u8>,
}

impl Page {
    /// Create a page from a title and body.
    pub fn new(title: PageTitle, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }

    /// A page with the given title and no content.
    ///
    /// Used in place of pages that have not been written yet.
    pub const fn empty(title: PageTitle) -> Self {
        Self {
            title,
            body: Vec::new(),
        }
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
