//! Error types for the page store.
//!
//! [`StoreError`] separates the three things a caller may want to react to
//! differently: a title that was refused before touching the disk, a page
//! that simply does not exist yet, and every other storage failure.

use std::path::{Path, PathBuf};

/// Errors that can occur in the page store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The title cannot be used as a storage key.
    #[error("invalid page title {title:?}: {reason}")]
    InvalidTitle {
        /// The rejected title, as supplied by the caller.
        title: String,
        /// Why the title was rejected.
        reason: &'static str,
    },

    /// No page has been saved under this title.
    #[error("page not found: {title}")]
    NotFound {
        /// The title that was looked up.
        title: String,
    },

    /// Reading or writing the page file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory the operation was acting on.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// Build an [`StoreError::Io`] for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` if the page does not exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the title was rejected before any storage access.
    pub const fn is_invalid_title(&self) -> bool {
        matches!(self, Self::InvalidTitle { .. })
    }
}
