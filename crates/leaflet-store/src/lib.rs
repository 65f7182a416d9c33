//! Page persistence for Leaflet.
//!
//! A page is a named blob of bytes stored as one plain file under the
//! store's root directory. The title is the key: page `Home` lives in
//! `<root>/Home.txt`. There is no header, no metadata and no index; the
//! directory listing *is* the database.
//!
//! # Architecture
//!
//! ```text
//! caller --> PageTitle::parse --> PageStore::save / load --> <root>/<title>.txt
//! ```
//!
//! [`PageStore`] holds nothing in memory besides its root path. Every
//! [`load`](PageStore::load) re-reads the file and every
//! [`save`](PageStore::save) replaces it whole through a temporary file and
//! an atomic rename, so readers never observe a half-written page.
//! Concurrent saves to the same title are not serialized: the last rename
//! wins.
//!
//! Titles are validated by [`PageTitle::parse`] before they reach the
//! filesystem, so no title can name a path outside the root directory.
//!
//! # Modules
//!
//! - [`page`] -- [`Page`] and the validated [`PageTitle`] key
//! - [`store`] -- [`PageStore`] filesystem operations
//! - [`error`] -- [`StoreError`]

pub mod error;
pub mod page;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use page::{MAX_TITLE_LEN, Page, PageTitle};
pub use store::{PAGE_SUFFIX, PageStore};
