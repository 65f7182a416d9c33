//! Filesystem-backed page storage.
//!
//! One page is one file. Saves go through a temporary file that is
//! fsynced and renamed over the target, then the directory is fsynced so
//! the rename itself survives a crash. Loads read the whole file.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::StoreError;
use crate::page::{Page, PageTitle};

/// Suffix appended to a title to form its file name.
pub const PAGE_SUFFIX: &str = ".txt";

/// Title-addressed page storage rooted at a directory.
///
/// Stateless apart from the root path: cloning is cheap and every clone
/// sees the same pages.
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    /// The directory pages are stored in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a page with this title is stored in.
    pub fn path_for(&self, title: &PageTitle) -> PathBuf {
        self.root.join(format!("{title}{PAGE_SUFFIX}"))
    }

    /// Write `page`, replacing any previous contents for its title.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the temporary file cannot be written
    /// or synced, or the rename fails. The previous contents are left
    /// untouched in that case.
    pub async fn save(&self, page: &Page) -> Result<(), StoreError> {
        let path = self.path_for(&page.title);
        let tmp_path = self
            .root
            .join(format!(".{}.{}.tmp", page.title, Uuid::new_v4()));

        if let Err(e) = write_synced(&tmp_path, &page.body).await {
            fs::remove_file(&tmp_path).await.ok();
            return Err(StoreError::io(&tmp_path, e));
        }

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            fs::remove_file(&tmp_path).await.ok();
            return Err(StoreError::io(&path, e));
        }

        sync_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))
    }

    /// Read the page stored under `title`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no page has been saved under
    /// `title`, or [`StoreError::Io`] if the file exists but cannot be read.
    pub async fn load(&self, title: &PageTitle) -> Result<Page, StoreError> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => Ok(Page::new(title.clone(), body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                title: title.to_string(),
            }),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }
}

/// Create `path` (which must not exist), write `body`, and fsync it.
async fn write_synced(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    file.sync_all().await
}

/// Fsync a directory so renames inside it are durable.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

/// Directories cannot be opened for syncing on this platform.
#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A store in a unique scratch directory, removed on drop so a failing
    /// assertion does not leave it behind.
    struct ScratchStore(PageStore);

    impl std::ops::Deref for ScratchStore {
        type Target = PageStore;

        fn deref(&self) -> &PageStore {
            &self.0
        }
    }

    impl Drop for ScratchStore {
        fn drop(&mut self) {
            std::fs::remove_dir_all(self.0.root()).ok();
        }
    }

    async fn scratch_store(label: &str) -> ScratchStore {
        let dir = std::env::temp_dir().join(format!(
            "leaflet_store_{label}_{}_{}",
            std::process::id(),
            Uuid::new_v4()
        ));
        ScratchStore(PageStore::open(dir).await.unwrap())
    }

    fn title(raw: &str) -> PageTitle {
        PageTitle::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = scratch_store("roundtrip").await;
        let page = Page::new(title("Test"), "This is a sample Page.");

        store.save(&page).await.unwrap();
        let loaded = store.load(&title("Test")).await.unwrap();

        assert_eq!(loaded, page);
    }

    #[tokio::test]
    async fn arbitrary_bytes_survive_unchanged() {
        let store = scratch_store("bytes").await;
        let body: Vec<u8> = (0..=255).collect();
        store.save(&Page::new(title("Binary"), body.clone())).await.unwrap();

        let loaded = store.load(&title("Binary")).await.unwrap();
        assert_eq!(loaded.body, body);

        store.save(&Page::new(title("Empty"), Vec::new())).await.unwrap();
        assert!(store.load(&title("Empty")).await.unwrap().body.is_empty());
    }

    #[tokio::test]
    async fn save_replaces_whole_file() {
        let store = scratch_store("overwrite").await;
        store
            .save(&Page::new(title("Doc"), "a much longer first version"))
            .await
            .unwrap();
        store.save(&Page::new(title("Doc"), "short")).await.unwrap();

        let loaded = store.load(&title("Doc")).await.unwrap();
        assert_eq!(loaded.body, b"short");
    }

    #[tokio::test]
    async fn missing_page_is_not_found() {
        let store = scratch_store("missing").await;
        let err = store.load(&title("DoesNotExist")).await.unwrap_err();

        assert!(err.is_not_found(), "expected NotFound, got {err}");
    }

    #[tokio::test]
    async fn unreadable_page_is_io_not_not_found() {
        let store = scratch_store("unreadable").await;
        // A directory where the page file should be cannot be read as bytes.
        fs::create_dir(store.path_for(&title("Broken"))).await.unwrap();

        let err = store.load(&title("Broken")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "expected Io, got {err}");
    }

    #[tokio::test]
    async fn save_into_missing_root_is_io() {
        let store = scratch_store("gone").await;
        fs::remove_dir_all(store.root()).await.unwrap();

        let err = store
            .save(&Page::new(title("Orphan"), "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn save_leaves_no_temporary_files() {
        let store = scratch_store("tmpfiles").await;
        store.save(&Page::new(title("One"), "1")).await.unwrap();
        store.save(&Page::new(title("One"), "2")).await.unwrap();
        store.save(&Page::new(title("Two"), "2")).await.unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(store.root()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        assert_eq!(names, vec!["One.txt", "Two.txt"]);
    }

    #[tokio::test]
    async fn path_stays_inside_root() {
        let store = scratch_store("paths").await;
        let path = store.path_for(&title("Notes"));

        assert_eq!(path.parent(), Some(store.root()));
        assert_eq!(path.file_name().unwrap(), "Notes.txt");
    }

    #[tokio::test]
    async fn concurrent_saves_leave_one_complete_body() {
        let store = scratch_store("race").await;
        let first = vec![b'a'; 64 * 1024];
        let second = vec![b'b'; 32 * 1024];

        let page_a = Page::new(title("Race"), first.clone());
        let page_b = Page::new(title("Race"), second.clone());
        let (a, b) = tokio::join!(store.save(&page_a), store.save(&page_b));
        a.unwrap();
        b.unwrap();

        let loaded = store.load(&title("Race")).await.unwrap();
        assert!(loaded.body == first || loaded.body == second);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn page_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let store = scratch_store("mode").await;
        store.save(&Page::new(title("Private"), "x")).await.unwrap();

        let meta = fs::metadata(store.path_for(&title("Private"))).await.unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[tokio::test]
    #[allow(clippy::panic)]
    async fn scratch_dir_is_removed_even_when_a_test_panics() {
        let root = std::env::temp_dir().join(format!(
            "leaflet_store_unwind_{}_{}",
            std::process::id(),
            Uuid::new_v4()
        ));
        let store = PageStore::open(&root).await.unwrap();
        store.save(&Page::new(title("Left"), "x")).await.unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScratchStore(store);
            panic!("assertion failed inside a test body");
        }));

        assert!(outcome.is_err());
        assert!(!fs::try_exists(&root).await.unwrap());
    }
}
