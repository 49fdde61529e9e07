//! Disk-backed store for uploaded images.
//!
//! Uploads are written under a single root directory with generated names;
//! anything in the directory is served back verbatim over the static read
//! path, so the stored name is the only handle a client ever gets.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};

/// Route prefix under which stored files are served.
pub const UPLOAD_ROUTE: &str = "/uploads";

/// Store for uploaded binary attachments.
#[derive(Debug)]
pub struct FileStore {
    /// Directory all uploads are written to.
    root: PathBuf,
}

impl FileStore {
    /// Open a file store rooted at the given directory.
    ///
    /// Creates the directory if it doesn't exist; opening an existing store
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root).map_err(|source| Error::DirectoryCreate {
            path: root.clone(),
            source,
        })?;

        debug!("File store rooted at {}", root.display());
        Ok(Self { root })
    }

    /// Get the store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded blob and return its generated name.
    ///
    /// Only the extension of the client-supplied name survives; the rest of
    /// the stored name is `<unix-millis>-<random>`. Collisions are
    /// astronomically unlikely and not prevented.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn accept(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let stored = unique_name(original_name);
        let path = self.root.join(&stored);

        fs::write(&path, bytes).map_err(|source| Error::UploadWrite {
            path: path.clone(),
            source,
        })?;

        debug!("stored upload {stored} ({} bytes)", bytes.len());
        Ok(stored)
    }

    /// Build the absolute URL for a stored file.
    ///
    /// `base_url` is the request-derived `scheme://host` prefix.
    #[must_use]
    pub fn url_for(&self, base_url: &str, stored_name: &str) -> String {
        format!("{base_url}{UPLOAD_ROUTE}/{stored_name}")
    }

    /// List the names of all stored files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn stored_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a stored file by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub fn remove(&self, stored_name: &str) -> Result<()> {
        fs::remove_file(self.root.join(stored_name))?;
        Ok(())
    }
}

/// Generate a collision-resistant stored name for an upload.
///
/// Millisecond timestamp, dash, random suffix below 10^9, then the upload's
/// own extension.
fn unique_name(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{millis}-{suffix}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path().join("uploads")).expect("open store");
        (dir, store)
    }

    #[test]
    fn test_open_creates_directory() {
        let (_dir, store) = temp_store();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_open_is_idempotent() {
        let (_dir, store) = temp_store();
        let again = FileStore::open(store.root()).expect("reopen");
        assert_eq!(again.root(), store.root());
    }

    #[test]
    fn test_accept_writes_file() {
        let (_dir, store) = temp_store();
        let stored = store.accept("photo.png", b"fake image bytes").expect("accept");

        let bytes = std::fs::read(store.root().join(&stored)).expect("read back");
        assert_eq!(bytes, b"fake image bytes");
    }

    #[test]
    fn test_accept_keeps_extension() {
        let (_dir, store) = temp_store();
        let stored = store.accept("photo.png", b"x").expect("accept");

        assert!(stored.ends_with(".png"));
        assert!(stored.contains('-'));
    }

    #[test]
    fn test_accept_without_extension() {
        let (_dir, store) = temp_store();
        let stored = store.accept("README", b"x").expect("accept");
        assert!(!stored.contains('.'));
    }

    #[test]
    fn test_accept_generates_unique_names() {
        let (_dir, store) = temp_store();
        let a = store.accept("a.jpg", b"1").expect("accept a");
        let b = store.accept("a.jpg", b"2").expect("accept b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_url_for() {
        let (_dir, store) = temp_store();
        let url = store.url_for("https://example.com", "123-456.png");
        assert_eq!(url, "https://example.com/uploads/123-456.png");
    }

    #[test]
    fn test_stored_names_lists_files() {
        let (_dir, store) = temp_store();
        assert!(store.stored_names().expect("list").is_empty());

        let stored = store.accept("a.png", b"x").expect("accept");
        assert_eq!(store.stored_names().expect("list"), vec![stored]);
    }

    #[test]
    fn test_remove_deletes_file() {
        let (_dir, store) = temp_store();
        let stored = store.accept("a.png", b"x").expect("accept");

        store.remove(&stored).expect("remove");
        assert!(store.stored_names().expect("list").is_empty());
    }

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name("holiday.jpeg");
        let (stamp, rest) = name.split_once('-').expect("dash separator");
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert!(rest.ends_with(".jpeg"));
    }
}
