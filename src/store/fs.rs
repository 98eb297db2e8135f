//! File-System Backend Module
//!
//! One file per key under a root directory. Writes are staged in a sibling
//! temporary file and renamed into place, so readers see either the old or
//! the new contents and never a partial write.
//!
//! # On-disk layout
//! - key `users/alice` is stored at `<root>/users/alice.bin`
//! - key `notes.txt` keeps its extension: `<root>/notes.txt`
//! - listing strips a trailing `.bin`, so `x` and `x.bin` share a file

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::error::{Result, StoreError};
use crate::store::{Keys, StorageBackend, DEFAULT_EXTENSION};

/// Prefix and suffix of in-flight staging files; listing skips them.
///
/// `#` is outside the key grammar, so no key maps to a staging name.
const STAGING_PREFIX: &str = "#kvstore-";
const STAGING_SUFFIX: &str = ".tmp";

// == File-System Backend ==
/// Durable store mapping each key to a file under `root`.
///
/// TTLs passed to `set` are accepted and ignored: entries persist until
/// deleted.
#[derive(Debug)]
pub struct FsBackend {
    /// Canonical root directory
    root: PathBuf,
}

impl FsBackend {
    // == Constructor ==
    /// Opens a backend rooted at `root_dir`, creating it if absent.
    pub(crate) fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root = root_dir.into();
        fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;

        debug!(root = %root.display(), "Opened file-system backend");
        Ok(Self { root })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // == Key To Path ==
    /// Maps a key to its file path, rejecting anything that would land
    /// outside the root.
    fn key_to_path(&self, key: &str) -> Result<PathBuf> {
        let segments: Vec<&str> = key.split('/').collect();

        for segment in &segments {
            let mut components = Path::new(segment).components();
            let single_normal = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !single_normal {
                return Err(self.escape(key, "unsafe_segment"));
            }
        }

        let mut path = self.root.clone();
        if let Some((file_name, dirs)) = segments.split_last() {
            path.extend(dirs);
            if has_extension(file_name) {
                path.push(file_name);
            } else {
                path.push(format!("{file_name}.{DEFAULT_EXTENSION}"));
            }
        }

        if !path.starts_with(&self.root) {
            return Err(self.escape(key, "outside_root"));
        }
        self.ensure_resolves_within_root(&path, key)?;

        Ok(path)
    }

    /// Resolves the deepest existing ancestor of `path` (following symlinks)
    /// and checks it is still under the root.
    fn ensure_resolves_within_root(&self, path: &Path, key: &str) -> Result<()> {
        for candidate in path.ancestors() {
            match candidate.canonicalize() {
                Ok(resolved) if resolved.starts_with(&self.root) => return Ok(()),
                Ok(_) => return Err(self.escape(key, "symlink_escape")),
                Err(_) => continue,
            }
        }
        Err(self.escape(key, "outside_root"))
    }

    fn escape(&self, key: &str, reason: &'static str) -> StoreError {
        warn!(
            security_event = "path_escape_attempt",
            key,
            reason,
            root = %self.root.display(),
            "Blocked key escaping storage root"
        );
        StoreError::InvalidKey(format!("Key escapes root directory: {key:?}"))
    }

    // == Path To Key ==
    /// Inverse of `key_to_path` for a file found under the root.
    fn path_to_key(root: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(root).ok()?;
        let segments = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<&str>>>()?;
        let joined = segments.join("/");

        let suffix = format!(".{DEFAULT_EXTENSION}");
        match joined.strip_suffix(suffix.as_str()) {
            Some(stripped) => Some(stripped.to_string()),
            None => Some(joined),
        }
    }
}

fn has_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| !ext.is_empty())
}

fn is_staging_file(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|n| n.starts_with(STAGING_PREFIX) && n.ends_with(STAGING_SUFFIX))
}

/// True when a failed read or remove of `path` means there is no entry:
/// the file is missing, a directory sits at its path, or one of its
/// parents is a regular file.
fn is_absent(path: &Path, err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
        || path.is_dir()
        || path.ancestors().skip(1).any(Path::is_file)
}

/// Writes `value` to a fresh staging file in `dir`. Dropping the returned
/// handle without persisting it removes the file.
fn stage(dir: &Path, value: &[u8]) -> io::Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(dir)?;
    staged.write_all(value)?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

impl StorageBackend for FsBackend {
    fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        let path = self.key_to_path(key)?;

        match fs::read(&path) {
            Ok(value) => Ok(value),
            Err(e) if is_absent(&path, &e) => {
                Err(StoreError::KeyNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let path = self.key_to_path(key)?;
        if let Some(ttl) = ttl {
            trace!(key, ?ttl, "TTL ignored by file-system backend");
        }

        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let staged = stage(parent, value)?;
        staged.persist(&path).map_err(|e| e.error)?;

        debug!(key, bytes = value.len(), "Wrote entry");
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "Deleted entry");
                Ok(true)
            }
            Err(e) if is_absent(&path, &e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&mut self, prefix: &str) -> Result<Keys<'_>> {
        let root = self.root.clone();
        let prefix = prefix.to_string();

        let keys = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(StoreError::Io(io::Error::from(e)))),
                };
                if !entry.file_type().is_file() || is_staging_file(entry.file_name()) {
                    return None;
                }
                let key = Self::path_to_key(&root, entry.path())?;
                key.starts_with(&prefix).then_some(Ok(key))
            });

        Ok(Box::new(keys))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn create_backend() -> (FsBackend, TempDir) {
        let tmp = TempDir::new().unwrap();
        let backend = FsBackend::open(tmp.path().join("store")).unwrap();
        (backend, tmp)
    }

    fn listed(backend: &mut FsBackend, prefix: &str) -> HashSet<String> {
        backend
            .list(prefix)
            .unwrap()
            .collect::<Result<HashSet<_>>>()
            .unwrap()
    }

    #[test]
    fn test_open_creates_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("a").join("b");

        let backend = FsBackend::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root.canonicalize().unwrap());
    }

    #[test]
    fn test_set_and_get() {
        let (mut backend, _tmp) = create_backend();

        backend.set("users/alice", b"hello", None).unwrap();
        assert_eq!(backend.get("users/alice").unwrap(), b"hello");
        assert!(backend.root().join("users").join("alice.bin").is_file());
    }

    #[test]
    fn test_get_nonexistent() {
        let (mut backend, _tmp) = create_backend();

        assert!(matches!(
            backend.get("missing"),
            Err(StoreError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_get_directory_is_not_found() {
        let (mut backend, _tmp) = create_backend();
        backend.set("docs.d/readme", b"x", None).unwrap();

        assert!(matches!(
            backend.get("docs.d"),
            Err(StoreError::KeyNotFound(_))
        ));
        assert!(!backend.delete("docs.d").unwrap());
    }

    #[test]
    fn test_key_below_regular_file_is_absent() {
        let (mut backend, _tmp) = create_backend();
        backend.set("notes.txt", b"n", None).unwrap();

        assert!(matches!(
            backend.get("notes.txt/x"),
            Err(StoreError::KeyNotFound(_))
        ));
        assert!(!backend.delete("notes.txt/x").unwrap());
        assert!(!backend.delete("notes.txt/x/y").unwrap());
        assert_eq!(backend.get("notes.txt").unwrap(), b"n");
    }

    #[test]
    fn test_key_shaped_like_staging_file_is_listed() {
        let (mut backend, _tmp) = create_backend();

        for key in ["cfg/.kvstore-abc.tmp", ".kvstore-x.tmp", "cfg/kvstore-1.tmp"] {
            backend.set(key, b"v", None).unwrap();
            assert_eq!(backend.get(key).unwrap(), b"v");
        }

        assert_eq!(
            listed(&mut backend, ""),
            HashSet::from([
                "cfg/.kvstore-abc.tmp".to_string(),
                ".kvstore-x.tmp".to_string(),
                "cfg/kvstore-1.tmp".to_string(),
            ])
        );
    }

    #[test]
    fn test_extension_kept() {
        let (mut backend, _tmp) = create_backend();

        backend.set("notes.txt", b"n", None).unwrap();
        backend.set("trailing.", b"t", None).unwrap();

        assert!(backend.root().join("notes.txt").is_file());
        assert!(backend.root().join("trailing..bin").is_file());
        assert_eq!(
            listed(&mut backend, ""),
            HashSet::from(["notes.txt".to_string(), "trailing.".to_string()])
        );
    }

    #[test]
    fn test_overwrite() {
        let (mut backend, _tmp) = create_backend();

        backend.set("key", b"one", None).unwrap();
        backend.set("key", b"two", None).unwrap();
        assert_eq!(backend.get("key").unwrap(), b"two");
    }

    #[test]
    fn test_ttl_is_ignored() {
        let (mut backend, _tmp) = create_backend();

        backend
            .set("durable", b"v", Some(Duration::from_millis(1)))
            .unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(backend.get("durable").unwrap(), b"v");
    }

    #[test]
    fn test_delete() {
        let (mut backend, _tmp) = create_backend();

        backend.set("key", b"v", None).unwrap();
        assert!(backend.delete("key").unwrap());
        assert!(!backend.delete("key").unwrap());
        assert!(matches!(backend.get("key"), Err(StoreError::KeyNotFound(_))));
    }

    #[test]
    fn test_list_prefix() {
        let (mut backend, _tmp) = create_backend();

        backend.set("users/alice", b"a", None).unwrap();
        backend.set("users/bob", b"b", None).unwrap();
        backend.set("admins/x", b"x", None).unwrap();

        assert_eq!(
            listed(&mut backend, "users/"),
            HashSet::from(["users/alice".to_string(), "users/bob".to_string()])
        );
        assert_eq!(listed(&mut backend, "").len(), 3);
    }

    #[test]
    fn test_traversal_rejected_without_write() {
        let (mut backend, tmp) = create_backend();

        for key in ["../escape", "a/../../escape", "a/./b", "a//b", "/escape", ".", "a/.."] {
            assert!(
                matches!(backend.set(key, b"x", None), Err(StoreError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
            assert!(matches!(backend.get(key), Err(StoreError::InvalidKey(_))));
            assert!(matches!(backend.delete(key), Err(StoreError::InvalidKey(_))));
        }

        assert!(!tmp.path().join("escape.bin").exists());
        assert!(listed(&mut backend, "").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let (mut backend, tmp) = create_backend();
        let outside = tmp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, backend.root().join("link")).unwrap();

        assert!(matches!(
            backend.set("link/secret", b"x", None),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(!outside.join("secret.bin").exists());
    }

    #[test]
    fn test_interrupted_write_keeps_old_value() {
        let (mut backend, _tmp) = create_backend();
        backend.set("doc", b"old", None).unwrap();

        // Crash between staging and rename: the staged file is left behind.
        let path = backend.key_to_path("doc").unwrap();
        let staged = stage(path.parent().unwrap(), b"partial-new").unwrap();
        let leftover = staged.into_temp_path().keep().unwrap();
        assert!(leftover.exists());

        assert_eq!(backend.get("doc").unwrap(), b"old");
        assert_eq!(listed(&mut backend, ""), HashSet::from(["doc".to_string()]));

        backend.set("doc", b"new", None).unwrap();
        assert_eq!(backend.get("doc").unwrap(), b"new");
    }

    #[test]
    fn test_staging_file_removed_after_set() {
        let (mut backend, _tmp) = create_backend();
        backend.set("dir/key", b"v", None).unwrap();

        let names: Vec<_> = fs::read_dir(backend.root().join("dir"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("key.bin")]);
    }

    #[test]
    fn test_reopen_sees_existing_entries() {
        let tmp = TempDir::new().unwrap();
        {
            let mut backend = FsBackend::open(tmp.path()).unwrap();
            backend.set("persisted/key", b"v", None).unwrap();
            backend.close().unwrap();
        }

        let mut backend = FsBackend::open(tmp.path()).unwrap();
        assert_eq!(backend.get("persisted/key").unwrap(), b"v");
    }
}
