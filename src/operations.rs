//! Filesystem operation abstractions for dependency injection.
//!
//! The reconciler only touches the filesystem through [`FileSystemOps`], so
//! tests can inject failures into individual calls while everything else
//! still hits a real temporary directory.  Production code uses
//! [`SystemFileSystemOps`].

use std::io;
use std::path::{Path, PathBuf};

use crate::classify::{self, FileKind};

/// Abstraction over the filesystem calls made during reconciliation.
pub trait FileSystemOps: std::fmt::Debug {
    /// Classify `path` without following symlinks.
    fn classify(&self, path: &Path) -> FileKind;

    /// Create `path` and every missing ancestor.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Move `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails (cross-device, permissions, …).
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove the symlink at `path` without touching its destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be removed.
    fn remove_symlink(&self, path: &Path) -> io::Result<()>;

    /// Create a symlink at `link` pointing to `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()>;

    /// Read the destination of the symlink at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn classify(&self, path: &Path) -> FileKind {
        classify::classify(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        remove_symlink(path)
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        create_symlink(source, link)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

/// Create a symlink at `link` pointing to `source` (platform-specific).
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, link)
    }

    #[cfg(windows)]
    {
        if source.is_dir() {
            std::os::windows::fs::symlink_dir(source, link)
        } else {
            std::os::windows::fs::symlink_file(source, link)
        }
    }
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir`.
/// `symlink_metadata().is_dir()` is `false` for symlinks, so the raw
/// `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
fn remove_symlink(path: &Path) -> io::Result<()> {
    let meta = std::fs::symlink_metadata(path)?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}

fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// Fault-injecting wrapper around [`SystemFileSystemOps`] for unit tests.
///
/// Every call goes to the real filesystem unless its path has been marked
/// to fail, in which case a `PermissionDenied` error is returned instead.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FaultyFileSystemOps {
    fail_create_dir: Vec<PathBuf>,
    fail_rename_from: Vec<PathBuf>,
    fail_remove: Vec<PathBuf>,
    fail_symlink_at: Vec<PathBuf>,
}

#[cfg(test)]
impl FaultyFileSystemOps {
    /// Create a wrapper with no faults configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `create_dir_all` for `path`.
    #[must_use]
    pub fn fail_create_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_create_dir.push(path.into());
        self
    }

    /// Fail any `rename` whose origin is `path`.
    #[must_use]
    pub fn fail_rename_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_rename_from.push(path.into());
        self
    }

    /// Fail `remove_symlink` for `path`.
    #[must_use]
    pub fn fail_remove(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_remove.push(path.into());
        self
    }

    /// Fail `symlink` when the link would be created at `path`.
    #[must_use]
    pub fn fail_symlink_at(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_symlink_at.push(path.into());
        self
    }

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "injected failure")
    }
}

#[cfg(test)]
impl FileSystemOps for FaultyFileSystemOps {
    fn classify(&self, path: &Path) -> FileKind {
        classify::classify(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.fail_create_dir.iter().any(|p| p == path) {
            return Err(Self::denied());
        }
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fail_rename_from.iter().any(|p| p == from) {
            return Err(Self::denied());
        }
        std::fs::rename(from, to)
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        if self.fail_remove.iter().any(|p| p == path) {
            return Err(Self::denied());
        }
        remove_symlink(path)
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        if self.fail_symlink_at.iter().any(|p| p == link) {
            return Err(Self::denied());
        }
        create_symlink(source, link)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}
