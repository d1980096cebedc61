//! Filesystem entry classification without following symlinks.
use std::fmt;
use std::io;
use std::path::Path;

/// What currently occupies a path.
///
/// Always computed fresh from `lstat`; never cache a `FileKind` across a
/// mutation of the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Nothing exists at the path.
    Missing,
    /// The path is a symbolic link (its destination is not inspected).
    Symlink,
    /// The path is a real directory.
    Directory,
    /// The path is a regular file (or any other non-directory entry).
    RegularFile,
    /// The path exists but could not be inspected, e.g. permission denied.
    Unreadable,
}

impl FileKind {
    /// `true` for kinds that hold real user content (file or directory).
    #[must_use]
    pub const fn is_content(self) -> bool {
        matches!(self, Self::Directory | Self::RegularFile)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::Symlink => "symlink",
            Self::Directory => "directory",
            Self::RegularFile => "file",
            Self::Unreadable => "unreadable",
        };
        f.write_str(s)
    }
}

/// Classify `path` using the non-dereferencing stat call.
///
/// `NotFound` maps to [`FileKind::Missing`]; any other error maps to
/// [`FileKind::Unreadable`] so callers can refuse to touch the path.
#[must_use]
pub fn classify(path: &Path) -> FileKind {
    match std::fs::symlink_metadata(path) {
        Ok(meta) => {
            let ft = meta.file_type();
            if ft.is_symlink() {
                FileKind::Symlink
            } else if ft.is_dir() {
                FileKind::Directory
            } else {
                FileKind::RegularFile
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => FileKind::Missing,
        Err(_) => FileKind::Unreadable,
    }
}
