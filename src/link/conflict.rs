//! Conflict backup naming.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::classify::FileKind;
use crate::operations::FileSystemOps;

const SUFFIX: &str = ".conflict";

/// First unused name among `<source>.conflict`, `<source>.conflict.1`,
/// `<source>.conflict.2`, …
///
/// Anything that is not [`FileKind::Missing`] counts as taken, including
/// broken symlinks and paths that cannot be inspected.
#[must_use]
pub fn backup_path(fs: &dyn FileSystemOps, source: &Path) -> PathBuf {
    let first = with_suffix(source, SUFFIX);
    if fs.classify(&first) == FileKind::Missing {
        return first;
    }
    let mut n: u64 = 1;
    loop {
        let candidate = with_suffix(source, &format!("{SUFFIX}.{n}"));
        if fs.classify(&candidate) == FileKind::Missing {
            return candidate;
        }
        n += 1;
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
