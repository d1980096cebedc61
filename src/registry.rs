//! Persistent record of the targets this tool has linked.
use std::path::{Path, PathBuf};

use crate::error::RegistryError;

/// File name of the registry inside the state directory.
pub const REGISTRY_FILE_NAME: &str = "dots.json";

/// Ordered, duplicate-free set of absolute target paths.
///
/// Persisted as a JSON array of strings.  Insertion order is preserved so
/// the file diffs cleanly between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRegistry {
    targets: Vec<PathBuf>,
}

impl LinkRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    /// Load the registry from `path`.  A missing file yields an empty
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or is not a
    /// JSON array of strings.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(RegistryError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let stored: Vec<PathBuf> =
            serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut registry = Self::new();
        for target in stored {
            registry.insert(target);
        }
        Ok(registry)
    }

    /// Write the registry to `path`, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(&self.targets)?;
        let write_err = |source| RegistryError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, json + "\n").map_err(write_err)
    }

    /// Add `target` unless it is already recorded.  Returns `true` if it was
    /// added.
    pub fn insert(&mut self, target: impl Into<PathBuf>) -> bool {
        let target = target.into();
        if self.contains(&target) {
            return false;
        }
        self.targets.push(target);
        true
    }

    /// Whether `target` is recorded.
    #[must_use]
    pub fn contains(&self, target: &Path) -> bool {
        self.targets.iter().any(|t| t == target)
    }

    /// Drop `target` from the registry.  Returns `true` if it was present.
    pub fn remove(&mut self, target: &Path) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t != target);
        self.targets.len() != before
    }

    /// Recorded targets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.targets.iter().map(PathBuf::as_path)
    }

    /// Number of recorded targets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_and_ordered() {
        let mut reg = LinkRegistry::new();
        assert!(reg.insert("/h/.bashrc"));
        assert!(reg.insert("/h/.vimrc"));
        assert!(!reg.insert("/h/.bashrc"));
        let all: Vec<_> = reg.iter().collect();
        assert_eq!(all, vec![Path::new("/h/.bashrc"), Path::new("/h/.vimrc")]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut reg = LinkRegistry::new();
        reg.insert("/h/.a");
        assert!(reg.remove(Path::new("/h/.a")));
        assert!(!reg.remove(Path::new("/h/.a")));
        assert!(reg.is_empty());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reg = LinkRegistry::load(&dir.path().join(REGISTRY_FILE_NAME)).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        std::fs::write(&path, r#"{"not": "an array"}"#).unwrap();
        assert!(matches!(
            LinkRegistry::load(&path),
            Err(RegistryError::Parse { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dotlink").join(REGISTRY_FILE_NAME);
        let mut reg = LinkRegistry::new();
        reg.insert("/h/.zshrc");
        reg.insert("/h/.bashrc");
        reg.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(raw, vec!["/h/.zshrc", "/h/.bashrc"]);
        assert_eq!(LinkRegistry::load(&path).unwrap(), reg);
    }

    #[test]
    fn load_drops_duplicates_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        std::fs::write(&path, r#"["/h/.a", "/h/.b", "/h/.a"]"#).unwrap();
        let reg = LinkRegistry::load(&path).unwrap();
        assert_eq!(reg.len(), 2);
    }
}
