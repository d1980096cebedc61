//! Non-fatal configuration checks.
use std::collections::HashSet;
use std::path::{Component, Path};

use super::DotEntry;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The entry that triggered the warning (`source -> target`).
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item`.
    #[must_use]
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.item, self.message)
    }
}

/// Check the eligible entries for empty paths, duplicate targets, and
/// sources that escape the dotfiles root.
#[must_use]
pub fn validate(dots: &[&DotEntry]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut targets = HashSet::new();

    for dot in dots {
        if dot.source.trim().is_empty() {
            warnings.push(ValidationWarning::new(dot.name(), "source path is empty"));
        } else if escapes_root(Path::new(&dot.source)) {
            warnings.push(ValidationWarning::new(
                dot.name(),
                "source path points outside the dotfiles directory",
            ));
        }

        if dot.target.trim().is_empty() {
            warnings.push(ValidationWarning::new(dot.name(), "target path is empty"));
        } else if !targets.insert(dot.target.as_str()) {
            warnings.push(ValidationWarning::new(
                dot.name(),
                format!("target {} is declared more than once", dot.target),
            ));
        }
    }

    warnings
}

/// Whether joining `relative` onto a root can leave that root.
fn escapes_root(relative: &Path) -> bool {
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return true,
            Component::ParentDir => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
        }
    }
    false
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn check(dots: &[DotEntry]) -> Vec<ValidationWarning> {
        validate(&dots.iter().collect::<Vec<_>>())
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let dots = [
            DotEntry::new("bash/bashrc", ".bashrc"),
            DotEntry::new("vim/vimrc", ".vimrc"),
        ];
        assert!(check(&dots).is_empty());
    }

    #[test]
    fn empty_paths_warn() {
        let warnings = check(&[DotEntry::new("", " ")]);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].message, "source path is empty");
        assert_eq!(warnings[1].message, "target path is empty");
    }

    #[test]
    fn duplicate_target_warns_once() {
        let warnings = check(&[
            DotEntry::new("a/bashrc", ".bashrc"),
            DotEntry::new("b/bashrc", ".bashrc"),
        ]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "b/bashrc -> .bashrc");
    }

    #[test]
    fn escaping_sources_warn() {
        assert!(escapes_root(Path::new("../secret")));
        assert!(escapes_root(Path::new("a/../../b")));
        assert!(escapes_root(Path::new("/etc/passwd")));
        assert!(!escapes_root(Path::new("a/../b")));
        assert!(!escapes_root(Path::new("./a/b")));

        let warnings = check(&[DotEntry::new("../x", ".x")]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("outside the dotfiles directory"));
    }
}
