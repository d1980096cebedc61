//! Link reconciliation: make each target a symlink to its source.
//!
//! [`Linker::reconcile`] walks a small state machine driven by what
//! currently occupies the target:
//!
//! ```text
//! Missing                 -> link
//! Symlink   (+force)      -> remove -> link
//! Symlink   (-force)      -> skip (or already linked)
//! Directory|RegularFile   -> move into source | back up | skip -> link
//! ```
//!
//! Every decision re-classifies the paths involved, since earlier steps
//! change what later steps see.
pub mod conflict;
pub mod hosts;
pub mod prune;

use std::path::{Component, Path, PathBuf};

use crate::classify::FileKind;
use crate::config::DotEntry;
use crate::error::LinkError;
use crate::logging::{EntryStatus, Event, Log};
use crate::operations::FileSystemOps;
use crate::registry::LinkRegistry;

/// Result of reconciling one entry.
#[derive(Debug)]
pub enum Outcome {
    /// A new symlink was created.
    Linked,
    /// The target already pointed at the source; nothing changed.
    AlreadyLinked,
    /// Left untouched; rerunning with force would resolve it.
    Skipped(LinkError),
    /// The entry could not be linked.
    Failed(LinkError),
}

impl Outcome {
    /// Map a reconciliation error to `Skipped` or `Failed`.
    #[must_use]
    pub fn from_error(err: LinkError) -> Self {
        if err.is_skip() {
            Self::Skipped(err)
        } else {
            Self::Failed(err)
        }
    }

    /// Summary status for this outcome.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        match self {
            Self::Linked => EntryStatus::Linked,
            Self::AlreadyLinked => EntryStatus::AlreadyLinked,
            Self::Skipped(_) => EntryStatus::Skipped,
            Self::Failed(_) => EntryStatus::Failed,
        }
    }

    /// The skip or failure reason, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&LinkError> {
        match self {
            Self::Skipped(e) | Self::Failed(e) => Some(e),
            Self::Linked | Self::AlreadyLinked => None,
        }
    }
}

/// Everything [`Linker::reconcile`] needs besides the entry itself.
pub struct Linker<'a> {
    fs: &'a dyn FileSystemOps,
    log: &'a dyn Log,
    dotfiles_root: &'a Path,
    home: &'a Path,
    force: bool,
}

impl std::fmt::Debug for Linker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linker")
            .field("fs", &self.fs)
            .field("dotfiles_root", &self.dotfiles_root)
            .field("home", &self.home)
            .field("force", &self.force)
            .finish_non_exhaustive()
    }
}

impl<'a> Linker<'a> {
    /// Create a linker rooted at `dotfiles_root` (sources) and `home`
    /// (relative targets).
    #[must_use]
    pub const fn new(
        fs: &'a dyn FileSystemOps,
        log: &'a dyn Log,
        dotfiles_root: &'a Path,
        home: &'a Path,
        force: bool,
    ) -> Self {
        Self {
            fs,
            log,
            dotfiles_root,
            home,
            force,
        }
    }

    /// Absolute source path for `entry`.
    #[must_use]
    pub fn source_path(&self, entry: &DotEntry) -> PathBuf {
        self.dotfiles_root.join(&entry.source)
    }

    /// Absolute target path for `entry`; absolute targets are used as-is.
    #[must_use]
    pub fn target_path(&self, entry: &DotEntry) -> PathBuf {
        self.home.join(&entry.target)
    }

    /// Bring `entry` to the linked state, recording the target in `registry`
    /// when it ends up pointing at the source.
    pub fn reconcile(&self, entry: &DotEntry, registry: &mut LinkRegistry) -> Outcome {
        let source = self.source_path(entry);
        let target = self.target_path(entry);
        if let Err(err) = self.check_entry(entry, &source, &target) {
            return Outcome::from_error(err);
        }
        match self.try_reconcile(&source, &target, registry) {
            Ok(outcome) => outcome,
            Err(err) => Outcome::from_error(err),
        }
    }

    /// Refuse entries that would move or replace a whole tree: empty paths,
    /// and paths naming `$HOME`, the dotfiles root, or an ancestor of either.
    fn check_entry(
        &self,
        entry: &DotEntry,
        source: &Path,
        target: &Path,
    ) -> Result<(), LinkError> {
        let reason = if entry.target.trim().is_empty() {
            Some((target, "target path is empty"))
        } else if entry.source.trim().is_empty() {
            Some((source, "source path is empty"))
        } else if normalize(self.home).starts_with(normalize(target)) {
            Some((target, "target is the home directory or one of its parents"))
        } else if normalize(self.dotfiles_root).starts_with(normalize(target)) {
            Some((target, "target is the dotfiles directory or one of its parents"))
        } else if normalize(self.dotfiles_root).starts_with(normalize(source)) {
            Some((source, "source is the dotfiles directory or one of its parents"))
        } else {
            None
        };

        let Some((path, reason)) = reason else {
            return Ok(());
        };
        self.log.event(&Event::UnsafeEntry {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
        Err(LinkError::UnsafeEntry {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn try_reconcile(
        &self,
        source: &Path,
        target: &Path,
        registry: &mut LinkRegistry,
    ) -> Result<Outcome, LinkError> {
        if let Some(parent) = target.parent() {
            self.ensure_dir(parent)?;
        }
        self.clear_symlink(target)?;
        self.resolve_conflict(source, target)?;
        self.link(source, target, registry)
    }

    /// Create `dir` and its ancestors if it does not exist yet.
    fn ensure_dir(&self, dir: &Path) -> Result<(), LinkError> {
        if self.fs.classify(dir) != FileKind::Missing {
            return Ok(());
        }
        match self.fs.create_dir_all(dir) {
            Ok(()) => {
                self.log.event(&Event::DirectoryCreated {
                    path: dir.to_path_buf(),
                });
                Ok(())
            }
            Err(source) => {
                self.log.event(&Event::DirectoryFailed {
                    path: dir.to_path_buf(),
                    reason: source.to_string(),
                });
                Err(LinkError::DirectoryCreationFailed {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Under force, drop whatever symlink occupies the target.
    fn clear_symlink(&self, target: &Path) -> Result<(), LinkError> {
        match self.fs.classify(target) {
            FileKind::Unreadable => Err(self.unreadable(target)),
            FileKind::Symlink if self.force => match self.fs.remove_symlink(target) {
                Ok(()) => {
                    self.log.event(&Event::SymlinkRemoved {
                        target: target.to_path_buf(),
                    });
                    Ok(())
                }
                Err(e) => {
                    self.log.event(&Event::TargetStillOccupied {
                        target: target.to_path_buf(),
                    });
                    Err(LinkError::TargetOccupiedAfterResolution {
                        target: target.to_path_buf(),
                        source: Some(e),
                    })
                }
            },
            _ => Ok(()),
        }
    }

    /// Make room when a real file or directory sits at the target.
    fn resolve_conflict(&self, source: &Path, target: &Path) -> Result<(), LinkError> {
        let kind = self.fs.classify(target);
        if !kind.is_content() {
            return Ok(());
        }
        self.log.event(&Event::TargetOccupied {
            kind,
            target: target.to_path_buf(),
        });

        match self.fs.classify(source) {
            FileKind::Missing => self.adopt_target(source, target),
            FileKind::Unreadable => Err(self.unreadable(source)),
            FileKind::Symlink => Err(self.source_is_symlink(source)),
            FileKind::Directory | FileKind::RegularFile if self.force => {
                self.back_up_target(source, target)
            }
            FileKind::Directory | FileKind::RegularFile => {
                self.log.event(&Event::BothExist {
                    source: source.to_path_buf(),
                });
                Err(LinkError::TargetOccupiedNoForce {
                    source_path: source.to_path_buf(),
                    target: target.to_path_buf(),
                })
            }
        }
    }

    /// Move the existing target into the dotfiles tree as the new source.
    fn adopt_target(&self, source: &Path, target: &Path) -> Result<(), LinkError> {
        if let Some(parent) = source.parent() {
            self.ensure_dir(parent)?;
        }
        match self.fs.rename(target, source) {
            Ok(()) => {
                self.log.event(&Event::MovedToSource {
                    target: target.to_path_buf(),
                    source: source.to_path_buf(),
                });
                Ok(())
            }
            Err(e) => {
                self.log.event(&Event::MoveFailed {
                    target: target.to_path_buf(),
                    source: source.to_path_buf(),
                    reason: e.to_string(),
                });
                Err(LinkError::TargetOccupiedAfterResolution {
                    target: target.to_path_buf(),
                    source: Some(e),
                })
            }
        }
    }

    /// Move the target aside to the first free `.conflict` name.
    fn back_up_target(&self, source: &Path, target: &Path) -> Result<(), LinkError> {
        let backup = conflict::backup_path(self.fs, source);
        match self.fs.rename(target, &backup) {
            Ok(()) => {
                self.log.event(&Event::ConflictBackup {
                    target: target.to_path_buf(),
                    backup,
                });
                Ok(())
            }
            Err(e) => {
                self.log.event(&Event::BackupFailed {
                    target: target.to_path_buf(),
                    reason: e.to_string(),
                });
                Err(LinkError::TargetOccupiedAfterResolution {
                    target: target.to_path_buf(),
                    source: Some(e),
                })
            }
        }
    }

    /// Final checks, then create `target -> source`.
    fn link(
        &self,
        source: &Path,
        target: &Path,
        registry: &mut LinkRegistry,
    ) -> Result<Outcome, LinkError> {
        match self.fs.classify(source) {
            FileKind::Missing => {
                self.log.event(&Event::SourceMissing {
                    source: source.to_path_buf(),
                });
                return Err(LinkError::SourceMissing(source.to_path_buf()));
            }
            FileKind::Symlink => return Err(self.source_is_symlink(source)),
            FileKind::Unreadable => return Err(self.unreadable(source)),
            FileKind::Directory | FileKind::RegularFile => {}
        }

        match self.fs.classify(target) {
            FileKind::Missing => {}
            FileKind::Symlink if !self.force => {
                if self.points_at(target, source) {
                    self.log.event(&Event::AlreadyLinked {
                        target: target.to_path_buf(),
                    });
                    registry.insert(target);
                    return Ok(Outcome::AlreadyLinked);
                }
                self.log.event(&Event::TargetIsSymlink {
                    target: target.to_path_buf(),
                });
                return Err(LinkError::TargetIsSymlink(target.to_path_buf()));
            }
            FileKind::Unreadable => return Err(self.unreadable(target)),
            FileKind::Symlink | FileKind::Directory | FileKind::RegularFile => {
                self.log.event(&Event::TargetStillOccupied {
                    target: target.to_path_buf(),
                });
                return Err(LinkError::TargetOccupiedAfterResolution {
                    target: target.to_path_buf(),
                    source: None,
                });
            }
        }

        match self.fs.symlink(source, target) {
            Ok(()) => {
                self.log.event(&Event::Linked {
                    source: source.to_path_buf(),
                    target: target.to_path_buf(),
                });
                registry.insert(target);
                Ok(Outcome::Linked)
            }
            Err(e) => {
                self.log.event(&Event::LinkFailed {
                    target: target.to_path_buf(),
                    reason: e.to_string(),
                });
                Err(LinkError::LinkCreationFailed {
                    target: target.to_path_buf(),
                    source: e,
                })
            }
        }
    }

    /// Whether the symlink at `link` resolves to `dest`.  Relative link
    /// contents are taken relative to the link's directory.
    fn points_at(&self, link: &Path, dest: &Path) -> bool {
        self.fs.read_link(link).is_ok_and(|found| {
            let found = match link.parent() {
                Some(parent) if found.is_relative() => parent.join(found),
                _ => found,
            };
            found == dest
        })
    }

    fn unreadable(&self, path: &Path) -> LinkError {
        self.log.event(&Event::Unreadable {
            path: path.to_path_buf(),
        });
        LinkError::Unreadable(path.to_path_buf())
    }

    fn source_is_symlink(&self, source: &Path) -> LinkError {
        self.log.event(&Event::SourceIsSymlink {
            source: source.to_path_buf(),
        });
        LinkError::SourceIsSymlink(source.to_path_buf())
    }
}

/// Fold `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            _ => out.push(component),
        }
    }
    out
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::logging::MemoryLog;
    use crate::operations::{FaultyFileSystemOps, SystemFileSystemOps};
    use std::fs;

    struct Fixture {
        tmp: tempfile::TempDir,
        home: PathBuf,
        dots: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let home = tmp.path().join("home");
            let dots = home.join("dotfiles");
            fs::create_dir_all(&dots).unwrap();
            Self {
                tmp,
                home,
                dots,
            }
        }

        fn write(path: &Path, content: &str) {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn source(&self, rel: &str) -> PathBuf {
            self.dots.join(rel)
        }

        fn target(&self, rel: &str) -> PathBuf {
            self.home.join(rel)
        }

        fn run_with(
            &self,
            fs: &dyn FileSystemOps,
            entry: &DotEntry,
            force: bool,
        ) -> (Outcome, MemoryLog, LinkRegistry) {
            let log = MemoryLog::new();
            let mut registry = LinkRegistry::new();
            let outcome =
                Linker::new(fs, &log, &self.dots, &self.home, force).reconcile(entry, &mut registry);
            (outcome, log, registry)
        }

        fn run(&self, entry: &DotEntry, force: bool) -> (Outcome, MemoryLog, LinkRegistry) {
            self.run_with(&SystemFileSystemOps, entry, force)
        }
    }

    fn bashrc() -> DotEntry {
        DotEntry::new("bash/bashrc", ".bashrc")
    }

    fn assert_links_to(target: &Path, source: &Path) {
        assert_eq!(classify(target), FileKind::Symlink);
        assert_eq!(fs::read_link(target).unwrap(), source);
    }

    #[test]
    fn links_missing_target() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "alias ll='ls -l'");

        let (outcome, log, registry) = fx.run(&bashrc(), false);

        assert!(matches!(outcome, Outcome::Linked));
        assert_links_to(&fx.target(".bashrc"), &fx.source("bash/bashrc"));
        assert!(registry.contains(&fx.target(".bashrc")));
        assert_eq!(
            log.events(),
            vec![Event::Linked {
                source: fx.source("bash/bashrc"),
                target: fx.target(".bashrc"),
            }]
        );
    }

    #[test]
    fn moves_existing_target_into_missing_source() {
        let fx = Fixture::new();
        Fixture::write(&fx.target(".bashrc"), "user content");

        let (outcome, log, registry) = fx.run(&bashrc(), false);

        assert!(matches!(outcome, Outcome::Linked));
        assert_eq!(
            fs::read_to_string(fx.source("bash/bashrc")).unwrap(),
            "user content"
        );
        assert_links_to(&fx.target(".bashrc"), &fx.source("bash/bashrc"));
        assert!(registry.contains(&fx.target(".bashrc")));
        assert_eq!(
            log.events(),
            vec![
                Event::TargetOccupied {
                    kind: FileKind::RegularFile,
                    target: fx.target(".bashrc"),
                },
                Event::DirectoryCreated {
                    path: fx.dots.join("bash"),
                },
                Event::MovedToSource {
                    target: fx.target(".bashrc"),
                    source: fx.source("bash/bashrc"),
                },
                Event::Linked {
                    source: fx.source("bash/bashrc"),
                    target: fx.target(".bashrc"),
                },
            ]
        );
    }

    #[test]
    fn moves_existing_directory_with_its_contents() {
        let fx = Fixture::new();
        Fixture::write(&fx.target(".config/nvim/init.lua"), "vim.o.number = true");
        let entry = DotEntry::new("nvim", ".config/nvim");

        let (outcome, _, _) = fx.run(&entry, false);

        assert!(matches!(outcome, Outcome::Linked));
        assert_eq!(
            fs::read_to_string(fx.source("nvim/init.lua")).unwrap(),
            "vim.o.number = true"
        );
        assert_links_to(&fx.target(".config/nvim"), &fx.source("nvim"));
        assert_eq!(
            fs::read_to_string(fx.target(".config/nvim/init.lua")).unwrap(),
            "vim.o.number = true"
        );
    }

    #[test]
    fn both_exist_without_force_is_skipped_untouched() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "tracked");
        Fixture::write(&fx.target(".bashrc"), "local");

        let (outcome, log, registry) = fx.run(&bashrc(), false);

        assert!(matches!(
            outcome,
            Outcome::Skipped(LinkError::TargetOccupiedNoForce { .. })
        ));
        assert_eq!(fs::read_to_string(fx.target(".bashrc")).unwrap(), "local");
        assert_eq!(
            fs::read_to_string(fx.source("bash/bashrc")).unwrap(),
            "tracked"
        );
        assert_eq!(classify(&fx.source("bash/bashrc.conflict")), FileKind::Missing);
        assert!(registry.is_empty());
        assert!(log.events().contains(&Event::BothExist {
            source: fx.source("bash/bashrc"),
        }));
    }

    #[test]
    fn both_exist_with_force_backs_up_target() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "tracked");
        Fixture::write(&fx.target(".bashrc"), "local");

        let (outcome, log, _) = fx.run(&bashrc(), true);

        assert!(matches!(outcome, Outcome::Linked));
        let backup = fx.source("bash/bashrc.conflict");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "local");
        assert_links_to(&fx.target(".bashrc"), &fx.source("bash/bashrc"));
        assert!(log.events().contains(&Event::ConflictBackup {
            target: fx.target(".bashrc"),
            backup,
        }));
    }

    #[test]
    fn force_backup_never_overwrites_older_backups() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "tracked");
        Fixture::write(&fx.source("bash/bashrc.conflict"), "first");
        Fixture::write(&fx.source("bash/bashrc.conflict.1"), "second");
        Fixture::write(&fx.target(".bashrc"), "third");

        let (outcome, _, _) = fx.run(&bashrc(), true);

        assert!(matches!(outcome, Outcome::Linked));
        assert_eq!(
            fs::read_to_string(fx.source("bash/bashrc.conflict")).unwrap(),
            "first"
        );
        assert_eq!(
            fs::read_to_string(fx.source("bash/bashrc.conflict.1")).unwrap(),
            "second"
        );
        assert_eq!(
            fs::read_to_string(fx.source("bash/bashrc.conflict.2")).unwrap(),
            "third"
        );
    }

    #[test]
    fn second_run_is_already_linked() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "x");

        let (first, _, _) = fx.run(&bashrc(), false);
        let (second, log, registry) = fx.run(&bashrc(), false);

        assert!(matches!(first, Outcome::Linked));
        assert!(matches!(second, Outcome::AlreadyLinked));
        assert_eq!(second.status(), EntryStatus::AlreadyLinked);
        assert!(registry.contains(&fx.target(".bashrc")));
        assert_eq!(
            log.events(),
            vec![Event::AlreadyLinked {
                target: fx.target(".bashrc"),
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn relative_link_to_source_is_already_linked() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "x");
        std::os::unix::fs::symlink("dotfiles/bash/bashrc", fx.target(".bashrc")).unwrap();

        let (outcome, _, _) = fx.run(&bashrc(), false);
        assert!(matches!(outcome, Outcome::AlreadyLinked));
    }

    #[cfg(unix)]
    #[test]
    fn foreign_symlink_without_force_is_skipped() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "x");
        let elsewhere = fx.home.join("elsewhere");
        Fixture::write(&elsewhere, "y");
        std::os::unix::fs::symlink(&elsewhere, fx.target(".bashrc")).unwrap();

        let (outcome, log, registry) = fx.run(&bashrc(), false);

        assert!(matches!(
            outcome,
            Outcome::Skipped(LinkError::TargetIsSymlink(_))
        ));
        assert_links_to(&fx.target(".bashrc"), &elsewhere);
        assert!(registry.is_empty());
        assert!(log.events().contains(&Event::TargetIsSymlink {
            target: fx.target(".bashrc"),
        }));
    }

    #[cfg(unix)]
    #[test]
    fn force_replaces_existing_symlink() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "x");
        std::os::unix::fs::symlink(fx.home.join("missing"), fx.target(".bashrc")).unwrap();

        let (outcome, log, _) = fx.run(&bashrc(), true);

        assert!(matches!(outcome, Outcome::Linked));
        assert_links_to(&fx.target(".bashrc"), &fx.source("bash/bashrc"));
        assert_eq!(
            log.events()[0],
            Event::SymlinkRemoved {
                target: fx.target(".bashrc"),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn force_recreates_link_that_already_points_at_source() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "x");
        fx.run(&bashrc(), false);

        let (outcome, log, registry) = fx.run(&bashrc(), true);

        assert!(matches!(outcome, Outcome::Linked));
        assert_links_to(&fx.target(".bashrc"), &fx.source("bash/bashrc"));
        assert!(registry.contains(&fx.target(".bashrc")));
        assert_eq!(
            log.events(),
            vec![
                Event::SymlinkRemoved {
                    target: fx.target(".bashrc"),
                },
                Event::Linked {
                    source: fx.source("bash/bashrc"),
                    target: fx.target(".bashrc"),
                },
            ]
        );
    }

    #[test]
    fn empty_target_never_moves_home() {
        let fx = Fixture::new();
        Fixture::write(&fx.target("precious"), "keep me");

        for force in [false, true] {
            let (outcome, log, registry) = fx.run(&DotEntry::new("x", ""), force);

            match outcome {
                Outcome::Failed(LinkError::UnsafeEntry { path, reason }) => {
                    assert_eq!(path, fx.home);
                    assert_eq!(reason, "target path is empty");
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
            assert!(registry.is_empty());
            assert_eq!(log.events().len(), 1);
        }
        assert_eq!(
            fs::read_to_string(fx.target("precious")).unwrap(),
            "keep me"
        );
        assert_eq!(classify(&fx.source("x")), FileKind::Missing);
    }

    #[test]
    fn targets_naming_home_or_its_parents_are_refused() {
        let fx = Fixture::new();
        let home = fx.home.to_string_lossy().into_owned();
        for target in [".", "./", "a/..", "..", home.as_str(), "dotfiles", "dotfiles/."] {
            let (outcome, _, _) = fx.run(&DotEntry::new("x", target), true);
            assert!(
                matches!(outcome, Outcome::Failed(LinkError::UnsafeEntry { .. })),
                "target {target:?}: {outcome:?}"
            );
        }
        assert_eq!(classify(&fx.dots), FileKind::Directory);
        assert_eq!(classify(&fx.source("x")), FileKind::Missing);
    }

    #[test]
    fn empty_or_root_source_is_refused() {
        let fx = Fixture::new();
        Fixture::write(&fx.target(".bashrc"), "local");

        for source in ["", " ", ".", ".."] {
            let (outcome, _, _) = fx.run(&DotEntry::new(source, ".bashrc"), true);
            assert!(
                matches!(outcome, Outcome::Failed(LinkError::UnsafeEntry { .. })),
                "source {source:?}: {outcome:?}"
            );
        }
        assert_eq!(fs::read_to_string(fx.target(".bashrc")).unwrap(), "local");
    }

    #[test]
    fn normalize_folds_dots_lexically() {
        assert_eq!(normalize(Path::new("/h/./a/../b/")), PathBuf::from("/h/b"));
        assert_eq!(normalize(Path::new("/h/.")), PathBuf::from("/h"));
        assert_eq!(normalize(Path::new("/h/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[cfg(unix)]
    #[test]
    fn source_symlink_always_fails() {
        for (force, occupy_target) in [(false, false), (true, false), (false, true), (true, true)]
        {
            let fx = Fixture::new();
            let real = fx.home.join("real");
            Fixture::write(&real, "x");
            fs::create_dir_all(fx.dots.join("bash")).unwrap();
            std::os::unix::fs::symlink(&real, fx.source("bash/bashrc")).unwrap();
            if occupy_target {
                Fixture::write(&fx.target(".bashrc"), "local");
            }

            let (outcome, log, _) = fx.run(&bashrc(), force);

            assert!(
                matches!(outcome, Outcome::Failed(LinkError::SourceIsSymlink(_))),
                "force={force} occupied={occupy_target}: {outcome:?}"
            );
            assert!(log.events().contains(&Event::SourceIsSymlink {
                source: fx.source("bash/bashrc"),
            }));
            if occupy_target {
                assert_eq!(fs::read_to_string(fx.target(".bashrc")).unwrap(), "local");
            }
        }
    }

    #[test]
    fn missing_source_and_target_fails() {
        let fx = Fixture::new();

        let (outcome, log, registry) = fx.run(&bashrc(), false);

        assert!(matches!(
            outcome,
            Outcome::Failed(LinkError::SourceMissing(_))
        ));
        assert!(registry.is_empty());
        assert_eq!(classify(&fx.target(".bashrc")), FileKind::Missing);
        assert_eq!(
            log.events(),
            vec![Event::SourceMissing {
                source: fx.source("bash/bashrc"),
            }]
        );
    }

    #[test]
    fn creates_missing_target_parents() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("i3/config"), "bindsym");
        let entry = DotEntry::new("i3/config", ".config/i3/config");

        let (outcome, log, _) = fx.run(&entry, false);

        assert!(matches!(outcome, Outcome::Linked));
        assert_eq!(
            log.events()[0],
            Event::DirectoryCreated {
                path: fx.target(".config/i3"),
            }
        );
        assert_links_to(&fx.target(".config/i3/config"), &fx.source("i3/config"));
    }

    #[test]
    fn absolute_target_bypasses_home() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("motd"), "hi");
        let outside = fx.tmp.path().join("etc").join("motd");
        let entry = DotEntry::new("motd", outside.to_string_lossy());

        let (outcome, _, registry) = fx.run(&entry, false);

        assert!(matches!(outcome, Outcome::Linked));
        assert_links_to(&outside, &fx.source("motd"));
        assert!(registry.contains(&outside));
    }

    #[test]
    fn directory_creation_failure_fails_entry() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("i3/config"), "bindsym");
        let entry = DotEntry::new("i3/config", ".config/i3/config");
        let ops = FaultyFileSystemOps::new().fail_create_dir(fx.target(".config/i3"));

        let (outcome, log, registry) = fx.run_with(&ops, &entry, false);

        assert!(matches!(
            outcome,
            Outcome::Failed(LinkError::DirectoryCreationFailed { .. })
        ));
        assert!(registry.is_empty());
        assert!(matches!(
            log.events()[0],
            Event::DirectoryFailed { .. }
        ));
    }

    #[test]
    fn failed_move_into_source_leaves_target_occupied() {
        let fx = Fixture::new();
        Fixture::write(&fx.target(".bashrc"), "user content");
        let ops = FaultyFileSystemOps::new().fail_rename_from(fx.target(".bashrc"));

        let (outcome, log, _) = fx.run_with(&ops, &bashrc(), false);

        match outcome {
            Outcome::Failed(LinkError::TargetOccupiedAfterResolution { source, .. }) => {
                assert!(source.is_some());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(
            fs::read_to_string(fx.target(".bashrc")).unwrap(),
            "user content"
        );
        assert!(
            log.events()
                .iter()
                .any(|e| matches!(e, Event::MoveFailed { .. }))
        );
    }

    #[test]
    fn failed_backup_leaves_target_occupied() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "tracked");
        Fixture::write(&fx.target(".bashrc"), "local");
        let ops = FaultyFileSystemOps::new().fail_rename_from(fx.target(".bashrc"));

        let (outcome, log, _) = fx.run_with(&ops, &bashrc(), true);

        assert!(matches!(
            outcome,
            Outcome::Failed(LinkError::TargetOccupiedAfterResolution { .. })
        ));
        assert_eq!(fs::read_to_string(fx.target(".bashrc")).unwrap(), "local");
        assert!(
            log.events()
                .iter()
                .any(|e| matches!(e, Event::BackupFailed { .. }))
        );
    }

    #[cfg(unix)]
    #[test]
    fn failed_symlink_removal_leaves_target_occupied() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "x");
        std::os::unix::fs::symlink(fx.home.join("old"), fx.target(".bashrc")).unwrap();
        let ops = FaultyFileSystemOps::new().fail_remove(fx.target(".bashrc"));

        let (outcome, _, _) = fx.run_with(&ops, &bashrc(), true);

        assert!(matches!(
            outcome,
            Outcome::Failed(LinkError::TargetOccupiedAfterResolution { .. })
        ));
        assert_eq!(classify(&fx.target(".bashrc")), FileKind::Symlink);
    }

    #[test]
    fn failed_symlink_call_is_link_creation_failure() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("bash/bashrc"), "x");
        let ops = FaultyFileSystemOps::new().fail_symlink_at(fx.target(".bashrc"));

        let (outcome, log, registry) = fx.run_with(&ops, &bashrc(), false);

        assert!(matches!(
            outcome,
            Outcome::Failed(LinkError::LinkCreationFailed { .. })
        ));
        assert!(registry.is_empty());
        assert!(
            log.events()
                .iter()
                .any(|e| matches!(e, Event::LinkFailed { .. }))
        );
    }

    #[test]
    fn unreadable_target_fails() {
        let fx = Fixture::new();
        Fixture::write(&fx.source("x"), "x");
        Fixture::write(&fx.target(".blocker"), "not a directory");
        let entry = DotEntry::new("x", ".blocker/x");

        let (outcome, log, _) = fx.run(&entry, true);

        assert!(matches!(
            outcome,
            Outcome::Failed(LinkError::Unreadable(_))
        ));
        assert!(log.events().contains(&Event::Unreadable {
            path: fx.target(".blocker/x"),
        }));
        assert_eq!(
            fs::read_to_string(fx.target(".blocker")).unwrap(),
            "not a directory"
        );
    }

    #[test]
    fn outcome_status_mapping() {
        assert_eq!(Outcome::Linked.status(), EntryStatus::Linked);
        let skip = Outcome::from_error(LinkError::TargetIsSymlink(PathBuf::from("/t")));
        assert_eq!(skip.status(), EntryStatus::Skipped);
        let fail = Outcome::from_error(LinkError::SourceMissing(PathBuf::from("/s")));
        assert_eq!(fail.status(), EntryStatus::Failed);
        assert!(fail.error().is_some());
        assert!(Outcome::AlreadyLinked.error().is_none());
    }
}
