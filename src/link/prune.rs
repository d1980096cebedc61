//! Removal of links that are no longer declared.
use std::path::{Path, PathBuf};

use crate::classify::FileKind;
use crate::logging::{Event, Log};
use crate::operations::FileSystemOps;
use crate::registry::LinkRegistry;

/// Drop every registry entry that is not in `keep`.
///
/// A stale entry that is still a symlink into `dotfiles_root` is removed
/// from disk.  Anything else at that path belongs to the user now and is
/// left alone; only the registry entry goes.  Entries that cannot be
/// removed or inspected stay registered for the next run.  Returns the
/// number of links removed from disk.
pub fn prune(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    registry: &mut LinkRegistry,
    keep: &[PathBuf],
    dotfiles_root: &Path,
) -> usize {
    let stale: Vec<PathBuf> = registry
        .iter()
        .filter(|t| !keep.iter().any(|k| k == t))
        .map(Path::to_path_buf)
        .collect();

    let mut removed = 0;
    for target in stale {
        match fs.classify(&target) {
            FileKind::Symlink if links_into(fs, &target, dotfiles_root) => {
                match fs.remove_symlink(&target) {
                    Ok(()) => {
                        log.event(&Event::Pruned {
                            target: target.clone(),
                        });
                        removed += 1;
                    }
                    Err(e) => {
                        log.event(&Event::PruneFailed {
                            target,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                }
            }
            FileKind::Unreadable => {
                log.event(&Event::Unreadable { path: target });
                continue;
            }
            FileKind::Missing => {
                log.debug(&format!("Forgetting missing link: {}", target.display()));
            }
            _ => {
                log.debug(&format!(
                    "Forgetting link replaced by user: {}",
                    target.display()
                ));
            }
        }
        registry.remove(&target);
    }
    removed
}

fn links_into(fs: &dyn FileSystemOps, link: &Path, root: &Path) -> bool {
    fs.read_link(link).is_ok_and(|dest| {
        let dest = match link.parent() {
            Some(parent) if dest.is_relative() => parent.join(dest),
            _ => dest,
        };
        dest.starts_with(root)
    })
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::logging::MemoryLog;
    use crate::operations::{FaultyFileSystemOps, SystemFileSystemOps};
    use std::fs;
    use std::os::unix::fs::symlink;

    struct Fixture {
        _tmp: tempfile::TempDir,
        home: PathBuf,
        dots: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().to_path_buf();
        let dots = home.join("dotfiles");
        fs::create_dir_all(&dots).unwrap();
        fs::write(dots.join("a"), "a").unwrap();
        fs::write(dots.join("b"), "b").unwrap();
        Fixture {
            _tmp: tmp,
            home,
            dots,
        }
    }

    #[test]
    fn removes_stale_managed_links_only() {
        let fx = fixture();
        let kept = fx.home.join(".a");
        let stale = fx.home.join(".b");
        symlink(fx.dots.join("a"), &kept).unwrap();
        symlink(fx.dots.join("b"), &stale).unwrap();
        let mut registry = LinkRegistry::new();
        registry.insert(&kept);
        registry.insert(&stale);
        let log = MemoryLog::new();

        let removed = prune(
            &SystemFileSystemOps,
            &log,
            &mut registry,
            &[kept.clone()],
            &fx.dots,
        );

        assert_eq!(removed, 1);
        assert_eq!(classify(&stale), FileKind::Missing);
        assert_eq!(classify(&kept), FileKind::Symlink);
        assert!(registry.contains(&kept));
        assert!(!registry.contains(&stale));
        assert_eq!(fs::read_to_string(fx.dots.join("b")).unwrap(), "b");
        assert_eq!(log.events(), vec![Event::Pruned { target: stale }]);
    }

    #[test]
    fn user_replaced_paths_are_forgotten_not_removed() {
        let fx = fixture();
        let replaced = fx.home.join(".replaced");
        let foreign = fx.home.join(".foreign");
        let gone = fx.home.join(".gone");
        fs::write(&replaced, "mine now").unwrap();
        symlink(fx.home.join("elsewhere"), &foreign).unwrap();
        let mut registry = LinkRegistry::new();
        for t in [&replaced, &foreign, &gone] {
            registry.insert(t);
        }
        let log = MemoryLog::new();

        let removed = prune(&SystemFileSystemOps, &log, &mut registry, &[], &fx.dots);

        assert_eq!(removed, 0);
        assert!(registry.is_empty());
        assert_eq!(fs::read_to_string(&replaced).unwrap(), "mine now");
        assert_eq!(classify(&foreign), FileKind::Symlink);
        assert!(log.events().is_empty());
    }

    #[test]
    fn failed_removal_keeps_registry_entry() {
        let fx = fixture();
        let stale = fx.home.join(".b");
        symlink(fx.dots.join("b"), &stale).unwrap();
        let mut registry = LinkRegistry::new();
        registry.insert(&stale);
        let log = MemoryLog::new();
        let ops = FaultyFileSystemOps::new().fail_remove(&stale);

        let removed = prune(&ops, &log, &mut registry, &[], &fx.dots);

        assert_eq!(removed, 0);
        assert!(registry.contains(&stale));
        assert!(matches!(log.events()[0], Event::PruneFailed { .. }));
    }

    #[test]
    fn uninspectable_path_keeps_registry_entry() {
        let fx = fixture();
        fs::write(fx.home.join(".blocker"), "a file, not a directory").unwrap();
        let stale = fx.home.join(".blocker").join("link");
        let mut registry = LinkRegistry::new();
        registry.insert(&stale);
        let log = MemoryLog::new();

        let removed = prune(&SystemFileSystemOps, &log, &mut registry, &[], &fx.dots);

        assert_eq!(removed, 0);
        assert!(registry.contains(&stale));
        assert_eq!(log.events(), vec![Event::Unreadable { path: stale }]);
    }
}
