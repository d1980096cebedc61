//! Command: link every applicable dotfile.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::classify::{self, FileKind};
use crate::cli::{GlobalOpts, LinkOpts};
use crate::config::{Config, validation};
use crate::environment::Environment;
use crate::link::{Linker, Outcome, hosts, prune};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::registry::{LinkRegistry, REGISTRY_FILE_NAME};

/// Counts from one batch of reconciliations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries that applied to this host.
    pub eligible: usize,
    /// New symlinks created.
    pub linked: usize,
    /// Targets that already pointed at their source.
    pub already_linked: usize,
    /// Entries left alone until rerun with force.
    pub skipped: usize,
    /// Entries that could not be linked.
    pub failed: usize,
    /// Stale links removed by `--prune`.
    pub pruned: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Linked => self.linked += 1,
            Outcome::AlreadyLinked => self.already_linked += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Run the link command.
///
/// When no `--config` was given and the default config does not exist yet,
/// it is created and nothing is linked.
///
/// # Errors
///
/// Returns an error if the config or registry cannot be loaded or saved, or
/// if any entry failed to link.
pub fn run(global: &GlobalOpts, opts: &LinkOpts, env: &Environment, verbose: bool) -> Result<()> {
    let path = super::config_path(global, env);

    if global.config.is_none() && classify::classify(&path) == FileKind::Missing {
        let log = super::start_logging("link", verbose, global.color, env);
        return super::init::create_default_config(&path, &log);
    }

    let config = Config::load(&path)?;
    let log = super::start_logging("link", verbose, global.color || config.color, env);
    log.debug(&format!("dotlink {}", crate::VERSION));
    log.debug(&format!("config: {}", path.display()));

    let summary = execute(&config, opts, env, &SystemFileSystemOps, &log)?;
    log.print_summary(opts.force);

    let failed = log.failure_count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} dotfiles failed to link", summary.eligible);
    }
    Ok(())
}

/// Reconcile every entry of `config` that applies to this host, then
/// persist the registry.
///
/// Per-entry results are reported through `log`; only registry I/O can make
/// this fail.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded or saved.
pub fn execute(
    config: &Config,
    opts: &LinkOpts,
    env: &Environment,
    fs: &dyn FileSystemOps,
    log: &dyn Log,
) -> Result<RunSummary> {
    let dotfiles_root = config.dotfiles_root(&env.home);
    let registry_path = env.state_dir().join(REGISTRY_FILE_NAME);
    let mut registry = LinkRegistry::load(&registry_path)?;
    log.debug(&format!(
        "registry: {} ({} links)",
        registry_path.display(),
        registry.len()
    ));

    let eligible = hosts::filter(&config.dots, &env.hostname);
    log.debug(&format!(
        "{} of {} dotfiles apply to host {}",
        eligible.len(),
        config.dots.len(),
        env.hostname
    ));

    let warnings = validation::validate(&eligible);
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in &warnings {
            log.warn(&format!("  {warning}"));
        }
    }

    log.stage("Linking dotfiles");
    let linker = Linker::new(fs, log, &dotfiles_root, &env.home, opts.force);
    let mut summary = RunSummary {
        eligible: eligible.len(),
        ..RunSummary::default()
    };
    for entry in &eligible {
        let outcome = linker.reconcile(entry, &mut registry);
        let reason = outcome.error().map(ToString::to_string);
        log.record_entry(&entry.name(), outcome.status(), reason.as_deref());
        summary.record(&outcome);
    }

    if opts.prune {
        log.stage("Pruning stale links");
        let keep: Vec<PathBuf> = eligible.iter().map(|e| linker.target_path(e)).collect();
        summary.pruned = prune::prune(fs, log, &mut registry, &keep, &dotfiles_root);
    }

    registry
        .save(&registry_path)
        .context("saving link registry")?;
    Ok(summary)
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::DotEntry;
    use crate::logging::{EntryStatus, MemoryLog};
    use std::ffi::OsString;
    use std::fs;

    fn env_in(root: &std::path::Path) -> Environment {
        let home = OsString::from(root.join("home"));
        Environment::from_vars(
            |k| (k == "HOME").then(|| home.clone()),
            "thishost".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn links_entries_for_this_host_and_saves_registry() {
        let tmp = tempfile::tempdir().unwrap();
        let env = env_in(tmp.path());
        let dots = env.home.join("dotfiles");
        fs::create_dir_all(dots.join("bash")).unwrap();
        fs::write(dots.join("bash/bashrc"), "x").unwrap();
        fs::write(dots.join("i3"), "y").unwrap();
        let config = Config {
            dots: vec![
                DotEntry::new("bash/bashrc", ".bashrc"),
                DotEntry::new("i3", ".i3").with_hosts(["otherhost"]),
                DotEntry::new("missing", ".missing"),
            ],
            ..Config::default()
        };
        let log = MemoryLog::new();

        let summary =
            execute(&config, &LinkOpts::default(), &env, &SystemFileSystemOps, &log).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                eligible: 2,
                linked: 1,
                failed: 1,
                ..RunSummary::default()
            }
        );
        assert_eq!(
            classify::classify(&env.home.join(".i3")),
            FileKind::Missing
        );
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, EntryStatus::Linked);
        assert_eq!(entries[1].status, EntryStatus::Failed);
        assert!(entries[1].message.as_deref().unwrap().contains("source does not exist"));

        let saved = LinkRegistry::load(&env.state_dir().join(REGISTRY_FILE_NAME)).unwrap();
        assert!(saved.contains(&env.home.join(".bashrc")));
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn prune_removes_links_dropped_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let env = env_in(tmp.path());
        let dots = env.home.join("dotfiles");
        fs::create_dir_all(&dots).unwrap();
        fs::write(dots.join("a"), "a").unwrap();
        fs::write(dots.join("b"), "b").unwrap();
        let both = Config {
            dots: vec![DotEntry::new("a", ".a"), DotEntry::new("b", ".b")],
            ..Config::default()
        };
        execute(&both, &LinkOpts::default(), &env, &SystemFileSystemOps, &MemoryLog::new())
            .unwrap();

        let only_a = Config {
            dots: vec![DotEntry::new("a", ".a")],
            ..Config::default()
        };
        let opts = LinkOpts {
            force: false,
            prune: true,
        };
        let summary =
            execute(&only_a, &opts, &env, &SystemFileSystemOps, &MemoryLog::new()).unwrap();

        assert_eq!(summary.pruned, 1);
        assert_eq!(summary.already_linked, 1);
        assert_eq!(classify::classify(&env.home.join(".b")), FileKind::Missing);
        let saved = LinkRegistry::load(&env.state_dir().join(REGISTRY_FILE_NAME)).unwrap();
        assert_eq!(saved.iter().collect::<Vec<_>>(), vec![env.home.join(".a").as_path()]);
    }

    #[test]
    fn validation_warnings_are_logged() {
        let tmp = tempfile::tempdir().unwrap();
        let env = env_in(tmp.path());
        let config = Config {
            dots: vec![DotEntry::new("../outside", ".x")],
            ..Config::default()
        };
        let log = MemoryLog::new();

        execute(&config, &LinkOpts::default(), &env, &SystemFileSystemOps, &log).unwrap();

        assert!(log.lines().iter().any(|l| matches!(
            l,
            crate::logging::Line::Warn(msg) if msg.contains("outside the dotfiles directory")
        )));
    }

    #[test]
    fn malformed_registry_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let env = env_in(tmp.path());
        fs::create_dir_all(env.state_dir()).unwrap();
        fs::write(env.state_dir().join(REGISTRY_FILE_NAME), "not json").unwrap();

        let result = execute(
            &Config::default(),
            &LinkOpts::default(),
            &env,
            &SystemFileSystemOps,
            &MemoryLog::new(),
        );

        assert!(result.is_err());
    }
}
