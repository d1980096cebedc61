// Shared helpers for integration tests.
//
// Provides a temporary home directory with a dotfiles tree and a fluent
// builder so each integration test can set up an isolated environment
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;

use dotlink::cli::LinkOpts;
use dotlink::commands::link::{RunSummary, execute};
use dotlink::config::{Config, DotEntry};
use dotlink::environment::Environment;
use dotlink::logging::MemoryLog;
use dotlink::operations::SystemFileSystemOps;

/// Hostname every test environment reports.
pub const HOSTNAME: &str = "thishost";

/// An isolated home directory backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `home/`           : `$HOME`, all XDG directories default under it
/// - `home/dotfiles/`  : the dotfiles root
pub struct IntegrationTestContext {
    /// Temporary directory holding everything.
    pub root: tempfile::TempDir,
    /// Resolved environment pointing into `root`.
    pub env: Environment,
    /// Config used by [`IntegrationTestContext::link`].
    pub config: Config,
}

impl IntegrationTestContext {
    /// Create a new context with an empty dotfiles directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let home = OsString::from(root.path().join("home"));
        let env = Environment::from_vars(
            |k| (k == "HOME").then(|| home.clone()),
            HOSTNAME.to_string(),
        )
        .expect("resolve environment");
        std::fs::create_dir_all(env.home.join("dotfiles")).expect("create dotfiles dir");
        Self {
            root,
            env,
            config: Config::default(),
        }
    }

    /// `$HOME` for this context.
    pub fn home(&self) -> &Path {
        &self.env.home
    }

    /// The dotfiles root for this context.
    pub fn dotfiles(&self) -> PathBuf {
        self.config.dotfiles_root(&self.env.home)
    }

    /// Path under `$HOME`.
    pub fn target(&self, rel: &str) -> PathBuf {
        self.env.home.join(rel)
    }

    /// Path under the dotfiles root.
    pub fn source(&self, rel: &str) -> PathBuf {
        self.dotfiles().join(rel)
    }

    /// Run the link batch with a recording logger.
    pub fn link(&self, force: bool) -> (RunSummary, MemoryLog) {
        self.link_with(&LinkOpts {
            force,
            prune: false,
        })
    }

    /// Run the link batch with explicit options.
    pub fn link_with(&self, opts: &LinkOpts) -> (RunSummary, MemoryLog) {
        let log = MemoryLog::new();
        let summary =
            execute(&self.config, opts, &self.env, &SystemFileSystemOps, &log).expect("link");
        (summary, log)
    }

    /// Run the compiled binary with `$HOME` pointed at this context.
    pub fn run_binary(&self, args: &[&str]) -> Output {
        std::process::Command::new(env!("CARGO_BIN_EXE_dotlink"))
            .args(args)
            .env("HOME", self.home())
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("XDG_DATA_HOME")
            .env_remove("XDG_CACHE_HOME")
            .output()
            .expect("run dotlink binary")
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Declare an entry in the config.
    pub fn with_dot(mut self, entry: DotEntry) -> Self {
        self.ctx.config.dots.push(entry);
        self
    }

    /// Create a file inside the dotfiles root.
    pub fn with_source(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.source(rel), content);
        self
    }

    /// Create a file under `$HOME`.
    pub fn with_target(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.target(rel), content);
        self
    }

    /// Write the current config to the default config location so the
    /// binary picks it up.
    pub fn with_config_file(self) -> Self {
        let path = dotlink::config::default_path(&self.ctx.env.config_home);
        let content = toml::to_string(&self.ctx.config).expect("serialize config");
        write_file(&path, &content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
