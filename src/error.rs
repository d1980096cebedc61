//! Domain-specific error types for the dotlink engine.
//!
//! Internal modules return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! EnvironmentError : HOME could not be determined
//! ConfigError      : config file read, parse, default-config write
//! RegistryError    : link registry read, parse, persist
//! LinkError        : per-entry reconciliation failures (never process-fatal)
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while resolving the user's directories.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// `HOME` is unset or empty.
    #[error("HOME is not set")]
    HomeNotSet,
}

/// Errors that arise from loading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not match the schema.
    #[error("invalid TOML in {}: {source}", path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying parser error.
        source: toml::de::Error,
    },

    /// The default config could not be serialized.
    #[error("cannot serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config file could not be written.
    #[error("cannot write config file {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `init` was asked to create a config that already exists.
    #[error("config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

/// Errors that arise from reading or persisting the link registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry file exists but could not be read.
    #[error("cannot read link registry {}: {source}", path.display())]
    Read {
        /// Registry file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The registry file is not a JSON array of strings.
    #[error("invalid link registry {}: {source}", path.display())]
    Parse {
        /// Registry file path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The registry could not be written back to disk.
    #[error("cannot write link registry {}: {source}", path.display())]
    Write {
        /// Registry file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The registry could not be serialized.
    #[error("cannot serialize link registry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a single dotfile entry could not be linked.
///
/// Every variant is scoped to one entry; the batch always continues.
/// [`LinkError::is_skip`] separates the user-correctable cases (rerun with
/// `--force`) from genuine failures.
#[derive(Error, Debug)]
pub enum LinkError {
    /// A parent directory for the target or source could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source still does not exist after conflict resolution.
    #[error("source does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    /// The source is itself a symlink; linking through it would build a chain.
    #[error("source is a symlink: {}", .0.display())]
    SourceIsSymlink(PathBuf),

    /// Both source and target hold real content and force is off.
    #[error("both source and target exist; rerun with force: {}", source_path.display())]
    TargetOccupiedNoForce {
        /// Resolved source path.
        source_path: PathBuf,
        /// Resolved target path.
        target: PathBuf,
    },

    /// The target is a foreign symlink and force is off.
    #[error("target is a symlink; rerun with force to replace: {}", .0.display())]
    TargetIsSymlink(PathBuf),

    /// Conflict resolution ran but the target is still occupied.
    #[error("target still occupied after resolution: {}", target.display())]
    TargetOccupiedAfterResolution {
        /// Resolved target path.
        target: PathBuf,
        /// The failed rename/remove, when one was attempted.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The final symlink call failed even though its preconditions held.
    #[error("error creating link {}: {source}", target.display())]
    LinkCreationFailed {
        /// Resolved target path.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A path exists but could not be inspected (e.g. permission denied).
    #[error("cannot inspect {}", .0.display())]
    Unreadable(PathBuf),

    /// The entry resolves to a path that must never be moved or replaced,
    /// such as an empty target or `$HOME` itself.
    #[error("refusing to link {}: {reason}", path.display())]
    UnsafeEntry {
        /// Resolved path that was refused.
        path: PathBuf,
        /// Why the path was refused.
        reason: &'static str,
    },
}

impl LinkError {
    /// `true` when the entry should be reported as skipped rather than failed.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::TargetOccupiedNoForce { .. } | Self::TargetIsSymlink(_)
        )
    }
}
