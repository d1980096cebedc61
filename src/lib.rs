//! Declarative dotfiles symlink manager.
//!
//! Reads a TOML list of `source -> target` entries and makes each target
//! (under `$HOME`) a symlink to its source (under the dotfiles directory),
//! adopting, backing up, or skipping whatever is already in the way.
//!
//! The crate is organised in layers:
//!
//! - **[`classify`]** and **[`operations`]**: inspect and mutate the filesystem
//! - **[`link`]**: host filtering, per-entry reconciliation, stale-link pruning
//! - **[`config`]**, **[`environment`]**, **[`registry`]**: inputs and persisted state
//! - **[`commands`]**: top-level subcommand orchestration (`link`, `init`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod link;
pub mod logging;
pub mod operations;
pub mod registry;

/// Directory name used under the XDG data and cache homes.
pub const APP_NAME: &str = "dotlink";

/// Version string: `DOTLINK_VERSION` at build time, else the crate version.
pub const VERSION: &str = match option_env!("DOTLINK_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
