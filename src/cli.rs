//! Command-line interface definitions.
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for dotlink.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Symlink your dotfiles into place from a declarative config",
    version = crate::VERSION
)]
pub struct Cli {
    /// Subcommand to run; `link` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options accepted by every subcommand
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Link options given before the subcommand (or without one)
    #[command(flatten)]
    pub link: LinkOpts,
}

impl Cli {
    /// The subcommand to run; `link` when none was given.
    ///
    /// Link flags given before the subcommand are merged into `link`'s own.
    ///
    /// # Errors
    ///
    /// Returns a usage error when link flags precede a subcommand that does
    /// not take them (e.g. `dotlink --prune init`).
    pub fn resolved_command(&self) -> Result<Command, clap::Error> {
        match &self.command {
            None => Ok(Command::Link(self.link.clone())),
            Some(Command::Link(opts)) => Ok(Command::Link(opts.merge(&self.link))),
            Some(other) if self.link.is_set() => Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                format!(
                    "--force and --prune only apply to `link`, not `{}`",
                    other.name()
                ),
            )),
            Some(other) => Ok(other.clone()),
        }
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Config file to use instead of $XDG_CONFIG_HOME/dotlink.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Colorize output regardless of the config file
    #[arg(long, global = true)]
    pub color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Link every dotfile that applies to this host (default)
    Link(LinkOpts),
    /// Write a default config file
    Init,
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name as typed on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Link(_) => "link",
            Self::Init => "init",
            Self::Version => "version",
        }
    }
}

/// Options for the `link` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct LinkOpts {
    /// Move conflicting targets aside and replace existing symlinks
    #[arg(short, long)]
    pub force: bool,

    /// Remove previously created links that are no longer declared
    #[arg(long)]
    pub prune: bool,
}

impl LinkOpts {
    /// Combine two sets of link flags; a flag set in either is set.
    #[must_use]
    pub const fn merge(&self, other: &Self) -> Self {
        Self {
            force: self.force || other.force,
            prune: self.prune || other.prune,
        }
    }

    /// Whether any link flag was given.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.force || self.prune
    }
}
