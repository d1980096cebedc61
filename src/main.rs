//! dotlink command-line entry point.

use anyhow::Result;
use clap::Parser;

use dotlink::cli::{Cli, Command};
use dotlink::commands;
use dotlink::environment::{self, Environment};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let command = args.resolved_command().unwrap_or_else(|e| e.exit());

    match command {
        Command::Version => {
            commands::version::run(&environment::hostname());
            Ok(())
        }
        Command::Init => commands::init::run(&args.global, &Environment::detect()?, args.verbose),
        Command::Link(opts) => {
            commands::link::run(&args.global, &opts, &Environment::detect()?, args.verbose)
        }
    }
}
