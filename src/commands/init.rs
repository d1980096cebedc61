//! Command: write a default config file.
use anyhow::Result;
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::environment::Environment;
use crate::logging::Log;

/// Run the init command.
///
/// # Errors
///
/// Returns an error if the config file already exists or cannot be written.
pub fn run(global: &GlobalOpts, env: &Environment, verbose: bool) -> Result<()> {
    let path = super::config_path(global, env);
    let log = super::start_logging("init", verbose, global.color, env);
    create_default_config(&path, &log)
}

/// Write the default config to `path` and tell the user where it is.
///
/// # Errors
///
/// Returns an error if `path` exists or cannot be written.
pub fn create_default_config(path: &Path, log: &dyn Log) -> Result<()> {
    Config::write_default(path)?;
    log.info(&format!("Creating config file in: {}", path.display()));
    log.info("Add entries under `dots` and run dotlink again.");
    Ok(())
}
