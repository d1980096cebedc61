//! Subcommand implementations and the helpers they share.
pub mod init;
pub mod link;
pub mod version;

use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::config;
use crate::environment::Environment;
use crate::logging::{self, Logger};

/// The config file for this run: `--config` if given, else the default.
#[must_use]
pub fn config_path(global: &GlobalOpts, env: &Environment) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(|| config::default_path(&env.config_home))
}

/// Install the tracing subscriber for `command` and return its logger.
///
/// Must be called at most once per process.
#[must_use]
pub fn start_logging(command: &str, verbose: bool, color: bool, env: &Environment) -> Logger {
    let log_file = logging::log_file_path(&env.cache_home, command);
    logging::init_subscriber(verbose, color, log_file.as_deref());
    Logger::new(log_file, color)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn env() -> Environment {
        Environment::from_vars(
            |k| (k == "HOME").then(|| OsString::from("/home/u")),
            "box".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn config_path_defaults_to_config_home() {
        let global = GlobalOpts {
            config: None,
            color: false,
        };
        assert_eq!(
            config_path(&global, &env()),
            PathBuf::from("/home/u/.config/dotlink.toml")
        );
    }

    #[test]
    fn config_path_honours_override() {
        let global = GlobalOpts {
            config: Some(PathBuf::from("/etc/dots.toml")),
            color: false,
        };
        assert_eq!(config_path(&global, &env()), PathBuf::from("/etc/dots.toml"));
    }
}
