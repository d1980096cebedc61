//! Configuration file model and loading.
//!
//! The config is a single TOML file:
//!
//! ```toml
//! dotfiles = "dotfiles"
//! color = false
//! dots = [
//!     { source = "bash/bashrc", target = ".bashrc" },
//!     { source = "i3/config", target = ".config/i3/config", hosts = ["laptop"] },
//! ]
//! ```
pub mod toml_loader;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File name of the config inside `$XDG_CONFIG_HOME`.
pub const CONFIG_FILE_NAME: &str = "dotlink.toml";

/// One declared symlink intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotEntry {
    /// Path relative to the dotfiles root.
    pub source: String,
    /// Path relative to `$HOME`, or absolute.
    pub target: String,
    /// Hosts this entry applies to; empty means every host.
    #[serde(default, alias = "hostname", skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

impl DotEntry {
    /// Create an entry that applies to every host.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            hosts: Vec::new(),
        }
    }

    /// Restrict the entry to the given hosts.
    #[must_use]
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Short display name used in the run summary.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} -> {}", self.source, self.target)
    }
}

/// Decoded configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dotfiles directory, relative to `$HOME` unless absolute.
    pub dotfiles: String,
    /// Colorize console output.
    pub color: bool,
    /// Declared links, in processing order.
    pub dots: Vec<DotEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dotfiles: "dotfiles".to_string(),
            color: false,
            dots: Vec::new(),
        }
    }
}

impl Config {
    /// Load the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Write [`Config::default`] to `path`, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if `path` exists, or an error
    /// if the file cannot be written.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.symlink_metadata().is_ok() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        toml_loader::write_config(path, &Self::default())
    }

    /// Absolute dotfiles root for the given home directory.
    #[must_use]
    pub fn dotfiles_root(&self, home: &Path) -> PathBuf {
        home.join(&self.dotfiles)
    }
}

/// Default config location: `<config_home>/dotlink.toml`.
#[must_use]
pub fn default_path(config_home: &Path) -> PathBuf {
    config_home.join(CONFIG_FILE_NAME)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            dotfiles = "src/dots"
            color = true
            dots = [
                { source = "bash/bashrc", target = ".bashrc" },
                { source = "i3/config", target = ".config/i3/config", hosts = ["laptop"] },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(config.dotfiles, "src/dots");
        assert!(config.color);
        assert_eq!(config.dots.len(), 2);
        assert!(config.dots[0].hosts.is_empty());
        assert_eq!(config.dots[1].hosts, vec!["laptop"]);
    }

    #[test]
    fn hostname_is_alias_for_hosts() {
        let config: Config = toml::from_str(
            r#"dots = [{ source = "a", target = ".a", hostname = ["box"] }]"#,
        )
        .unwrap();
        assert_eq!(config.dots[0].hosts, vec!["box"]);
    }

    #[test]
    fn missing_keys_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dotfiles, "dotfiles");
    }

    #[test]
    fn dotfiles_root_relative_and_absolute() {
        let home = Path::new("/home/u");
        let config = Config::default();
        assert_eq!(config.dotfiles_root(home), PathBuf::from("/home/u/dotfiles"));

        let config = Config {
            dotfiles: "/srv/dots".to_string(),
            ..Config::default()
        };
        assert_eq!(config.dotfiles_root(home), PathBuf::from("/srv/dots"));
    }

    #[test]
    fn write_default_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        Config::write_default(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "color = true\n").unwrap();
        let err = Config::write_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "color = true\n");
    }

    #[test]
    fn entry_name() {
        assert_eq!(DotEntry::new("bash/bashrc", ".bashrc").name(), "bash/bashrc -> .bashrc");
    }
}
