//! Resolution of the user's home, XDG directories, and hostname.
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::EnvironmentError;

/// Directories and host identity for one run.
///
/// Resolved once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// The user's home directory.
    pub home: PathBuf,
    /// `$XDG_CONFIG_HOME`, default `~/.config`.
    pub config_home: PathBuf,
    /// `$XDG_DATA_HOME`, default `~/.local/share`.
    pub data_home: PathBuf,
    /// `$XDG_CACHE_HOME`, default `~/.cache`.
    pub cache_home: PathBuf,
    /// Current machine's hostname.
    pub hostname: String,
}

impl Environment {
    /// Resolve from the process environment and the OS hostname.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::HomeNotSet`] if no home directory can be
    /// determined.
    pub fn detect() -> Result<Self, EnvironmentError> {
        Self::from_vars(|key| std::env::var_os(key), hostname())
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// `HOME` is consulted first, then `USERPROFILE`.  Empty or relative XDG
    /// values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::HomeNotSet`] if neither variable is set.
    pub fn from_vars<F>(lookup: F, hostname: String) -> Result<Self, EnvironmentError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let home = ["HOME", "USERPROFILE"]
            .into_iter()
            .filter_map(&lookup)
            .find(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(EnvironmentError::HomeNotSet)?;

        let xdg = |key: &str, fallback: &[&str]| {
            lookup(key)
                .map(PathBuf::from)
                .filter(|p| p.is_absolute())
                .unwrap_or_else(|| fallback.iter().fold(home.clone(), |acc, c| acc.join(c)))
        };

        Ok(Self {
            config_home: xdg("XDG_CONFIG_HOME", &[".config"]),
            data_home: xdg("XDG_DATA_HOME", &[".local", "share"]),
            cache_home: xdg("XDG_CACHE_HOME", &[".cache"]),
            home,
            hostname,
        })
    }

    /// Where this tool keeps its own state under `data_home`.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.data_home.join(crate::APP_NAME)
    }
}

/// The OS hostname, lossily converted to UTF-8.
#[must_use]
pub fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}
