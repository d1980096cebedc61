//! Tracing-backed logger with per-entry summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{EntryRecord, EntryStatus, Log};
use super::utils::paint;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// `record_entry` is **not** included because its signature differs from the
/// `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger used by the command line front end.
///
/// Messages go through `tracing`, so whatever subscriber
/// [`init_subscriber`](super::subscriber::init_subscriber) installed decides
/// where they end up.  Entry results are kept for [`Logger::print_summary`].
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<EntryRecord>>,
    log_file: Option<PathBuf>,
    color: bool,
}

impl Logger {
    /// Create a new logger.
    ///
    /// `log_file` is only shown in the summary; the file itself is written by
    /// [`FileLayer`](super::subscriber::FileLayer).
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>, color: bool) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
            color,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "dotlink::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record an entry result for the summary.
    pub fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(EntryRecord {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed entries.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(EntryStatus::Failed)
    }

    fn count(&self, status: EntryStatus) -> usize {
        self.entries
            .lock()
            .map_or(0, |guard| guard.iter().filter(|e| e.status == status).count())
    }

    /// Print the per-entry list followed by the linked-count line.
    pub fn print_summary(&self, force: bool) {
        let entries = self.entries();

        if !entries.is_empty() {
            self.stage("Summary");
            for entry in &entries {
                let (icon, code) = match entry.status {
                    EntryStatus::Linked => ("✓", "32"),
                    EntryStatus::AlreadyLinked => ("·", "2"),
                    EntryStatus::Skipped => ("○", "33"),
                    EntryStatus::Failed => ("✗", "31"),
                };
                let suffix = entry
                    .message
                    .as_ref()
                    .map_or_else(String::new, |msg| format!(" ({msg})"));
                self.info(&paint(
                    self.color,
                    code,
                    &format!("{icon} {}{suffix}", entry.name),
                ));
            }
        }

        if force {
            self.info("Force mode enabled");
        }
        self.info(&linked_count_line(
            self.count(EntryStatus::Linked),
            entries.len(),
        ));

        if let Some(path) = self.log_path() {
            self.info(&paint(self.color, "2", &format!("log: {}", path.display())));
        }
    }
}

/// `No new dotfiles linked.`, `All N dotfiles linked.` or `K of N dotfiles linked.`
#[must_use]
pub fn linked_count_line(linked: usize, total: usize) -> String {
    if linked == 0 {
        "No new dotfiles linked.".to_string()
    } else if linked == total {
        format!("All {total} dotfiles linked.")
    } else {
        format!("{linked} of {total} dotfiles linked.")
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        self.record_entry(name, status, message);
    }

    fn color(&self) -> bool {
        self.color
    }
}
