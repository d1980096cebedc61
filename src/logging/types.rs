//! Core logging types: entry records, status, and the [`Log`] trait.
use super::event::{Event, Severity};

/// Per-entry result kept for the run summary.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Human-readable entry name (`source -> target`).
    pub name: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail message (skip or failure reason).
    pub message: Option<String>,
}

/// Status of a reconciled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// A new symlink was created.
    Linked,
    /// The target already pointed at the source.
    AlreadyLinked,
    /// Left untouched; rerunning with `--force` would resolve it.
    Skipped,
    /// The entry could not be linked.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) writes through `tracing`;
/// [`MemoryLog`](super::memory::MemoryLog) keeps everything in memory so
/// callers can inspect exactly which events a run produced.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an entry result for the summary.
    fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>);

    /// Whether rendered events should carry ANSI colors.
    fn color(&self) -> bool {
        false
    }

    /// Report a structured reconciliation event at its own severity.
    fn event(&self, event: &Event) {
        let msg = event.render(self.color());
        match event.severity() {
            Severity::Debug => self.debug(&msg),
            Severity::Info => self.info(&msg),
            Severity::Warn => self.warn(&msg),
            Severity::Error => self.error(&msg),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    impl Log for Lines {
        fn stage(&self, msg: &str) {
            self.0.lock().unwrap().push(format!("stage {msg}"));
        }
        fn info(&self, msg: &str) {
            self.0.lock().unwrap().push(format!("info {msg}"));
        }
        fn debug(&self, msg: &str) {
            self.0.lock().unwrap().push(format!("debug {msg}"));
        }
        fn warn(&self, msg: &str) {
            self.0.lock().unwrap().push(format!("warn {msg}"));
        }
        fn error(&self, msg: &str) {
            self.0.lock().unwrap().push(format!("error {msg}"));
        }
        fn record_entry(&self, _: &str, _: EntryStatus, _: Option<&str>) {}
    }

    #[test]
    fn default_event_dispatches_by_severity() {
        let log = Lines::default();
        log.event(&Event::SourceMissing {
            source: PathBuf::from("/d/vimrc"),
        });
        log.event(&Event::AlreadyLinked {
            target: PathBuf::from("/h/.vimrc"),
        });
        let lines = log.0.lock().unwrap();
        assert_eq!(lines[0], "error Source does not exist: /d/vimrc");
        assert_eq!(lines[1], "debug Already linked: /h/.vimrc");
    }

    #[test]
    fn entry_status_equality() {
        assert_eq!(EntryStatus::Linked, EntryStatus::Linked);
        assert_ne!(EntryStatus::Skipped, EntryStatus::Failed);
        assert_ne!(EntryStatus::AlreadyLinked, EntryStatus::Linked);
    }
}
