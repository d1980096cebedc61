//! In-memory logger that keeps every message and event.
use std::sync::Mutex;

use super::event::Event;
use super::types::{EntryRecord, EntryStatus, Log};

/// A single captured display message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A stage header.
    Stage(String),
    /// An informational message.
    Info(String),
    /// A debug message.
    Debug(String),
    /// A warning.
    Warn(String),
    /// An error.
    Error(String),
}

/// Implement the display methods of [`Log`] by pushing the message into
/// `self.lines` as the corresponding [`Line`] variant.
macro_rules! capture_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.lines.lock() {
                    guard.push(Line::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Logger that records output instead of printing it.
///
/// Events are kept both in structured form (see [`MemoryLog::events`]) and
/// as rendered lines, so callers can assert on either.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<Line>>,
    events: Mutex<Vec<Event>>,
    entries: Mutex<Vec<EntryRecord>>,
}

impl MemoryLog {
    /// Create an empty in-memory logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All display lines captured so far.
    #[must_use]
    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// All structured events captured so far, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// All entry results recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

impl Log for MemoryLog {
    capture_log_methods! {
        stage => Stage,
        info  => Info,
        debug => Debug,
        warn  => Warn,
        error => Error,
    }

    fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(EntryRecord {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    fn event(&self, event: &Event) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
        let msg = event.render(false);
        match event.severity() {
            super::Severity::Debug => self.debug(&msg),
            super::Severity::Info => self.info(&msg),
            super::Severity::Warn => self.warn(&msg),
            super::Severity::Error => self.error(&msg),
        }
    }
}
