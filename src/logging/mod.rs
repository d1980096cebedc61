//! Logging infrastructure for structured console and file output.

mod event;
mod logger;
mod memory;
mod subscriber;
mod types;
mod utils;

pub use event::{Event, Severity};
pub use logger::{Logger, linked_count_line};
pub use memory::{Line, MemoryLog};
pub use subscriber::init_subscriber;
pub use types::{EntryRecord, EntryStatus, Log};
pub use utils::log_file_path;

/// Create a Logger backed by an isolated per-thread tracing subscriber
/// with a [`FileLayer`](subscriber::FileLayer), so that tracing events emitted
/// by logger methods actually reach the log file during tests.
///
/// The returned [`tracing::dispatcher::DefaultGuard`] must be kept alive for
/// the duration of the test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = log_file_path(tmp.path(), "test").expect("failed to create log dir");
    let file_layer = subscriber::FileLayer::new(&path).expect("failed to create file layer");
    let log = Logger::new(Some(path), false);
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
