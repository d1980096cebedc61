//! Structured reconciliation events and their single text renderer.
//!
//! The reconciler never formats strings itself: it emits an [`Event`] and
//! the [`Log`](super::Log) backend decides how to present it.  Color policy
//! lives entirely in [`Event::render`].
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::utils::paint;
use crate::classify::FileKind;

const GREEN: &str = "0;32";
const YELLOW: &str = "0;33";
const RED: &str = "0;31";

/// Level at which an [`Event`] is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Only shown with `--verbose`; always written to the log file.
    Debug,
    /// Progress message.
    Info,
    /// Something the user can fix (usually by rerunning with `--force`).
    Warn,
    /// The entry could not be completed.
    Error,
}

/// One notable action or decision taken while reconciling an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A missing parent directory was created.
    DirectoryCreated {
        /// Directory that now exists.
        path: PathBuf,
    },
    /// A missing parent directory could not be created.
    DirectoryFailed {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying error text.
        reason: String,
    },
    /// The target holds a real file or directory.
    TargetOccupied {
        /// What occupies the target.
        kind: FileKind,
        /// Resolved target path.
        target: PathBuf,
    },
    /// The existing target was adopted as the new source.
    MovedToSource {
        /// Where the content was.
        target: PathBuf,
        /// Where the content is now.
        source: PathBuf,
    },
    /// Adopting the target as source failed.
    MoveFailed {
        /// Resolved target path.
        target: PathBuf,
        /// Resolved source path.
        source: PathBuf,
        /// Underlying error text.
        reason: String,
    },
    /// Force mode moved the target aside to a conflict backup.
    ConflictBackup {
        /// Resolved target path.
        target: PathBuf,
        /// Chosen `.conflict` path.
        backup: PathBuf,
    },
    /// Moving the target to its conflict backup failed.
    BackupFailed {
        /// Resolved target path.
        target: PathBuf,
        /// Underlying error text.
        reason: String,
    },
    /// Source and target both hold content and force is off.
    BothExist {
        /// Resolved source path.
        source: PathBuf,
    },
    /// Force mode removed an existing symlink at the target.
    SymlinkRemoved {
        /// Resolved target path.
        target: PathBuf,
    },
    /// A foreign symlink was left at the target because force is off.
    TargetIsSymlink {
        /// Resolved target path.
        target: PathBuf,
    },
    /// The target already points at the source.
    AlreadyLinked {
        /// Resolved target path.
        target: PathBuf,
    },
    /// The source does not exist.
    SourceMissing {
        /// Resolved source path.
        source: PathBuf,
    },
    /// The source is a symlink; linking through it is refused.
    SourceIsSymlink {
        /// Resolved source path.
        source: PathBuf,
    },
    /// A path exists but could not be inspected.
    Unreadable {
        /// Offending path.
        path: PathBuf,
    },
    /// The entry resolves to a path that is never touched.
    UnsafeEntry {
        /// Resolved path that was refused.
        path: PathBuf,
        /// Why the path was refused.
        reason: String,
    },
    /// Resolution ran but the target is still occupied.
    TargetStillOccupied {
        /// Resolved target path.
        target: PathBuf,
    },
    /// A symlink was created.
    Linked {
        /// Resolved source path.
        source: PathBuf,
        /// Resolved target path.
        target: PathBuf,
    },
    /// The symlink call failed.
    LinkFailed {
        /// Resolved target path.
        target: PathBuf,
        /// Underlying error text.
        reason: String,
    },
    /// A stale link recorded in the registry was removed.
    Pruned {
        /// Removed target path.
        target: PathBuf,
    },
    /// A stale link could not be removed.
    PruneFailed {
        /// Target path that is still present.
        target: PathBuf,
        /// Underlying error text.
        reason: String,
    },
}

impl Event {
    /// Level at which this event is reported.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::AlreadyLinked { .. } => Severity::Debug,
            Self::DirectoryCreated { .. }
            | Self::MovedToSource { .. }
            | Self::ConflictBackup { .. }
            | Self::SymlinkRemoved { .. }
            | Self::Linked { .. }
            | Self::Pruned { .. } => Severity::Info,
            Self::TargetOccupied { .. } | Self::BothExist { .. } | Self::TargetIsSymlink { .. } => {
                Severity::Warn
            }
            Self::DirectoryFailed { .. }
            | Self::MoveFailed { .. }
            | Self::BackupFailed { .. }
            | Self::SourceMissing { .. }
            | Self::SourceIsSymlink { .. }
            | Self::Unreadable { .. }
            | Self::UnsafeEntry { .. }
            | Self::TargetStillOccupied { .. }
            | Self::LinkFailed { .. }
            | Self::PruneFailed { .. } => Severity::Error,
        }
    }

    /// Render the event as a single message, optionally with ANSI colors.
    #[must_use]
    pub fn render(&self, color: bool) -> String {
        let p = Painter { color };
        match self {
            Self::DirectoryCreated { path } => p.field("Created directory", path),
            Self::DirectoryFailed { path, reason } => {
                p.note(&p.field("Couldn't create directory", path), reason)
            }
            Self::TargetOccupied { kind, target } => {
                p.field(&format!("Target is a {kind}"), target)
            }
            Self::MovedToSource { target, source } => {
                p.arrow("Moving before linking", target, source)
            }
            Self::MoveFailed {
                target,
                source,
                reason,
            } => p.note(&p.arrow("Couldn't move before linking", target, source), reason),
            Self::ConflictBackup { target, backup } => p.arrow(
                "Both source and target exist, forcing move out of the way",
                target,
                backup,
            ),
            Self::BackupFailed { target, reason } => {
                p.note(&p.field("Couldn't backup target, skipping", target), reason)
            }
            Self::BothExist { source } => p.note(
                &p.field("Both source and target exist. Skipping", source),
                "Use --force to override.",
            ),
            Self::SymlinkRemoved { target } => p.field("Removed existing symlink", target),
            Self::TargetIsSymlink { target } => p.note(
                &p.field("Target is a symlink. Skipping", target),
                "Use --force to replace it.",
            ),
            Self::AlreadyLinked { target } => p.field("Already linked", target),
            Self::SourceMissing { source } => p.field("Source does not exist", source),
            Self::SourceIsSymlink { source } => p.field("Source is a symlink", source),
            Self::Unreadable { path } => p.field("Cannot inspect path", path),
            Self::UnsafeEntry { path, reason } => {
                p.note(&p.field("Refusing to link", path), reason)
            }
            Self::TargetStillOccupied { target } => p.field("Target is still occupied", target),
            Self::Linked { source, target } => p.arrow("Linking", source, target),
            Self::LinkFailed { target, reason } => {
                p.note(&p.field("Error linking", target), reason)
            }
            Self::Pruned { target } => p.field("Removed stale link", target),
            Self::PruneFailed { target, reason } => {
                p.note(&p.field("Couldn't remove stale link", target), reason)
            }
        }
    }
}

/// Applies the optional color scheme to the three message shapes.
struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, code: &str, text: &str) -> String {
        paint(self.color, code, text)
    }

    /// `<prefix>: <path>`
    fn field(&self, prefix: &str, path: &Path) -> String {
        format!(
            "{prefix}: {}",
            self.paint(YELLOW, &path.display().to_string())
        )
    }

    /// `<prefix>: <from> => <to>`
    fn arrow(&self, prefix: &str, from: &Path, to: &Path) -> String {
        format!(
            "{prefix}: {} => {}",
            self.paint(GREEN, &from.display().to_string()),
            self.paint(YELLOW, &to.display().to_string())
        )
    }

    /// Append a second line with extra detail.
    fn note(&self, head: &str, detail: &str) -> String {
        let mut out = head.to_string();
        let _ = write!(out, "\n{}", self.paint(RED, detail));
        out
    }
}
