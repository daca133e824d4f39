//! Change events as seen by the dispatch loop.

use std::fmt;
use std::path::PathBuf;

use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};

/// Kind of change reported for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File contents written.
    Write,
    /// File created.
    Create,
    /// File renamed (either side of the rename).
    Rename,
    /// Permissions, timestamps or other attributes changed.
    Metadata,
    /// File deleted.
    Remove,
    /// File opened, read or closed.
    Access,
    /// Anything the backend could not classify.
    Other,
}

impl ChangeKind {
    /// Whether a change of this kind can trigger the command.
    pub fn is_actionable(self) -> bool {
        matches!(
            self,
            ChangeKind::Write | ChangeKind::Create | ChangeKind::Rename
        )
    }
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Other) => ChangeKind::Write,
            // inotify reports a rename as From, To and then Both; the pair
            // already covers each side.
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => ChangeKind::Other,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Metadata,
            EventKind::Remove(_) => ChangeKind::Remove,
            EventKind::Access(_) => ChangeKind::Access,
            EventKind::Any | EventKind::Other => ChangeKind::Other,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Write => "write",
            ChangeKind::Create => "create",
            ChangeKind::Rename => "rename",
            ChangeKind::Metadata => "metadata",
            ChangeKind::Remove => "remove",
            ChangeKind::Access => "access",
            ChangeKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A single path change delivered by the notification source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a notify event into one change event per path.
    pub fn from_notify(event: notify::Event) -> Vec<ChangeEvent> {
        let kind = ChangeKind::from(&event.kind);
        event
            .paths
            .into_iter()
            .map(|path| ChangeEvent { path, kind })
            .collect()
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path.display())
    }
}
