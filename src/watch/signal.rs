//! Raw filesystem signals and their classification.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};

/// What a raw filesystem signal says happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// The path was created, or another file was renamed onto it.
    Create,
    /// The path's content was written.
    Write,
    /// Anything else (access, metadata, removal, rename away).
    Other,
}

impl SignalKind {
    /// Classifies a notify event kind for its primary path.
    #[must_use]
    pub const fn of(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                Self::Create
            }
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Self::Write,
            _ => Self::Other,
        }
    }

    /// Returns true for kinds that can change a file's content.
    #[must_use]
    pub const fn is_content_change(self) -> bool {
        matches!(self, Self::Create | Self::Write)
    }
}

/// One raw signal for one path, as delivered by the notification primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignal {
    /// The path the signal refers to.
    pub path: PathBuf,
    /// What happened to the path.
    pub kind: SignalKind,
}

impl RawSignal {
    /// Creates a signal.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: SignalKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Splits a notify event into one signal per path.
    ///
    /// A rename reported with both endpoints yields `Other` for the source
    /// path and `Create` for the destination path.
    #[must_use]
    pub fn from_event(event: &notify::Event) -> Vec<Self> {
        if matches!(event.kind, EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            && event.paths.len() == 2
        {
            return vec![
                Self::new(&event.paths[0], SignalKind::Other),
                Self::new(&event.paths[1], SignalKind::Create),
            ];
        }

        let kind = SignalKind::of(&event.kind);
        event
            .paths
            .iter()
            .map(|path| Self::new(path, kind))
            .collect()
    }

    /// Returns true if this signal means `watched` may have new content.
    #[must_use]
    pub fn is_relevant_to(&self, watched: &Path) -> bool {
        self.kind.is_content_change() && self.path == watched
    }
}
