//! Change events flowing from the detector to the reconciler.

use std::fmt;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The path appeared.
    Created,
    /// The contents changed.
    Modified,
    /// The path disappeared.
    Deleted,
    /// The path was one side of a rename.
    Renamed,
}

impl EventKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event reported by the change detector. Identity is path and kind only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawEvent {
    /// Vault-relative path.
    pub path: String,
    /// What happened.
    pub kind: EventKind,
}

impl RawEvent {
    /// Creates an event.
    pub fn new(path: impl Into<String>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// A change that has been quiet for the debounce period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledEvent {
    /// Vault-relative path.
    pub path: String,
    /// The last kind reported for the path.
    pub kind: EventKind,
}
