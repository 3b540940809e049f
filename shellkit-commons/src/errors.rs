//! Classification of I/O failures.
//!
//! Filesystem helpers propagate the original [`io::Error`]; callers that need
//! to branch do so on the structured [`io::ErrorKind`], never on message text.

use std::io;

/// Coarse category of an I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoCategory {
    /// The path does not exist.
    NotFound,
    /// OS-level permission denial (EACCES, EPERM).
    PermissionDenied,
    /// The path already exists where a new entry was expected.
    AlreadyExists,
    /// A directory was expected but something else was found, or vice versa.
    WrongEntryType,
    Other,
}

impl IoCategory {
    pub fn of(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::NotADirectory | io::ErrorKind::IsADirectory => Self::WrongEntryType,
            _ => Self::Other,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::AlreadyExists => "already exists",
            Self::WrongEntryType => "wrong entry type",
            Self::Other => "i/o failure",
        }
    }
}

/// True when the error means "nothing at that path".
#[inline]
pub fn is_not_found(error: &io::Error) -> bool {
    IoCategory::of(error) == IoCategory::NotFound
}
