use shellkit_commons::IoCategory;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a filesystem operation. The underlying error is kept as the
/// source so callers can still inspect its kind.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{op} `{}`: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in `{}`: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    #[error("filesystem task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl FsError {
    /// Build a mapper for `map_err` that tags an [`io::Error`] with the
    /// operation and path it came from.
    pub(crate) fn io(op: &'static str, path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { op, path, source }
    }

    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Glob(error) => Some(error.error()),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Json { source, .. } => source.io_error_kind(),
            other => other.io_error().map(io::Error::kind),
        }
    }

    pub fn category(&self) -> Option<IoCategory> {
        self.io_error().map(IoCategory::of)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_underlying_kind() {
        let error = FsError::io("read", "/missing")(io::Error::from(io::ErrorKind::NotFound));
        assert!(error.is_not_found());
        assert_eq!(error.category(), Some(IoCategory::NotFound));
        assert!(error.to_string().starts_with("read `/missing`"));
    }

    #[test]
    fn json_errors_are_not_io() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = FsError::Json {
            path: PathBuf::from("broken.json"),
            source,
        };
        assert_eq!(error.kind(), None);
        assert!(!error.is_not_found());
    }
}
