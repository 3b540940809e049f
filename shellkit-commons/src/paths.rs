use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

/// A filepath argument given either as one path or as segments that are
/// joined left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec {
    Single(PathBuf),
    Segments(Vec<PathBuf>),
}

impl PathSpec {
    /// Join the specification into a single, lexically clean path.
    pub fn join(&self) -> PathBuf {
        match self {
            Self::Single(path) => join_segments(std::slice::from_ref(path)),
            Self::Segments(segments) => join_segments(segments),
        }
    }
}

/// Join one or many path segments into a single path.
pub fn join(spec: impl Into<PathSpec>) -> PathBuf {
    spec.into().join()
}

/// Join segments the way a script author would by gluing them with the
/// platform separator.
///
/// - empty segments are skipped
/// - only the first non-empty segment may contribute a root; later roots and
///   prefixes are dropped instead of restarting the path
/// - the result is cleaned lexically, and an empty result becomes `.`
pub fn join_segments<I, P>(segments: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut joined = PathBuf::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.as_os_str().is_empty() {
            continue;
        }

        if joined.as_os_str().is_empty() {
            joined.push(segment);
            continue;
        }

        for component in segment.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {}
                other => joined.push(other.as_os_str()),
            }
        }
    }

    if joined.as_os_str().is_empty() {
        return PathBuf::from(".");
    }
    joined.clean()
}

impl From<&str> for PathSpec {
    fn from(value: &str) -> Self {
        Self::Single(PathBuf::from(value))
    }
}

impl From<String> for PathSpec {
    fn from(value: String) -> Self {
        Self::Single(PathBuf::from(value))
    }
}

impl From<&String> for PathSpec {
    fn from(value: &String) -> Self {
        Self::Single(PathBuf::from(value))
    }
}

impl From<&Path> for PathSpec {
    fn from(value: &Path) -> Self {
        Self::Single(value.to_path_buf())
    }
}

impl From<PathBuf> for PathSpec {
    fn from(value: PathBuf) -> Self {
        Self::Single(value)
    }
}

impl From<&PathBuf> for PathSpec {
    fn from(value: &PathBuf) -> Self {
        Self::Single(value.clone())
    }
}

impl<P: AsRef<Path>> From<Vec<P>> for PathSpec {
    fn from(value: Vec<P>) -> Self {
        Self::Segments(value.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl<P: AsRef<Path>> From<&[P]> for PathSpec {
    fn from(value: &[P]) -> Self {
        Self::Segments(value.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl<P: AsRef<Path>, const N: usize> From<[P; N]> for PathSpec {
    fn from(value: [P; N]) -> Self {
        Self::Segments(value.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}
