use glob::{MatchOptions, Pattern};
use shellkit_commons::log::LOG_TARGET;
use shellkit_commons::{Context, LogEntry};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FsError;

/// Knobs for [`glob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobOptions {
    /// Directory patterns are relative to. Defaults to the context's `cwd`.
    pub cwd: Option<PathBuf>,
    pub only_files: bool,
    /// Let wildcards match names starting with `.`.
    pub dot: bool,
    pub case_sensitive: bool,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            only_files: true,
            dot: false,
            case_sensitive: true,
        }
    }
}

impl GlobOptions {
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn only_files(mut self, only_files: bool) -> Self {
        self.only_files = only_files;
        self
    }

    pub fn dot(mut self, dot: bool) -> Self {
        self.dot = dot;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.case_sensitive,
            require_literal_separator: true,
            require_literal_leading_dot: !self.dot,
        }
    }
}

/// Expand glob patterns into the matching paths, relative to the search
/// directory and sorted. Patterns prefixed with `!` remove matches instead
/// of adding them.
pub async fn glob<I, S>(
    ctx: &Context,
    patterns: I,
    options: GlobOptions,
) -> Result<Vec<String>, FsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
    ctx.log(LogEntry::new("glob").args(&patterns));

    let base = match &options.cwd {
        Some(cwd) => ctx.absolutize(cwd),
        None => ctx.cwd().to_path_buf(),
    };

    tokio::task::spawn_blocking(move || expand(&base, &patterns, &options)).await?
}

fn expand(
    base: &Path,
    patterns: &[String],
    options: &GlobOptions,
) -> Result<Vec<String>, FsError> {
    let match_options = options.match_options();
    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for pattern in patterns {
        match pattern.strip_prefix('!') {
            Some(negated) => excludes.push(compile(negated)?),
            None => includes.push(pattern),
        }
    }

    let escaped_base = Pattern::escape(&base.to_string_lossy());
    let mut matches = BTreeSet::new();

    for pattern in includes {
        compile(pattern)?;
        let full = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            format!("{}/{}", escaped_base.trim_end_matches('/'), pattern)
        };

        let walk = glob::glob_with(&full, match_options).map_err(|source| FsError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in walk {
            let path = match entry {
                Ok(path) => path,
                Err(error) if error.error().kind() == io::ErrorKind::PermissionDenied => {
                    debug!(
                        target: LOG_TARGET,
                        path = %error.path().display(),
                        "glob skipped unreadable directory"
                    );
                    continue;
                }
                Err(error) => return Err(error.into()),
            };
            if options.only_files && !path.is_file() {
                continue;
            }

            let shown = path.strip_prefix(base).unwrap_or(&path);
            let shown = shown.to_string_lossy().into_owned();
            if excludes
                .iter()
                .any(|exclude| exclude.matches_with(&shown, match_options))
            {
                continue;
            }
            matches.insert(shown);
        }
    }

    Ok(matches.into_iter().collect())
}

fn compile(pattern: &str) -> Result<Pattern, FsError> {
    Pattern::new(pattern).map_err(|source| FsError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
