use path_clean::PathClean;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::log::{LogEntry, LogSink, TracingLogSink};
use crate::paths::PathSpec;

/// Explicit state carried by a script: the directory relative paths resolve
/// against, and the sink every operation logs to.
///
/// Nothing here touches the process-wide working directory. Changing
/// directory mutates this value, so two contexts never observe each other's
/// `cd`.
#[derive(Clone)]
pub struct Context {
    cwd: PathBuf,
    log: Arc<dyn LogSink>,
}

impl Context {
    /// Create a context rooted at `cwd` that logs through `tracing`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            log: Arc::new(TracingLogSink),
        }
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log = sink;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Replace the base directory. Callers are expected to have validated
    /// that `cwd` is an existing directory.
    pub fn set_cwd(&mut self, cwd: impl Into<PathBuf>) {
        self.cwd = cwd.into();
    }

    pub fn log_sink(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    /// Join a path specification and resolve it against the base directory.
    pub fn resolve(&self, spec: impl Into<PathSpec>) -> PathBuf {
        self.absolutize(&spec.into().join())
    }

    /// Resolve an already-joined path against the base directory.
    pub fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path).clean()
        }
    }

    pub fn log(&self, entry: LogEntry) {
        self.log.log(&entry);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("cwd", &self.cwd).finish()
    }
}
