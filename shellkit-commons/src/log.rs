use parking_lot::Mutex;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Tracing target shared by every operation log line.
pub const LOG_TARGET: &str = "shellkit";

/// A single operation record: the operation name followed by the tokens it
/// acted on (paths, modes, command arguments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub op: Cow<'static, str>,
    pub args: Vec<String>,
    /// Optional discriminator, e.g. `shell` or `exec` for command lines.
    pub mode: Option<&'static str>,
}

impl LogEntry {
    pub fn new(op: impl Into<Cow<'static, str>>) -> Self {
        Self {
            op: op.into(),
            args: Vec::new(),
            mode: None,
        }
    }

    pub fn mode(mut self, mode: &'static str) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    pub fn path(self, path: &Path) -> Self {
        self.arg(path.display())
    }

    pub fn args<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        self.args.extend(values.into_iter().map(|v| v.to_string()));
        self
    }

    /// Render as a shell-like line, quoting arguments that need it.
    pub fn render(&self) -> String {
        let mut line = self.op.to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_escape::escape(Cow::Borrowed(arg.as_str())));
        }
        line
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Destination for operation records. Fire-and-forget: sinks never report
/// failures back to the operation that logged.
pub trait LogSink: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// Emits each entry as an `info` event on the `shellkit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, entry: &LogEntry) {
        info!(target: LOG_TARGET, op = %entry.op, mode = entry.mode, "{entry}");
    }
}

/// Drops every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn log(&self, _entry: &LogEntry) {}
}

/// Keeps entries in memory so tests can assert on what was logged.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.entries.lock().iter().map(LogEntry::render).collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}
