//! Shared building blocks for the shellkit crates.
//!
//! Every filesystem and process helper follows the same discipline: join the
//! caller's path segments, resolve them against an explicit [`Context`], log
//! the operation through the context's [`LogSink`], then hand off to the
//! underlying primitive. The pieces of that discipline live here so
//! `shellkit-exec` and `shellkit-fs` stay independent of each other.

pub mod config;
pub mod context;
pub mod errors;
pub mod log;
pub mod paths;

pub use config::{ExecConfig, JsonConfig, JsonIndent, LogConfig, ShellkitConfig, StdioMode};
pub use context::Context;
pub use errors::{IoCategory, is_not_found};
pub use log::{LogEntry, LogSink, MemoryLogSink, NoopLogSink, TracingLogSink};
pub use paths::{PathSpec, join, join_segments};
