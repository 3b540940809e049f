//! # shellkit
//!
//! Logged filesystem and process helpers for build scripts and task runners.
//!
//! Every helper follows the same discipline: accept a path (or a list of
//! path segments), join and resolve it against the script's working
//! directory, log what is about to happen, then await the underlying
//! `tokio::fs` or `tokio::process` call. The working directory lives in an
//! explicit [`Context`] owned by the [`Shell`], never in the process.
//!
//! ## Workspace
//!
//! - [`shellkit_commons`]: path joining, [`Context`], log sinks, configuration.
//! - [`shellkit_exec`]: the dual-mode command runner.
//! - [`shellkit_fs`]: filesystem operations.
//!
//! ## Example
//!
//! ```no_run
//! use shellkit::{ExecOptions, Shell};
//!
//! # async fn build() -> anyhow::Result<()> {
//! shellkit::init_tracing();
//! let mut sh = Shell::from_current_dir()?;
//!
//! sh.empty_dir("dist").await?;
//! sh.run("cargo build --release", ExecOptions::new()).await?;
//! sh.cp(["target", "release", "app"], "dist").await?;
//!
//! // Arguments are passed verbatim, no shell parsing.
//! sh.exec("git", ["tag", "-a", "v1.0", "-m", "release; 1.0"], ExecOptions::new())
//!     .await?;
//!
//! sh.cd("dist").await?;
//! for file in sh.glob(["**/*", "!**/*.d"], Default::default()).await? {
//!     println!("{file}");
//! }
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;

pub mod logging;

pub use logging::{DEFAULT_FILTER, init_tracing};
pub use shellkit_commons::{
    Context, ExecConfig, IoCategory, JsonConfig, JsonIndent, LogConfig, LogEntry, LogSink,
    MemoryLogSink, NoopLogSink, PathSpec, ShellkitConfig, StdioMode, TracingLogSink, join,
    join_segments,
};
pub use shellkit_exec::{
    CommandExecutor, CommandMode, CommandOutput, CommandRunner, CommandSpec, CommandStatus,
    DryRunCommandExecutor, ExecError, ExecOptions, ProcessCommandExecutor,
};
pub use shellkit_fs::{FsError, GlobOptions, JsonWriteOptions};

/// A script's working state: its [`Context`], a command runner configured
/// from [`ShellkitConfig`], and the JSON layout used by [`Shell::write_json`].
///
/// Methods that change directory take `&mut self`, so a `cd` can never race
/// with an operation that depends on it.
pub struct Shell<E: CommandExecutor = ProcessCommandExecutor> {
    ctx: Context,
    runner: CommandRunner<E>,
    json: JsonWriteOptions,
}

impl Shell {
    /// A shell rooted at `cwd` with built-in defaults and no config files.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::with_config(cwd, &ShellkitConfig::default())
    }

    pub fn with_config(cwd: impl Into<PathBuf>, config: &ShellkitConfig) -> Self {
        Self::with_executor(cwd, ProcessCommandExecutor::new(), config)
    }

    /// A shell rooted at `cwd`, configured from the user and workspace
    /// `shellkit.toml` layers.
    pub fn load(cwd: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let cwd = cwd.into();
        let config = ShellkitConfig::load(&cwd)?;
        Ok(Self::with_config(cwd, &config))
    }

    /// [`Shell::load`] rooted at the process's current directory.
    pub fn from_current_dir() -> anyhow::Result<Self> {
        Self::load(std::env::current_dir()?)
    }
}

impl<E: CommandExecutor> Shell<E> {
    pub fn with_executor(cwd: impl Into<PathBuf>, executor: E, config: &ShellkitConfig) -> Self {
        let mut ctx = Context::new(cwd);
        if !config.log.enabled {
            ctx = ctx.with_log_sink(Arc::new(NoopLogSink));
        }

        Self {
            ctx,
            runner: CommandRunner::new(executor)
                .with_defaults(ExecOptions::from_config(&config.exec)),
            json: JsonWriteOptions::from(&config.json),
        }
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.ctx = self.ctx.with_log_sink(sink);
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn runner(&self) -> &CommandRunner<E> {
        &self.runner
    }

    pub fn json_options(&self) -> &JsonWriteOptions {
        &self.json
    }

    /// Resolve a path specification against the current directory without
    /// touching the filesystem.
    pub fn path(&self, spec: impl Into<PathSpec>) -> PathBuf {
        self.ctx.resolve(spec)
    }

    // Commands

    /// Run a shell line (`"make && make install"`) or a `(program, args)`
    /// pair, depending on what `spec` converts from.
    pub async fn run(
        &self,
        spec: impl Into<CommandSpec>,
        options: ExecOptions,
    ) -> Result<CommandOutput, ExecError> {
        self.runner.run(&self.ctx, spec, options).await
    }

    pub async fn exec<I, A>(
        &self,
        program: impl Into<String>,
        args: I,
        options: ExecOptions,
    ) -> Result<CommandOutput, ExecError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.runner.exec(&self.ctx, program, args, options).await
    }

    pub async fn shell(
        &self,
        line: impl Into<String>,
        options: ExecOptions,
    ) -> Result<CommandOutput, ExecError> {
        self.runner.shell(&self.ctx, line, options).await
    }

    // Filesystem

    pub async fn read_json<T: DeserializeOwned>(
        &self,
        path: impl Into<PathSpec>,
    ) -> Result<T, FsError> {
        shellkit_fs::read_json(&self.ctx, path).await
    }

    /// Write `value` as JSON using the configured indentation.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: impl Into<PathSpec>,
        value: &T,
    ) -> Result<(), FsError> {
        shellkit_fs::write_json(&self.ctx, path, value, &self.json).await
    }

    pub async fn mkdirp<I, P>(&self, paths: I) -> Result<(), FsError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathSpec>,
    {
        shellkit_fs::mkdirp(&self.ctx, paths).await
    }

    pub async fn glob<I, S>(
        &self,
        patterns: I,
        options: GlobOptions,
    ) -> Result<Vec<String>, FsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        shellkit_fs::glob(&self.ctx, patterns, options).await
    }

    pub async fn write(
        &self,
        path: impl Into<PathSpec>,
        contents: impl AsRef<[u8]>,
    ) -> Result<(), FsError> {
        shellkit_fs::write(&self.ctx, path, contents).await
    }

    pub async fn read(&self, path: impl Into<PathSpec>) -> Result<Vec<u8>, FsError> {
        shellkit_fs::read(&self.ctx, path).await
    }

    pub async fn read_to_string(&self, path: impl Into<PathSpec>) -> Result<String, FsError> {
        shellkit_fs::read_to_string(&self.ctx, path).await
    }

    pub async fn cd(&mut self, path: impl Into<PathSpec>) -> Result<(), FsError> {
        shellkit_fs::cd(&mut self.ctx, path).await
    }

    pub async fn ls(&self, path: impl Into<PathSpec>) -> Result<Vec<String>, FsError> {
        shellkit_fs::ls(&self.ctx, path).await
    }

    /// Copy into a directory, over a file, or to a new path. Returns where
    /// the copy landed.
    pub async fn cp(
        &self,
        from: impl Into<PathSpec>,
        to: impl Into<PathSpec>,
    ) -> Result<PathBuf, FsError> {
        shellkit_fs::cp(&self.ctx, from, to).await
    }

    pub async fn rm<I, P>(&self, paths: I) -> Result<(), FsError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathSpec>,
    {
        shellkit_fs::rm(&self.ctx, paths).await
    }

    pub async fn mv(
        &self,
        from: impl Into<PathSpec>,
        to: impl Into<PathSpec>,
    ) -> Result<PathBuf, FsError> {
        shellkit_fs::mv(&self.ctx, from, to).await
    }

    pub async fn exists(&self, path: impl Into<PathSpec>) -> Result<bool, FsError> {
        shellkit_fs::exists(&self.ctx, path).await
    }

    pub fn cwd(&self) -> PathBuf {
        shellkit_fs::cwd(&self.ctx)
    }

    pub async fn chmod(&self, path: impl Into<PathSpec>, mode: u32) -> Result<(), FsError> {
        shellkit_fs::chmod(&self.ctx, path, mode).await
    }

    pub async fn tmp_dir(&self) -> Result<PathBuf, FsError> {
        shellkit_fs::tmp_dir(&self.ctx).await
    }

    pub async fn empty_dir(&self, path: impl Into<PathSpec>) -> Result<(), FsError> {
        shellkit_fs::empty_dir(&self.ctx, path).await
    }

    pub fn home(&self) -> Option<PathBuf> {
        shellkit_fs::home(&self.ctx)
    }
}

impl<E: CommandExecutor> std::fmt::Debug for Shell<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("ctx", &self.ctx)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}
