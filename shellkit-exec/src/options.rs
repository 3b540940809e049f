use shellkit_commons::{ExecConfig, StdioMode};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Caller-supplied command options. Every field is optional; unset fields
/// fall back to the runner's defaults when the options are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    pub stdin: Option<StdioMode>,
    pub stdout: Option<StdioMode>,
    pub stderr: Option<StdioMode>,
    /// Working directory, resolved against the script context when relative.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables. Merged per key, caller wins.
    pub env: BTreeMap<String, String>,
    pub reject: Option<bool>,
    pub timeout: Option<Duration>,
    /// Program used to interpret shell-mode lines.
    pub shell: Option<String>,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in defaults: inherit every stream and reject failures.
    pub fn defaults() -> Self {
        Self {
            stdin: Some(StdioMode::Inherit),
            stdout: Some(StdioMode::Inherit),
            stderr: Some(StdioMode::Inherit),
            reject: Some(true),
            ..Self::default()
        }
    }

    /// Defaults taken from the `[exec]` configuration section.
    pub fn from_config(config: &ExecConfig) -> Self {
        Self {
            stdin: Some(config.stdio),
            stdout: Some(config.stdio),
            stderr: Some(config.stdio),
            reject: Some(config.reject),
            timeout: config.timeout(),
            shell: config.shell.clone(),
            ..Self::default()
        }
    }

    /// Set all three standard streams.
    pub fn stdio(mut self, mode: StdioMode) -> Self {
        self.stdin = Some(mode);
        self.stdout = Some(mode);
        self.stderr = Some(mode);
        self
    }

    pub fn stdin(mut self, mode: StdioMode) -> Self {
        self.stdin = Some(mode);
        self
    }

    pub fn stdout(mut self, mode: StdioMode) -> Self {
        self.stdout = Some(mode);
        self
    }

    pub fn stderr(mut self, mode: StdioMode) -> Self {
        self.stderr = Some(mode);
        self
    }

    /// Capture stdout and stderr instead of forwarding them.
    pub fn piped(self) -> Self {
        self.stdout(StdioMode::Piped).stderr(StdioMode::Piped)
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn reject(mut self, reject: bool) -> Self {
        self.reject = Some(reject);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn shell(mut self, program: impl Into<String>) -> Self {
        self.shell = Some(program.into());
        self
    }

    /// Overlay `self` on top of `defaults`: any value set here wins.
    pub fn merged_over(&self, defaults: &ExecOptions) -> ExecOptions {
        let mut env = defaults.env.clone();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        ExecOptions {
            stdin: self.stdin.or(defaults.stdin),
            stdout: self.stdout.or(defaults.stdout),
            stderr: self.stderr.or(defaults.stderr),
            cwd: self.cwd.clone().or_else(|| defaults.cwd.clone()),
            env,
            reject: self.reject.or(defaults.reject),
            timeout: self.timeout.or(defaults.timeout),
            shell: self.shell.clone().or_else(|| defaults.shell.clone()),
        }
    }
}

/// Concrete wiring for the three standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdioConfig {
    pub stdin: StdioMode,
    pub stdout: StdioMode,
    pub stderr: StdioMode,
}

impl Default for StdioConfig {
    fn default() -> Self {
        Self {
            stdin: StdioMode::Inherit,
            stdout: StdioMode::Inherit,
            stderr: StdioMode::Inherit,
        }
    }
}
