use async_trait::async_trait;
use parking_lot::Mutex;
use shellkit_commons::StdioMode;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ExecError;
use crate::options::StdioConfig;
use crate::spec::CommandSpec;

/// Shell family used for shell-mode commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellKind {
    Unix,
    Windows,
}

impl ShellKind {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// A fully resolved command, ready to hand to a [`CommandExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub spec: CommandSpec,
    pub shell: ShellKind,
    /// Overrides the platform shell program for shell-mode commands.
    pub shell_program: Option<String>,
    pub working_dir: PathBuf,
    pub env: BTreeMap<String, String>,
    pub stdio: StdioConfig,
    pub reject: bool,
    pub timeout: Option<Duration>,
}

impl CommandInvocation {
    pub fn new(spec: CommandSpec, working_dir: PathBuf) -> Self {
        Self {
            spec,
            shell: ShellKind::current(),
            shell_program: None,
            working_dir,
            env: BTreeMap::new(),
            stdio: StdioConfig::default(),
            reject: true,
            timeout: None,
        }
    }

    pub fn display(&self) -> String {
        self.spec.display()
    }
}

/// Describes the exit status of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    success: bool,
    code: Option<i32>,
    signal: Option<i32>,
}

impl CommandStatus {
    pub fn new(success: bool, code: Option<i32>) -> Self {
        Self {
            success,
            code,
            signal: None,
        }
    }

    pub fn with_signal(mut self, signal: i32) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Signal that terminated the child (Unix only).
    pub fn signal(&self) -> Option<i32> {
        self.signal
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        let converted = Self::new(status.success(), status.code());

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return converted.with_signal(signal);
            }
        }

        converted
    }
}

/// Output produced by the executor for a command invocation. Streams that
/// were inherited or nulled come back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::new(true, Some(0)),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Turn an unsuccessful status into the matching [`ExecError`].
    pub fn check(self, command: &str) -> Result<Self, ExecError> {
        if self.status.success() {
            return Ok(self);
        }

        if let Some(signal) = self.status.signal() {
            return Err(ExecError::Signal {
                command: command.to_owned(),
                signal,
                output: Box::new(self),
            });
        }

        Err(ExecError::NonZeroExit {
            command: command.to_owned(),
            code: self.status.code().unwrap_or(-1),
            output: Box::new(self),
        })
    }
}

/// Trait implemented by concrete command execution strategies.
///
/// Executors report the child's raw outcome. Turning a failed status into an
/// error is left to the runner, which knows the caller's `reject` choice.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput, ExecError>;
}

/// Spawns real processes through [`tokio::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self
    }

    fn build_command(invocation: &CommandInvocation) -> tokio::process::Command {
        let mut command = match &invocation.spec {
            CommandSpec::Exec { program, args } => {
                let mut command = tokio::process::Command::new(program);
                command.args(args);
                command
            }
            CommandSpec::Shell(line) => match invocation.shell {
                ShellKind::Unix => {
                    let program = invocation.shell_program.as_deref().unwrap_or("/bin/sh");
                    let mut command = tokio::process::Command::new(program);
                    command.arg("-c").arg(line);
                    command
                }
                ShellKind::Windows => {
                    let program = invocation
                        .shell_program
                        .as_deref()
                        .unwrap_or("powershell");
                    let mut command = tokio::process::Command::new(program);
                    command
                        .arg("-NoProfile")
                        .arg("-NonInteractive")
                        .arg("-Command")
                        .arg(line);
                    command
                }
            },
        };

        command
            .current_dir(&invocation.working_dir)
            .envs(&invocation.env)
            .stdin(to_stdio(invocation.stdio.stdin))
            .stdout(to_stdio(invocation.stdio.stdout))
            .stderr(to_stdio(invocation.stdio.stderr))
            .kill_on_drop(true);
        command
    }
}

fn to_stdio(mode: StdioMode) -> std::process::Stdio {
    match mode {
        StdioMode::Inherit => std::process::Stdio::inherit(),
        StdioMode::Piped => std::process::Stdio::piped(),
        StdioMode::Null => std::process::Stdio::null(),
    }
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput, ExecError> {
        let mut command = Self::build_command(invocation);
        let child = command.spawn().map_err(|source| ExecError::Spawn {
            command: invocation.display(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, and
        // `kill_on_drop` reaps it.
        let waited = match invocation.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecError::TimedOut {
                    command: invocation.display(),
                    timeout: limit,
                })?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| ExecError::Wait {
            command: invocation.display(),
            source,
        })?;

        Ok(CommandOutput {
            status: CommandStatus::from(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Records invocations without running anything. Every command succeeds
/// with empty output.
#[derive(Debug, Default, Clone)]
pub struct DryRunCommandExecutor {
    invocations: Arc<Mutex<Vec<CommandInvocation>>>,
}

impl DryRunCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged_invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl CommandExecutor for DryRunCommandExecutor {
    async fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput, ExecError> {
        self.invocations.lock().push(invocation.clone());
        Ok(CommandOutput::success(String::new()))
    }
}
