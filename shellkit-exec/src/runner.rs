use shellkit_commons::{Context, LogEntry};

use crate::error::ExecError;
use crate::executor::{
    CommandExecutor, CommandInvocation, CommandOutput, ProcessCommandExecutor, ShellKind,
};
use crate::options::{ExecOptions, StdioConfig};
use crate::spec::CommandSpec;

/// Operation name recorded for every command line.
pub const COMMAND_LOG_OP: &str = "$";

/// Entry point for running commands in either calling convention.
///
/// The runner merges caller options over its defaults, resolves the working
/// directory against the script [`Context`], logs the command, and hands the
/// invocation to its executor. Failures are returned unchanged; nothing is
/// retried.
pub struct CommandRunner<E: CommandExecutor = ProcessCommandExecutor> {
    executor: E,
    defaults: ExecOptions,
    shell: ShellKind,
}

impl Default for CommandRunner<ProcessCommandExecutor> {
    fn default() -> Self {
        Self::new(ProcessCommandExecutor::new())
    }
}

impl<E: CommandExecutor> CommandRunner<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            defaults: ExecOptions::defaults(),
            shell: ShellKind::current(),
        }
    }

    /// Layer `defaults` over the built-in defaults.
    pub fn with_defaults(mut self, defaults: ExecOptions) -> Self {
        self.defaults = defaults.merged_over(&ExecOptions::defaults());
        self
    }

    pub fn with_shell_kind(mut self, shell: ShellKind) -> Self {
        self.shell = shell;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn defaults(&self) -> &ExecOptions {
        &self.defaults
    }

    /// Run a command in whichever mode `spec` selects: a string runs through
    /// the shell, a `(program, args)` pair is spawned directly.
    pub async fn run(
        &self,
        ctx: &Context,
        spec: impl Into<CommandSpec>,
        options: ExecOptions,
    ) -> Result<CommandOutput, ExecError> {
        let invocation = self.prepare(ctx, spec.into(), &options)?;

        ctx.log(
            LogEntry::new(COMMAND_LOG_OP)
                .mode(invocation.spec.mode().as_str())
                .args(invocation.spec.tokens()),
        );

        let output = self.executor.execute(&invocation).await?;
        if invocation.reject {
            output.check(&invocation.display())
        } else {
            Ok(output)
        }
    }

    /// Spawn `program` with `args` directly. Shell metacharacters in the
    /// arguments reach the program untouched.
    pub async fn exec<I, A>(
        &self,
        ctx: &Context,
        program: impl Into<String>,
        args: I,
        options: ExecOptions,
    ) -> Result<CommandOutput, ExecError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.run(ctx, CommandSpec::exec(program, args), options).await
    }

    /// Run `line` through the shell.
    pub async fn shell(
        &self,
        ctx: &Context,
        line: impl Into<String>,
        options: ExecOptions,
    ) -> Result<CommandOutput, ExecError> {
        self.run(ctx, CommandSpec::shell(line), options).await
    }

    /// Resolve a spec and caller options into a concrete invocation.
    pub fn prepare(
        &self,
        ctx: &Context,
        spec: CommandSpec,
        options: &ExecOptions,
    ) -> Result<CommandInvocation, ExecError> {
        match &spec {
            CommandSpec::Shell(line) if line.trim().is_empty() => {
                return Err(ExecError::InvalidCommand(
                    "shell command line cannot be empty".into(),
                ));
            }
            CommandSpec::Exec { program, .. } if program.is_empty() => {
                return Err(ExecError::InvalidCommand("program cannot be empty".into()));
            }
            _ => {}
        }

        let merged = options.merged_over(&self.defaults);
        let working_dir = match &merged.cwd {
            Some(dir) => ctx.absolutize(dir),
            None => ctx.cwd().to_path_buf(),
        };

        let fallback = StdioConfig::default();
        Ok(CommandInvocation {
            spec,
            shell: self.shell,
            shell_program: merged.shell,
            working_dir,
            env: merged.env,
            stdio: StdioConfig {
                stdin: merged.stdin.unwrap_or(fallback.stdin),
                stdout: merged.stdout.unwrap_or(fallback.stdout),
                stderr: merged.stderr.unwrap_or(fallback.stderr),
            },
            reject: merged.reject.unwrap_or(true),
            timeout: merged.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{CommandStatus, DryRunCommandExecutor};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use shellkit_commons::{MemoryLogSink, StdioMode};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn context(sink: &Arc<MemoryLogSink>) -> Context {
        Context::new("/work").with_log_sink(sink.clone())
    }

    #[tokio::test]
    async fn argument_list_selects_exec_mode() {
        let sink = Arc::new(MemoryLogSink::new());
        let runner = CommandRunner::new(DryRunCommandExecutor::new());

        runner
            .run(&context(&sink), ("echo", ["a;b", "$(id)"]), ExecOptions::new())
            .await
            .unwrap();

        let invocations = runner.executor().logged_invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(
            invocations[0].spec,
            CommandSpec::Exec {
                program: "echo".into(),
                args: vec!["a;b".into(), "$(id)".into()],
            }
        );

        let entries = sink.entries();
        assert_eq!(entries[0].op, COMMAND_LOG_OP);
        assert_eq!(entries[0].mode, Some("exec"));
        assert_eq!(entries[0].args, vec!["echo", "a;b", "$(id)"]);
    }

    #[tokio::test]
    async fn string_selects_shell_mode() {
        let sink = Arc::new(MemoryLogSink::new());
        let runner = CommandRunner::new(DryRunCommandExecutor::new());

        runner
            .run(&context(&sink), "ls | wc -l", ExecOptions::new())
            .await
            .unwrap();

        let invocation = &runner.executor().logged_invocations()[0];
        assert_eq!(invocation.spec, CommandSpec::Shell("ls | wc -l".into()));

        let entries = sink.entries();
        assert_eq!(entries[0].mode, Some("shell"));
        assert_eq!(entries[0].args, vec!["ls | wc -l"]);
    }

    #[tokio::test]
    async fn streams_default_to_inherit() {
        let sink = Arc::new(MemoryLogSink::new());
        let runner = CommandRunner::new(DryRunCommandExecutor::new());
        runner
            .shell(&context(&sink), "true", ExecOptions::new())
            .await
            .unwrap();

        let invocation = &runner.executor().logged_invocations()[0];
        assert_eq!(invocation.stdio, StdioConfig::default());
        assert!(invocation.reject);
        assert_eq!(invocation.working_dir, PathBuf::from("/work"));
    }

    #[tokio::test]
    async fn caller_options_override_runner_defaults() {
        let sink = Arc::new(MemoryLogSink::new());
        let runner = CommandRunner::new(DryRunCommandExecutor::new())
            .with_defaults(ExecOptions::new().stdio(StdioMode::Null).env("CI", "1"));

        runner
            .exec(
                &context(&sink),
                "cargo",
                ["build"],
                ExecOptions::new().stdout(StdioMode::Piped).cwd("crates/app"),
            )
            .await
            .unwrap();

        let invocation = &runner.executor().logged_invocations()[0];
        assert_eq!(invocation.stdio.stdin, StdioMode::Null);
        assert_eq!(invocation.stdio.stdout, StdioMode::Piped);
        assert_eq!(invocation.stdio.stderr, StdioMode::Null);
        assert_eq!(invocation.env.get("CI").map(String::as_str), Some("1"));
        assert_eq!(invocation.working_dir, PathBuf::from("/work/crates/app"));
    }

    #[tokio::test]
    async fn rejects_empty_commands_before_logging() {
        let sink = Arc::new(MemoryLogSink::new());
        let runner = CommandRunner::new(DryRunCommandExecutor::new());

        let error = runner
            .shell(&context(&sink), "   ", ExecOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ExecError::InvalidCommand(_)));

        let error = runner
            .exec(&context(&sink), "", Vec::<String>::new(), ExecOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ExecError::InvalidCommand(_)));

        assert!(sink.entries().is_empty());
        assert!(runner.executor().logged_invocations().is_empty());
    }

    struct FailingExecutor;

    #[async_trait]
    impl CommandExecutor for FailingExecutor {
        async fn execute(
            &self,
            _invocation: &CommandInvocation,
        ) -> Result<CommandOutput, ExecError> {
            Ok(CommandOutput {
                status: CommandStatus::new(false, Some(2)),
                stdout: String::new(),
                stderr: "missing target".into(),
            })
        }
    }

    #[tokio::test]
    async fn shell_kind_is_recorded_on_invocations() {
        let sink = Arc::new(MemoryLogSink::new());
        let runner =
            CommandRunner::new(DryRunCommandExecutor::new()).with_shell_kind(ShellKind::Windows);

        runner
            .shell(&context(&sink), "dir /b", ExecOptions::new())
            .await
            .unwrap();

        let invocations = runner.executor().logged_invocations();
        assert_eq!(invocations[0].shell, ShellKind::Windows);
        assert_eq!(invocations[0].spec, CommandSpec::Shell("dir /b".into()));
    }

    #[tokio::test]
    async fn reject_controls_failure_reporting() {
        let sink = Arc::new(MemoryLogSink::new());
        let runner = CommandRunner::new(FailingExecutor);

        let error = runner
            .shell(&context(&sink), "make", ExecOptions::new())
            .await
            .unwrap_err();
        assert_eq!(error.exit_code(), Some(2));
        assert_eq!(error.output().map(|o| o.stderr.as_str()), Some("missing target"));

        let output = runner
            .shell(&context(&sink), "make", ExecOptions::new().reject(false))
            .await
            .unwrap();
        assert_eq!(output.status.code(), Some(2));
    }
}
