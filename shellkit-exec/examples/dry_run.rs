use shellkit_commons::{Context, MemoryLogSink};
use shellkit_exec::{CommandRunner, DryRunCommandExecutor, ExecError, ExecOptions};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), ExecError> {
    let sink = Arc::new(MemoryLogSink::new());
    let ctx = Context::new(std::env::temp_dir()).with_log_sink(sink.clone());
    let runner = CommandRunner::new(DryRunCommandExecutor::new());

    runner
        .run(&ctx, "cargo fmt --all && cargo test", ExecOptions::new())
        .await?;
    runner
        .run(&ctx, ("git", ["tag", "-a", "v1.0", "-m", "release 1.0"]), ExecOptions::new())
        .await?;

    for line in sink.rendered() {
        println!("{line}");
    }

    for invocation in runner.executor().logged_invocations() {
        println!("{:?} in {}", invocation.spec.mode(), invocation.working_dir.display());
    }

    Ok(())
}
