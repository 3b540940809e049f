use anyhow::Result;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use shellkit::{
    CommandMode, DryRunCommandExecutor, ExecOptions, GlobOptions, MemoryLogSink, Shell,
    ShellkitConfig, StdioMode,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

fn dry_shell(
    dir: &TempDir,
    config: &ShellkitConfig,
) -> (Shell<DryRunCommandExecutor>, Arc<MemoryLogSink>) {
    let sink = Arc::new(MemoryLogSink::new());
    let shell = Shell::with_executor(dir.path(), DryRunCommandExecutor::new(), config)
        .with_log_sink(sink.clone());
    (shell, sink)
}

#[tokio::test]
async fn run_dispatches_on_command_shape() -> Result<()> {
    let dir = TempDir::new()?;
    let (sh, sink) = dry_shell(&dir, &ShellkitConfig::default());

    sh.run("npm test -- --watch", ExecOptions::new()).await?;
    sh.run(("git", ["commit", "-m", "fix: a; b"]), ExecOptions::new()).await?;

    let invocations = sh.runner().executor().logged_invocations();
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].spec.mode(), CommandMode::Shell);
    assert_eq!(invocations[1].spec.mode(), CommandMode::Exec);
    assert_eq!(invocations[1].working_dir, dir.path());
    assert_eq!(
        invocations[1].spec.tokens(),
        vec!["git", "commit", "-m", "fix: a; b"]
    );

    let entries = sink.entries();
    assert_eq!(entries[0].op, "$");
    assert_eq!(entries[1].args, vec!["git", "commit", "-m", "fix: a; b"]);
    Ok(())
}

#[tokio::test]
async fn config_supplies_command_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ShellkitConfig::from_toml_str(
        r#"
        [exec]
        stdio = "piped"
        reject = false
        timeout_secs = 30
        "#,
    )?;
    let (sh, _sink) = dry_shell(&dir, &config);

    sh.shell("make", ExecOptions::new().stderr(StdioMode::Inherit))
        .await?;

    let invocation = &sh.runner().executor().logged_invocations()[0];
    assert_eq!(invocation.stdio.stdout, StdioMode::Piped);
    assert_eq!(invocation.stdio.stderr, StdioMode::Inherit);
    assert!(!invocation.reject);
    assert_eq!(invocation.timeout, Some(Duration::from_secs(30)));
    Ok(())
}

#[tokio::test]
async fn json_layout_follows_config() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ShellkitConfig::from_toml_str("[json]\nindent = \"spaces\"\nindent_width = 4\n")?;
    let (sh, _sink) = dry_shell(&dir, &config);

    sh.write_json(["out", "data.json"], &json!({ "a": [1] })).await?;
    assert_eq!(
        std::fs::read_to_string(dir.child("out/data.json").path())?,
        "{\n    \"a\": [\n        1\n    ]\n}\n"
    );

    let back: Value = sh.read_json("out/data.json").await?;
    assert_eq!(back, json!({ "a": [1] }));
    Ok(())
}

#[derive(Clone, Default)]
struct CapturedLines(Arc<Mutex<Vec<u8>>>);

impl CapturedLines {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLines {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLines {
    type Writer = CapturedLines;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn disabled_logging_emits_no_operation_lines() -> Result<()> {
    let dir = TempDir::new()?;
    let captured = CapturedLines::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let loud = Shell::with_config(dir.path(), &ShellkitConfig::default());
    loud.mkdirp(["loud"]).await?;
    assert!(captured.text().contains("mkdirp"));

    let config = ShellkitConfig::from_toml_str("[log]\nenabled = false\n")?;
    let quiet = Shell::with_config(dir.path(), &config);
    let before = captured.text();
    quiet.mkdirp(["quiet"]).await?;
    assert!(quiet.exists("quiet").await?);
    assert_eq!(captured.text(), before);
    Ok(())
}

#[tokio::test]
async fn script_flow_over_the_facade() -> Result<()> {
    let dir = TempDir::new()?;
    dir.child("assets/logo.svg").write_str("<svg/>")?;
    dir.child("assets/.cache").write_str("stale")?;
    let (mut sh, sink) = dry_shell(&dir, &ShellkitConfig::default());

    sh.empty_dir("dist").await?;
    sh.cp("assets", "dist").await?;
    sh.mv(["dist", "assets", "logo.svg"], ["dist", "logo.svg"]).await?;
    sh.rm(["dist/assets"]).await?;

    assert_eq!(sh.ls("dist").await?, vec!["logo.svg"]);

    let missing = sh.cd("nowhere").await.unwrap_err();
    assert!(missing.is_not_found());
    assert_eq!(sh.cwd(), dir.path());

    sh.cd("dist").await?;
    assert_eq!(sh.path("logo.svg"), dir.child("dist/logo.svg").path());
    assert_eq!(sh.glob(["*"], GlobOptions::default()).await?, vec!["logo.svg"]);

    let ops: Vec<String> = sink
        .entries()
        .into_iter()
        .map(|entry| entry.op.into_owned())
        .collect();
    assert_eq!(
        ops,
        vec!["empty_dir", "cp", "mv", "rm", "ls", "cd", "cwd", "cd", "glob"]
    );
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn real_commands_run_in_the_shell_directory() -> Result<()> {
    let dir = TempDir::new()?;
    dir.child("sub/marker").touch()?;
    let mut sh = Shell::new(dir.path());

    sh.cd("sub").await?;
    let output = sh
        .exec("ls", Vec::<String>::new(), ExecOptions::new().piped())
        .await?;
    assert_eq!(output.stdout, "marker\n");

    let tmp = sh.tmp_dir().await?;
    sh.write([tmp.as_path(), Path::new("note.txt")], "hi").await?;
    assert_eq!(sh.read_to_string(tmp.join("note.txt")).await?, "hi");
    sh.chmod(tmp.join("note.txt"), 0o600).await?;
    sh.rm([&tmp]).await?;
    assert!(!sh.exists(&tmp).await?);
    Ok(())
}
