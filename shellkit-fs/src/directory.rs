use shellkit_commons::{Context, LogEntry, PathSpec, is_not_found};
use std::io;
use std::path::PathBuf;

use crate::error::FsError;
use crate::files::remove_path;

/// Create each directory and any missing parents. Existing directories are
/// left alone.
pub async fn mkdirp<I, P>(ctx: &Context, paths: I) -> Result<(), FsError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathSpec>,
{
    for path in paths {
        let path = ctx.resolve(path);
        ctx.log(LogEntry::new("mkdirp").path(&path));
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(FsError::io("mkdirp", &path))?;
    }
    Ok(())
}

/// Names of the entries directly inside a directory, sorted.
pub async fn ls(ctx: &Context, path: impl Into<PathSpec>) -> Result<Vec<String>, FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("ls").path(&path));

    let mut entries = tokio::fs::read_dir(&path)
        .await
        .map_err(FsError::io("ls", &path))?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(FsError::io("ls", &path))?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Point the context at another directory. On failure the context keeps its
/// previous directory.
pub async fn cd(ctx: &mut Context, path: impl Into<PathSpec>) -> Result<(), FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("cd").path(&path));

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(FsError::io("cd", &path))?;
    if !metadata.is_dir() {
        return Err(FsError::io("cd", &path)(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }

    ctx.set_cwd(path);
    Ok(())
}

pub fn cwd(ctx: &Context) -> PathBuf {
    let cwd = ctx.cwd().to_path_buf();
    ctx.log(LogEntry::new("cwd").path(&cwd));
    cwd
}

/// Remove everything inside a directory but keep the directory itself.
pub async fn empty_dir(ctx: &Context, path: impl Into<PathSpec>) -> Result<(), FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("empty_dir").path(&path));

    let mut entries = match tokio::fs::read_dir(&path).await {
        Ok(entries) => entries,
        Err(error) if is_not_found(&error) => {
            return tokio::fs::create_dir_all(&path)
                .await
                .map_err(FsError::io("empty_dir", &path));
        }
        Err(error) => return Err(FsError::io("empty_dir", &path)(error)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(FsError::io("empty_dir", &path))?
    {
        let child = entry.path();
        remove_path(&child)
            .await
            .map_err(FsError::io("empty_dir", &child))?;
    }
    Ok(())
}

/// Allocate a fresh directory under the system temp directory. It is not
/// cleaned up automatically.
pub async fn tmp_dir(ctx: &Context) -> Result<PathBuf, FsError> {
    let path = tokio::task::spawn_blocking(|| {
        tempfile::Builder::new()
            .prefix("shellkit-")
            .tempdir()
            .map(tempfile::TempDir::keep)
            .map_err(FsError::io("tmp_dir", std::env::temp_dir()))
    })
    .await??;

    ctx.log(LogEntry::new("tmp_dir").path(&path));
    Ok(path)
}

/// The current user's home directory, if the platform reports one.
pub fn home(ctx: &Context) -> Option<PathBuf> {
    let home = dirs::home_dir();
    if let Some(path) = &home {
        ctx.log(LogEntry::new("home").path(path));
    }
    home
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn mkdirp_is_idempotent() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let ctx = Context::new(dir.path());

        mkdirp(&ctx, ["a/b/c", "d"]).await?;
        mkdirp(&ctx, ["a/b/c"]).await?;

        assert!(dir.path().join("a/b/c").is_dir());
        assert!(dir.path().join("d").is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn ls_lists_names_sorted() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let ctx = Context::new(dir.path());
        std::fs::write(dir.path().join("zeta"), "")?;
        std::fs::write(dir.path().join("alpha"), "")?;
        std::fs::create_dir(dir.path().join("mid"))?;
        std::fs::write(dir.path().join("mid/hidden-from-ls"), "")?;

        assert_eq!(ls(&ctx, ".").await?, vec!["alpha", "mid", "zeta"]);
        Ok(())
    }

    #[tokio::test]
    async fn cd_moves_relative_resolution() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut ctx = Context::new(dir.path());
        std::fs::create_dir(dir.path().join("sub"))?;
        std::fs::write(dir.path().join("sub/inner.txt"), "")?;

        cd(&mut ctx, "sub").await?;
        assert_eq!(ctx.cwd(), dir.path().join("sub"));
        assert_eq!(ls(&ctx, ".").await?, vec!["inner.txt"]);

        cd(&mut ctx, "..").await?;
        assert_eq!(ctx.cwd(), dir.path());
        Ok(())
    }

    #[tokio::test]
    async fn cd_rejects_files() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut ctx = Context::new(dir.path());
        std::fs::write(dir.path().join("plain"), "")?;

        let error = cd(&mut ctx, "plain").await.unwrap_err();
        assert_eq!(error.kind(), Some(io::ErrorKind::NotADirectory));
        assert_eq!(ctx.cwd(), dir.path());
        Ok(())
    }

    #[tokio::test]
    async fn empty_dir_keeps_the_directory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let ctx = Context::new(dir.path());
        std::fs::create_dir_all(dir.path().join("out/nested"))?;
        std::fs::write(dir.path().join("out/nested/x"), "")?;
        std::fs::write(dir.path().join("out/.dotfile"), "")?;

        empty_dir(&ctx, "out").await?;
        assert!(dir.path().join("out").is_dir());
        assert_eq!(std::fs::read_dir(dir.path().join("out"))?.count(), 0);

        empty_dir(&ctx, "fresh").await?;
        assert!(dir.path().join("fresh").is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn tmp_dir_survives_the_call() -> anyhow::Result<()> {
        let ctx = Context::new(std::env::temp_dir());

        let first = tmp_dir(&ctx).await?;
        let second = tmp_dir(&ctx).await?;
        assert!(first.is_dir());
        assert_ne!(first, second);

        std::fs::remove_dir(&first)?;
        std::fs::remove_dir(&second)?;
        Ok(())
    }
}
