//! Single-file helpers: read, write, existence, permissions, removal.

use shellkit_commons::{Context, LogEntry, PathSpec, is_not_found};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use crate::error::FsError;

/// Write `contents` to a file, creating missing parent directories.
pub async fn write(
    ctx: &Context,
    path: impl Into<PathSpec>,
    contents: impl AsRef<[u8]>,
) -> Result<(), FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("write").path(&path));

    ensure_parent("write", &path).await?;
    tokio::fs::write(&path, contents)
        .await
        .map_err(FsError::io("write", &path))
}

/// Read a file's raw bytes.
pub async fn read(ctx: &Context, path: impl Into<PathSpec>) -> Result<Vec<u8>, FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("read").path(&path));

    tokio::fs::read(&path).await.map_err(FsError::io("read", &path))
}

/// Read a file as UTF-8 text.
pub async fn read_to_string(ctx: &Context, path: impl Into<PathSpec>) -> Result<String, FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("read").arg("utf8").path(&path));

    tokio::fs::read_to_string(&path)
        .await
        .map_err(FsError::io("read", &path))
}

/// Check whether anything exists at `path`. The answer is logged with the
/// path.
pub async fn exists(ctx: &Context, path: impl Into<PathSpec>) -> Result<bool, FsError> {
    let path = ctx.resolve(path);
    let found = tokio::fs::try_exists(&path)
        .await
        .map_err(FsError::io("exists", &path))?;
    ctx.log(LogEntry::new("exists").path(&path).arg(found));
    Ok(found)
}

/// Set a file's permission bits. Outside Unix only the write bits matter:
/// clearing all of them marks the file read-only.
pub async fn chmod(ctx: &Context, path: impl Into<PathSpec>, mode: u32) -> Result<(), FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("chmod").path(&path).arg(format_args!("{mode:o}")));

    #[cfg(unix)]
    let permissions = {
        use std::os::unix::fs::PermissionsExt;
        std::fs::Permissions::from_mode(mode)
    };

    #[cfg(not(unix))]
    let permissions = {
        let mut permissions = tokio::fs::metadata(&path)
            .await
            .map_err(FsError::io("chmod", &path))?
            .permissions();
        permissions.set_readonly(mode & 0o222 == 0);
        permissions
    };

    tokio::fs::set_permissions(&path, permissions)
        .await
        .map_err(FsError::io("chmod", &path))
}

/// Remove every path, recursively. Paths that do not exist are skipped.
pub async fn rm<I, P>(ctx: &Context, paths: I) -> Result<(), FsError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathSpec>,
{
    for path in paths {
        let path = ctx.resolve(path);
        ctx.log(LogEntry::new("rm").path(&path));
        remove_path(&path).await.map_err(FsError::io("rm", &path))?;
    }
    Ok(())
}

/// `rm -rf` for one path. Missing paths are not an error.
pub(crate) async fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(error) if is_not_found(&error) => return Ok(()),
        Err(error) => return Err(error),
    };

    let removed = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match removed {
        Err(error) if is_not_found(&error) => Ok(()),
        other => other,
    }
}

/// Create the parent directory of `path` if it is missing.
pub(crate) async fn ensure_parent(op: &'static str, path: &Path) -> Result<(), FsError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(FsError::io(op, parent)),
        _ => Ok(()),
    }
}

/// Replace `path` with `contents` through a temporary sibling file, so
/// readers never observe a half-written file.
pub(crate) async fn write_atomic(
    op: &'static str,
    path: PathBuf,
    contents: Vec<u8>,
) -> Result<(), FsError> {
    ensure_parent(op, &path).await?;

    tokio::task::spawn_blocking(move || {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".shellkit-").suffix(".tmp");
        let permissions = match std::fs::metadata(&path) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(_) => default_file_permissions(),
        };
        if let Some(permissions) = permissions {
            builder.permissions(permissions);
        }

        let mut file = builder.tempfile_in(&dir).map_err(FsError::io(op, &dir))?;
        file.write_all(&contents).map_err(FsError::io(op, &path))?;
        file.as_file().sync_all().map_err(FsError::io(op, &path))?;
        file.persist(&path)
            .map_err(|error| FsError::io(op, &path)(error.error))?;
        Ok(())
    })
    .await?
}

#[cfg(unix)]
fn default_file_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_file_permissions() -> Option<std::fs::Permissions> {
    None
}
