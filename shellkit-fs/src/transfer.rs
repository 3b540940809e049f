//! Copy and move with `cp`/`mv` destination rules: into a directory when the
//! destination is one, replacing a file when it is one.

use shellkit_commons::{Context, LogEntry, PathSpec, is_not_found};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FsError;
use crate::files::{ensure_parent, remove_path};

/// Copy a file or directory tree.
pub async fn cp(
    ctx: &Context,
    from: impl Into<PathSpec>,
    to: impl Into<PathSpec>,
) -> Result<PathBuf, FsError> {
    let from = ctx.resolve(from);
    let to = ctx.resolve(to);
    ctx.log(LogEntry::new("cp").path(&from).path(&to));

    let target = resolve_destination("cp", &from, to).await?;
    ensure_parent("cp", &target).await?;
    copy_path(from, target.clone()).await?;
    Ok(target)
}

/// Move a file or directory. Completes before returning.
pub async fn mv(
    ctx: &Context,
    from: impl Into<PathSpec>,
    to: impl Into<PathSpec>,
) -> Result<PathBuf, FsError> {
    let from = ctx.resolve(from);
    let to = ctx.resolve(to);
    ctx.log(LogEntry::new("mv").path(&from).path(&to));

    let target = resolve_destination("mv", &from, to).await?;
    ensure_parent("mv", &target).await?;

    match tokio::fs::rename(&from, &target).await {
        Ok(()) => Ok(target),
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
            copy_path(from.clone(), target.clone()).await?;
            remove_path(&from).await.map_err(FsError::io("mv", &from))?;
            Ok(target)
        }
        Err(error) => Err(FsError::io("mv", &from)(error)),
    }
}

/// Work out where `from` actually lands.
///
/// An existing directory receives `from` under its own name. An existing
/// file is removed so it can be replaced. A missing destination is used
/// as-is. Nothing is removed unless the source exists and differs from the
/// final target.
async fn resolve_destination(
    op: &'static str,
    from: &Path,
    to: PathBuf,
) -> Result<PathBuf, FsError> {
    tokio::fs::symlink_metadata(from)
        .await
        .map_err(FsError::io(op, from))?;

    let (target, replace) = match tokio::fs::metadata(&to).await {
        Ok(metadata) if metadata.is_dir() => {
            let name = from.file_name().ok_or_else(|| {
                FsError::io(op, from)(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "source has no file name",
                ))
            })?;
            (to.join(name), false)
        }
        Ok(_) => (to, true),
        Err(error) if is_not_found(&error) => (to, false),
        Err(error) => return Err(FsError::io(op, &to)(error)),
    };

    if target == from {
        return Err(FsError::io(op, &target)(io::Error::new(
            io::ErrorKind::InvalidInput,
            "source and destination are the same file",
        )));
    }

    if replace {
        remove_path(&target)
            .await
            .map_err(FsError::io(op, &target))?;
    }
    Ok(target)
}

async fn copy_path(from: PathBuf, to: PathBuf) -> Result<(), FsError> {
    tokio::task::spawn_blocking(move || copy_blocking(&from, &to)).await?
}

fn copy_blocking(from: &Path, to: &Path) -> Result<(), FsError> {
    let metadata = std::fs::symlink_metadata(from).map_err(FsError::io("cp", from))?;

    if metadata.file_type().is_symlink() {
        return copy_symlink(from, to);
    }

    if !metadata.is_dir() {
        std::fs::copy(from, to).map_err(FsError::io("cp", from))?;
        return Ok(());
    }

    if to.starts_with(from) {
        return Err(FsError::io("cp", to)(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot copy a directory into itself",
        )));
    }

    std::fs::create_dir_all(to).map_err(FsError::io("cp", to))?;
    for entry in std::fs::read_dir(from).map_err(FsError::io("cp", from))? {
        let entry = entry.map_err(FsError::io("cp", from))?;
        copy_blocking(&entry.path(), &to.join(entry.file_name()))?;
    }
    std::fs::set_permissions(to, metadata.permissions()).map_err(FsError::io("cp", to))
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<(), FsError> {
    let link = std::fs::read_link(from).map_err(FsError::io("cp", from))?;
    std::os::unix::fs::symlink(link, to).map_err(FsError::io("cp", to))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<(), FsError> {
    std::fs::copy(from, to).map_err(FsError::io("cp", from))?;
    Ok(())
}
