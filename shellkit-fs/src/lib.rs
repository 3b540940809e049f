//! Logged filesystem helpers for scripts.
//!
//! Every operation takes a [`Context`] and one or more [`PathSpec`]s (a
//! single path or a list of segments), resolves them against the context's
//! directory, logs the operation, and awaits the underlying `tokio::fs` call.
//! Failures surface as [`FsError`], which keeps the original `io::Error`.
//!
//! ```no_run
//! use shellkit_commons::Context;
//! use shellkit_fs::{JsonWriteOptions, cp, mkdirp, read_json, write_json};
//!
//! # async fn demo() -> Result<(), shellkit_fs::FsError> {
//! let ctx = Context::new("/tmp/project");
//! mkdirp(&ctx, ["dist"]).await?;
//! cp(&ctx, "README.md", "dist").await?;
//!
//! let mut manifest: serde_json::Value = read_json(&ctx, "package.json").await?;
//! manifest["private"] = true.into();
//! write_json(&ctx, ["dist", "package.json"], &manifest, &JsonWriteOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod error;
pub mod files;
pub mod json;
pub mod search;
pub mod transfer;

pub use directory::{cd, cwd, empty_dir, home, ls, mkdirp, tmp_dir};
pub use error::FsError;
pub use files::{chmod, exists, read, read_to_string, rm, write};
pub use json::{JsonWriteOptions, read_json, write_json};
pub use search::{GlobOptions, glob};
pub use shellkit_commons::{Context, PathSpec};
pub use transfer::{cp, mv};
