//! JSON files: parse on read, pretty-print with a trailing newline on write.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};
use shellkit_commons::{Context, JsonConfig, LogEntry, PathSpec};

use crate::error::FsError;
use crate::files::write_atomic;

const BOM: char = '\u{feff}';

/// How [`write_json`] lays out its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonWriteOptions {
    /// Bytes emitted per nesting level. `None` writes everything on one line.
    pub indent: Option<Vec<u8>>,
}

impl Default for JsonWriteOptions {
    fn default() -> Self {
        Self::tab()
    }
}

impl JsonWriteOptions {
    pub fn tab() -> Self {
        Self {
            indent: Some(b"\t".to_vec()),
        }
    }

    pub fn spaces(width: usize) -> Self {
        Self {
            indent: Some(vec![b' '; width]),
        }
    }

    pub fn compact() -> Self {
        Self { indent: None }
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(128);
        match &self.indent {
            Some(indent) => {
                let formatter = PrettyFormatter::with_indent(indent);
                let mut serializer = Serializer::with_formatter(&mut out, formatter);
                value.serialize(&mut serializer)?;
            }
            None => serde_json::to_writer(&mut out, value)?,
        }
        out.push(b'\n');
        Ok(out)
    }
}

impl From<&JsonConfig> for JsonWriteOptions {
    fn from(config: &JsonConfig) -> Self {
        Self {
            indent: config.indent_bytes(),
        }
    }
}

/// Read and deserialize a JSON file. A leading byte-order mark is ignored.
pub async fn read_json<T: DeserializeOwned>(
    ctx: &Context,
    path: impl Into<PathSpec>,
) -> Result<T, FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("read_json").path(&path));

    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(FsError::io("read_json", &path))?;
    let body = text.strip_prefix(BOM).unwrap_or(&text);
    serde_json::from_str(body).map_err(|source| FsError::Json { path, source })
}

/// Serialize `value` and atomically replace the file at `path` with it.
/// Missing parent directories are created.
pub async fn write_json<T: Serialize + ?Sized>(
    ctx: &Context,
    path: impl Into<PathSpec>,
    value: &T,
    options: &JsonWriteOptions,
) -> Result<(), FsError> {
    let path = ctx.resolve(path);
    ctx.log(LogEntry::new("write_json").path(&path));

    let bytes = options.render(value).map_err(|source| FsError::Json {
        path: path.clone(),
        source,
    })?;
    write_atomic("write_json", path, bytes).await
}
