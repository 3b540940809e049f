//! Layered TOML configuration.
//!
//! Layers are merged from lowest to highest precedence: built-in defaults,
//! the user file under the platform config directory, then `shellkit.toml`
//! in the workspace. Missing files are skipped, malformed ones are errors.

use anyhow::{Context as _, Result, ensure};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How a child process's standard stream is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StdioMode {
    /// Share the parent's stream.
    #[default]
    Inherit,
    /// Capture into the command output.
    Piped,
    /// Connect to the null device.
    Null,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShellkitConfig {
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub json: JsonConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExecConfig {
    /// Default wiring for stdin, stdout and stderr.
    #[serde(default)]
    pub stdio: StdioMode,
    /// Treat a non-zero exit or a signal as an error.
    #[serde(default = "ExecConfig::default_reject")]
    pub reject: bool,
    /// Kill the child after this many seconds. `0` disables the limit.
    #[serde(default)]
    pub timeout_secs: u64,
    /// Program used for shell-mode commands instead of the platform shell.
    #[serde(default)]
    pub shell: Option<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            stdio: StdioMode::default(),
            reject: Self::default_reject(),
            timeout_secs: 0,
            shell: None,
        }
    }
}

impl ExecConfig {
    const fn default_reject() -> bool {
        true
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonIndent {
    #[default]
    Tab,
    Spaces,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub indent: JsonIndent,
    /// Width used when `indent = "spaces"`.
    #[serde(default = "JsonConfig::default_indent_width")]
    pub indent_width: u8,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            indent: JsonIndent::default(),
            indent_width: Self::default_indent_width(),
        }
    }
}

impl JsonConfig {
    const MAX_INDENT_WIDTH: u8 = 16;

    const fn default_indent_width() -> u8 {
        2
    }

    /// The bytes written per indentation level, or `None` for compact output.
    pub fn indent_bytes(&self) -> Option<Vec<u8>> {
        match self.indent {
            JsonIndent::Tab => Some(b"\t".to_vec()),
            JsonIndent::Spaces => Some(vec![b' '; usize::from(self.indent_width)]),
            JsonIndent::Compact => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_enabled")]
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

impl LogConfig {
    const fn default_enabled() -> bool {
        true
    }
}

impl ShellkitConfig {
    pub const FILE_NAME: &'static str = "shellkit.toml";

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).context("Failed to parse shellkit configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Location of the per-user configuration file, if the platform has a
    /// config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shellkit").join(Self::FILE_NAME))
    }

    /// Load the user layer and the workspace layer rooted at `workspace`.
    pub fn load(workspace: &Path) -> Result<Self> {
        let mut layers = Vec::with_capacity(2);
        if let Some(user) = Self::user_config_path() {
            layers.push(user);
        }
        layers.push(workspace.join(Self::FILE_NAME));
        Self::load_layers(&layers)
    }

    /// Merge the given files in order; later files win.
    pub fn load_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Value::Table(toml::Table::new());
        for path in paths {
            let source = match std::fs::read_to_string(path) {
                Ok(source) => source,
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(error) => {
                    return Err(error)
                        .with_context(|| format!("Failed to read config {}", path.display()));
                }
            };
            let layer: toml::Table = toml::from_str(&source)
                .with_context(|| format!("Failed to parse config {}", path.display()))?;
            merge_toml_values(&mut merged, &toml::Value::Table(layer));
        }

        let config: Self = merged
            .try_into()
            .context("Merged configuration does not match the shellkit schema")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.json.indent_width <= JsonConfig::MAX_INDENT_WIDTH,
            "json.indent_width must be at most {}",
            JsonConfig::MAX_INDENT_WIDTH
        );
        if let Some(shell) = &self.exec.shell {
            ensure!(!shell.trim().is_empty(), "exec.shell cannot be empty");
        }
        Ok(())
    }
}

/// Recursively merge two TOML values.
///
/// Tables merge key by key; any other value in `overlay` replaces `base`.
pub fn merge_toml_values(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key.clone(), value.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn empty_source_yields_defaults() -> Result<()> {
        let config = ShellkitConfig::from_toml_str("")?;
        assert_eq!(config, ShellkitConfig::default());
        assert_eq!(config.exec.stdio, StdioMode::Inherit);
        assert!(config.exec.reject);
        assert_eq!(config.exec.timeout(), None);
        assert_eq!(config.json.indent_bytes(), Some(b"\t".to_vec()));
        assert!(config.log.enabled);
        Ok(())
    }

    #[test]
    fn parses_every_section() -> Result<()> {
        let config = ShellkitConfig::from_toml_str(
            r#"
            [exec]
            stdio = "piped"
            reject = false
            timeout_secs = 30
            shell = "/bin/bash"

            [json]
            indent = "spaces"
            indent_width = 4

            [log]
            enabled = false
            "#,
        )?;

        assert_eq!(config.exec.stdio, StdioMode::Piped);
        assert!(!config.exec.reject);
        assert_eq!(config.exec.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.exec.shell.as_deref(), Some("/bin/bash"));
        assert_eq!(config.json.indent_bytes(), Some(b"    ".to_vec()));
        assert!(!config.log.enabled);
        Ok(())
    }

    #[test]
    fn later_layers_override_earlier_ones() -> Result<()> {
        let dir = TempDir::new()?;
        let user = dir.path().join("user.toml");
        let workspace = dir.path().join("workspace.toml");
        std::fs::write(&user, "[exec]\nstdio = \"null\"\ntimeout_secs = 5\n")?;
        std::fs::write(&workspace, "[exec]\nstdio = \"piped\"\n")?;

        let missing = dir.path().join("missing.toml");
        let config = ShellkitConfig::load_layers(&[user, workspace, missing])?;
        assert_eq!(config.exec.stdio, StdioMode::Piped);
        assert_eq!(config.exec.timeout_secs, 5);
        Ok(())
    }

    #[test]
    fn rejects_oversized_indent() {
        let result = ShellkitConfig::from_toml_str("[json]\nindent_width = 40\n");
        assert!(result.is_err());
    }

    #[test]
    fn malformed_layer_is_an_error() -> Result<()> {
        let dir = TempDir::new()?;
        let broken = dir.path().join(ShellkitConfig::FILE_NAME);
        std::fs::write(&broken, "[exec\nstdio = ")?;
        assert!(ShellkitConfig::load(dir.path()).is_err());
        Ok(())
    }
}
