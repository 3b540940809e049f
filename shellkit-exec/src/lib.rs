//! Command runner with two calling conventions.
//!
//! A command is either a shell line (`"ls | wc -l"`), interpreted by the
//! platform shell, or a program plus argument vector (`("git", ["status"])`),
//! spawned directly with no shell parsing. [`CommandRunner`] accepts both
//! through [`CommandSpec`], merges caller [`ExecOptions`] over its defaults
//! (every standard stream inherited from the parent), logs the command
//! through the script context, and delegates to a [`CommandExecutor`].

pub mod error;
pub mod executor;
pub mod options;
pub mod runner;
pub mod spec;

pub use error::ExecError;
pub use executor::{
    CommandExecutor, CommandInvocation, CommandOutput, CommandStatus, DryRunCommandExecutor,
    ProcessCommandExecutor, ShellKind,
};
pub use options::{ExecOptions, StdioConfig};
pub use runner::{COMMAND_LOG_OP, CommandRunner};
pub use shellkit_commons::StdioMode;
pub use spec::{CommandMode, CommandSpec};
