use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::executor::CommandOutput;

/// Failure of a command execution. Spawn and wait errors keep the original
/// [`io::Error`] as their source; exit failures carry whatever output was
/// captured.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command `{command}` exited with code {code}")]
    NonZeroExit {
        command: String,
        code: i32,
        output: Box<CommandOutput>,
    },

    #[error("command `{command}` was terminated by signal {signal}")]
    Signal {
        command: String,
        signal: i32,
        output: Box<CommandOutput>,
    },

    #[error("command `{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },
}

impl ExecError {
    /// Exit code reported by the child, when it exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Captured output of a child that ran to completion but failed.
    pub fn output(&self) -> Option<&CommandOutput> {
        match self {
            Self::NonZeroExit { output, .. } | Self::Signal { output, .. } => Some(output.as_ref()),
            _ => None,
        }
    }
}
