use std::borrow::Cow;
use std::fmt;

/// Which calling convention a command uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandMode {
    /// The whole line goes to the shell, so pipes, globs and `$VAR` expand.
    Shell,
    /// The program is spawned directly with an argument vector. Nothing is
    /// parsed or expanded.
    Exec,
}

impl CommandMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Exec => "exec",
        }
    }
}

/// What to run: a shell command line, or a program plus its arguments.
///
/// A string converts into [`CommandSpec::Shell`]; a `(program, args)` pair
/// converts into [`CommandSpec::Exec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    Shell(String),
    Exec { program: String, args: Vec<String> },
}

impl CommandSpec {
    pub fn shell(line: impl Into<String>) -> Self {
        Self::Shell(line.into())
    }

    pub fn exec<I, A>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self::Exec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mode(&self) -> CommandMode {
        match self {
            Self::Shell(_) => CommandMode::Shell,
            Self::Exec { .. } => CommandMode::Exec,
        }
    }

    /// The tokens recorded in the operation log: the raw line for shell mode,
    /// program followed by each argument for exec mode.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Self::Shell(line) => vec![line.clone()],
            Self::Exec { program, args } => {
                let mut tokens = Vec::with_capacity(args.len() + 1);
                tokens.push(program.clone());
                tokens.extend(args.iter().cloned());
                tokens
            }
        }
    }

    /// Human-readable command line. Exec-mode arguments are quoted so the
    /// output can be pasted back into a shell.
    pub fn display(&self) -> String {
        match self {
            Self::Shell(line) => line.clone(),
            Self::Exec { program, args } => {
                let mut rendered = shell_quote(program).into_owned();
                for arg in args {
                    rendered.push(' ');
                    rendered.push_str(&shell_quote(arg));
                }
                rendered
            }
        }
    }
}

fn shell_quote(token: &str) -> Cow<'_, str> {
    shell_escape::escape(Cow::Borrowed(token))
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for CommandSpec {
    fn from(line: &str) -> Self {
        Self::Shell(line.to_owned())
    }
}

impl From<String> for CommandSpec {
    fn from(line: String) -> Self {
        Self::Shell(line)
    }
}

impl From<&String> for CommandSpec {
    fn from(line: &String) -> Self {
        Self::Shell(line.clone())
    }
}

impl<P, I, A> From<(P, I)> for CommandSpec
where
    P: Into<String>,
    I: IntoIterator<Item = A>,
    A: Into<String>,
{
    fn from((program, args): (P, I)) -> Self {
        Self::exec(program, args)
    }
}
