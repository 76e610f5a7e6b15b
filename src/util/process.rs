//! Subprocess execution utilities.
//!
//! A [`Cmd`] is an ordered argument vector. Token 0 names the program and
//! the rest are passed to it literally, never through a shell. A [`Runner`]
//! launches a command, blocks until it terminates and reports its exit
//! status.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::util::buffer::{ByteBuf, GrowBuf};

/// Prefix of the line echoed for every command before it runs.
pub const ECHO_PREFIX: &str = "[CMD]: ";

/// One external program invocation.
///
/// Tokens usually borrow string literals owned by the caller; computed
/// paths can be stored owned. The command can be reused after [`Cmd::reset`]
/// without giving up its allocation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Cmd<'a> {
    tokens: GrowBuf<Cow<'a, str>>,
}

impl<'a> Cmd<'a> {
    /// Create a command with no tokens.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a command for `program`.
    pub fn new(program: impl Into<Cow<'a, str>>) -> Self {
        let mut cmd = Self::default();
        cmd.tokens.append(program.into());
        cmd
    }

    /// Append one token.
    pub fn arg(&mut self, token: impl Into<Cow<'a, str>>) -> &mut Self {
        self.tokens.append(token.into());
        self
    }

    /// Append several tokens in order.
    pub fn append<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Forget all tokens, keeping capacity.
    pub fn reset(&mut self) -> &mut Self {
        self.tokens.reset();
        self
    }

    /// The program name (token 0), if any.
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(|t| &**t)
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[Cow<'a, str>] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// All tokens, program first.
    pub fn tokens(&self) -> &[Cow<'a, str>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Render the echo line written before the command runs.
    pub fn echo_line(&self) -> ByteBuf {
        let mut line = ByteBuf::new();
        line.append_str(ECHO_PREFIX);
        for (i, token) in self.tokens().iter().enumerate() {
            if i > 0 {
                line.append(b' ');
            }
            line.append_str(token);
        }
        line.append(b'\n');
        line
    }
}

impl fmt::Display for Cmd<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Cmd<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tokens().iter()).finish()
    }
}

/// Failure to run a command to normal completion.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot execute an empty command")]
    Empty,

    #[error("could not spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("could not wait on `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` was terminated by signal {signal}")]
    Signaled { program: String, signal: i32 },

    #[error("command `{command}` failed with exit code {code}")]
    Failed { command: String, code: i32 },
}

/// Executes commands as child processes.
pub trait Runner {
    /// Run `cmd` to completion and return its exit status.
    ///
    /// A nonzero status is returned as `Ok`; only failures to launch or
    /// abnormal termination are errors.
    fn execute(&self, cmd: &Cmd<'_>) -> Result<i32, ExecError>;

    /// Run `cmd` and treat any nonzero status as an error.
    ///
    /// Callers propagate the error to `main`, which terminates the tool.
    fn execute_or_die(&self, cmd: &Cmd<'_>) -> Result<(), ExecError> {
        match self.execute(cmd)? {
            0 => Ok(()),
            code => Err(ExecError::Failed {
                command: cmd.to_string(),
                code,
            }),
        }
    }
}

impl<R: Runner + ?Sized> Runner for &R {
    fn execute(&self, cmd: &Cmd<'_>) -> Result<i32, ExecError> {
        (**self).execute(cmd)
    }
}

/// Runs commands as real child processes, echoing each one to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    quiet: bool,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the `[CMD]:` echo.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn echo(&self, cmd: &Cmd<'_>) {
        if self.quiet {
            return;
        }
        let line = cmd.echo_line();
        let mut stdout = io::stdout().lock();
        // Losing the echo must not stop the build.
        let _ = stdout.write_all(&line);
        let _ = stdout.flush();
    }
}

impl Runner for ProcessRunner {
    fn execute(&self, cmd: &Cmd<'_>) -> Result<i32, ExecError> {
        let program = cmd.program().ok_or(ExecError::Empty)?;
        self.echo(cmd);
        tracing::debug!(command = %cmd, "spawning");

        let mut child = Command::new(program)
            .args(cmd.args().iter().map(|t| &**t))
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let status = child.wait().map_err(|source| ExecError::Wait {
            program: program.to_string(),
            source,
        })?;

        exit_code(program, status)
    }
}

#[cfg(unix)]
fn exit_code(program: &str, status: ExitStatus) -> Result<i32, ExecError> {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => Ok(code),
        (None, Some(signal)) => Err(ExecError::Signaled {
            program: program.to_string(),
            signal,
        }),
        (None, None) => Err(ExecError::Wait {
            program: program.to_string(),
            source: io::Error::other(format!("unrecognized wait status {status:?}")),
        }),
    }
}

#[cfg(not(unix))]
fn exit_code(program: &str, status: ExitStatus) -> Result<i32, ExecError> {
    status.code().ok_or_else(|| ExecError::Wait {
        program: program.to_string(),
        source: io::Error::other("process exit code unavailable"),
    })
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
