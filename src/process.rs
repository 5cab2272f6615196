// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Subprocess execution behind a small trait.
///
/// Helpers that shell out to `gpg` or `git` take a [`CommandRunner`] so that
/// the exit status and captured output are explicit values, and so tests can
/// script the responses.
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Exit status and captured streams of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct CommandOutput
{
    /// Exit code; `None` when the process was terminated by a signal.
    pub code:   Option<i32,>,
    /// Captured standard output, decoded lossily as UTF-8.
    pub stdout: String,
    /// Captured standard error, decoded lossily as UTF-8.
    pub stderr: String,
}

impl CommandOutput
{
    /// Returns `true` when the process exited with status zero.
    pub fn success(&self,) -> bool
    {
        self.code == Some(0,)
    }
}

/// Runs external programs and captures their output.
pub trait CommandRunner
{
    /// Runs `program` with `args`, waiting for it to finish.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`CommandOutput::code`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] when the process cannot be started.
    fn run(&self, program: &str, args: &[&str],) -> Result<CommandOutput, Error,>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default,)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner
{
    fn run(&self, program: &str, args: &[&str],) -> Result<CommandOutput, Error,>
    {
        debug!(program, ?args, "running command");
        let output = Command::new(program,)
            .args(args,)
            .stdin(Stdio::null(),)
            .output()
            .map_err(|source| Error::Spawn {
                program: program.to_owned(),
                source,
            },)?;

        Ok(CommandOutput {
            code:   output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout,).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr,).into_owned(),
        },)
    }
}

/// Runs a command with inherited standard streams and fails unless it exits
/// successfully.
///
/// # Errors
///
/// Returns [`Error::Spawn`] when the process cannot be started and
/// [`Error::CommandFailed`] when it exits with a non-zero status.
///
/// # Example
///
/// ```no_run
/// use pkgmatrix::run_checked;
///
/// # fn example() -> Result<(), pkgmatrix::Error> {
/// run_checked("dpkg-buildpackage", &["-us", "-uc"],)?;
/// # Ok(())
/// # }
/// ```
pub fn run_checked(program: &str, args: &[&str],) -> Result<(), Error,>
{
    debug!(program, ?args, "running checked command");
    let status = Command::new(program,).args(args,).status().map_err(|source| Error::Spawn {
        program: program.to_owned(),
        source,
    },)?;

    if !status.success() {
        return Err(Error::command_failed(render_command(program, args,), status.code(),),);
    }

    Ok((),)
}

fn render_command(program: &str, args: &[&str],) -> String
{
    std::iter::once(program,).chain(args.iter().copied(),).collect::<Vec<_,>>().join(" ",)
}
