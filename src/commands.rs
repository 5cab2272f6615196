// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Executable lookup on `PATH`.

use tracing::{debug, warn};

use crate::error::Error;

/// Returns `true` when `name` resolves to an executable on `PATH`.
///
/// Lookup is silent: nothing is written to standard output or error.
pub fn command_exists(name: &str,) -> bool
{
    match which::which(name,) {
        Ok(path,) => {
            debug!(name, path = %path.display(), "resolved command");
            true
        }
        Err(_,) => false,
    }
}

/// Fails on the first name in `names` that is not on `PATH`.
///
/// # Errors
///
/// Returns [`Error::CommandNotFound`] naming the first missing command.
///
/// # Example
///
/// ```no_run
/// use pkgmatrix::require_commands;
///
/// # fn example() -> Result<(), pkgmatrix::Error> {
/// require_commands(&["gpg", "git", "reprepro"],)?;
/// # Ok(())
/// # }
/// ```
pub fn require_commands<S,>(names: &[S],) -> Result<(), Error,>
where
    S: AsRef<str,>,
{
    for name in names {
        let name = name.as_ref();
        if !command_exists(name,) {
            warn!(name, "required command is missing");
            return Err(Error::CommandNotFound {
                name: name.to_owned(),
            },);
        }
    }

    Ok((),)
}
