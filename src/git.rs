// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Git configuration reads.
///
/// Only the signing key is consulted; the crate never writes git config.
use tracing::debug;

use crate::{error::Error, process::CommandRunner};

const SIGNING_KEY: &str = "user.signingkey";

/// Returns the signing key configured for git.
///
/// The repository-local value is preferred; the global value is used when no
/// local one is set.
///
/// # Errors
///
/// Returns [`Error::SigningKeyNotConfigured`] when neither scope sets
/// `user.signingkey`, and [`Error::Spawn`] when `git` cannot be started.
///
/// # Example
///
/// ```no_run
/// use pkgmatrix::{SystemRunner, configured_signing_key};
///
/// # fn example() -> Result<(), pkgmatrix::Error> {
/// let key = configured_signing_key(&SystemRunner,)?;
/// println!("signing with {key}");
/// # Ok(())
/// # }
/// ```
pub fn configured_signing_key<R,>(runner: &R,) -> Result<String, Error,>
where
    R: CommandRunner + ?Sized,
{
    for scope in ["--local", "--global"] {
        if let Some(key,) = read_config(runner, scope, SIGNING_KEY,)? {
            debug!(scope, key = %key, "found git signing key");
            return Ok(key,);
        }
    }

    Err(Error::SigningKeyNotConfigured,)
}

fn read_config<R,>(runner: &R, scope: &str, name: &str,) -> Result<Option<String,>, Error,>
where
    R: CommandRunner + ?Sized,
{
    let output = runner.run("git", &["config", scope, name],)?;
    if !output.success() {
        return Ok(None,);
    }

    let value = output.stdout.trim();
    if value.is_empty() {
        return Ok(None,);
    }

    Ok(Some(value.to_owned(),),)
}
