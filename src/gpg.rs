// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Signing key inspection through `gpg`.
///
/// The key material is never imported into a keyring; `gpg` only lists it in
/// its colon-delimited machine format.
use std::path::Path;

use tracing::debug;

use crate::{
    error::Error,
    process::{CommandOutput, CommandRunner},
};

/// Default location of the ASCII-armored signing key.
pub const DEFAULT_KEY_PATH: &str = "misc/key.asc";

const RECORD_TYPE: usize = 0;
const FINGERPRINT: usize = 9;
const CAPABILITIES: usize = 11;

/// Returns the fingerprint of the signing-capable key in `key_path`.
///
/// Records are scanned from the end of the listing so a signing subkey wins
/// over the primary key. The fingerprint is read from the `fpr` row that
/// follows the matching `pub` or `sub` record.
///
/// # Errors
///
/// Returns [`Error::MissingKeyFile`] when `key_path` does not exist,
/// [`Error::Spawn`] or [`Error::CommandFailed`] when `gpg` cannot list the key,
/// and [`Error::NoSigningKey`] when no record carries signing capability.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use pkgmatrix::{SystemRunner, signing_key_fingerprint};
///
/// # fn example() -> Result<(), pkgmatrix::Error> {
/// let fingerprint = signing_key_fingerprint(&SystemRunner, Path::new("misc/key.asc",),)?;
/// println!("{fingerprint}");
/// # Ok(())
/// # }
/// ```
pub fn signing_key_fingerprint<R,>(runner: &R, key_path: &Path,) -> Result<String, Error,>
where
    R: CommandRunner + ?Sized,
{
    if !key_path.is_file() {
        return Err(Error::MissingKeyFile {
            path: key_path.to_path_buf(),
        },);
    }

    let path = key_path.to_string_lossy();
    let args = ["--batch", "--with-colons", "--import-options", "show-only", "--import", &*path];
    let output = runner.run("gpg", &args,)?;
    ensure_success(&output, &args,)?;

    let fingerprint = find_signing_fingerprint(&output.stdout,).ok_or_else(|| Error::NoSigningKey {
        path: key_path.to_path_buf(),
    },)?;
    debug!(%fingerprint, "resolved signing key fingerprint");

    Ok(fingerprint,)
}

fn ensure_success(output: &CommandOutput, args: &[&str],) -> Result<(), Error,>
{
    if output.success() {
        return Ok((),);
    }

    Err(Error::command_failed(format!("gpg {}", args.join(" ",)), output.code,),)
}

fn find_signing_fingerprint(listing: &str,) -> Option<String,>
{
    let rows: Vec<Vec<&str,>,> = listing
        .lines()
        .filter(|line| !line.is_empty(),)
        .map(|line| line.split(':',).collect(),)
        .collect();

    rows.iter().enumerate().rev().find_map(|(index, row,)| {
        if !is_signing_key(row,) {
            return None;
        }

        rows.get(index + 1,)
            .and_then(|next| next.get(FINGERPRINT,),)
            .filter(|fingerprint| !fingerprint.is_empty(),)
            .map(|fingerprint| (*fingerprint).to_owned(),)
    },)
}

fn is_signing_key(row: &[&str],) -> bool
{
    let is_key = matches!(row.get(RECORD_TYPE,).copied(), Some("pub" | "sub"));
    let can_sign = row
        .get(CAPABILITIES,)
        .is_some_and(|capabilities| capabilities.contains(['s', 'S',],),);
    is_key && can_sign
}

#[cfg(test)]
mod tests
{
    use tempfile::tempdir;

    use super::*;
    use crate::process::testing::ScriptedRunner;

    const LISTING: &str = "\
pub:-:4096:1:1111111111111111:1700000000:::-:::scESC::::::23::0:
fpr:::::::::AAAA1111AAAA1111AAAA1111AAAA1111AAAA1111:
uid:-::::1700000000::HASH::Builder <builder@example.org>::::::::::0:
sub:-:4096:1:2222222222222222:1700000000::::::e::::::23:
fpr:::::::::BBBB2222BBBB2222BBBB2222BBBB2222BBBB2222:
sub:-:4096:1:3333333333333333:1700000000::::::s::::::23:
fpr:::::::::CCCC3333CCCC3333CCCC3333CCCC3333CCCC3333:
";

    #[test]
    fn signing_subkey_wins_over_primary()
    {
        assert_eq!(
            find_signing_fingerprint(LISTING,).as_deref(),
            Some("CCCC3333CCCC3333CCCC3333CCCC3333CCCC3333")
        );
    }

    #[test]
    fn primary_key_is_used_without_signing_subkey()
    {
        let listing = LISTING.lines().take(5,).collect::<Vec<_,>>().join("\n",);
        assert_eq!(
            find_signing_fingerprint(&listing,).as_deref(),
            Some("AAAA1111AAAA1111AAAA1111AAAA1111AAAA1111")
        );
    }

    #[test]
    fn encryption_only_listing_has_no_signing_key()
    {
        let listing = "\
sub:-:4096:1:2222222222222222:1700000000::::::e::::::23:
fpr:::::::::BBBB2222BBBB2222BBBB2222BBBB2222BBBB2222:
";
        assert!(find_signing_fingerprint(listing,).is_none());
        assert!(find_signing_fingerprint("",).is_none());
    }

    #[test]
    fn missing_key_file_is_reported_before_running_gpg()
    {
        let runner = ScriptedRunner::default();
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("key.asc",);

        let error = signing_key_fingerprint(&runner, &path,).expect_err("expected missing key",);
        assert!(matches!(error, Error::MissingKeyFile { .. }));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn fingerprint_is_read_from_gpg_listing()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("key.asc",);
        std::fs::write(&path, "-----BEGIN PGP PUBLIC KEY BLOCK-----\n",).expect("write key",);
        let runner = ScriptedRunner::default().respond(0, LISTING,);

        let fingerprint = signing_key_fingerprint(&runner, &path,).expect("fingerprint",);
        assert_eq!(fingerprint, "CCCC3333CCCC3333CCCC3333CCCC3333CCCC3333");

        let calls = runner.calls.borrow();
        assert_eq!(calls[0][0], "gpg");
        assert!(calls[0].iter().any(|arg| arg == "--with-colons"));
        let expected = path.to_string_lossy().into_owned();
        assert_eq!(calls[0].last(), Some(&expected));
    }

    #[test]
    fn listing_without_signing_key_is_an_error()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("key.asc",);
        std::fs::write(&path, "armored",).expect("write key",);
        let runner = ScriptedRunner::default().respond(0, "uid:-::::::::Nobody:\n",);

        let error = signing_key_fingerprint(&runner, &path,).expect_err("expected no key",);
        assert!(matches!(error, Error::NoSigningKey { .. }));
    }

    #[test]
    fn gpg_failure_is_propagated()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("key.asc",);
        std::fs::write(&path, "armored",).expect("write key",);
        let runner = ScriptedRunner::default().respond(2, "",);

        let error = signing_key_fingerprint(&runner, &path,).expect_err("expected gpg failure",);
        assert!(matches!(error, Error::CommandFailed { .. }));
    }
}
