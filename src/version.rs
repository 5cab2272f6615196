// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Codename and release-version helpers.
//!
//! Distribution releases are described by strings such as `"Bookworm
//! (stable)"` or `"22.04 LTS"`. The helpers here collapse those into the
//! canonical codename and the semantic version used for minimum-version
//! checks against the build matrix.

use semver::Version;

use crate::error::Error;

const LTS_SUFFIX: &str = " LTS";

/// Collapses a verbose release string to its canonical codename.
///
/// Takes the first whitespace-delimited token and lowercases it. Input
/// without any token yields an empty string.
///
/// # Examples
///
/// ```
/// use pkgmatrix::normalize_codename;
///
/// assert_eq!(normalize_codename("Bookworm (stable)",), "bookworm");
/// assert_eq!(normalize_codename("   ",), "");
/// ```
pub fn normalize_codename(release: &str,) -> String
{
    release.split_whitespace().next().map(str::to_lowercase,).unwrap_or_default()
}

/// Parses a release version into a [`Version`].
///
/// A trailing `" LTS"` marker is removed, numeric components lose their
/// leading zeros (`"22.04"` reads as `22.4.0`) and missing minor or patch
/// components are filled with zero. Components past the third move into the
/// build metadata (`"1.2.3.4"` reads as `1.2.3+4`), with trailing zero
/// components dropped, so four-part versions still order by their last part.
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] when the remaining text is not a
/// semantic version.
pub fn parse_release_version(value: &str,) -> Result<Version, Error,>
{
    let stripped = value.strip_suffix(LTS_SUFFIX,).unwrap_or(value,).trim();
    let (release, build,) = match stripped.split_once('+',) {
        Some((release, build,),) => (release, Some(build,),),
        None => (stripped, None,),
    };
    let (core, pre,) = release.split_at(release.find('-',).unwrap_or(release.len(),),);

    let mut components: Vec<String,> = core
        .split('.',)
        .map(|component| match component.parse::<u64,>() {
            Ok(number,) => number.to_string(),
            Err(_,) => component.to_owned(),
        },)
        .collect();
    let mut metadata = if components.len() > 3 { components.split_off(3,) } else { Vec::new() };
    while metadata.last().is_some_and(|component| component == "0",) {
        metadata.pop();
    }
    metadata.extend(build.map(str::to_owned,),);
    while components.len() < 3 {
        components.push("0".to_owned(),);
    }

    let mut candidate = format!("{}{pre}", components.join(".",));
    if !metadata.is_empty() {
        candidate.push('+',);
        candidate.push_str(&metadata.join(".",),);
    }
    Version::parse(&candidate,).map_err(|source| Error::InvalidVersion {
        value: value.to_owned(),
        source,
    },)
}

/// Returns `true` when `version` is greater than or equal to `minimum`.
///
/// Both sides go through [`parse_release_version`], so `"11.0"` satisfies a
/// minimum of `"10 LTS"`.
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] when either side fails to parse.
pub fn satisfies_minimum(version: &str, minimum: &str,) -> Result<bool, Error,>
{
    let version = parse_release_version(version,)?;
    let minimum = parse_release_version(minimum,)?;
    Ok(version >= minimum,)
}
