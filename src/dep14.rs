// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! DEP-14 version mangling.
//!
//! Debian package versions may contain characters that git refuses in
//! reference names. DEP-14 maps `:` to `%` and `~` to `_`, and appends `#` to
//! any `.` that would otherwise form `..`, end the name, or precede `lock`.
//! [`demangle`] reverses the character mapping and drops every `#`, so a
//! version that already contained `#` does not survive a round trip.

/// Encodes a package version as a git-safe reference component.
///
/// # Examples
///
/// ```
/// use pkgmatrix::mangle;
///
/// assert_eq!(mangle("1:2.3~4",), "1%2.3_4");
/// assert_eq!(mangle("1.2.",), "1.2.#");
/// assert_eq!(mangle("1..2.lock",), "1.#.2.#lock");
/// ```
pub fn mangle(version: &str,) -> String
{
    let substituted: Vec<char,> = version
        .chars()
        .map(|ch| match ch {
            ':' => '%',
            '~' => '_',
            other => other,
        },)
        .collect();

    let mut mangled = String::with_capacity(substituted.len() + 4,);
    for (index, ch,) in substituted.iter().enumerate() {
        mangled.push(*ch,);
        if *ch == '.' && needs_marker(&substituted[index + 1..],) {
            mangled.push('#',);
        }
    }

    mangled
}

/// Decodes a DEP-14 reference component back into a package version.
///
/// # Examples
///
/// ```
/// use pkgmatrix::demangle;
///
/// assert_eq!(demangle("1%2.3_4",), "1:2.3~4");
/// assert_eq!(demangle("1.2.#",), "1.2.");
/// ```
pub fn demangle(version: &str,) -> String
{
    version
        .chars()
        .filter_map(|ch| match ch {
            '%' => Some(':',),
            '_' => Some('~',),
            '#' => None,
            other => Some(other,),
        },)
        .collect()
}

fn needs_marker(rest: &[char],) -> bool
{
    match rest {
        [] => true,
        ['.', ..] => true,
        ['l', 'o', 'c', 'k', ..] => true,
        _ => false,
    }
}
