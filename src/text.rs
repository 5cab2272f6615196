// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Display helpers for build logs.

const ELLIPSIS: &str = "...";

/// Truncates `text` to at most `max_length` characters.
///
/// Removed content is replaced by a three character ellipsis placed before
/// the kept tail when `keep_tail` is set and after the kept head otherwise.
/// Lengths are counted in `char`s. A limit that leaves no room next to the
/// ellipsis always yields an empty string; otherwise text that already fits
/// is returned unchanged.
///
/// Both directions keep exactly `max_length - 3` characters of the input, so
/// `ellipsize("abcdefghij", 5, true)` is `"...ij"` rather than `"...hij"`:
/// the longer form would be six characters and overrun the limit.
///
/// # Examples
///
/// ```
/// use pkgmatrix::ellipsize;
///
/// assert_eq!(ellipsize("abcdefghij", 5, false,), "ab...");
/// assert_eq!(ellipsize("abcdefghij", 5, true,), "...ij");
/// assert_eq!(ellipsize("ab", 5, false,), "ab");
/// ```
pub fn ellipsize(text: &str, max_length: usize, keep_tail: bool,) -> String
{
    let keep = max_length.saturating_sub(ELLIPSIS.len(),);
    if keep == 0 {
        return String::new();
    }

    let length = text.chars().count();
    if length <= max_length {
        return text.to_owned();
    }

    if keep_tail {
        let tail: String = text.chars().skip(length - keep,).collect();
        format!("{ELLIPSIS}{tail}")
    } else {
        let head: String = text.chars().take(keep,).collect();
        format!("{head}{ELLIPSIS}")
    }
}
