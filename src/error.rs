#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the build matrix crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the matrix loader, helpers and CLI.
///
/// Every failure is fatal to the calling build script; nothing in the crate
/// retries or degrades. Instances are typically constructed through the
/// [`io_error`] helper, the constructors on [`Error`], or the provided `From`
/// implementations.
#[derive(Debug, masterror::Error,)]
pub enum Error
{
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error,
    },
    /// Wraps serialization errors when rendering JSON output.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error,
    },
    /// Wraps YAML encoding errors when rendering the matrix back to text.
    #[error("failed to render matrix: {source}")]
    Render {
        /// Underlying encoding error from serde_yaml.
        source: serde_yaml::Error,
    },
    /// Wraps I/O errors raised while writing command output.
    #[error("failed to write output: {source}")]
    Output {
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Returned when a document or argument violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String,
    },
    /// Returned when a query names a distribution absent from the matrix.
    #[error("distribution '{dist}' is not present in the matrix")]
    UnknownDistribution {
        /// Distribution identifier requested by the caller.
        dist: String,
    },
    /// Returned when a version string cannot be read as a semantic version.
    #[error("invalid version '{value}': {source}")]
    InvalidVersion {
        /// Version string as supplied, before normalization.
        value:  String,
        /// Underlying parse error.
        source: semver::Error,
    },
    /// Returned when the signing key material is absent.
    #[error("key file {path:?} does not exist")]
    MissingKeyFile {
        /// Expected location of the ASCII-armored key.
        path: PathBuf,
    },
    /// Returned when the key material carries no signing-capable key.
    #[error("no signing-capable key found in {path:?}")]
    NoSigningKey {
        /// Location of the inspected key material.
        path: PathBuf,
    },
    /// Returned when neither local nor global git config names a signing key.
    #[error("user.signingkey is not configured in git (local or global)")]
    SigningKeyNotConfigured,
    /// Returned when a required executable is not on `PATH`.
    #[error("required command '{name}' was not found in PATH")]
    CommandNotFound {
        /// Name of the missing command.
        name: String,
    },
    /// Returned when a subprocess cannot be started at all.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error reported by the operating system.
        source:  std::io::Error,
    },
    /// Returned when a checked subprocess exits unsuccessfully.
    #[error("command '{command}' failed with {status}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit status description (`exit status N` or signal termination).
        status:  String,
    },
}

impl Error
{
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M,>(message: M,) -> Self
    where
        M: Into<String,>,
    {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Constructs a [`Error::CommandFailed`] from a rendered command line and
    /// the exit code, which is absent when a signal terminated the process.
    pub fn command_failed<C,>(command: C, code: Option<i32,>,) -> Self
    where
        C: Into<String,>,
    {
        let status = match code {
            Some(code,) => format!("exit status {code}"),
            None => "termination by signal".to_owned(),
        };
        Self::CommandFailed {
            command: command.into(),
            status,
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self,) -> String
    {
        format!("{self}")
    }
}

impl From<serde_yaml::Error,> for Error
{
    fn from(source: serde_yaml::Error,) -> Self
    {
        Self::Parse {
            source,
        }
    }
}

impl From<serde_json::Error,> for Error
{
    fn from(source: serde_json::Error,) -> Self
    {
        Self::Serialize {
            source,
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error,) -> Error
{
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}
