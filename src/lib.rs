//! Helpers for a package build pipeline.
//!
//! The library loads the build matrix (distributions × codenames ×
//! architectures) and the package list, answers the questions build scripts
//! ask about them (which targets exist, whether a codename is excluded,
//! whether a release meets the minimum version), converts package versions
//! to DEP-14 git reference names, and wraps the handful of external commands
//! the pipeline depends on (`gpg`, `git config`, `PATH` lookups).

mod commands;
mod config;
mod dep14;
mod error;
mod git;
mod gpg;
mod matrix;
mod process;
mod text;
mod version;

pub use commands::{command_exists, require_commands};
pub use config::{BuildConfig, DEFAULT_MATRIX_PATH, DEFAULT_PACKAGES_PATH, PackageList, Settings};
pub use dep14::{demangle, mangle};
pub use error::{Error, io_error};
pub use git::configured_signing_key;
pub use gpg::{DEFAULT_KEY_PATH, signing_key_fingerprint};
pub use matrix::{Distribution, Matrix, Target, Vars};
pub use process::{CommandOutput, CommandRunner, SystemRunner, run_checked};
pub use text::ellipsize;
pub use version::{normalize_codename, parse_release_version, satisfies_minimum};
