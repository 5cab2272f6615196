//! Configuration documents consumed by the build scripts.
//!
//! [`BuildConfig`] is created once at process start and then shared by
//! reference with every helper that needs it. It reads each document the
//! first time it is asked for and keeps the result, so a file is parsed at
//! most once per configuration. It bundles the typed build matrix with the
//! package list, whose structure belongs to the callers and is therefore
//! kept as a generic YAML tree.

use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::{
    error::{self, Error},
    gpg::DEFAULT_KEY_PATH,
    matrix::Matrix,
};

/// Default file name of the build matrix.
pub const DEFAULT_MATRIX_PATH: &str = "matrix.yaml";
/// Default file name of the package list.
pub const DEFAULT_PACKAGES_PATH: &str = "packages.yaml";

/// Locations of the files read by the helpers.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use pkgmatrix::Settings;
///
/// let settings = Settings::in_dir(Path::new("/srv/build",),);
/// assert_eq!(settings.matrix, Path::new("/srv/build/matrix.yaml"));
/// assert_eq!(settings.key, Path::new("/srv/build/misc/key.asc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Settings
{
    /// Path of the build matrix document.
    pub matrix:   PathBuf,
    /// Path of the package list document.
    pub packages: PathBuf,
    /// Path of the ASCII-armored signing key.
    pub key:      PathBuf,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            matrix:   PathBuf::from(DEFAULT_MATRIX_PATH,),
            packages: PathBuf::from(DEFAULT_PACKAGES_PATH,),
            key:      PathBuf::from(DEFAULT_KEY_PATH,),
        }
    }
}

impl Settings
{
    /// Resolves the default file names relative to `root`.
    pub fn in_dir(root: &Path,) -> Self
    {
        let defaults = Self::default();
        Self {
            matrix:   root.join(defaults.matrix,),
            packages: root.join(defaults.packages,),
            key:      root.join(defaults.key,),
        }
    }
}

/// Package list document.
///
/// The crate imposes no schema; lookups return raw YAML values.
#[derive(Debug, Clone, Default, PartialEq, Serialize,)]
#[serde(transparent)]
pub struct PackageList
{
    document: Value,
}

impl PackageList
{
    /// Loads the package list from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Parse`] when it is not valid YAML.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        let packages = Self::parse(&contents,)?;
        debug!(path = %path.display(), entries = packages.names().len(), "loaded package list");
        Ok(packages,)
    }

    /// Parses the package list from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the text is not valid YAML.
    pub fn parse(contents: &str,) -> Result<Self, Error,>
    {
        Ok(Self {
            document: serde_yaml::from_str(contents,)?,
        },)
    }

    /// Returns the value stored under a top-level key.
    pub fn get(&self, key: &str,) -> Option<&Value,>
    {
        self.document.get(key,)
    }

    /// Returns the top-level string keys in document order.
    ///
    /// Documents whose root is not a mapping have no names.
    pub fn names(&self,) -> Vec<&str,>
    {
        self.document
            .as_mapping()
            .map(|mapping| mapping.keys().filter_map(Value::as_str,).collect())
            .unwrap_or_default()
    }

    /// Borrows the whole document.
    pub fn as_value(&self,) -> &Value
    {
        &self.document
    }
}

/// Configuration documents named by [`Settings`], each read on first use.
///
/// A failed read is not cached; the next call tries again.
#[derive(Debug, Clone,)]
pub struct BuildConfig
{
    settings: Settings,
    matrix:   OnceCell<Matrix,>,
    packages: OnceCell<PackageList,>,
}

impl BuildConfig
{
    /// Creates a configuration that reads its documents on demand.
    pub fn new(settings: Settings,) -> Self
    {
        Self {
            settings,
            matrix: OnceCell::new(),
            packages: OnceCell::new(),
        }
    }

    /// Reads the matrix and the package list named by `settings` up front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when a file is missing and [`Error::Parse`] when
    /// one is malformed.
    pub fn load(settings: Settings,) -> Result<Self, Error,>
    {
        let config = Self::new(settings,);
        config.matrix()?;
        config.packages()?;
        Ok(config,)
    }

    /// Builds a configuration from already parsed documents.
    pub fn with_documents(settings: Settings, matrix: Matrix, packages: PackageList,) -> Self
    {
        Self {
            settings,
            matrix: OnceCell::with_value(matrix,),
            packages: OnceCell::with_value(packages,),
        }
    }

    /// File locations this configuration reads from.
    pub fn settings(&self,) -> &Settings
    {
        &self.settings
    }

    /// The build matrix, read from [`Settings::matrix`] on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Parse`] when it is malformed.
    pub fn matrix(&self,) -> Result<&Matrix, Error,>
    {
        self.matrix.get_or_try_init(|| Matrix::load(&self.settings.matrix,),)
    }

    /// The package list, read from [`Settings::packages`] on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Parse`] when it is malformed.
    pub fn packages(&self,) -> Result<&PackageList, Error,>
    {
        self.packages.get_or_try_init(|| PackageList::load(&self.settings.packages,),)
    }

    /// Location of the signing key material.
    pub fn key_path(&self,) -> &Path
    {
        &self.settings.key
    }
}
