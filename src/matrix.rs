// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Build matrix document and the views derived from it.
//!
//! The matrix maps a distribution identifier to the codenames and
//! architectures that should be built for it. Document order is preserved
//! everywhere: target expansion walks distributions, then codenames, then
//! architectures in the order they were written. Each entry also keeps the
//! YAML tree it was read from, so [`Matrix::to_yaml`] reproduces key order,
//! scalar types and keys the schema does not know about.

use std::{fmt, fs, path::Path};

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::{
    error::{self, Error},
    version,
};

/// Ordered mapping from distribution identifier to its build description.
///
/// # Examples
///
/// ```
/// use pkgmatrix::Matrix;
///
/// let yaml = r#"
/// debian:
///   codenames: [bookworm]
///   arch: [amd64, arm64]
/// "#;
/// let matrix = Matrix::parse(yaml,).expect("valid matrix",);
/// assert_eq!(matrix.target_names(), ["debian-bookworm-amd64", "debian-bookworm-arm64"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize,)]
#[serde(transparent)]
pub struct Matrix
{
    distributions: IndexMap<String, Distribution,>,
}

/// Build description of a single distribution.
#[derive(Debug, Clone, PartialEq,)]
pub struct Distribution
{
    /// Release codenames built for this distribution.
    pub codenames: Vec<String,>,

    /// Architectures built for every codename.
    pub arch: Vec<String,>,

    /// Per-distribution variables consulted by the query helpers.
    pub vars: Vars,

    /// Excludes the distribution from derived target lists when `true`.
    pub disabled: Option<bool,>,

    source: Value,
}

#[derive(Deserialize,)]
struct DistributionFields
{
    codenames: Vec<String,>,
    arch:      Vec<String,>,
    #[serde(default)]
    vars:      Vars,
    #[serde(default)]
    disabled:  Option<bool,>,
}

/// Variables attached to a distribution.
///
/// Variables owned by the build scripts are not modelled here; read them
/// from [`Distribution::source`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize,)]
pub struct Vars
{
    /// Codenames that callers should skip for this distribution.
    #[serde(default)]
    pub exclude: Option<Vec<String,>,>,

    /// Oldest release version supported, for example `"20.04 LTS"`.
    #[serde(default, deserialize_with = "deserialize_optional_version")]
    pub min_version: Option<String,>,
}

/// One concrete distribution, codename and architecture combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize,)]
pub struct Target
{
    /// Distribution identifier.
    pub dist:     String,
    /// Release codename.
    pub codename: String,
    /// Architecture.
    pub arch:     String,
}

impl Target
{
    /// Returns the display name `"{dist}-{codename}-{arch}"`.
    pub fn name(&self,) -> String
    {
        self.to_string()
    }
}

impl fmt::Display for Target
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}-{}-{}", self.dist, self.codename, self.arch)
    }
}

impl<'de,> Deserialize<'de,> for Distribution
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: Deserializer<'de,>,
    {
        let source = Value::deserialize(deserializer,)?;
        let fields: DistributionFields =
            serde_yaml::from_value(source.clone(),).map_err(D::Error::custom,)?;

        Ok(Self {
            codenames: fields.codenames,
            arch: fields.arch,
            vars: fields.vars,
            disabled: fields.disabled,
            source,
        },)
    }
}

impl Distribution
{
    /// YAML tree this entry was read from, unknown keys included.
    pub fn source(&self,) -> &Value
    {
        &self.source
    }

    /// Returns `true` when the distribution is explicitly disabled.
    pub fn is_disabled(&self,) -> bool
    {
        self.disabled == Some(true,)
    }

    /// Returns `true` when `codename` is listed in `vars.exclude`.
    ///
    /// The comparison is exact; callers normalize release strings with
    /// [`normalize_codename`](crate::normalize_codename) beforehand.
    pub fn excludes(&self, codename: &str,) -> bool
    {
        self.vars
            .exclude
            .as_ref()
            .is_some_and(|excluded| excluded.iter().any(|entry| entry == codename,),)
    }

    /// Returns `true` when `release` meets `vars.min_version`, or when no
    /// minimum is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] when either version fails to parse.
    pub fn accepts_version(&self, release: &str,) -> Result<bool, Error,>
    {
        match self.vars.min_version.as_deref() {
            None => Ok(true,),
            Some(minimum,) => version::satisfies_minimum(release, minimum,),
        }
    }
}

impl Matrix
{
    /// Loads the matrix from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Parse`] when the document does not match the schema.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        let matrix = Self::parse(&contents,)?;
        debug!(path = %path.display(), distributions = matrix.len(), "loaded build matrix");
        Ok(matrix,)
    }

    /// Parses the matrix from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the document does not match the schema.
    pub fn parse(contents: &str,) -> Result<Self, Error,>
    {
        Ok(serde_yaml::from_str(contents,)?,)
    }

    /// Number of distributions, disabled ones included.
    pub fn len(&self,) -> usize
    {
        self.distributions.len()
    }

    /// Returns `true` when the matrix lists no distribution.
    pub fn is_empty(&self,) -> bool
    {
        self.distributions.is_empty()
    }

    /// Iterates over distributions in document order.
    pub fn iter(&self,) -> impl Iterator<Item = (&str, &Distribution,),>
    {
        self.distributions.iter().map(|(name, body,)| (name.as_str(), body,),)
    }

    /// Looks up a distribution by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDistribution`] when `dist` is not listed.
    pub fn get(&self, dist: &str,) -> Result<&Distribution, Error,>
    {
        self.distributions.get(dist,).ok_or_else(|| Error::UnknownDistribution {
            dist: dist.to_owned(),
        },)
    }

    /// Returns a new matrix without the distributions marked `disabled: true`.
    ///
    /// Entries that omit the flag are kept.
    pub fn without_disabled(&self,) -> Self
    {
        let distributions = self
            .distributions
            .iter()
            .filter(|(_, body,)| !body.is_disabled(),)
            .map(|(name, body,)| (name.clone(), body.clone(),),)
            .collect();

        Self {
            distributions,
        }
    }

    /// Expands every distribution into its codename × architecture targets.
    ///
    /// Ordering follows the document: distribution, then codename, then
    /// architecture. Disabled distributions are expanded too; chain
    /// [`without_disabled`](Self::without_disabled) to skip them.
    pub fn targets(&self,) -> Vec<Target,>
    {
        self.distributions
            .iter()
            .flat_map(|(dist, body,)| {
                body.codenames.iter().flat_map(move |codename| {
                    body.arch.iter().map(move |arch| Target {
                        dist:     dist.clone(),
                        codename: codename.clone(),
                        arch:     arch.clone(),
                    },)
                },)
            },)
            .collect()
    }

    /// Renders every target as `"{dist}-{codename}-{arch}"`.
    pub fn target_names(&self,) -> Vec<String,>
    {
        self.targets().iter().map(Target::name,).collect()
    }

    /// Returns `true` when `codename` is excluded for `dist`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDistribution`] when `dist` is not listed.
    pub fn is_excluded(&self, codename: &str, dist: &str,) -> Result<bool, Error,>
    {
        Ok(self.get(dist,)?.excludes(codename,),)
    }

    /// Returns `true` when `release` satisfies the minimum version of `dist`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDistribution`] when `dist` is not listed and
    /// [`Error::InvalidVersion`] when a version fails to parse.
    pub fn is_compatible_version(&self, release: &str, dist: &str,) -> Result<bool, Error,>
    {
        self.get(dist,)?.accepts_version(release,)
    }

    /// Serializes the matrix back to YAML in the layout the build scripts
    /// commit to the repository.
    ///
    /// Every entry is emitted from the tree it was read from, so key order
    /// and scalar types survive. Mapping keys are rendered as plain strings,
    /// the document separator is dropped and every sequence item is indented
    /// two spaces deeper than the emitter places it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when encoding fails.
    pub fn to_yaml(&self,) -> Result<String, Error,>
    {
        let document: Mapping = self
            .distributions
            .iter()
            .map(|(name, body,)| (Value::String(name.clone(),), stringify_keys(&body.source,),),)
            .collect();
        let rendered = serde_yaml::to_string(&document,).map_err(|source| Error::Render {
            source,
        },)?;

        let header = Regex::new(r"\A---[ \t]*\r?\n",)
            .map_err(|e| Error::validation(format!("invalid regex: {e}"),),)?;
        let sequence_item =
            Regex::new(r"(?m)^( *)-",).map_err(|e| Error::validation(format!("invalid regex: {e}"),),)?;

        let without_header = header.replace(&rendered, "",);
        Ok(sequence_item.replace_all(&without_header, "${1}  -",).into_owned(),)
    }
}

/// Rewrites the keys of `value` and of every nested mapping as strings.
///
/// Sequences are left alone, including mappings inside them.
fn stringify_keys(value: &Value,) -> Value
{
    let Value::Mapping(mapping,) = value else {
        return value.clone();
    };

    let rewritten: Mapping = mapping
        .iter()
        .map(|(key, item,)| {
            let item = match item {
                Value::Mapping(_,) => stringify_keys(item,),
                other => other.clone(),
            };
            (key_as_string(key,), item,)
        },)
        .collect();
    Value::Mapping(rewritten,)
}

fn key_as_string(key: &Value,) -> Value
{
    match key {
        Value::Null => Value::String(String::new(),),
        Value::Bool(flag,) => Value::String(flag.to_string(),),
        Value::Number(number,) => Value::String(number.to_string(),),
        other => other.clone(),
    }
}

fn deserialize_optional_version<'de, D,>(deserializer: D,) -> Result<Option<String,>, D::Error,>
where
    D: Deserializer<'de,>,
{
    match Option::<Value,>::deserialize(deserializer,)? {
        None | Some(Value::Null,) => Ok(None,),
        Some(Value::String(text,),) => Ok(Some(text,),),
        Some(Value::Number(number,),) => Ok(Some(number.to_string(),),),
        Some(other,) => {
            Err(D::Error::custom(format!("min_version must be a string or number, got {other:?}"),),)
        }
    }
}
