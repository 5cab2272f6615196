//! Command-line interface for the pkgmatrix binary.
//!
//! Build scripts call the subcommands to expand the matrix and to ask the
//! per-target questions. Boolean queries answer through the exit status:
//! `0` for yes and `1` for no. Errors are printed to standard error and exit
//! with status `2`.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use pkgmatrix::{
    BuildConfig, DEFAULT_KEY_PATH, DEFAULT_MATRIX_PATH, DEFAULT_PACKAGES_PATH, Error, Matrix,
    Settings, SystemRunner, Target, configured_signing_key, demangle, ellipsize, mangle, normalize_codename,
    require_commands, signing_key_fingerprint,
};
use tracing_subscriber::EnvFilter;

/// Command line interface for querying the package build matrix.
#[derive(Debug, Parser,)]
#[command(name = "pkgmatrix", version, about = "Query the package build matrix")]
struct Cli
{
    #[command(flatten)]
    files: FileArgs,

    #[command(subcommand)]
    command: Command,
}

/// Locations of the configuration documents.
#[derive(Debug, Args,)]
struct FileArgs
{
    /// Path to the build matrix document.
    #[arg(long, global = true, env = "PKGMATRIX_MATRIX", default_value = DEFAULT_MATRIX_PATH)]
    matrix: PathBuf,

    /// Path to the package list document.
    #[arg(long, global = true, env = "PKGMATRIX_PACKAGES", default_value = DEFAULT_PACKAGES_PATH)]
    packages: PathBuf,

    /// Path to the ASCII-armored signing key.
    #[arg(long, global = true, env = "PKGMATRIX_KEY", default_value = DEFAULT_KEY_PATH)]
    key: PathBuf,
}

impl From<FileArgs,> for Settings
{
    fn from(files: FileArgs,) -> Self
    {
        Self {
            matrix:   files.matrix,
            packages: files.packages,
            key:      files.key,
        }
    }
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// List build targets, one name per line.
    Targets(TargetsArgs,),
    /// Print the matrix in its canonical YAML layout.
    Matrix(MatrixArgs,),
    /// Print the package list as JSON.
    Packages,
    /// Exit 0 when CODENAME is excluded for DIST.
    Excluded(ExcludedArgs,),
    /// Exit 0 when VERSION meets the minimum version of DIST.
    Compatible(CompatibleArgs,),
    /// Print the canonical codename for a release string.
    Normalize(TextArgs,),
    /// Print the DEP-14 mangled form of a version.
    Mangle(TextArgs,),
    /// Print the version encoded by a DEP-14 reference component.
    Demangle(TextArgs,),
    /// Shorten text for log output.
    Ellipsize(EllipsizeArgs,),
    /// Print the fingerprint of the signing key.
    Fingerprint,
    /// Print the signing key configured in git.
    #[command(name = "signing-key")]
    SigningKey,
    /// Fail unless every named command is on PATH.
    Require(RequireArgs,),
}

#[derive(Debug, Args,)]
struct TargetsArgs
{
    /// Include distributions marked `disabled: true`.
    #[arg(long = "all", action = ArgAction::SetTrue)]
    all: bool,

    /// Emit the targets as a JSON array of objects.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args,)]
struct MatrixArgs
{
    /// Include distributions marked `disabled: true`.
    #[arg(long = "all", action = ArgAction::SetTrue)]
    all: bool,
}

#[derive(Debug, Args,)]
struct ExcludedArgs
{
    /// Release codename, normalized before the lookup.
    codename: String,
    /// Distribution identifier.
    dist:     String,
}

#[derive(Debug, Args,)]
struct CompatibleArgs
{
    /// Release version, for example `22.04 LTS`.
    version: String,
    /// Distribution identifier.
    dist:    String,
}

#[derive(Debug, Args,)]
struct TextArgs
{
    /// Input string.
    value: String,
}

#[derive(Debug, Args,)]
struct EllipsizeArgs
{
    /// Input string.
    value: String,

    /// Maximum length of the output in characters.
    #[arg(long = "max", value_name = "N")]
    max: usize,

    /// Keep the end of the string instead of the beginning.
    #[arg(long = "tail", action = ArgAction::SetTrue)]
    tail: bool,
}

#[derive(Debug, Args,)]
struct RequireArgs
{
    /// Command names that must resolve on PATH.
    #[arg(required = true)]
    names: Vec<String,>,
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
enum Answer
{
    Yes,
    No,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main() -> ExitCode
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env(),)
        .with_writer(io::stderr,)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match run(cli, &mut handle,) {
        Ok(Answer::Yes,) => ExitCode::SUCCESS,
        Ok(Answer::No,) => ExitCode::from(1,),
        Err(error,) => {
            eprintln!("{}", error.to_display_string());
            ExitCode::from(2,)
        }
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from configuration loading, queries and
/// external commands.
fn run<W: Write,>(cli: Cli, out: &mut W,) -> Result<Answer, Error,>
{
    let config = BuildConfig::new(Settings::from(cli.files,),);
    match cli.command {
        Command::Targets(args,) => {
            let matrix = selected_matrix(&config, args.all,)?;
            write_targets(out, &matrix.targets(), args.json,)?;
            Ok(Answer::Yes,)
        }
        Command::Matrix(args,) => {
            let matrix = selected_matrix(&config, args.all,)?;
            write_text(out, &matrix.to_yaml()?,)?;
            Ok(Answer::Yes,)
        }
        Command::Packages => {
            serde_json::to_writer(&mut *out, config.packages()?,)?;
            write_line(out, "",)?;
            Ok(Answer::Yes,)
        }
        Command::Excluded(args,) => {
            let matrix = config.matrix()?;
            let codename = normalize_codename(&args.codename,);
            Ok(answer(matrix.is_excluded(&codename, &args.dist,)?,),)
        }
        Command::Compatible(args,) => {
            let matrix = config.matrix()?;
            Ok(answer(matrix.is_compatible_version(&args.version, &args.dist,)?,),)
        }
        Command::Normalize(args,) => print_value(out, &normalize_codename(&args.value,),),
        Command::Mangle(args,) => print_value(out, &mangle(&args.value,),),
        Command::Demangle(args,) => print_value(out, &demangle(&args.value,),),
        Command::Ellipsize(args,) => print_value(out, &ellipsize(&args.value, args.max, args.tail,),),
        Command::Fingerprint => {
            print_value(out, &signing_key_fingerprint(&SystemRunner, config.key_path(),)?,)
        }
        Command::SigningKey => print_value(out, &configured_signing_key(&SystemRunner,)?,),
        Command::Require(args,) => {
            require_commands(&args.names,)?;
            Ok(Answer::Yes,)
        }
    }
}

fn selected_matrix(config: &BuildConfig, include_disabled: bool,) -> Result<Matrix, Error,>
{
    let matrix = config.matrix()?;
    if include_disabled { Ok(matrix.clone(),) } else { Ok(matrix.without_disabled(),) }
}

fn answer(value: bool,) -> Answer
{
    if value { Answer::Yes } else { Answer::No }
}

fn write_targets<W: Write,>(out: &mut W, targets: &[Target], json: bool,) -> Result<(), Error,>
{
    if json {
        serde_json::to_writer(&mut *out, targets,)?;
        return write_line(out, "",);
    }

    for target in targets {
        write_line(out, &target.name(),)?;
    }

    Ok((),)
}

fn print_value<W: Write,>(out: &mut W, value: &str,) -> Result<Answer, Error,>
{
    write_line(out, value,)?;
    Ok(Answer::Yes,)
}

fn write_line<W: Write,>(out: &mut W, line: &str,) -> Result<(), Error,>
{
    writeln!(out, "{line}").map_err(|source| Error::Output {
        source,
    },)
}

fn write_text<W: Write,>(out: &mut W, text: &str,) -> Result<(), Error,>
{
    out.write_all(text.as_bytes(),).map_err(|source| Error::Output {
        source,
    },)
}

#[cfg(test)]
mod tests
{
    use std::{fs, path::Path};

    use clap::Parser;
    use tempfile::tempdir;

    use super::{Answer, Cli, Command, run};

    const MATRIX: &str = r#"
debian:
  codenames: [bookworm, bullseye]
  arch: [amd64]
  vars:
    exclude: [bullseye]
ubuntu:
  codenames: [noble]
  arch: [amd64]
  vars:
    min_version: 20.04 LTS
  disabled: true
"#;

    fn invoke(dir: &Path, args: &[&str],) -> (Result<Answer, pkgmatrix::Error,>, String,)
    {
        let matrix = dir.join("matrix.yaml",);
        let mut argv = vec![
            env!("CARGO_PKG_NAME").to_owned(),
            "--matrix".to_owned(),
            matrix.to_string_lossy().into_owned(),
        ];
        argv.extend(args.iter().map(|arg| (*arg).to_owned(),),);

        let cli = Cli::try_parse_from(argv,).expect("failed to parse CLI",);
        let mut buffer = Vec::new();
        let result = run(cli, &mut buffer,);
        (result, String::from_utf8(buffer,).expect("invalid UTF-8",),)
    }

    fn workspace() -> tempfile::TempDir
    {
        let temp = tempdir().expect("failed to create tempdir",);
        fs::write(temp.path().join("matrix.yaml",), MATRIX,).expect("failed to write matrix",);
        temp
    }

    #[test]
    fn targets_skip_disabled_by_default()
    {
        let temp = workspace();
        let (result, output,) = invoke(temp.path(), &["targets"],);
        assert_eq!(result.expect("targets",), Answer::Yes);
        assert_eq!(output, "debian-bookworm-amd64\ndebian-bullseye-amd64\n");
    }

    #[test]
    fn targets_all_includes_disabled_as_json()
    {
        let temp = workspace();
        let (result, output,) = invoke(temp.path(), &["targets", "--all", "--json"],);
        result.expect("targets",);

        let parsed: serde_json::Value = serde_json::from_str(&output,).expect("valid JSON",);
        let targets = parsed.as_array().expect("array",);
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[2]["dist"], "ubuntu");
        assert_eq!(targets[2]["codename"], "noble");
    }

    #[test]
    fn excluded_normalizes_the_codename()
    {
        let temp = workspace();
        let (result, _,) = invoke(temp.path(), &["excluded", "Bullseye (oldstable)", "debian"],);
        assert_eq!(result.expect("query",), Answer::Yes);

        let (result, _,) = invoke(temp.path(), &["excluded", "bookworm", "debian"],);
        assert_eq!(result.expect("query",), Answer::No);
    }

    #[test]
    fn compatible_answers_through_exit_status()
    {
        let temp = workspace();
        let (result, _,) = invoke(temp.path(), &["compatible", "24.04 LTS", "ubuntu"],);
        assert_eq!(result.expect("query",), Answer::Yes);

        let (result, _,) = invoke(temp.path(), &["compatible", "18.04", "ubuntu"],);
        assert_eq!(result.expect("query",), Answer::No);
    }

    #[test]
    fn unknown_distribution_is_an_error()
    {
        let temp = workspace();
        let (result, _,) = invoke(temp.path(), &["excluded", "sid", "arch"],);
        assert!(matches!(result, Err(pkgmatrix::Error::UnknownDistribution { .. })));
    }

    #[test]
    fn matrix_prints_enabled_distributions()
    {
        let temp = workspace();
        let (result, output,) = invoke(temp.path(), &["matrix"],);
        result.expect("matrix",);
        assert!(output.starts_with("debian:\n  codenames:\n    - bookworm\n",));
        assert!(!output.contains("ubuntu",));
    }

    #[test]
    fn string_helpers_print_their_result()
    {
        let temp = workspace();
        assert_eq!(invoke(temp.path(), &["mangle", "1:2.3~4"],).1, "1%2.3_4\n");
        assert_eq!(invoke(temp.path(), &["demangle", "1%2.3_4"],).1, "1:2.3~4\n");
        assert_eq!(invoke(temp.path(), &["normalize", "Trixie (testing)"],).1, "trixie\n");
        assert_eq!(
            invoke(temp.path(), &["ellipsize", "abcdefghij", "--max", "5", "--tail"],).1,
            "...ij\n"
        );
    }

    #[test]
    fn require_reports_missing_command()
    {
        let temp = workspace();
        let (result, _,) =
            invoke(temp.path(), &["require", "pkgmatrix-definitely-missing-binary"],);
        assert!(matches!(result, Err(pkgmatrix::Error::CommandNotFound { .. })));
    }

    #[test]
    fn missing_matrix_file_is_a_load_error()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let (result, _,) = invoke(temp.path(), &["targets"],);
        assert!(matches!(result, Err(pkgmatrix::Error::Io { .. })));
    }

    #[test]
    fn fingerprint_reads_the_key_named_on_the_command_line()
    {
        let temp = workspace();
        let key = temp.path().join("release.asc",);
        let (result, _,) = invoke(temp.path(), &["--key", &key.to_string_lossy(), "fingerprint"],);
        match result {
            Err(pkgmatrix::Error::MissingKeyFile {
                path,
            },) => assert_eq!(path, key),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn packages_are_read_from_the_configured_path()
    {
        let temp = workspace();
        let packages = temp.path().join("pkgs.yaml",);
        fs::write(&packages, "hello:\n  dists: [debian]\n",).expect("failed to write packages",);

        let (result, output,) =
            invoke(temp.path(), &["--packages", &packages.to_string_lossy(), "packages"],);
        result.expect("packages",);
        assert_eq!(output, "{\"hello\":{\"dists\":[\"debian\"]}}\n");
    }

    #[test]
    fn queries_do_not_need_the_package_list()
    {
        let temp = workspace();
        let (result, _,) = invoke(temp.path(), &["compatible", "24.04", "ubuntu"],);
        assert_eq!(result.expect("query",), Answer::Yes);
    }

    #[test]
    fn require_needs_at_least_one_name()
    {
        let parsed = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "require"],);
        assert!(parsed.is_err());
    }

    #[test]
    fn packages_parses_and_subcommand_is_mandatory()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "packages"],).expect("parse",);
        assert!(matches!(cli.command, Command::Packages));
        assert!(Cli::try_parse_from([env!("CARGO_PKG_NAME")],).is_err());
    }
}
