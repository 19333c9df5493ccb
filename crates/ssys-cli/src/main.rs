//! `ssys`: inspect star system and asset data files.
//!
//! ```text
//! ssys dump Ogat.xml              print the record as JSON
//! ssys check dat/ssys             parse a whole directory
//! ssys trace Ogat.xml             show every event and state change
//! ssys table asset                print the asset transition tables
//! ```

mod tables;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use ssys_data::{Document, Kind, load_dir, parse_document, write_report};
use ssys_machine::ParseError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_PARSE_ERROR: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "ssys", version, about = "Parse star system and asset data files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse files and print each record as JSON
    Dump {
        /// Data files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Parse every file as this kind instead of detecting it
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// One record per line
        #[arg(long)]
        compact: bool,
    },

    /// Parse every `*.xml` file under a directory and report failures
    Check {
        dir: PathBuf,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Print every event alongside the state change it caused
    Trace {
        file: PathBuf,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Print the open and close tables of a machine and audit them
    Table {
        #[arg(value_enum)]
        kind: KindArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Ssys,
    Asset,
}

impl From<KindArg> for Kind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ssys => Kind::SSystem,
            KindArg::Asset => Kind::Asset,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(anyhow::Error),
    /// A parse failure with the source it came from, for a full report.
    Parse {
        error: ParseError,
        source: String,
        filename: String,
    },
    Data(ssys_data::Error),
    /// Failures were already printed while the command ran.
    Reported { exit_code: i32 },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Parse { .. } => EXIT_PARSE_ERROR,
            CliError::Data(ssys_data::Error::Io { .. }) => EXIT_IO_ERROR,
            CliError::Data(_) => EXIT_PARSE_ERROR,
            CliError::Reported { exit_code } => *exit_code,
        }
    }

    fn from_data(error: ssys_data::Error, path: &Path, source: String) -> Self {
        match error {
            ssys_data::Error::Parse(error) => CliError::Parse {
                error,
                source,
                filename: path.display().to_string(),
            },
            other => CliError::Data(other),
        }
    }

    /// Print the error to stderr.
    fn report(&self) {
        match self {
            CliError::Parse {
                error,
                source,
                filename,
            } => {
                if write_report(error, filename, source, io::stderr()).is_err() {
                    eprintln!("error: {filename}: {error}");
                }
            }
            CliError::Reported { .. } => {}
            other => eprintln!("error: {other}"),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e:#}"),
            CliError::Parse {
                error, filename, ..
            } => write!(f, "{filename}: {error}"),
            CliError::Data(e) => write!(f, "{e}"),
            CliError::Reported { exit_code } => write!(f, "failed with exit code {exit_code}"),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<ssys_data::Error> for CliError {
    fn from(e: ssys_data::Error) -> Self {
        CliError::Data(e)
    }
}

// ============================================================================
// Commands
// ============================================================================

fn read_source(path: &Path) -> Result<String, CliError> {
    Ok(std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?)
}

fn load(path: &Path, kind: Option<KindArg>) -> Result<Document, CliError> {
    let source = read_source(path)?;
    let parsed = match kind {
        Some(kind) => Kind::from(kind).parse(&source),
        None => parse_document(&source),
    };
    parsed.map_err(|error| CliError::from_data(error, path, source))
}

fn print_json(document: &Document, compact: bool) -> Result<(), CliError> {
    let json = if compact {
        serde_json::to_string(document)
    } else {
        serde_json::to_string_pretty(document)
    }
    .context("serialising record")?;
    writeln!(io::stdout().lock(), "{json}").context("writing to stdout")?;
    Ok(())
}

fn dump(files: &[PathBuf], kind: Option<KindArg>, compact: bool) -> Result<(), CliError> {
    let mut worst = EXIT_SUCCESS;
    for path in files {
        match load(path, kind) {
            Ok(document) => {
                debug!(path = %path.display(), name = document.name(), "dumping");
                print_json(&document, compact)?
            }
            Err(err) => {
                err.report();
                worst = worst.max(err.exit_code());
            }
        }
    }
    if worst == EXIT_SUCCESS {
        Ok(())
    } else {
        Err(CliError::Reported { exit_code: worst })
    }
}

fn check(dir: &Path, kind: Option<KindArg>) -> Result<(), CliError> {
    if !dir.is_dir() {
        return Err(anyhow::anyhow!("{} is not a directory", dir.display()).into());
    }

    debug!(dir = %dir.display(), "checking directory");
    let batch = load_dir(dir, kind.map(Kind::from));
    let mut worst = EXIT_SUCCESS;
    for failure in &batch.failures {
        let err = match &failure.error {
            ssys_data::Error::Parse(error) => match std::fs::read_to_string(&failure.path) {
                Ok(source) => CliError::Parse {
                    error: error.clone(),
                    source,
                    filename: failure.path.display().to_string(),
                },
                Err(_) => CliError::Io(anyhow::anyhow!(
                    "{}: {error}",
                    failure.path.display()
                )),
            },
            other => CliError::Io(anyhow::anyhow!("{}: {other}", failure.path.display())),
        };
        err.report();
        worst = worst.max(failure_exit_code(&failure.error));
    }

    println!(
        "parsed {}, failed {}",
        batch.documents.len(),
        batch.failures.len()
    );
    if worst == EXIT_SUCCESS {
        Ok(())
    } else {
        Err(CliError::Reported { exit_code: worst })
    }
}

/// Exit code for one document a batch skipped.
fn failure_exit_code(error: &ssys_data::Error) -> i32 {
    match error {
        ssys_data::Error::Io { .. } | ssys_data::Error::Walk(_) => EXIT_IO_ERROR,
        _ => EXIT_PARSE_ERROR,
    }
}

fn trace(path: &Path, kind: Option<KindArg>) -> Result<(), CliError> {
    let source = read_source(path)?;
    let kind = match kind {
        Some(kind) => Kind::from(kind),
        None => match Kind::detect(&source) {
            Ok(kind) => kind,
            Err(error) => return Err(CliError::from_data(error, path, source)),
        },
    };

    debug!(path = %path.display(), %kind, "tracing");
    let trace = kind.trace(&source)?;
    let mut out = io::stdout().lock();
    for step in &trace.steps {
        writeln!(out, "{:<16} {} -> {}", step.from.to_string(), step.event, step.to)
            .context("writing to stdout")?;
    }

    match trace.result {
        Ok(document) => {
            writeln!(out, "parsed {kind} `{}`", document.name()).context("writing to stdout")?;
            Ok(())
        }
        Err(error) => {
            drop(out);
            Err(CliError::Parse {
                error,
                source,
                filename: path.display().to_string(),
            })
        }
    }
}

fn table(kind: KindArg) -> Result<(), CliError> {
    let (out, issues) = match Kind::from(kind) {
        Kind::SSystem => tables::render(ssys_data::ssys_machine()?),
        Kind::Asset => tables::render(ssys_data::asset_machine()?),
    };
    print!("{out}");
    if issues.is_empty() {
        Ok(())
    } else {
        Err(CliError::Reported {
            exit_code: EXIT_PARSE_ERROR,
        })
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Dump {
            files,
            kind,
            compact,
        } => dump(&files, kind, compact),
        Command::Check { dir, kind } => check(&dir, kind),
        Command::Trace { file, kind } => trace(&file, kind),
        Command::Table { kind } => table(kind),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                EXIT_USAGE_ERROR
            } else {
                EXIT_SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    match run(cli) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            e.report();
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use facet_testhelpers::test;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dump_args() {
        let cli =
            Cli::try_parse_from(["ssys", "dump", "a.xml", "b.xml", "--kind", "asset", "--compact"])
                .unwrap();
        let Command::Dump {
            files,
            kind,
            compact,
        } = cli.command
        else {
            panic!("expected dump");
        };
        assert_eq!(files, vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")]);
        assert_eq!(kind, Some(KindArg::Asset));
        assert!(compact);
    }

    #[test]
    fn test_dump_needs_a_file() {
        assert!(Cli::try_parse_from(["ssys", "dump"]).is_err());
        assert!(Cli::try_parse_from(["ssys", "table", "fleet"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let missing = load(Path::new("/nonexistent/Ogat.xml"), None).unwrap_err();
        assert_eq!(missing.exit_code(), EXIT_IO_ERROR);
        assert!(missing.to_string().contains("reading /nonexistent/Ogat.xml"));

        let error = ssys_data::parse_ssys("<ssys/>").unwrap_err();
        let parse = CliError::from_data(error, Path::new("Sol.xml"), "<ssys/>".into());
        assert_eq!(parse.exit_code(), EXIT_PARSE_ERROR);
        assert!(parse.to_string().starts_with("Sol.xml: "));

        let unknown = CliError::from(ssys_data::Error::UnknownRoot("fleet".into()));
        assert_eq!(unknown.exit_code(), EXIT_PARSE_ERROR);
    }

    #[test]
    fn test_batch_failure_exit_codes() {
        let io = ssys_data::Error::Io {
            path: PathBuf::from("Ogat.xml"),
            source: io::Error::from(io::ErrorKind::InvalidData),
        };
        assert_eq!(failure_exit_code(&io), EXIT_IO_ERROR);
        assert_eq!(
            failure_exit_code(&ssys_data::Error::UnknownRoot("fleet".into())),
            EXIT_PARSE_ERROR
        );
        let parse = ssys_data::parse_ssys("<ssys/>").unwrap_err();
        assert_eq!(failure_exit_code(&parse), EXIT_PARSE_ERROR);
    }
}
