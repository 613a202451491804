mod commands;
mod helpers;

use clap::Parser;
use ebeam_core::domain::BeamError;

pub const EXIT_REVERTED: i32 = 1;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("ebeam".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_logging(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "ebeam", version, about = "Electron beam moment/Twiss conversion engine")]
struct Cli {
    /// Log conversion steps (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Print the default beam settings as JSON
    Defaults(commands::DefaultsArgs),
    /// Validate a settings file and list derived fields that are out of date
    Check(commands::CheckArgs),
    /// Build the beam from the active representation and repopulate every view
    Resolve(commands::ResolveArgs),
    /// Create settings from a syned electron beam JSON file
    Import(commands::ImportArgs),
    /// Convert one plane's Twiss parameters to second moments
    Twiss(commands::TwissArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Defaults(args) => commands::run_defaults_command(args),
        CliCommand::Check(args) => commands::run_check_command(args),
        CliCommand::Resolve(args) => commands::run_resolve_command(args),
        CliCommand::Import(args) => commands::run_import_command(args),
        CliCommand::Twiss(args) => commands::run_twiss_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Beam(#[from] BeamError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Beam(error) => error.exit_code(),
            Self::Internal(_) => 5,
        }
    }

    pub fn diagnostic_line(&self) -> String {
        match self {
            Self::Usage(message) => format!("ERROR: [INPUT.CLI_USAGE] {}", message.trim_end()),
            Self::Beam(error) => error.diagnostic_line(),
            Self::Internal(error) => format!("ERROR: [SYS.CLI] {error:#}"),
        }
    }
}
