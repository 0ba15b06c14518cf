//! Purpose: `take-a-hint` CLI entry point demonstrating hinted failure reports.
//! Role: Binary crate root; parses args, layers settings, installs the panic hook.
//! Invariants: Argument errors go through `ParseErrorHandler` with default settings.
//! Invariants: Returned command errors go through `ExecutionErrorHandler`.
//! Invariants: Process exit code is derived from the handlers or `api::to_exit_code`.
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use take_a_hint::api::{
    Caught, Error, ExecutionErrorHandler, HintCommand, HintConfig, HintHandler, HintRegistry,
    ParseErrorHandler, to_exit_code,
};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

/// Declarative metadata for this binary.
struct Launchpad;

impl HintHandler for Launchpad {
    fn hint_messages(&self) -> HintRegistry {
        command_dispatch::site_hints()
    }
}

fn main() {
    init_tracing();
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) => return handle_parse_error(&err, &args),
    };

    let command = match build_command(&cli) {
        Ok(command) => command,
        Err(err) => {
            emit_error(&err);
            return to_exit_code(err.kind());
        }
    };
    let reporter = command.clone().into_reporter();
    command.init();

    match command_dispatch::dispatch_command(cli.command, &reporter) {
        Ok(()) => 0,
        Err(err) => {
            let handler = ExecutionErrorHandler::new(reporter);
            handler
                .handle_execution_error(&err, &mut io::stderr().lock())
                .unwrap_or_else(|report_err| to_exit_code(report_err.kind()))
        }
    }
}

fn handle_parse_error(err: &clap::Error, args: &[OsString]) -> i32 {
    if matches!(
        err.kind(),
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
    ) {
        return match err.print() {
            Ok(()) => err.exit_code(),
            Err(_) => to_exit_code(take_a_hint::api::ErrorKind::Io),
        };
    }
    let handler = ParseErrorHandler::new(HintCommand::for_handler(&Launchpad).into_reporter());
    handler
        .handle_parse_error(err, args, &mut io::stderr().lock())
        .unwrap_or_else(|report_err| to_exit_code(report_err.kind()))
}

fn build_command(cli: &Cli) -> Result<HintCommand, Error> {
    let mut command = HintCommand::for_handler(&Launchpad);
    if let Some(path) = &cli.config {
        command = command.config(&HintConfig::from_path(path)?);
    }
    if cli.show_stack_trace {
        command = command.show_stack_trace(true);
    }
    if cli.hide_hints {
        command = command.show_hints(false);
    }
    if let Some(url) = &cli.docs_url {
        command = command.docs_url(url.as_str());
    }
    if let Some(code) = cli.exit_code {
        command = command.default_exit_code(code);
    }
    if let Some(separator) = &cli.separator {
        command = command.default_separator(separator.as_str());
    }
    Ok(command)
}

// Setup failures are reported in the same format, with built-in settings.
fn emit_error(err: &Error) {
    let reporter = HintCommand::new().into_reporter();
    let caught = Caught::from_error(err);
    if let Err(report_err) = reporter.report(&mut io::stderr().lock(), &caught) {
        tracing::warn!(error = %report_err, "failed to write error report");
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "take-a-hint",
    version,
    about = "Render uncaught failures as short, hinted console reports",
    after_help = r#"EXAMPLES
  $ take-a-hint panic "Oxygen leak !!!"
  $ take-a-hint --docs-url https://example.com/docs fail "Oxygen leak !!!" --hint "Check the tanks"
  $ take-a-hint --config hint.json settings"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        help = "JSON file with declarative hint settings",
        value_hint = ValueHint::FilePath
    )]
    config: Option<PathBuf>,
    #[arg(long, help = "Append the stack block to every report")]
    show_stack_trace: bool,
    #[arg(long, help = "Never print hint lines")]
    hide_hints: bool,
    #[arg(long, value_name = "URL", help = "Documentation URL shown under each report")]
    docs_url: Option<String>,
    #[arg(
        long,
        value_name = "CODE",
        allow_negative_numbers = true,
        help = "Exit code used after a panic report (1 keeps the default behavior)"
    )]
    exit_code: Option<i32>,
    #[arg(long, value_name = "TEXT", help = "Separator between prefixes and messages")]
    separator: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Panic with a plain message
    Panic { message: String },
    /// Panic with a hint-carrying error
    Fail {
        message: String,
        #[arg(long)]
        hint: Option<String>,
        #[arg(long)]
        custom_message: Option<String>,
    },
    /// Panic inside a function that has a registered default hint
    Annotated { message: String },
    /// Return an error instead of panicking
    Error {
        message: String,
        #[arg(long)]
        hint: Option<String>,
    },
    /// Print the effective settings as JSON
    Settings,
}
