//! Purpose: Route clap parse failures and command execution failures through the reporter.
//! Exports: `ParseErrorHandler`, `ExecutionErrorHandler`, `ExitCodeMapper`.
//! Role: Dispatch adapters for CLI apps; the caller owns the process exit.
//! Invariants: Handlers return an exit code and never terminate the process.
//! Invariants: Help/version output from clap is passed through untouched.
use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use clap::error::ErrorKind as ClapErrorKind;

use crate::api::reporter::Reporter;
use crate::core::caught::{Caught, Failure};
use crate::core::error::Error;

const CLAP_ERROR_TYPE: &str = "clap::Error";
const EXIT_CODE_ON_EXECUTION_ERROR: i32 = 1;

/// Maps a reported failure to the exit code handed back to the caller.
pub type ExitCodeMapper = Arc<dyn Fn(&Caught) -> i32 + Send + Sync>;

#[derive(Clone)]
pub struct ParseErrorHandler {
    reporter: Reporter,
    exit_code_mapper: Option<ExitCodeMapper>,
}

impl fmt::Debug for ParseErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseErrorHandler")
            .field("reporter", &self.reporter)
            .field("exit_code_mapper", &self.exit_code_mapper.is_some())
            .finish()
    }
}

impl ParseErrorHandler {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            reporter,
            exit_code_mapper: None,
        }
    }

    pub fn with_exit_code_mapper(mut self, mapper: ExitCodeMapper) -> Self {
        self.exit_code_mapper = Some(mapper);
        self
    }

    pub fn handle_parse_error<W>(
        &self,
        err: &clap::Error,
        args: &[OsString],
        sink: &mut W,
    ) -> Result<i32, Error>
    where
        W: Write + ?Sized,
    {
        tracing::debug!(kind = ?err.kind(), args = ?args, "handling argument parse error");
        if matches!(
            err.kind(),
            ClapErrorKind::DisplayHelp
                | ClapErrorKind::DisplayVersion
                | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        ) {
            write!(sink, "{}", err.render())?;
            sink.flush()?;
            return Ok(err.exit_code());
        }

        let caught = Caught::Plain(Failure::new(CLAP_ERROR_TYPE, clap_error_summary(err)));
        self.reporter.report(sink, &caught)?;
        for tip in clap_error_tips(err) {
            writeln!(sink, "{tip}")?;
        }
        sink.flush()?;

        Ok(match &self.exit_code_mapper {
            Some(mapper) => mapper(&caught),
            None => err.exit_code(),
        })
    }
}

#[derive(Clone)]
pub struct ExecutionErrorHandler {
    reporter: Reporter,
    exit_code_mapper: Option<ExitCodeMapper>,
    exit_code_on_execution_error: i32,
}

impl fmt::Debug for ExecutionErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionErrorHandler")
            .field("reporter", &self.reporter)
            .field("exit_code_mapper", &self.exit_code_mapper.is_some())
            .field(
                "exit_code_on_execution_error",
                &self.exit_code_on_execution_error,
            )
            .finish()
    }
}

impl ExecutionErrorHandler {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            reporter,
            exit_code_mapper: None,
            exit_code_on_execution_error: EXIT_CODE_ON_EXECUTION_ERROR,
        }
    }

    pub fn with_exit_code_mapper(mut self, mapper: ExitCodeMapper) -> Self {
        self.exit_code_mapper = Some(mapper);
        self
    }

    pub fn with_exit_code_on_execution_error(mut self, code: i32) -> Self {
        self.exit_code_on_execution_error = code;
        self
    }

    pub fn handle_execution_error<E, W>(&self, err: &E, sink: &mut W) -> Result<i32, Error>
    where
        E: std::error::Error + 'static,
        W: Write + ?Sized,
    {
        let caught = Caught::from_error(err);
        self.reporter.report(sink, &caught)?;
        Ok(match &self.exit_code_mapper {
            Some(mapper) => mapper(&caught),
            None => self.exit_code_on_execution_error,
        })
    }
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_tips(err: &clap::Error) -> Vec<String> {
    err.to_string()
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("tip:"))
        .map(str::to_string)
        .collect()
}
