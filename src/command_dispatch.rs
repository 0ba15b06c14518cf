//! Purpose: Hold top-level CLI command dispatch for `take-a-hint`.
//! Exports: `dispatch_command`, `site_hints`.
//! Role: Keep `main.rs` focused on parse/bootstrap and raise the demo failures here.
//! Invariants: Panicking commands rely on the installed hook for their output.
//! Invariants: `launch_probe` stays registered in `site_hints` under its own origin.

use std::io;
use std::panic;

use take_a_hint::api::{Error, ErrorKind, HintError, HintRegistry, Reporter};
use take_a_hint::origin;

use super::Command;

const PROBE_HINT: &str = "Probes only launch under a clear sky. Check the weather report and retry.";

pub(super) fn site_hints() -> HintRegistry {
    HintRegistry::new().function(module_path!(), "launch_probe", PROBE_HINT)
}

pub(super) fn dispatch_command(command: Command, reporter: &Reporter) -> Result<(), HintError> {
    match command {
        Command::Panic { message } => panic!("{message}"),
        Command::Fail {
            message,
            hint,
            custom_message,
        } => {
            let mut err = HintError::of(io::Error::other(message));
            if let Some(hint) = hint {
                err = err.with_hint(hint);
            }
            if let Some(custom_message) = custom_message {
                err = err.with_custom_message(custom_message);
            }
            panic::panic_any(err)
        }
        Command::Annotated { message } => launch_probe(&message),
        Command::Error { message, hint } => {
            let err = HintError::of(io::Error::other(message));
            Err(match hint {
                Some(hint) => err.with_hint(hint),
                None => err,
            })
        }
        Command::Settings => {
            let json = serde_json::to_string_pretty(reporter.settings()).map_err(|err| {
                HintError::of(
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode settings")
                        .with_source(err),
                )
            })?;
            println!("{json}");
            Ok(())
        }
    }
}

fn launch_probe(weather: &str) -> ! {
    panic::panic_any(HintError::of(io::Error::other(weather.to_string())).at(origin!()))
}
