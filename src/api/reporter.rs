// Frozen render pipeline: settings + site hints + exit strategy.
use std::fmt;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use crate::core::caught::Caught;
use crate::core::config::{DEFAULT_EXIT_CODE, HintSettings};
use crate::core::error::Error;
use crate::core::origin::HintRegistry;
use crate::core::render::render;
use crate::core::resolve::resolve;

/// Ends the process after a report asks for a custom exit code.
pub trait Terminate: Send + Sync {
    fn terminate(&self, code: i32);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}

#[derive(Clone)]
pub struct Reporter {
    settings: HintSettings,
    registry: HintRegistry,
    terminator: Arc<dyn Terminate>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub(crate) fn new(
        settings: HintSettings,
        registry: HintRegistry,
        terminator: Arc<dyn Terminate>,
    ) -> Self {
        Self {
            settings,
            registry,
            terminator,
        }
    }

    pub fn settings(&self) -> &HintSettings {
        &self.settings
    }

    pub fn registry(&self) -> &HintRegistry {
        &self.registry
    }

    /// Custom exit code, if one replaces the platform's default failure code.
    pub fn exit_code(&self) -> Option<i32> {
        let code = self.settings.default_exit_code();
        (code != DEFAULT_EXIT_CODE).then_some(code)
    }

    /// Resolves and renders `caught` without deciding about the process.
    pub fn report<W>(&self, sink: &mut W, caught: &Caught) -> Result<(), Error>
    where
        W: Write + ?Sized,
    {
        // Site hints are invisible when hints are hidden.
        let origin_hint = if self.settings.show_hints() {
            self.registry.lookup(caught.origin())
        } else {
            None
        };
        let resolved = resolve(caught, &self.settings, origin_hint);
        render(sink, &self.settings, &resolved)?;
        Ok(())
    }

    /// Reports `caught`, then terminates when a custom exit code is configured.
    pub fn handle<W>(&self, sink: &mut W, caught: &Caught) -> Result<(), Error>
    where
        W: Write + ?Sized,
    {
        // A failed write still ends the process with the configured code.
        let reported = self.report(sink, caught);
        if let Some(code) = self.exit_code() {
            tracing::debug!(code, "terminating with custom exit code");
            self.terminator.terminate(code);
        }
        reported
    }

    /// Reports an error returned from `main` on stderr.
    pub fn finish<T, E>(&self, result: Result<T, E>) -> ExitCode
    where
        E: std::error::Error + 'static,
    {
        ExitCode::from(self.finish_with(&mut io::stderr().lock(), result))
    }

    fn finish_with<T, E, W>(&self, sink: &mut W, result: Result<T, E>) -> u8
    where
        E: std::error::Error + 'static,
        W: Write + ?Sized,
    {
        let Err(err) = result else {
            return 0;
        };
        let caught = Caught::from_error(&err);
        if let Err(report_err) = self.handle(sink, &caught) {
            tracing::warn!(error = %report_err, "failed to write error report");
        }
        1
    }
}
