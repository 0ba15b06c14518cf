//! Purpose: Wire a `Reporter` in as the process-wide panic hook.
//! Exports: `install`, `install_with_sink`.
//! Role: Dispatch adapter for uncaught panics on any thread.
//! Invariants: Installing again replaces the previous hook.
//! Invariants: The hook never panics; write failures are logged after the exit decision ran.
use std::backtrace::Backtrace;
use std::io::{self, Write};
use std::panic;
use std::sync::Arc;
use std::thread;

use crate::api::reporter::Reporter;
use crate::core::caught::Caught;

/// Reports panics on stderr.
pub fn install(reporter: Reporter) {
    install_with_sink(reporter, || Box::new(io::stderr()));
}

/// Reports panics on the writer returned by `sink` for each panic.
pub fn install_with_sink<F>(reporter: Reporter, sink: F)
where
    F: Fn() -> Box<dyn Write> + Send + Sync + 'static,
{
    let reporter = Arc::new(reporter);
    panic::set_hook(Box::new(move |info| {
        let current = thread::current();
        let thread_name = current.name().unwrap_or("<unnamed>");
        tracing::debug!(thread = thread_name, "reporting uncaught panic");

        let backtrace = reporter
            .settings()
            .show_stack_trace()
            .then(Backtrace::force_capture);
        let caught = Caught::from_panic(info, backtrace.as_ref());

        let mut out = sink();
        if let Err(err) = reporter.handle(&mut out, &caught) {
            tracing::warn!(thread = thread_name, error = %err, "failed to write panic report");
        }
    }));
    tracing::debug!("installed hint panic hook");
}
