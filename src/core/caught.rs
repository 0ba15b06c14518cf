//! Purpose: Model a caught failure as either a plain error or a hint-carrying envelope.
//! Exports: `HintError`, `Failure`, `Caught`, `PANIC_TYPE_NAME`.
//! Role: Input of the message resolver; snapshots errors and panic payloads.
//! Invariants: A hinted envelope with a cause renders the cause as its source.
//! Invariants: Snapshots own their text, so reports never borrow the panic payload.
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt;
use std::panic::{Location, PanicHookInfo};

use crate::core::origin::Origin;

/// Type name reported for panics whose payload carries no message.
pub const PANIC_TYPE_NAME: &str = "panic";

/// Error that carries a hints message and a custom error message next to an
/// optional cause.
///
/// Raise it with `?`, return it from `main`, or hand it to
/// `std::panic::panic_any` to have the panic hook render it.
pub struct HintError {
    cause: Option<Box<dyn StdError + Send + Sync>>,
    cause_type: Option<&'static str>,
    hints_message: String,
    custom_error_message: String,
    origin: Origin,
    backtrace: Backtrace,
}

impl HintError {
    /// Envelope raised by hand, without an underlying cause.
    #[track_caller]
    pub fn new() -> Self {
        Self {
            cause: None,
            cause_type: None,
            hints_message: String::new(),
            custom_error_message: String::new(),
            origin: Origin::from_location(Location::caller()),
            backtrace: Backtrace::capture(),
        }
    }

    #[track_caller]
    pub fn of<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut err = Self::new();
        err.cause = Some(Box::new(cause));
        err.cause_type = Some(std::any::type_name::<E>());
        err
    }

    pub fn with_hint(mut self, hints_message: impl Into<String>) -> Self {
        self.hints_message = hints_message.into();
        self
    }

    pub fn with_custom_message(mut self, custom_error_message: impl Into<String>) -> Self {
        self.custom_error_message = custom_error_message.into();
        self
    }

    /// Replaces the recorded caller location, typically with `origin!()`.
    pub fn at(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn hints_message(&self) -> &str {
        &self.hints_message
    }

    pub fn custom_error_message(&self) -> &str {
        &self.custom_error_message
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl Default for HintError {
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintError")
            .field("cause", &self.cause)
            .field("hints_message", &self.hints_message)
            .field("custom_error_message", &self.custom_error_message)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for HintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{cause}"),
            None if !self.custom_error_message.is_empty() => {
                f.write_str(&self.custom_error_message)
            }
            None => f.write_str("hint error"),
        }
    }
}

impl StdError for HintError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn StdError + 'static))
    }
}

/// Owned snapshot of one error: what the report prints about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    type_name: String,
    message: String,
    origin: Option<Origin>,
    backtrace: Option<String>,
    causes: Vec<String>,
}

impl Failure {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            origin: None,
            backtrace: None,
            causes: Vec::new(),
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Keeps the backtrace only when it was actually captured.
    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            self.backtrace = Some(backtrace.to_string());
        }
        self
    }

    pub fn with_causes(mut self, causes: Vec<String>) -> Self {
        self.causes = causes;
        self
    }

    fn adopt_frame(&mut self, frame: &Origin) {
        if let Some(origin) = self.origin.as_mut() {
            origin.adopt(frame);
        }
    }

    fn from_dyn(type_name: &str, err: &(dyn StdError + 'static)) -> Self {
        Self::new(type_name, err.to_string()).with_causes(source_chain(err.source()))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// Lines of the stack block, before prefixing.
    pub fn stack_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.message.trim().is_empty() {
            lines.push(self.type_name.clone());
        } else {
            lines.extend(
                format!("{}: {}", self.type_name, self.message)
                    .lines()
                    .map(str::to_string),
            );
        }
        if let Some(backtrace) = &self.backtrace {
            lines.extend(backtrace.lines().map(str::to_string));
        }
        for cause in &self.causes {
            lines.push(format!("Caused by: {cause}"));
        }
        lines
    }
}

/// A caught failure, classified for the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Caught {
    Plain(Failure),
    Hinted {
        /// The envelope itself; the source when there is no cause.
        envelope: Failure,
        cause: Option<Failure>,
        hints_message: String,
        custom_error_message: String,
    },
}

impl Caught {
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + 'static,
    {
        if let Some(hint) = (err as &dyn Any).downcast_ref::<HintError>() {
            return Self::from_hint_error(hint);
        }
        Caught::Plain(Failure::from_dyn(std::any::type_name::<E>(), err))
    }

    /// For type-erased errors; the reported type name is the erased one.
    pub fn from_dyn_error(err: &(dyn StdError + 'static)) -> Self {
        if let Some(hint) = err.downcast_ref::<HintError>() {
            return Self::from_hint_error(hint);
        }
        Caught::Plain(Failure::from_dyn(std::any::type_name_of_val(err), err))
    }

    pub fn from_hint_error(err: &HintError) -> Self {
        let origin = err.origin().clone();
        let cause = err.cause().map(|cause| {
            let cause: &(dyn StdError + 'static) = cause;
            Failure::from_dyn(err.cause_type.unwrap_or("error"), cause)
                .with_origin(origin.clone())
                .with_backtrace(err.backtrace())
        });
        let envelope_message = match err.cause() {
            Some(cause) => cause.to_string(),
            None => String::new(),
        };
        let envelope = Failure::new(std::any::type_name::<HintError>(), envelope_message)
            .with_origin(origin)
            .with_backtrace(err.backtrace());
        Caught::Hinted {
            envelope,
            cause,
            hints_message: err.hints_message().to_string(),
            custom_error_message: err.custom_error_message().to_string(),
        }
    }

    /// Classifies a panic. `backtrace` is used unless a `HintError` payload
    /// already captured one.
    ///
    /// The origin comes from the frame that panicked, so registry hints keyed
    /// by function or type apply to plain panics too.
    pub fn from_panic(info: &PanicHookInfo<'_>, backtrace: Option<&Backtrace>) -> Self {
        let frame = Origin::panicking_frame();
        let payload = info.payload();
        if let Some(hint) = payload.downcast_ref::<HintError>() {
            let mut caught = Self::from_hint_error(hint);
            if let Some(frame) = &frame {
                caught.adopt_frame(frame);
            }
            if let Some(backtrace) = backtrace {
                caught.fill_backtrace(backtrace);
            }
            return caught;
        }

        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            String::new()
        };
        let origin = match (frame, info.location()) {
            (Some(frame), Some(location)) => Some(frame.located_at(location)),
            (Some(frame), None) => Some(frame),
            (None, location) => location.map(Origin::from_location),
        };
        let mut failure = Failure::new(PANIC_TYPE_NAME, message);
        if let Some(origin) = origin {
            failure = failure.with_origin(origin);
        }
        if let Some(backtrace) = backtrace {
            failure = failure.with_backtrace(backtrace);
        }
        Caught::Plain(failure)
    }

    /// Failure whose type and stack are shown.
    pub fn source(&self) -> &Failure {
        match self {
            Caught::Plain(failure) => failure,
            Caught::Hinted {
                cause: Some(cause), ..
            } => cause,
            Caught::Hinted { envelope, .. } => envelope,
        }
    }

    /// Message of the caught value itself, before unwrapping.
    pub fn message(&self) -> &str {
        match self {
            Caught::Plain(failure) => failure.message(),
            Caught::Hinted { envelope, .. } => envelope.message(),
        }
    }

    pub fn hints_message(&self) -> &str {
        match self {
            Caught::Plain(_) => "",
            Caught::Hinted { hints_message, .. } => hints_message,
        }
    }

    pub fn custom_error_message(&self) -> &str {
        match self {
            Caught::Plain(_) => "",
            Caught::Hinted {
                custom_error_message,
                ..
            } => custom_error_message,
        }
    }

    pub fn origin(&self) -> Option<&Origin> {
        match self {
            Caught::Plain(failure) => failure.origin(),
            Caught::Hinted { envelope, .. } => envelope.origin(),
        }
    }

    fn adopt_frame(&mut self, frame: &Origin) {
        match self {
            Caught::Plain(failure) => failure.adopt_frame(frame),
            Caught::Hinted {
                envelope, cause, ..
            } => {
                envelope.adopt_frame(frame);
                if let Some(cause) = cause {
                    cause.adopt_frame(frame);
                }
            }
        }
    }

    fn fill_backtrace(&mut self, backtrace: &Backtrace) {
        let failure = match self {
            Caught::Plain(failure) => failure,
            Caught::Hinted {
                cause: Some(cause), ..
            } => cause,
            Caught::Hinted { envelope, .. } => envelope,
        };
        if failure.backtrace.is_none() {
            *failure = failure.clone().with_backtrace(backtrace);
        }
    }
}

fn source_chain(mut cur: Option<&(dyn StdError + 'static)>) -> Vec<String> {
    let mut causes = Vec::new();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}
