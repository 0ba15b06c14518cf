//! Purpose: Define the stable public Rust API boundary for take-a-hint.
//! Exports: Command builder, reporter, dispatch adapters, and the types they accept.
//! Role: Public, additive-only surface over the core pipeline.
//! Invariants: Applications configure through `HintCommand`; `Reporter` is read-only.
//! Invariants: Dispatch adapters share one resolve + render path.

mod clap_handler;
mod command;
pub mod hook;
mod reporter;

pub use crate::core::caught::{Caught, Failure, HintError};
pub use crate::core::config::{HintConfig, HintSettings};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::origin::{HintRegistry, Origin};
pub use clap_handler::{ExecutionErrorHandler, ExitCodeMapper, ParseErrorHandler};
pub use command::{HintCommand, HintHandler};
pub use reporter::{ProcessExit, Reporter, Terminate};
