//! Purpose: Build the settings bundle from owner metadata and fluent overrides.
//! Exports: `HintHandler`, `HintCommand`.
//! Role: Configuration entry point; freezes into a `Reporter` or installs the panic hook.
//! Invariants: Layers apply in order: defaults, owner metadata, config documents, setters.
//! Invariants: Nothing here touches process state until `init` is called.
use std::sync::Arc;

use crate::api::hook;
use crate::api::reporter::{ProcessExit, Reporter, Terminate};
use crate::core::config::{HintConfig, HintSettings};
use crate::core::origin::HintRegistry;

/// Declarative metadata attached to an application's main type.
///
/// Both methods default to "nothing declared", so `impl HintHandler for App {}`
/// opts a type in with built-in defaults.
pub trait HintHandler {
    fn hint_config(&self) -> HintConfig {
        HintConfig::default()
    }

    fn hint_messages(&self) -> HintRegistry {
        HintRegistry::default()
    }
}

#[derive(Clone)]
pub struct HintCommand {
    settings: HintSettings,
    registry: HintRegistry,
    terminator: Arc<dyn Terminate>,
}

impl Default for HintCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl HintCommand {
    pub fn new() -> Self {
        Self {
            settings: HintSettings::default(),
            registry: HintRegistry::default(),
            terminator: Arc::new(ProcessExit),
        }
    }

    pub fn for_handler<H>(owner: &H) -> Self
    where
        H: HintHandler + ?Sized,
    {
        let mut command = Self::new();
        command.settings.apply(&owner.hint_config());
        command.registry.merge(owner.hint_messages());
        command
    }

    pub fn settings(&self) -> &HintSettings {
        &self.settings
    }

    /// Overlays a declarative document, e.g. one read with `HintConfig::from_path`.
    pub fn config(mut self, config: &HintConfig) -> Self {
        self.settings.apply(config);
        self
    }

    pub fn hint_messages(mut self, registry: HintRegistry) -> Self {
        self.registry.merge(registry);
        self
    }

    pub fn terminator(mut self, terminator: Arc<dyn Terminate>) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn show_stack_trace(mut self, show_stack_trace: bool) -> Self {
        self.settings.show_stack_trace = show_stack_trace;
        self
    }

    pub fn show_hints(mut self, show_hints: bool) -> Self {
        self.settings.show_hints = show_hints;
        self
    }

    pub fn default_exception_message(mut self, message: impl Into<String>) -> Self {
        self.settings.default_exception_message = message.into();
        self
    }

    pub fn default_docs_message(mut self, message: impl Into<String>) -> Self {
        self.settings.default_docs_message = message.into();
        self
    }

    /// Any value other than 1 makes the reporter exit with it.
    pub fn default_exit_code(mut self, code: i32) -> Self {
        self.settings.default_exit_code = code;
        self
    }

    pub fn hint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.hint_prefix = prefix.into();
        self
    }

    pub fn error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.error_prefix = prefix.into();
        self
    }

    pub fn stack_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.stack_prefix = prefix.into();
        self
    }

    pub fn docs_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.docs_prefix = prefix.into();
        self
    }

    pub fn default_separator(mut self, separator: impl Into<String>) -> Self {
        self.settings.default_separator = separator.into();
        self
    }

    pub fn default_docs_separator(mut self, separator: impl Into<String>) -> Self {
        self.settings.default_docs_separator = separator.into();
        self
    }

    /// An empty URL disables the docs block.
    pub fn docs_url(mut self, url: impl Into<String>) -> Self {
        self.settings.docs_url = url.into();
        self
    }

    pub fn into_reporter(self) -> Reporter {
        Reporter::new(self.settings, self.registry, self.terminator)
    }

    /// Installs the reporter as the process-wide panic hook, replacing any
    /// previous hook.
    pub fn init(self) {
        hook::install(self.into_reporter());
    }
}
