//! Purpose: Hold the resolved report settings and the declarative layer that feeds them.
//! Exports: `HintSettings`, `HintConfig`, and the built-in `DEFAULT_*` values.
//! Role: Configuration resolver shared by the command builder and the reporter.
//! Invariants: Every text setting is a non-null string; JSON `null` becomes "".
//! Invariants: An undeclared `HintConfig` field never changes the lower layer.
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_EXCEPTION_MESSAGE: &str = "Application failed with exception : ";
pub const DEFAULT_DOCS_MESSAGE: &str = "See the docs for details : ";
pub const DEFAULT_EXIT_CODE: i32 = 1;
pub const DEFAULT_HINT_PREFIX: &str = "\u{2705} hints:";
pub const DEFAULT_ERROR_PREFIX: &str = "\u{274C} error:";
pub const DEFAULT_STACK_PREFIX: &str = "\u{26D4} stack:";
pub const DEFAULT_DOCS_PREFIX: &str = "\u{2754} usage:";
pub const DEFAULT_SEPARATOR: &str = "\t";
pub const DEFAULT_DOCS_SEPARATOR: &str = "---";

/// Settings bundle read by one report. Built once per command, then frozen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HintSettings {
    pub(crate) show_stack_trace: bool,
    pub(crate) show_hints: bool,
    pub(crate) default_exception_message: String,
    pub(crate) default_docs_message: String,
    pub(crate) default_exit_code: i32,
    pub(crate) hint_prefix: String,
    pub(crate) error_prefix: String,
    pub(crate) stack_prefix: String,
    pub(crate) docs_prefix: String,
    pub(crate) default_separator: String,
    pub(crate) default_docs_separator: String,
    pub(crate) docs_url: String,
}

impl Default for HintSettings {
    fn default() -> Self {
        Self {
            show_stack_trace: false,
            show_hints: true,
            default_exception_message: DEFAULT_EXCEPTION_MESSAGE.to_string(),
            default_docs_message: DEFAULT_DOCS_MESSAGE.to_string(),
            default_exit_code: DEFAULT_EXIT_CODE,
            hint_prefix: DEFAULT_HINT_PREFIX.to_string(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
            stack_prefix: DEFAULT_STACK_PREFIX.to_string(),
            docs_prefix: DEFAULT_DOCS_PREFIX.to_string(),
            default_separator: DEFAULT_SEPARATOR.to_string(),
            default_docs_separator: DEFAULT_DOCS_SEPARATOR.to_string(),
            docs_url: String::new(),
        }
    }
}

impl HintSettings {
    pub fn from_config(config: &HintConfig) -> Self {
        let mut settings = Self::default();
        settings.apply(config);
        settings
    }

    /// Overlays every field `config` declares.
    pub fn apply(&mut self, config: &HintConfig) {
        if let Some(value) = config.show_stack_trace {
            self.show_stack_trace = value;
        }
        if let Some(value) = config.show_hints {
            self.show_hints = value;
        }
        if let Some(value) = config.default_exit_code {
            self.default_exit_code = value;
        }
        overlay(&mut self.default_exception_message, &config.default_exception_message);
        overlay(&mut self.default_docs_message, &config.default_docs_message);
        overlay(&mut self.hint_prefix, &config.hint_prefix);
        overlay(&mut self.error_prefix, &config.error_prefix);
        overlay(&mut self.stack_prefix, &config.stack_prefix);
        overlay(&mut self.docs_prefix, &config.docs_prefix);
        overlay(&mut self.default_separator, &config.default_separator);
        overlay(&mut self.default_docs_separator, &config.default_docs_separator);
        overlay(&mut self.docs_url, &config.docs_url);
    }

    pub fn show_stack_trace(&self) -> bool {
        self.show_stack_trace
    }

    pub fn show_hints(&self) -> bool {
        self.show_hints
    }

    pub fn default_exception_message(&self) -> &str {
        &self.default_exception_message
    }

    pub fn default_docs_message(&self) -> &str {
        &self.default_docs_message
    }

    pub fn default_exit_code(&self) -> i32 {
        self.default_exit_code
    }

    pub fn hint_prefix(&self) -> &str {
        &self.hint_prefix
    }

    pub fn error_prefix(&self) -> &str {
        &self.error_prefix
    }

    pub fn stack_prefix(&self) -> &str {
        &self.stack_prefix
    }

    pub fn docs_prefix(&self) -> &str {
        &self.docs_prefix
    }

    pub fn default_separator(&self) -> &str {
        &self.default_separator
    }

    pub fn default_docs_separator(&self) -> &str {
        &self.default_docs_separator
    }

    pub fn docs_url(&self) -> &str {
        &self.docs_url
    }
}

fn overlay(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

/// Declarative settings attached to an owner type or loaded from a JSON document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HintConfig {
    pub show_stack_trace: Option<bool>,
    pub show_hints: Option<bool>,
    #[serde(deserialize_with = "null_as_empty")]
    pub default_exception_message: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub default_docs_message: Option<String>,
    pub default_exit_code: Option<i32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub hint_prefix: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub error_prefix: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub stack_prefix: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub docs_prefix: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub default_separator: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub default_docs_separator: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub docs_url: Option<String>,
}

impl HintConfig {
    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|err| {
            Error::new(ErrorKind::Config)
                .with_message("invalid hint config")
                .with_source(err)
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read hint config")
                .with_path(path)
                .with_source(err)
        })?;
        Self::from_json_str(&text).map_err(|err| err.with_path(path))
    }
}

// Only runs when the key is present, so absent keys stay `None`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(value.unwrap_or_default()))
}
