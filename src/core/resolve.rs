// Turns a caught failure plus settings into the text of each report line.
use crate::core::caught::{Caught, Failure};
use crate::core::config::HintSettings;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub error_text: String,
    pub hint_text: Option<String>,
    pub show_docs: bool,
    pub show_stack: bool,
    pub source: &'a Failure,
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn resolve<'a>(
    caught: &'a Caught,
    settings: &HintSettings,
    origin_hint: Option<&str>,
) -> Resolved<'a> {
    let source = caught.source();

    let custom = caught.custom_error_message();
    let error_text = if is_blank(custom) {
        let detail = if is_blank(caught.message()) {
            source.type_name()
        } else {
            caught.message()
        };
        format!("{}{detail}", settings.default_exception_message())
    } else {
        custom.to_string()
    };

    // Visibility wins over content.
    let hint_text = if settings.show_hints() {
        let explicit = caught.hints_message();
        if !is_blank(explicit) {
            Some(explicit.to_string())
        } else {
            origin_hint
                .filter(|hint| !is_blank(hint))
                .map(str::to_string)
        }
    } else {
        None
    };

    Resolved {
        error_text,
        hint_text,
        show_docs: !is_blank(settings.docs_url()),
        show_stack: settings.show_stack_trace(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_blank, resolve};
    use crate::core::caught::{Caught, Failure, HintError};
    use crate::core::config::{HintConfig, HintSettings};
    use std::io;

    fn leak() -> io::Error {
        io::Error::other("Oxygen leak !!!")
    }

    fn settings(config: HintConfig) -> HintSettings {
        HintSettings::from_config(&config)
    }

    #[test]
    fn blank_means_empty_or_whitespace() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn plain_error_text_is_default_message_plus_error_message() {
        let caught = Caught::from_error(&leak());
        let resolved = resolve(&caught, &HintSettings::default(), None);
        assert_eq!(
            resolved.error_text,
            "Application failed with exception : Oxygen leak !!!"
        );
        assert_eq!(resolved.hint_text, None);
        assert!(!resolved.show_docs);
        assert!(!resolved.show_stack);
    }

    #[test]
    fn blank_message_falls_back_to_source_type_name() {
        let caught = Caught::Plain(Failure::new("app::Leak", "   "));
        let resolved = resolve(&caught, &HintSettings::default(), None);
        assert_eq!(
            resolved.error_text,
            "Application failed with exception : app::Leak"
        );
    }

    #[test]
    fn custom_message_is_used_verbatim() {
        let err = HintError::of(leak()).with_custom_message("Error message");
        let caught = Caught::from_error(&err);
        let config = HintConfig {
            default_exception_message: Some("ignored : ".to_string()),
            ..HintConfig::default()
        };
        let resolved = resolve(&caught, &settings(config), None);
        assert_eq!(resolved.error_text, "Error message");
    }

    #[test]
    fn blank_custom_message_uses_synthesis_rule() {
        let err = HintError::of(leak()).with_custom_message(" ");
        let caught = Caught::from_error(&err);
        let resolved = resolve(&caught, &HintSettings::default(), None);
        assert_eq!(
            resolved.error_text,
            "Application failed with exception : Oxygen leak !!!"
        );
    }

    #[test]
    fn hidden_hints_suppress_explicit_and_origin_hints() {
        let err = HintError::of(leak())
            .with_hint("A hint message")
            .with_custom_message("Error message");
        let caught = Caught::from_error(&err);
        let config = HintConfig {
            show_hints: Some(false),
            ..HintConfig::default()
        };
        let resolved = resolve(&caught, &settings(config), Some("origin hint"));
        assert_eq!(resolved.error_text, "Error message");
        assert_eq!(resolved.hint_text, None);
    }

    #[test]
    fn explicit_hint_wins_over_origin_hint() {
        let err = HintError::of(leak()).with_hint("explicit");
        let caught = Caught::from_error(&err);
        let resolved = resolve(&caught, &HintSettings::default(), Some("origin"));
        assert_eq!(resolved.hint_text.as_deref(), Some("explicit"));
    }

    #[test]
    fn origin_hint_fills_in_when_no_explicit_hint() {
        let caught = Caught::from_error(&leak());
        let resolved = resolve(&caught, &HintSettings::default(), Some("origin"));
        assert_eq!(resolved.hint_text.as_deref(), Some("origin"));

        let resolved = resolve(&caught, &HintSettings::default(), Some("  "));
        assert_eq!(resolved.hint_text, None);
    }

    #[test]
    fn docs_and_stack_follow_settings() {
        let caught = Caught::from_error(&leak());
        let config = HintConfig {
            docs_url: Some("http://github.com".to_string()),
            show_stack_trace: Some(true),
            ..HintConfig::default()
        };
        let resolved = resolve(&caught, &settings(config), None);
        assert!(resolved.show_docs);
        assert!(resolved.show_stack);

        let config = HintConfig {
            docs_url: Some("   ".to_string()),
            ..HintConfig::default()
        };
        assert!(!resolve(&caught, &settings(config), None).show_docs);
    }
}
