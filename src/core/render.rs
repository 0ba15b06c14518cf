//! Purpose: Write a resolved report to an output sink in the fixed line format.
//! Exports: `render`, `prefix_lines`.
//! Role: Last pipeline stage before the exit decision.
//! Invariants: Every emitted line of a block starts with that block's prefix + separator.
//! Invariants: Only sink write failures surface; formatting itself cannot fail.
use std::io::{self, Write};

use crate::core::config::HintSettings;
use crate::core::resolve::{Resolved, is_blank};

const LINE_BREAK: &str = "\n";

pub fn render<W>(sink: &mut W, settings: &HintSettings, resolved: &Resolved<'_>) -> io::Result<()>
where
    W: Write + ?Sized,
{
    let separator = settings.default_separator();
    let error_prefix = format!("{}{separator}", settings.error_prefix());
    let hint_prefix = format!("{}{separator}", settings.hint_prefix());
    let docs_prefix = format!("{}{separator}", settings.docs_prefix());

    writeln!(sink, "{}", prefix_lines(&error_prefix, &resolved.error_text, true))?;

    if let Some(hint) = &resolved.hint_text {
        writeln!(sink, "{}", prefix_lines(&hint_prefix, hint, true))?;
    }

    if resolved.show_docs {
        let docs_separator = settings.default_docs_separator();
        let mut docs = String::new();
        if !is_blank(docs_separator) {
            docs.push_str(docs_separator);
            docs.push_str(LINE_BREAK);
        }
        docs.push_str(settings.default_docs_message());
        docs.push_str(settings.docs_url());
        writeln!(sink, "{}", prefix_lines(&docs_prefix, &docs, false))?;
    }

    if resolved.show_stack {
        writeln!(sink)?;
        for line in resolved.source.stack_lines() {
            writeln!(sink, "{}{separator}{line}", settings.stack_prefix())?;
        }
    }

    sink.flush()
}

/// Prefixes `message` and every line continuation inside it.
pub fn prefix_lines(prefix: &str, message: &str, start_with_line_break: bool) -> String {
    let mut out = String::new();
    if start_with_line_break {
        out.push_str(LINE_BREAK);
    }
    out.push_str(prefix);
    out.push_str(&message.replace(LINE_BREAK, &format!("{LINE_BREAK}{prefix}")));
    out
}
