//! `//!` sentinel lines: text macro definitions and invocations, and the
//! zinc block markers.

use std::sync::LazyLock;

use regex::Regex;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*//!\s+(textmacro_once|textmacro|endtextmacro|runtextmacro|endzinc|zinc)\b")
        .expect("directive regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    MacroStart,
    MacroEnd,
    MacroRun,
    ZincStart,
    ZincEnd,
}

/// Classify a line as a sentinel directive.
pub fn classify(text: &str) -> Option<Directive> {
    let caps = DIRECTIVE.captures(text)?;
    let directive = match &caps[1] {
        "textmacro" | "textmacro_once" => Directive::MacroStart,
        "endtextmacro" => Directive::MacroEnd,
        "runtextmacro" => Directive::MacroRun,
        "zinc" => Directive::ZincStart,
        _ => Directive::ZincEnd,
    };
    Some(directive)
}

/// Whether the line is any `//!` directive, recognized or not.
pub fn is_directive_line(text: &str) -> bool {
    text.trim_start().starts_with("//!")
}

/// Replace the first `//!` marker with blanks so the rest of the line can be
/// tokenized with columns intact.
pub fn unmark(text: &str) -> String {
    text.replacen("//!", "   ", 1)
}
