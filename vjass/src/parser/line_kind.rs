use crate::block::BlockKind;
use crate::directive;
use crate::lexer::{Token, tokenize};
use crate::text::LineRecord;

/// What a single line means to the outline builder and the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Open(BlockKind),
    Close(BlockKind),
    /// A `//` comment line that is not a `//!` directive.
    Comment,
    Native,
    Local,
    TypeDecl,
    Other,
}

const FUNCTION_MODIFIERS: &[&str] = &["private", "public", "static", "stub", "constant"];
const VISIBILITY: &[&str] = &["private", "public"];
const NATIVE_MODIFIERS: &[&str] = &["constant"];

pub fn classify(line: &LineRecord) -> LineKind {
    let text = line.text();
    let trimmed = text.trim_start();
    if trimmed.starts_with("//") {
        return if directive::is_directive_line(text) {
            LineKind::Other
        } else {
            LineKind::Comment
        };
    }

    let tokens = tokenize(text, line.line());
    let Some(first_ident) = tokens.first().filter(|t| t.is_ident()) else {
        return LineKind::Other;
    };

    // Bare keywords: no modifiers allowed in front.
    match first_ident.text.as_str() {
        "globals" => return LineKind::Open(BlockKind::Globals),
        "endglobals" => return LineKind::Close(BlockKind::Globals),
        "endfunction" => return LineKind::Close(BlockKind::Function),
        "endmethod" => return LineKind::Close(BlockKind::Method),
        "endstruct" => return LineKind::Close(BlockKind::Struct),
        "endlibrary" => return LineKind::Close(BlockKind::Library),
        "local" => return LineKind::Local,
        "type" => return LineKind::TypeDecl,
        _ => {}
    }

    if let Some(keyword) = after_modifiers(&tokens, FUNCTION_MODIFIERS) {
        match keyword.text.as_str() {
            "function" => return LineKind::Open(BlockKind::Function),
            "method" => return LineKind::Open(BlockKind::Method),
            _ => {}
        }
    }
    if let Some(keyword) = after_modifiers(&tokens, VISIBILITY) {
        match keyword.text.as_str() {
            "struct" => return LineKind::Open(BlockKind::Struct),
            "library" | "library_once" => return LineKind::Open(BlockKind::Library),
            _ => {}
        }
    }
    if after_modifiers(&tokens, NATIVE_MODIFIERS).is_some_and(|t| t.is_keyword("native")) {
        return LineKind::Native;
    }

    LineKind::Other
}

/// The first identifier after any run of the given modifier keywords.
fn after_modifiers<'t>(tokens: &'t [Token], modifiers: &[&str]) -> Option<&'t Token> {
    tokens
        .iter()
        .find(|t| !(t.is_ident() && modifiers.contains(&t.text.as_str())))
        .filter(|t| t.is_ident())
}

/// Statement keywords that never start a struct member.
const NON_MEMBER_WORDS: &[&str] = &[
    "call", "set", "return", "if", "else", "elseif", "endif", "loop", "endloop", "exitwhen",
    "implement", "debug",
];

/// `integer x`, `constant real y`, `private string array z`.
pub fn is_global_line(line: &LineRecord) -> bool {
    let tokens = tokenize(line.text(), line.line());
    match (tokens.first(), tokens.get(1)) {
        (Some(first), _) if first.is_keyword("constant") => true,
        (Some(first), Some(second)) => first.is_ident() && second.is_ident(),
        _ => false,
    }
}

/// `[private|public] [static|stub] type [array] name`, or the legacy
/// `local type name` form.
pub fn is_member_line(line: &LineRecord) -> bool {
    let tokens = tokenize(line.text(), line.line());
    let mut rest = tokens.as_slice();
    if rest.first().is_some_and(|t| VISIBILITY.contains(&t.text.as_str()) && t.is_ident()) {
        rest = &rest[1..];
    }
    if rest.first().is_some_and(|t| t.is_keyword("static") || t.is_keyword("stub")) {
        rest = &rest[1..];
    }
    match (rest.first(), rest.get(1)) {
        (Some(ty), Some(name)) => {
            ty.is_ident() && name.is_ident() && !NON_MEMBER_WORDS.contains(&ty.text.as_str())
        }
        _ => false,
    }
}
