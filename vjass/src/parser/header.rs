//! Per-construct scanners over a single line's tokens.
//!
//! Every scanner is forgiving: a missing identifier leaves the matching field
//! unset and the declaration is still produced.

use crate::decl::{
    Func, Global, LineComment, Library, Local, Member, Method, Modifier, Native, Struct, Take,
    TypeDecl, Visibility,
};
use crate::lexer::{Token, tokenize};
use crate::text::{LineRecord, TextRange};

fn tokens_of(line: &LineRecord) -> Vec<Token> {
    tokenize(line.text(), line.line())
}

fn keyword_index(tokens: &[Token], keyword: &str) -> Option<usize> {
    tokens.iter().position(|t| t.is_keyword(keyword))
}

/// Text of the identifier at `index`, if there is one.
fn ident_at(tokens: &[Token], index: usize) -> Option<String> {
    tokens
        .get(index)
        .filter(|t| t.is_ident())
        .map(|t| t.text.clone())
}

/// Identifiers separated by commas. Items that are not identifiers are
/// skipped, as is the keyword `optional` in item position.
fn ident_list(tokens: &[Token]) -> Vec<String> {
    let mut items = Vec::new();
    let mut expect_item = true;
    for token in tokens {
        if expect_item {
            if token.is_keyword("optional") {
                continue;
            }
            if token.is_ident() {
                items.push(token.text.clone());
                expect_item = false;
            }
        } else if token.is_op(",") {
            expect_item = true;
        }
    }
    items
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Name, parameters and return type of a native, function or method header.
#[derive(Debug, Clone, Default)]
struct Signature {
    name: Option<String>,
    takes: Vec<Take>,
    returns: Option<String>,
    /// Identifiers in front of the construct keyword.
    modifiers: Vec<String>,
}

fn parse_signature(line: &LineRecord, keyword: &str) -> Signature {
    let tokens = tokens_of(line);
    let mut sig = Signature::default();

    let keyword_at = keyword_index(&tokens, keyword);
    let takes_at = keyword_index(&tokens, "takes");
    let returns_at = keyword_index(&tokens, "returns");

    if let Some(at) = keyword_at {
        sig.name = ident_at(&tokens, at + 1);
        sig.modifiers = tokens[..at]
            .iter()
            .filter(|t| t.is_ident())
            .map(|t| t.text.clone())
            .collect();
    }
    if let Some(at) = returns_at {
        sig.returns = ident_at(&tokens, at + 1);
    }
    if let Some(at) = takes_at {
        let end = returns_at.filter(|&r| r > at).unwrap_or(tokens.len());
        sig.takes = parse_takes(&tokens[at + 1..end]);
    }

    sig
}

/// `integer a, string b` or `nothing`.
fn parse_takes(tokens: &[Token]) -> Vec<Take> {
    enum State {
        Type,
        Name,
        Comma,
    }

    let mut takes: Vec<Take> = Vec::new();
    let mut state = State::Type;

    for token in tokens {
        match state {
            State::Type => {
                if token.is_keyword("nothing") {
                    break;
                }
                if token.is_ident() {
                    takes.push(Take {
                        ty: token.text.clone(),
                        name: None,
                        range: token.range(),
                    });
                    state = State::Name;
                }
            }
            State::Name => {
                if token.is_ident() {
                    if let Some(take) = takes.last_mut() {
                        take.name = Some(token.text.clone());
                        take.range.end = token.end();
                    }
                    state = State::Comma;
                } else if token.is_op(",") {
                    state = State::Type;
                }
            }
            State::Comma => {
                if token.is_op(",") {
                    state = State::Type;
                }
            }
        }
    }

    takes
}

fn visibility_of(modifiers: &[String]) -> Visibility {
    modifiers
        .iter()
        .rev()
        .find_map(|m| Visibility::from_keyword(m))
        .unwrap_or_default()
}

pub fn parse_native(line: &LineRecord) -> Native {
    let sig = parse_signature(line, "native");
    Native {
        is_constant: sig.modifiers.iter().any(|m| m == "constant"),
        name: sig.name,
        takes: sig.takes,
        returns: sig.returns,
        comments: Vec::new(),
        range: line.range(),
    }
}

/// Header of a function block; `range` is the whole block.
pub fn parse_function(header: &LineRecord, range: TextRange) -> Func {
    let sig = parse_signature(header, "function");
    Func {
        visibility: visibility_of(&sig.modifiers),
        is_constant: sig.modifiers.iter().any(|m| m == "constant"),
        name: sig.name,
        takes: sig.takes,
        returns: sig.returns,
        range,
        ..Func::default()
    }
}

pub fn parse_method(header: &LineRecord, range: TextRange) -> Method {
    let sig = parse_signature(header, "method");
    let modifier = sig
        .modifiers
        .iter()
        .rev()
        .filter_map(|m| Modifier::from_keyword(m))
        .find(|m| matches!(m, Modifier::Static | Modifier::Stub))
        .unwrap_or_default();
    Method {
        visibility: visibility_of(&sig.modifiers),
        modifier,
        name: sig.name,
        takes: sig.takes,
        returns: sig.returns,
        range,
        ..Method::default()
    }
}

// ---------------------------------------------------------------------------
// Library / struct / type headers
// ---------------------------------------------------------------------------

/// `library NAME [initializer INIT] [requires|needs|uses [optional] A, B]`.
pub fn parse_library(header: &LineRecord, range: TextRange) -> Library {
    let tokens = tokens_of(header);
    let mut library = Library {
        range,
        ..Library::default()
    };

    let Some(at) = tokens
        .iter()
        .position(|t| t.is_keyword("library") || t.is_keyword("library_once"))
    else {
        return library;
    };
    library.name = ident_at(&tokens, at + 1);

    if let Some(init) = keyword_index(&tokens, "initializer") {
        library.initializer = ident_at(&tokens, init + 1);
    }

    let requires_at = tokens.iter().position(|t| {
        t.is_keyword("requires") || t.is_keyword("needs") || t.is_keyword("uses")
    });
    if let Some(req) = requires_at {
        library.requires = ident_list(&tokens[req + 1..]);
    }

    library
}

/// `struct NAME [extends A, B]`.
pub fn parse_struct(header: &LineRecord, range: TextRange) -> Struct {
    let tokens = tokens_of(header);
    let mut def = Struct {
        range,
        ..Struct::default()
    };

    let leading: Vec<String> = tokens
        .iter()
        .take_while(|t| !t.is_keyword("struct"))
        .map(|t| t.text.clone())
        .collect();
    def.visibility = visibility_of(&leading);

    if let Some(at) = keyword_index(&tokens, "struct") {
        def.name = ident_at(&tokens, at + 1);
    }
    if let Some(at) = keyword_index(&tokens, "extends") {
        def.extends = ident_list(&tokens[at + 1..]);
    }

    def
}

/// `type NAME extends PARENT`.
pub fn parse_type(line: &LineRecord) -> TypeDecl {
    let tokens = tokens_of(line);
    let mut decl = TypeDecl {
        range: line.range(),
        ..TypeDecl::default()
    };
    if let Some(at) = keyword_index(&tokens, "type") {
        decl.name = ident_at(&tokens, at + 1);
    }
    if let Some(at) = keyword_index(&tokens, "extends") {
        decl.extends = ident_at(&tokens, at + 1);
    }
    decl
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

/// Type, array flag and name starting at `tokens[0]`.
fn parse_variable(tokens: &[Token]) -> (Option<String>, bool, Option<String>) {
    let ty = ident_at(tokens, 0);
    match tokens.get(1) {
        Some(t) if t.is_keyword("array") => (ty, true, ident_at(tokens, 2)),
        Some(t) if t.is_ident() => (ty, false, Some(t.text.clone())),
        _ => (ty, false, None),
    }
}

/// `[private|public] [constant] type [array] name [= value]`.
pub fn parse_global(line: &LineRecord) -> Global {
    let tokens = tokens_of(line);
    let mut rest = tokens.as_slice();
    let mut global = Global {
        range: line.range(),
        ..Global::default()
    };

    if let Some(visibility) = rest.first().and_then(|t| Visibility::from_keyword(&t.text)) {
        global.visibility = visibility;
        rest = &rest[1..];
    }
    if rest.first().is_some_and(|t| t.is_keyword("constant")) {
        global.modifier = Modifier::Constant;
        rest = &rest[1..];
    }

    let (ty, is_array, name) = parse_variable(rest);
    global.ty = ty;
    global.is_array = is_array;
    global.name = name;
    global
}

/// `local [constant] type [array] name [= value]`. The range starts at `local`.
pub fn parse_local(line: &LineRecord) -> Local {
    let tokens = tokens_of(line);
    let mut local = Local {
        range: line.range(),
        ..Local::default()
    };
    if let Some(at) = keyword_index(&tokens, "local") {
        local.range.start = tokens[at].start();
        let mut rest = &tokens[at + 1..];
        if rest.first().is_some_and(|t| t.is_keyword("constant")) {
            local.modifier = Modifier::Constant;
            rest = &rest[1..];
        }
        let (ty, is_array, name) = parse_variable(rest);
        local.ty = ty;
        local.is_array = is_array;
        local.name = name;
    }
    local
}

/// `[private|public] [static|stub] [constant|readonly] type [array] name`, or
/// the legacy form with an embedded `local` keyword, which takes precedence
/// when present.
pub fn parse_member(line: &LineRecord) -> Member {
    let tokens = tokens_of(line);
    let mut rest = tokens.as_slice();
    let mut member = Member {
        range: line.range(),
        ..Member::default()
    };

    if let Some(visibility) = rest.first().and_then(|t| Visibility::from_keyword(&t.text)) {
        member.visibility = visibility;
        rest = &rest[1..];
    }
    if let Some(modifier) = rest
        .first()
        .filter(|t| t.is_keyword("static") || t.is_keyword("stub"))
        .and_then(|t| Modifier::from_keyword(&t.text))
    {
        member.modifier = modifier;
        rest = &rest[1..];
    }
    while let Some(token) = rest.first() {
        if token.is_keyword("constant") {
            member.is_constant = true;
        } else if token.is_keyword("readonly") {
            member.is_readonly = true;
        } else {
            break;
        }
        rest = &rest[1..];
    }

    let (ty, is_array, name) = parse_variable(rest);
    member.ty = ty;
    member.is_array = is_array;
    member.name = name;

    if let Some(at) = keyword_index(rest, "local") {
        member.range.start = rest[at].start();
        let mut legacy = &rest[at + 1..];
        if legacy.first().is_some_and(|t| t.is_keyword("constant")) {
            member.is_constant = true;
            legacy = &legacy[1..];
        }
        let (ty, is_array, name) = parse_variable(legacy);
        member.ty = ty;
        member.is_array = is_array;
        member.name = name;
    }

    member
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

pub fn parse_line_comment(line: &LineRecord) -> LineComment {
    let tokens = tokens_of(line);
    match tokens.iter().find(|t| t.is_comment()) {
        Some(token) => LineComment {
            text: token.text.clone(),
            range: token.range(),
        },
        None => LineComment {
            text: line.text().trim().to_string(),
            range: line.range(),
        },
    }
}
