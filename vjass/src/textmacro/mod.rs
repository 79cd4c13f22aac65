pub mod expand;

use tracing::trace;

use crate::directive::{self, Directive};
use crate::lexer::{Token, tokenize};
use crate::parser::error::ParseError;
use crate::text::{LineRecord, TextRange};

/// A named template of source lines, defined between `//! textmacro` and
/// `//! endtextmacro`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMacro {
    pub name: String,
    /// Formal parameter names, referenced in the body as `$name$`.
    pub params: Vec<String>,
    /// Body lines, exclusive of the sentinels.
    pub body: Vec<LineRecord>,
    /// From the header line to the end sentinel.
    pub range: TextRange,
}

impl TextMacro {
    /// Replay the body with `$param$` markers replaced by the actual arguments.
    ///
    /// Missing arguments substitute the empty string. The returned lines keep
    /// the body lines' own positions.
    pub fn expand(&self, args: &[String]) -> Vec<LineRecord> {
        self.body
            .iter()
            .map(|line| {
                let mut text = line.text().to_string();
                for (index, param) in self.params.iter().enumerate() {
                    let actual = args.get(index).map(String::as_str).unwrap_or("");
                    text = text.replace(&format!("${param}$"), actual);
                }
                line.with_text(text)
            })
            .collect()
    }

    /// The raw body text.
    pub fn text(&self) -> String {
        self.body.iter().map(LineRecord::text).collect()
    }
}

/// A single `//! runtextmacro` request.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroInvocation {
    pub name: String,
    /// Actual arguments with their surrounding quotes removed.
    pub args: Vec<String>,
    /// `runtextmacro optional`: a missing macro is not reported.
    pub optional: bool,
    pub site: LineRecord,
}

impl MacroInvocation {
    /// Parse `//! runtextmacro [optional] NAME("a", "b")`.
    pub fn parse(site: &LineRecord) -> MacroInvocation {
        let tokens = tokenize(&directive::unmark(site.text()), site.line());
        let mut rest = tokens.as_slice();
        if rest.first().is_some_and(|t| t.is_keyword("runtextmacro")) {
            rest = &rest[1..];
        }
        let optional = rest.first().is_some_and(|t| t.is_keyword("optional"));
        if optional {
            rest = &rest[1..];
        }

        let mut name = String::new();
        let mut args = Vec::new();
        if let Some(first) = rest.first().filter(|t| t.is_ident()) {
            name = first.text.clone();
            if rest.get(1).is_some_and(|t| t.is_op("(")) {
                args = comma_list(&rest[2..], Token::is_string)
                    .into_iter()
                    .map(|arg| strip_quotes(&arg).to_string())
                    .collect();
            }
        }

        MacroInvocation {
            name,
            args,
            optional,
            site: site.clone(),
        }
    }
}

fn strip_quotes(arg: &str) -> &str {
    let arg = arg.strip_prefix('"').unwrap_or(arg);
    arg.strip_suffix('"').unwrap_or(arg)
}

/// Collect tokens accepted by `accept`, separated by commas, up to a `)`.
fn comma_list(tokens: &[Token], accept: impl Fn(&Token) -> bool) -> Vec<String> {
    let mut items = Vec::new();
    let mut expect_item = true;
    for token in tokens {
        if token.is_op(")") {
            break;
        }
        if expect_item {
            if accept(token) {
                items.push(token.text.clone());
                expect_item = false;
            }
        } else if token.is_op(",") {
            expect_item = true;
        }
    }
    items
}

/// Parse a `//! textmacro NAME(a, b)` or `//! textmacro NAME takes a, b` header.
fn parse_header(line: &LineRecord) -> (Option<String>, Vec<String>) {
    let tokens = tokenize(&directive::unmark(line.text()), line.line());
    let Some(name) = tokens.get(1).filter(|t| t.is_ident()) else {
        return (None, Vec::new());
    };
    let params = match tokens.get(2) {
        Some(t) if t.is_op("(") || t.is_keyword("takes") => comma_list(&tokens[3..], Token::is_ident),
        _ => Vec::new(),
    };
    (Some(name.text.clone()), params)
}

/// All macro definitions of one parse, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: Vec<TextMacro>,
}

impl MacroTable {
    /// Remove every macro definition from `lines`, returning the table and the
    /// remaining stream.
    pub fn extract(
        lines: Vec<LineRecord>,
        file_id: usize,
        errors: &mut Vec<ParseError>,
    ) -> (MacroTable, Vec<LineRecord>) {
        let mut table = MacroTable::default();
        let mut remaining = Vec::with_capacity(lines.len());
        // The macro currently collecting body lines, and its header line.
        let mut open: Option<(Option<TextMacro>, LineRecord)> = None;

        for line in lines {
            match directive::classify(line.text()) {
                Some(Directive::MacroStart) => {
                    if let Some((current, header)) = open.take() {
                        errors.push(ParseError::warning(
                            "text macro is not closed before the next one starts",
                            header.span(),
                            file_id,
                        ));
                        table.register(current, &header, file_id, errors);
                    }
                    let current = match parse_header(&line) {
                        (Some(name), params) => Some(TextMacro {
                            name,
                            params,
                            body: Vec::new(),
                            range: line.range(),
                        }),
                        (None, _) => {
                            errors.push(ParseError::warning(
                                "text macro has no name",
                                line.span(),
                                file_id,
                            ));
                            None
                        }
                    };
                    open = Some((current, line));
                }
                Some(Directive::MacroEnd) => match open.take() {
                    Some((mut current, header)) => {
                        if let Some(m) = current.as_mut() {
                            m.range.end = line.range().end;
                        }
                        table.register(current, &header, file_id, errors);
                    }
                    None => {
                        trace!(line = line.line(), "dropping unmatched endtextmacro");
                        errors.push(ParseError::warning(
                            "`endtextmacro` without a matching `textmacro`",
                            line.span(),
                            file_id,
                        ));
                    }
                },
                _ => match open.as_mut() {
                    Some((current, _)) => {
                        if let Some(m) = current.as_mut() {
                            m.range.end = line.range().end;
                            m.body.push(line);
                        }
                    }
                    None => remaining.push(line),
                },
            }
        }

        if let Some((current, header)) = open {
            errors.push(ParseError::warning(
                "text macro is never closed with `endtextmacro`",
                header.span(),
                file_id,
            ));
            table.register(current, &header, file_id, errors);
        }

        (table, remaining)
    }

    fn register(
        &mut self,
        text_macro: Option<TextMacro>,
        header: &LineRecord,
        file_id: usize,
        errors: &mut Vec<ParseError>,
    ) {
        let Some(text_macro) = text_macro else {
            return;
        };
        if self.get(&text_macro.name).is_some() {
            errors.push(
                ParseError::warning(
                    format!("duplicate text macro `{}`", text_macro.name),
                    header.span(),
                    file_id,
                )
                .with_note("invocations use the first definition"),
            );
        }
        self.macros.push(text_macro);
    }

    /// The first definition with this name.
    pub fn get(&self, name: &str) -> Option<&TextMacro> {
        self.macros.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextMacro> {
        self.macros.iter()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}
