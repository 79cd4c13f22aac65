use tracing::trace;

use crate::directive::{self, Directive};
use crate::parser::error::ParseError;
use crate::text::LineRecord;
use crate::textmacro::{MacroInvocation, MacroTable};

/// Replaces `//! runtextmacro` lines with the invoked macro's expanded body.
pub struct Expander<'a> {
    table: &'a MacroTable,
    max_lines: Option<usize>,
    file_id: usize,
    /// Lines produced by expansion so far.
    produced: usize,
    cap_reported: bool,
    /// Names of the macros currently being replayed.
    active: Vec<String>,
    errors: &'a mut Vec<ParseError>,
}

impl<'a> Expander<'a> {
    pub fn new(
        table: &'a MacroTable,
        max_lines: Option<usize>,
        file_id: usize,
        errors: &'a mut Vec<ParseError>,
    ) -> Self {
        Expander {
            table,
            max_lines,
            file_id,
            produced: 0,
            cap_reported: false,
            active: Vec::new(),
            errors,
        }
    }

    pub fn expand(mut self, lines: Vec<LineRecord>) -> Vec<LineRecord> {
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            if directive::classify(line.text()) == Some(Directive::MacroRun) {
                let invocation = MacroInvocation::parse(&line);
                self.run(&invocation, &mut out);
            } else {
                out.push(line);
            }
        }
        out
    }

    fn run(&mut self, invocation: &MacroInvocation, out: &mut Vec<LineRecord>) {
        let table = self.table;
        let Some(text_macro) = table.get(&invocation.name) else {
            trace!(name = %invocation.name, "undefined text macro");
            if invocation.optional {
                return;
            }
            self.warn(
                format!("undefined text macro `{}`", invocation.name),
                &invocation.site,
            );
            return;
        };

        if self.active.contains(&invocation.name) {
            self.warn(
                format!("text macro `{}` invokes itself", invocation.name),
                &invocation.site,
            );
            return;
        }

        self.active.push(invocation.name.clone());
        for line in text_macro.expand(&invocation.args) {
            if directive::classify(line.text()) == Some(Directive::MacroRun) {
                let nested = MacroInvocation::parse(&line);
                self.run(&nested, out);
                continue;
            }
            if self.max_lines.is_some_and(|max| self.produced >= max) {
                if !self.cap_reported {
                    self.cap_reported = true;
                    self.warn(
                        "text macro expansion limit reached; remaining expansions are skipped",
                        &invocation.site,
                    );
                }
                break;
            }
            self.produced += 1;
            out.push(line);
        }
        self.active.pop();
    }

    fn warn(&mut self, message: impl Into<String>, site: &LineRecord) {
        self.errors
            .push(ParseError::warning(message, site.span(), self.file_id));
    }
}
