use std::ops::Range;

use tracing::trace;

use crate::block::{Block, BlockKind, Node};
use crate::parser::error::ParseError;
use crate::parser::line_kind::{LineKind, classify};
use crate::text::{LineRecord, TextRange};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Nest lines into blocks. The result is a `Program` block holding the
/// top-level lines and blocks in stream order.
///
/// A closer only closes the innermost open block when their kinds agree; any
/// other closer is kept as an ordinary line of whatever is open.
pub fn build_outline(lines: Vec<LineRecord>, file_id: usize, errors: &mut Vec<ParseError>) -> Block {
    let mut state = OutlineState::new(file_id, errors);
    for line in lines {
        state.feed(line);
    }
    state.finalize()
}

// ---------------------------------------------------------------------------
// Builder state
// ---------------------------------------------------------------------------

struct OutlineState<'e> {
    file_id: usize,
    /// Open blocks with the byte span of their opener. Innermost = current scope.
    block_stack: Vec<(Block, Range<usize>)>,
    root: Block,
    errors: &'e mut Vec<ParseError>,
}

impl<'e> OutlineState<'e> {
    fn new(file_id: usize, errors: &'e mut Vec<ParseError>) -> Self {
        OutlineState {
            file_id,
            block_stack: Vec::new(),
            root: Block::new(BlockKind::Program, TextRange::default()),
            errors,
        }
    }

    fn feed(&mut self, line: LineRecord) {
        match classify(&line) {
            LineKind::Open(kind) => {
                let mut block = Block::new(kind, line.range());
                let opener = line.span();
                if kind.has_header() {
                    block.children.push(Node::Line(line));
                }
                self.block_stack.push((block, opener));
            }
            LineKind::Close(kind) => {
                if self.block_stack.last().is_some_and(|(b, _)| b.kind == kind) {
                    self.close_current(line.range());
                } else {
                    trace!(line = line.line(), %kind, "ignoring mismatched closer");
                    let message = match self.block_stack.last() {
                        Some((open, _)) => format!("`end{kind}` does not close the open {} block", open.kind),
                        None => format!("`end{kind}` without an open {kind} block"),
                    };
                    self.errors
                        .push(ParseError::warning(message, line.span(), self.file_id));
                    self.append(line);
                }
            }
            _ => self.append(line),
        }
    }

    /// Add a content line to the current scope.
    fn append(&mut self, line: LineRecord) {
        match self.block_stack.last_mut() {
            Some((block, _)) => {
                block.range.end = line.range().end;
                block.children.push(Node::Line(line));
            }
            None => self.root.children.push(Node::Line(line)),
        }
    }

    fn close_current(&mut self, closer: TextRange) {
        let Some((mut block, _)) = self.block_stack.pop() else {
            return;
        };
        block.range.end = closer.end;
        block.closed = true;
        self.attach(block);
    }

    fn attach(&mut self, block: Block) {
        match self.block_stack.last_mut() {
            Some((parent, _)) => {
                parent.range.end = parent.range.end.max(block.range.end);
                parent.children.push(Node::Block(block));
            }
            None => self.root.children.push(Node::Block(block)),
        }
    }

    fn finalize(mut self) -> Block {
        // Unclosed blocks end at the last line they absorbed.
        while let Some((block, opener)) = self.block_stack.pop() {
            self.errors.push(
                ParseError::warning(
                    format!("{} block is never closed", block.kind),
                    opener,
                    self.file_id,
                )
                .with_note(format!("expected `end{}`", block.kind)),
            );
            self.attach(block);
        }

        if let (Some(first), Some(last)) = (self.root.children.first(), self.root.children.last()) {
            self.root.range = first.range().cover(&last.range());
        }
        self.root
    }
}
