use tracing::trace;

use crate::block::{Block, BlockKind, Node};
use crate::directive::{self, Directive};
use crate::lexer::{Token, tokenize};
use crate::parser::error::ParseError;
use crate::text::LineRecord;

/// A grammar parser for the text between `//! zinc` and `//! endzinc`.
///
/// It receives the tokens of every zinc block in stream order, each token
/// carrying the line it came from. Its errors are passed back to the caller
/// untouched.
pub trait SubDialectParser {
    type Output;
    type Error;

    fn parse(&self, tokens: Vec<Token>) -> Result<Self::Output, Self::Error>;
}

/// Move zinc blocks out of the line stream.
///
/// Returns the sealed blocks in order and the lines that remain for the
/// outline builder. The sentinel lines themselves belong to neither.
pub fn extract(
    lines: Vec<LineRecord>,
    file_id: usize,
    errors: &mut Vec<ParseError>,
) -> (Vec<Block>, Vec<LineRecord>) {
    let mut blocks = Vec::new();
    let mut remaining = Vec::with_capacity(lines.len());
    let mut open: Option<(Block, LineRecord)> = None;

    for line in lines {
        match directive::classify(line.text()) {
            Some(Directive::ZincStart) => {
                if let Some((current, _)) = open.as_mut() {
                    trace!(line = line.line(), "nested zinc start");
                    errors.push(ParseError::warning(
                        "`//! zinc` inside an open zinc block",
                        line.span(),
                        file_id,
                    ));
                    current.range.end = line.range().end;
                    continue;
                }
                open = Some((Block::new(BlockKind::Zinc, line.range()), line));
            }
            Some(Directive::ZincEnd) => match open.take() {
                Some((mut block, _)) => {
                    block.range.end = line.range().end;
                    block.closed = true;
                    blocks.push(block);
                }
                None => {
                    errors.push(ParseError::warning(
                        "`//! endzinc` without a matching `//! zinc`",
                        line.span(),
                        file_id,
                    ));
                }
            },
            _ => match open.as_mut() {
                Some((block, _)) => {
                    block.range.end = line.range().end;
                    block.children.push(Node::Line(line));
                }
                None => remaining.push(line),
            },
        }
    }

    if let Some((block, header)) = open {
        errors.push(
            ParseError::warning("zinc block is never closed", header.span(), file_id)
                .with_note("expected `//! endzinc`"),
        );
        blocks.push(block);
    }

    (blocks, remaining)
}

/// The token stream of all zinc blocks, each token tagged with its line.
pub fn tokens(blocks: &[Block]) -> Vec<Token> {
    blocks
        .iter()
        .flat_map(|block| block.children.iter())
        .filter_map(|node| match node {
            Node::Line(line) => Some(line),
            Node::Block(_) => None,
        })
        .flat_map(|line| tokenize(line.text(), line.line()))
        .collect()
}
