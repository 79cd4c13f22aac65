//! Parser for zinc, the brace-delimited dialect embedded in vJass sources
//! between `//! zinc` and `//! endzinc`.
//!
//! The result uses the same declaration model as the main language, so it
//! can be merged into the program parsed from the surrounding text.

mod cursor;
pub mod error;
mod grammar;

pub use error::ZincError;

use tracing::debug;
use vjass::lexer::Token;
use vjass::{Program, SubDialectParser};

use crate::cursor::Cursor;
use crate::grammar::Grammar;

/// Parse a zinc token stream into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ZincError> {
    let count = tokens.len();
    let program = Grammar::new(Cursor::new(tokens)).program()?;
    debug!(
        tokens = count,
        libraries = program.libraries.len(),
        functions = program.functions.len(),
        structs = program.structs.len(),
        "parsed zinc"
    );
    Ok(program)
}

/// [`SubDialectParser`] adapter for use with [`vjass::Parser::parse_zinc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ZincParser;

impl SubDialectParser for ZincParser {
    type Output = Program;
    type Error = ZincError;

    fn parse(&self, tokens: Vec<Token>) -> Result<Program, ZincError> {
        parse(tokens)
    }
}
