mod assemble;
pub mod error;
pub mod header;
pub mod line_kind;
mod outline;
pub mod zinc;

pub use error::ParseError;
pub use zinc::SubDialectParser;

use tracing::debug;

use crate::Program;
use crate::block::Block;
use crate::lexer::Token;
use crate::text::{LineRecord, segment, strip_block_comments};
use crate::textmacro::expand::Expander;
use crate::textmacro::{MacroTable, TextMacro};

/// Knobs for a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Upper bound on the number of lines text macro expansion may produce.
    /// `None` leaves expansion unbounded.
    pub max_expanded_lines: Option<usize>,
}

/// Parser entry point.
///
/// Every stage runs once in the constructor; the accessors only read the
/// results.
#[derive(Debug, Clone)]
pub struct Parser {
    file_id: usize,
    macros: MacroTable,
    expanded: Vec<LineRecord>,
    zinc_blocks: Vec<Block>,
    outline: Block,
    diagnostics: Vec<ParseError>,
}

impl Parser {
    pub fn new(source: &str, file_id: usize) -> Self {
        Parser::with_options(source, file_id, &ParseOptions::default())
    }

    pub fn with_options(source: &str, file_id: usize, options: &ParseOptions) -> Self {
        let mut diagnostics = Vec::new();

        let scanned = strip_block_comments(source);
        let lines = segment(&scanned);
        debug!(lines = lines.len(), "segmented source");

        let (macros, lines) = MacroTable::extract(lines, file_id, &mut diagnostics);
        debug!(macros = macros.len(), "collected text macros");

        let expanded = Expander::new(&macros, options.max_expanded_lines, file_id, &mut diagnostics)
            .expand(lines);
        debug!(lines = expanded.len(), "expanded text macros");

        let (zinc_blocks, rest) = zinc::extract(expanded.clone(), file_id, &mut diagnostics);
        debug!(blocks = zinc_blocks.len(), "extracted zinc blocks");

        let outline = outline::build_outline(rest, file_id, &mut diagnostics);
        debug!(
            blocks = outline.descendants().len(),
            warnings = diagnostics.len(),
            "built outline"
        );

        Parser {
            file_id,
            macros,
            expanded,
            zinc_blocks,
            outline,
            diagnostics,
        }
    }

    /// Assemble the declarations of the main (non-zinc) text.
    pub fn parse(&self) -> Program {
        assemble::assemble(&self.outline, self.file_id)
    }

    /// Hand the zinc token stream to `parser` and return whatever it returns.
    pub fn parse_zinc<P: SubDialectParser>(&self, parser: &P) -> Result<P::Output, P::Error> {
        parser.parse(self.zinc_tokens())
    }

    pub fn zinc_tokens(&self) -> Vec<Token> {
        zinc::tokens(&self.zinc_blocks)
    }

    pub fn text_macros(&self) -> &MacroTable {
        &self.macros
    }

    /// Body text of the first macro with this name.
    pub fn macro_text(&self, name: &str) -> Option<String> {
        self.macros.get(name).map(TextMacro::text)
    }

    /// The line stream after macro expansion, zinc blocks included.
    pub fn expanded_lines(&self) -> &[LineRecord] {
        &self.expanded
    }

    pub fn zinc_blocks(&self) -> &[Block] {
        &self.zinc_blocks
    }

    /// The block tree of the main text, rooted at a `Program` block.
    pub fn outline(&self) -> &Block {
        &self.outline
    }

    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    pub fn file_id(&self) -> usize {
        self.file_id
    }
}
