use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{Files, SimpleFiles};

use vjass::{Parser, Program};
use zinc::{ZincError, ZincParser};

use crate::config::Config;

/// Everything the CLI reports about one source file.
pub struct Analysis {
    pub parser: Parser,
    /// Main program with the zinc declarations merged in.
    pub program: Program,
    pub zinc_error: Option<ZincError>,
}

pub fn analyze(source: &str, file_id: usize, config: &Config) -> Analysis {
    let parser = Parser::with_options(source, file_id, &config.parse_options());
    let mut program = parser.parse();

    let mut zinc_error = None;
    if config.zinc && !parser.zinc_blocks().is_empty() {
        match parser.parse_zinc(&ZincParser) {
            Ok(zinc_program) => program.merge(zinc_program),
            Err(error) => zinc_error = Some(error),
        }
    }

    Analysis {
        parser,
        program,
        zinc_error,
    }
}

/// A diagnostic for a zinc failure, labelled at the offending token when the
/// position can be mapped back into the file.
pub fn zinc_diagnostic(
    error: &ZincError,
    files: &SimpleFiles<String, String>,
    file_id: usize,
) -> Diagnostic<usize> {
    let diagnostic = Diagnostic::error().with_message(format!("zinc: {}", error));
    let Some(position) = error.position() else {
        return diagnostic;
    };
    match files.line_range(file_id, position.line) {
        Ok(line) => {
            let start = (line.start + position.column).min(line.end);
            let end = (start + 1).min(line.end);
            diagnostic.with_labels(vec![Label::primary(file_id, start..end)])
        }
        Err(_) => diagnostic,
    }
}
