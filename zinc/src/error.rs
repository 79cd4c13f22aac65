use std::fmt;

use vjass::Position;
use vjass::lexer::Token;

/// Why the zinc token stream could not be parsed.
///
/// Lines and columns are zero-based, as on [`Token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZincError {
    UnexpectedToken {
        found: String,
        expected: String,
        line: usize,
        column: usize,
    },
    UnexpectedEof {
        expected: String,
    },
}

impl ZincError {
    pub fn unexpected(found: &Token, expected: impl Into<String>) -> Self {
        ZincError::UnexpectedToken {
            found: found.text.clone(),
            expected: expected.into(),
            line: found.line,
            column: found.columns.start,
        }
    }

    pub fn eof(expected: impl Into<String>) -> Self {
        ZincError::UnexpectedEof {
            expected: expected.into(),
        }
    }

    /// Where the offending token starts, if there was one.
    pub fn position(&self) -> Option<Position> {
        match self {
            ZincError::UnexpectedToken { line, column, .. } => Some(Position::new(*line, *column)),
            ZincError::UnexpectedEof { .. } => None,
        }
    }
}

impl fmt::Display for ZincError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZincError::UnexpectedToken {
                found,
                expected,
                line,
                column,
            } => write!(
                f,
                "{}:{}: expected {}, found `{}`",
                line + 1,
                column + 1,
                expected,
                found
            ),
            ZincError::UnexpectedEof { expected } => {
                write!(f, "unexpected end of zinc code, expected {}", expected)
            }
        }
    }
}

impl std::error::Error for ZincError {}
