use minic_util::Span;
use thiserror::Error;

/// Internal parse failures. Per spec.md §7, a parse error skips both
/// semantic analysis and codegen; the driver turns this into the
/// `ParseUnexpectedToken`/`ParseExpectedToken`/`ParseUnexpectedEof`
/// diagnostic kinds before printing it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected}, found {found} at line {line}, column {column}")]
    Expected {
        expected: String,
        found: String,
        line: u32,
        column: u32,
        span: Span,
    },

    #[error("unexpected {found} at line {line}, column {column}")]
    UnexpectedToken {
        found: String,
        line: u32,
        column: u32,
        span: Span,
    },

    #[error("unexpected end of file")]
    UnexpectedEof { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. } => *span,
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
        }
    }
}
