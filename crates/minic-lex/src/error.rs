use thiserror::Error;

/// Internal lexer failures. The corresponding user-facing diagnostic (same
/// information, routed through [`minic_util::diagnostic`]) is what the
/// driver actually reports; this type exists so [`crate::Lexer::tokenize`]
/// has a `Result` to return before a `Handler` is wired up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character {found:?} at line {line}, column {column}")]
    UnexpectedChar { found: char, line: u32, column: u32 },
}
