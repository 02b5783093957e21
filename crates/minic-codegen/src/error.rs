//! Internal codegen failures (spec.md §4.4.5).
//!
//! The code generator assumes a semantically valid AST; every variant here
//! is "the analyzer should have rejected this, and didn't" — a programmer
//! bug, not a user-facing diagnostic. There is no recovery: the driver
//! prints the message and exits without writing a `.s` file.

use minic_util::Symbol;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("unknown struct `{0}` reached code generation")]
    UnknownStruct(Symbol),

    #[error("struct `{0}` has no field `{1}`")]
    UnknownField(Symbol, Symbol),

    #[error("unknown function `{0}` reached code generation")]
    UnknownFunction(Symbol),

    #[error("unresolved name `{0}` reached code generation")]
    UnresolvedName(Symbol),

    #[error("field access on non-struct type reached code generation")]
    NotAStruct,

    #[error("internal codegen invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
