//! User-facing compile diagnostics.
//!
//! This is the fifteen-diagnostic-kind reporting infrastructure spec.md §7
//! describes: the semantic analyzer (and, ahead of it, the lexer/parser)
//! records a [`Diagnostic`] per problem instead of aborting, and the driver
//! emits all of them to stderr in source order once analysis finishes —
//! codegen runs only if none were recorded.
//!
//! ```
//! use minic_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, DiagnosticKind, Handler};
//! use minic_util::Span;
//!
//! let handler = Handler::new();
//! DiagnosticBuilder::error("expected `int` or `bool`, found `struct N`")
//!     .code(DiagnosticCode::new(DiagnosticKind::TypeMismatch))
//!     .span(Span::DUMMY)
//!     .emit(&handler);
//!
//! assert!(handler.has_errors());
//! ```

mod builder;
mod codes;
mod level;

pub use builder::{DiagnosticBuilder, SourceSnippet};
pub use codes::{DiagnosticCode, DiagnosticKind};
pub use level::Level;

use crate::Span;
use std::cell::RefCell;

/// A single compile diagnostic: a message, its severity, where it occurred,
/// and any supporting notes/help text.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub code: Option<DiagnosticCode>,
    pub notes: Vec<String>,
    pub helps: Vec<String>,
    pub snippets: Vec<SourceSnippet>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            code: None,
            notes: Vec::new(),
            helps: Vec::new(),
            snippets: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }
}

/// Collects diagnostics as analysis proceeds; queried once at phase end to
/// decide whether codegen may run.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn build_error(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::error(message).span(span)
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.borrow().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// All recorded diagnostics, in the order they were emitted (source
    /// order, since analysis visits the AST depth-first in declaration
    /// order).
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handler_has_no_errors() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
    }

    #[test]
    fn emitting_records_in_order() {
        let handler = Handler::new();
        handler.emit_diagnostic(Diagnostic::error("first", Span::DUMMY));
        handler.emit_diagnostic(Diagnostic::error("second", Span::DUMMY));

        let diags = handler.diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].message, "first");
        assert_eq!(diags[1].message, "second");
    }

    #[test]
    fn build_error_attaches_code() {
        let handler = Handler::new();
        handler
            .build_error(Span::DUMMY, "duplicate struct `N`")
            .code(DiagnosticCode::new(DiagnosticKind::DuplicateStruct))
            .emit(&handler);

        let diags = handler.diagnostics();
        assert_eq!(
            diags[0].code,
            Some(DiagnosticCode::new(DiagnosticKind::DuplicateStruct))
        );
    }
}
