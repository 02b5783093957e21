//! The fixed set of diagnostic kinds the semantic analyzer (and, ahead of
//! it, the lexer/parser) can report.

/// One of the diagnostic kinds enumerated for the Mini compiler.
///
/// Lexer and parser kinds are ambient (ungoverned by the core spec); the
/// rest are exactly the fifteen the semantic analyzer is specified to emit
/// (spec.md §7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Lexer
    LexUnexpectedChar,
    // Parser
    ParseUnexpectedToken,
    ParseExpectedToken,
    ParseUnexpectedEof,
    // Semantic analysis
    DuplicateStruct,
    DuplicateFunction,
    DuplicateInScope,
    UnknownStruct,
    UnknownFunction,
    UnknownName,
    UnknownField,
    ArityMismatch,
    TypeMismatch,
    InvalidCondition,
    InvalidReturn,
    MissingReturn,
    InvalidDelete,
    InvalidPrintOperand,
    InvalidReadTarget,
}

impl DiagnosticKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LexUnexpectedChar => "unexpected-character",
            Self::ParseUnexpectedToken => "unexpected-token",
            Self::ParseExpectedToken => "expected-token",
            Self::ParseUnexpectedEof => "unexpected-eof",
            Self::DuplicateStruct => "duplicate-struct",
            Self::DuplicateFunction => "duplicate-function",
            Self::DuplicateInScope => "duplicate-in-scope",
            Self::UnknownStruct => "unknown-struct",
            Self::UnknownFunction => "unknown-function",
            Self::UnknownName => "unknown-name",
            Self::UnknownField => "unknown-field",
            Self::ArityMismatch => "arity-mismatch",
            Self::TypeMismatch => "type-mismatch",
            Self::InvalidCondition => "invalid-condition",
            Self::InvalidReturn => "invalid-return",
            Self::MissingReturn => "missing-return",
            Self::InvalidDelete => "invalid-delete",
            Self::InvalidPrintOperand => "invalid-print-operand",
            Self::InvalidReadTarget => "invalid-read-target",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A diagnostic's stable identifier, attached to every [`super::Diagnostic`]
/// so tests and tooling can match on it without parsing the message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiagnosticCode(pub DiagnosticKind);

impl DiagnosticCode {
    pub const fn new(kind: DiagnosticKind) -> Self {
        Self(kind)
    }

    pub const fn kind(&self) -> DiagnosticKind {
        self.0
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(DiagnosticKind::TypeMismatch.as_str(), "type-mismatch");
        assert_eq!(DiagnosticKind::MissingReturn.as_str(), "missing-return");
    }

    #[test]
    fn code_displays_its_kind() {
        let code = DiagnosticCode::new(DiagnosticKind::UnknownField);
        assert_eq!(format!("{}", code), "unknown-field");
    }
}
