//! Structured compile-time diagnostics shared by every phase from the
//! type checker onward: a kind, a primary span, optional labeled
//! secondary spans (e.g. the move origin in a use-after-move error), and
//! a human-readable message.

use crate::base::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    LexicalError,
    SyntaxError,
    UnknownSymbol,
    TypeMismatch,
    UnresolvedTraitBound,
    AmbiguousImpl,
    GenericArityMismatch,
    NonExhaustiveMatch,
    UseAfterMove,
    BorrowAliasConflict,
    ReleaseWithLiveBorrow,
    UnsafeWithoutJustification,
    AbiIncompatible,
    ImportCycle,
    InternalError,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::LexicalError => "LexicalError",
            DiagnosticKind::SyntaxError => "SyntaxError",
            DiagnosticKind::UnknownSymbol => "UnknownSymbol",
            DiagnosticKind::TypeMismatch => "TypeMismatch",
            DiagnosticKind::UnresolvedTraitBound => "UnresolvedTraitBound",
            DiagnosticKind::AmbiguousImpl => "AmbiguousImpl",
            DiagnosticKind::GenericArityMismatch => "GenericArityMismatch",
            DiagnosticKind::NonExhaustiveMatch => "NonExhaustiveMatch",
            DiagnosticKind::UseAfterMove => "UseAfterMove",
            DiagnosticKind::BorrowAliasConflict => "BorrowAliasConflict",
            DiagnosticKind::ReleaseWithLiveBorrow => "ReleaseWithLiveBorrow",
            DiagnosticKind::UnsafeWithoutJustification => "UnsafeWithoutJustification",
            DiagnosticKind::AbiIncompatible => "AbiIncompatible",
            DiagnosticKind::ImportCycle => "ImportCycle",
            DiagnosticKind::InternalError => "InternalError",
        }
    }
}

/// A secondary span with a label, e.g. "moved here" attached to the
/// `move` expression that precedes a `UseAfterMove`'s primary span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: TextRange,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub primary: TextRange,
    pub message: String,
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, primary: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            primary,
            message: message.into(),
            secondary: Vec::new(),
        }
    }

    pub fn with_label(mut self, span: TextRange, text: impl Into<String>) -> Self {
        self.secondary.push(Label {
            span,
            text: text.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    #[test]
    fn with_label_appends_secondary_span() {
        let origin = TextRange::new(TextSize::from(0), TextSize::from(3));
        let conflict = TextRange::new(TextSize::from(10), TextSize::from(13));
        let diag = Diagnostic::new(DiagnosticKind::UseAfterMove, conflict, "use after move")
            .with_label(origin, "moved here");
        assert_eq!(diag.secondary.len(), 1);
        assert_eq!(diag.secondary[0].span, origin);
    }

    #[test]
    fn code_names_match_kind() {
        assert_eq!(DiagnosticKind::ReleaseWithLiveBorrow.code(), "ReleaseWithLiveBorrow");
    }
}
