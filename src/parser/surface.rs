//! Per-line surface selection, in priority order: explicit directive,
//! then block-introducing shape, then an explicit Korean predicate
//! keyword, then the shared/English default.

use crate::lexer::{Token, TokenKind};
use crate::parser::ast::Surface;

/// Explicit `영어:` / `한국어:` directive found at the start of a line, if
/// any. Consumes no further tokens — callers strip it before dispatch.
pub fn explicit_directive(tokens: &[Token<'_>]) -> Option<Surface> {
    match tokens.first().map(|t| t.kind) {
        Some(TokenKind::EnglishDirective) => Some(Surface::English),
        Some(TokenKind::KoreanDirective) => Some(Surface::Korean),
        _ => None,
    }
}

/// English keywords that open a block-introducing (`:`-terminated) line.
fn english_block_head(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::IfKw
            | TokenKind::ElifKw
            | TokenKind::ElseKw
            | TokenKind::RepeatKw
            | TokenKind::FnKw
            | TokenKind::MatchKw
            | TokenKind::CaseKw
            | TokenKind::UnsafeKw
    )
}

/// Korean predicate/tail tokens that lock a block-introducing line to the
/// Korean surface.
fn korean_block_tail(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::IfTailKoKw
            | TokenKind::RepeatKoKw
            | TokenKind::DefineKoKw
            | TokenKind::CaseKoKw
            | TokenKind::UnsafeKoKw
    )
}

/// Korean predicate keywords that select the surface outside of a
/// block header (step 3 of the priority order).
fn korean_statement_predicate(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::ReturnKoKw
            | TokenKind::PrintKoKw
            | TokenKind::SetKoKw
            | TokenKind::AddAssignKoKw
            | TokenKind::ReleaseKoKw
            | TokenKind::DefineKoKw
            | TokenKind::CreateKoKw
            | TokenKind::BorrowKoKw
            | TokenKind::TryKoKw
            | TokenKind::TryShortKoKw
    )
}

/// Choose a surface for one logical line: directive, then block
/// pattern, then explicit Korean keyword, then (default) English/shared
/// expression grammar.
pub fn select(tokens: &[Token<'_>]) -> Surface {
    if let Some(s) = explicit_directive(tokens) {
        return s;
    }

    let ends_with_colon = tokens
        .iter()
        .rev()
        .find(|t| !t.kind.is_trivia())
        .map(|t| t.kind == TokenKind::Colon)
        .unwrap_or(false);

    if ends_with_colon {
        if tokens.iter().any(|t| english_block_head(t.kind)) {
            return Surface::English;
        }
        if tokens.iter().any(|t| korean_block_tail(t.kind)) {
            return Surface::Korean;
        }
    }

    if tokens.iter().any(|t| korean_statement_predicate(t.kind)) {
        return Surface::Korean;
    }

    Surface::English
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn english_if_locks_english() {
        let toks = tokenize("if x > 0:");
        assert_eq!(select(&toks), Surface::English);
    }

    #[test]
    fn korean_if_tail_locks_korean() {
        let toks = tokenize("참 이면:");
        assert_eq!(select(&toks), Surface::Korean);
    }

    #[test]
    fn korean_set_predicate_locks_korean() {
        let toks = tokenize("X를 Y로 설정한다");
        assert_eq!(select(&toks), Surface::Korean);
    }

    #[test]
    fn explicit_directive_wins() {
        let toks = tokenize("한국어: return 0");
        assert_eq!(select(&toks), Surface::Korean);
    }
}
