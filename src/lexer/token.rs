//! Logos-derived token kind shared by both surface grammars.

use logos::Logos;

/// Every lexical category produced by either surface.
///
/// Literal, punctuation and particle tokens are surface-neutral; keyword
/// variants are split `*Kw`/`*KoKw` only where the two surfaces use
/// different lexemes for the same grammatical role (most do — DAISY has
/// no bilingual keyword that lexes identically in both scripts).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum TokenKind {
    // ---------------------------------------------------------------
    // Trivia
    // ---------------------------------------------------------------
    #[regex(r"[ \t]+")]
    Whitespace,
    #[token("\n")]
    Newline,
    #[regex(r"#[^\n]*")]
    Comment,

    // ---------------------------------------------------------------
    // Literals
    // ---------------------------------------------------------------
    #[regex(r"-?[0-9]+")]
    Integer,
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    /// A run of Hangul syllable blocks: both a Korean identifier and the
    /// substrate every Korean keyword/particle regex below also matches,
    /// so those are ordered first (logos prefers the earlier variant on
    /// an equal-length match).
    #[regex(r"[\u{AC00}-\u{D7A3}]+")]
    HangulIdent,

    // ---------------------------------------------------------------
    // Particles (tokenized standalone, never merged into the host noun)
    // ---------------------------------------------------------------
    #[token("을")]
    ParticleEul,
    #[token("를")]
    ParticleReul,
    #[token("에")]
    ParticleE,
    #[token("의")]
    ParticleUi,
    #[token("부터")]
    ParticleButeo,
    #[token("까지")]
    ParticleKkaji,
    #[token("으로")]
    ParticleEuro,
    #[token("로")]
    ParticleRo,

    // ---------------------------------------------------------------
    // Surface directives
    // ---------------------------------------------------------------
    #[token("영어:")]
    EnglishDirective,
    #[token("한국어:")]
    KoreanDirective,

    // ---------------------------------------------------------------
    // Korean lexical keywords (§4.2)
    // ---------------------------------------------------------------
    #[token("정의한다")]
    DefineKoKw,
    #[token("함수")]
    FunctionKoKw,
    #[token("설정한다")]
    SetKoKw,
    #[token("더한다")]
    AddAssignKoKw,
    #[token("반환한다")]
    ReturnKoKw,
    #[token("출력한다")]
    PrintKoKw,
    #[token("해제한다")]
    ReleaseKoKw,
    #[token("반복한다")]
    RepeatKoKw,
    #[token("생성한다")]
    CreateKoKw,
    #[token("빌려온다")]
    BorrowKoKw,
    #[token("불변")]
    ImmutKoKw,
    #[token("가변")]
    MutKoKw,
    #[token("시도한다")]
    TryKoKw,
    #[token("시도")]
    TryShortKoKw,
    #[token("이면")]
    IfTailKoKw,
    #[token("만약")]
    GuardKoKw,
    #[token("케이스")]
    CaseKoKw,
    #[token("안전하지않음")]
    UnsafeKoKw,

    // ---------------------------------------------------------------
    // English keywords
    // ---------------------------------------------------------------
    #[token("fn")]
    FnKw,
    #[token("let")]
    LetKw,
    #[token("if")]
    IfKw,
    #[token("elif")]
    ElifKw,
    #[token("else")]
    ElseKw,
    #[token("repeat")]
    RepeatKw,
    #[token("match")]
    MatchKw,
    #[token("case")]
    CaseKw,
    #[token("return")]
    ReturnKw,
    #[token("print")]
    PrintKw,
    #[token("release")]
    ReleaseKw,
    #[token("unsafe")]
    UnsafeKw,
    #[token("struct")]
    StructKw,
    #[token("enum")]
    EnumKw,
    #[token("trait")]
    TraitKw,
    #[token("impl")]
    ImplKw,
    #[token("for")]
    ForKw,
    #[token("move")]
    MoveKw,
    #[token("borrow")]
    BorrowKw,
    #[token("mut")]
    MutKw,
    #[token("buffer")]
    BufferKw,
    #[token("view")]
    ViewKw,
    #[token("try")]
    TryKw,
    #[token("import")]
    ImportKw,
    #[token("use")]
    UseKw,
    #[token("as")]
    AsKw,
    #[token("pub")]
    PubKw,
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
    #[token("and")]
    AndKw,
    #[token("or")]
    OrKw,

    // ---------------------------------------------------------------
    // Multi-character punctuation (ordered before single-char prefixes)
    // ---------------------------------------------------------------
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("..")]
    DotDot,

    // ---------------------------------------------------------------
    // Single-character punctuation
    // ---------------------------------------------------------------
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn korean_predicate_keyword_is_exact() {
        let mut lex = TokenKind::lexer("설정한다");
        assert_eq!(lex.next(), Some(Ok(TokenKind::SetKoKw)));
    }

    #[test]
    fn noun_plus_particle_lexes_as_one_hangul_run() {
        // Splitting "버퍼를" into ident + particle is the job of
        // `lexer::Lexer`, not the raw logos grammar — see mod.rs.
        let mut lex = TokenKind::lexer("버퍼를");
        assert_eq!(lex.next(), Some(Ok(TokenKind::HangulIdent)));
        assert_eq!(lex.slice(), "버퍼를");
    }

    #[test]
    fn english_keyword() {
        let mut lex = TokenKind::lexer("fn");
        assert_eq!(lex.next(), Some(Ok(TokenKind::FnKw)));
    }
}
