//! Tokenizer shared by both surface grammars.
//!
//! Wraps the [`logos`]-generated [`TokenKind`] grammar with one
//! post-processing step the grammar itself cannot express: Korean
//! particles attach directly to their host noun with no separating
//! whitespace (`버퍼를`, not `버퍼 를`), so a single `HangulIdent` match
//! is split into an identifier token followed by a particle token
//! whenever it ends in a known particle.

mod token;

pub use token::TokenKind;

use crate::base::TextRange;

/// A single token: its kind, source text and byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Particles ordered longest-first so a greedy suffix check never matches
/// a shorter particle that is itself a suffix of a longer one (`로` is a
/// suffix of `으로`).
const PARTICLES: &[(&str, TokenKind)] = &[
    ("으로", TokenKind::ParticleEuro),
    ("부터", TokenKind::ParticleButeo),
    ("까지", TokenKind::ParticleKkaji),
    ("를", TokenKind::ParticleReul),
    ("을", TokenKind::ParticleEul),
    ("에", TokenKind::ParticleE),
    ("의", TokenKind::ParticleUi),
    ("로", TokenKind::ParticleRo),
];

/// An error the lexer could not resynchronize from until the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub range: TextRange,
    pub text: String,
}

/// Tokenizes one source file, splitting Korean noun+particle runs and
/// resynchronizing at the next newline after an unrecognized byte.
pub struct Lexer<'a> {
    input: &'a str,
    inner: logos::Lexer<'a, TokenKind>,
    /// A particle split off the previous `HangulIdent` match, queued for
    /// the next call to `next()`.
    pending: Option<Token<'a>>,
    pub errors: Vec<LexicalError>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            inner: TokenKind::lexer(input),
            pending: None,
            errors: Vec::new(),
        }
    }

    fn split_particle(&self, text: &'a str, start: u32) -> (Token<'a>, Option<Token<'a>>) {
        for (particle, kind) in PARTICLES {
            if let Some(stem) = text.strip_suffix(particle) {
                if !stem.is_empty() {
                    let stem_len = stem.len() as u32;
                    let particle_len = particle.len() as u32;
                    let stem_tok = Token {
                        kind: TokenKind::HangulIdent,
                        text: stem,
                        range: TextRange::at(start.into(), stem_len.into()),
                    };
                    let particle_tok = Token {
                        kind: *kind,
                        text: particle,
                        range: TextRange::at((start + stem_len).into(), particle_len.into()),
                    };
                    return (stem_tok, Some(particle_tok));
                }
            }
        }
        (
            Token {
                kind: TokenKind::HangulIdent,
                text,
                range: TextRange::at(start.into(), (text.len() as u32).into()),
            },
            None,
        )
    }

    /// Skip to the byte offset just after the next newline, recording a
    /// [`LexicalError`] for the unrecognized span.
    fn resync(&mut self, bad_start: u32) {
        let rest = &self.input[bad_start as usize..];
        let bad_len = rest.find('\n').unwrap_or(rest.len());
        let bad_text = &rest[..bad_len];
        self.errors.push(LexicalError {
            range: TextRange::at(bad_start.into(), (bad_len as u32).into()),
            text: bad_text.to_string(),
        });
        self.inner = TokenKind::lexer(self.input);
        self.inner.bump(bad_start as usize + bad_len);
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(tok) = self.pending.take() {
            return Some(tok);
        }
        loop {
            let result = self.inner.next()?;
            let text = self.inner.slice();
            let start = self.inner.span().start as u32;
            return match result {
                Ok(TokenKind::HangulIdent) => {
                    let (head, tail) = self.split_particle(text, start);
                    self.pending = tail;
                    Some(head)
                }
                Ok(kind) => Some(Token {
                    kind,
                    text,
                    range: TextRange::at(start.into(), (text.len() as u32).into()),
                }),
                Err(()) => {
                    self.resync(start);
                    continue;
                }
            };
        }
    }
}

/// Tokenize an entire source string, dropping trivia.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input)
        .filter(|t| !t.kind.is_trivia())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_noun_and_particle() {
        let tokens: Vec<_> = tokenize("버퍼를");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::HangulIdent);
        assert_eq!(tokens[0].text, "버퍼");
        assert_eq!(tokens[1].kind, TokenKind::ParticleReul);
        assert_eq!(tokens[1].text, "를");
    }

    #[test]
    fn splits_euro_not_ro() {
        let tokens: Vec<_> = tokenize("바이트로");
        assert_eq!(tokens[0].text, "바이트");
        assert_eq!(tokens[1].kind, TokenKind::ParticleRo);
    }

    #[test]
    fn hello_english_header_tokenizes() {
        let tokens: Vec<_> = tokenize("fn main() -> int:");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::FnKw,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::Ident,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn resyncs_after_bad_byte() {
        let mut lexer = Lexer::new("let x = 1\n$$$\nlet y = 2");
        let tokens: Vec<_> = (&mut lexer).collect();
        assert_eq!(lexer.errors.len(), 1);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::LetKw));
    }
}
