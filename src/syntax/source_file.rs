//! A loaded, normalized `.dsy` source file.

use crate::base::{FileId, LineIndex};

/// Per-line surface hint detected by the loader. Most lines carry no
/// hint; the parser falls back to shape-based dispatch
/// (`parser::surface::select`) for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceHint {
    English,
    Korean,
    None,
}

/// One source file after line-ending normalization, ready for lexing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    /// Normalized text: CRLF and lone CR collapsed to LF.
    pub text: String,
    pub line_index: LineIndex,
    pub line_hints: Vec<SurfaceHint>,
}

impl SourceFile {
    pub fn new(id: FileId, raw: &str) -> Self {
        let text = normalize_line_endings(raw);
        let line_index = LineIndex::new(&text);
        let line_hints = text.lines().map(detect_hint).collect();
        Self {
            id,
            text,
            line_index,
            line_hints,
        }
    }
}

fn normalize_line_endings(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            other => out.push(other),
        }
    }
    out
}

fn detect_hint(line: &str) -> SurfaceHint {
    let trimmed = line.trim_start();
    if trimmed.starts_with("영어:") {
        SurfaceHint::English
    } else if trimmed.starts_with("한국어:") {
        SurfaceHint::Korean
    } else {
        SurfaceHint::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> FileId {
        let mut table = crate::base::FileTable::new();
        table.intern(std::path::Path::new("a.dsy"))
    }

    #[test]
    fn normalizes_crlf_and_lone_cr() {
        let src = SourceFile::new(id(), "a\r\nb\rc\n");
        assert_eq!(src.text, "a\nb\nc\n");
    }

    #[test]
    fn detects_korean_directive_line() {
        let src = SourceFile::new(id(), "한국어: return 0\nprint 1\n");
        assert_eq!(src.line_hints[0], SurfaceHint::Korean);
        assert_eq!(src.line_hints[1], SurfaceHint::None);
    }
}
