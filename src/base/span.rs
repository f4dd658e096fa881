//! Byte-offset spans and line/column conversion.
//!
//! Every AST node, token and diagnostic carries a [`TextRange`] (from the
//! `text-size` crate) rather than a line/column pair; [`LineIndex`] converts
//! a `TextRange` to human-readable [`LineCol`] only at the point a
//! diagnostic is rendered.

pub use text_size::{TextRange, TextSize};

/// A 0-indexed line/column position, for diagnostic rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Maps byte offsets to line/column positions for one source file.
///
/// Built once per file from the normalized (LF-only) source text; offsets
/// of every line start are recorded so lookup is a binary search.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line; `line_starts[0] == 0`.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(TextSize::from(i as u32 + 1));
            }
        }
        Self { line_starts }
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        let col = offset - self.line_starts[line];
        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_starts_at_zero() {
        let idx = LineIndex::new("fn main:\n  print(1)\n");
        assert_eq!(idx.line_col(TextSize::from(0)), LineCol { line: 0, col: 0 });
    }

    #[test]
    fn offset_on_second_line() {
        let idx = LineIndex::new("fn main:\n  print(1)\n");
        // "fn main:\n" is 9 bytes; offset 11 is column 2 of line 1.
        assert_eq!(idx.line_col(TextSize::from(11)), LineCol { line: 1, col: 2 });
    }

    #[test]
    fn counts_lines() {
        let idx = LineIndex::new("a\nb\nc");
        assert_eq!(idx.line_count(), 3);
    }
}
