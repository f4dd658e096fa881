use crate::base::TextRange;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("syntax error at {span:?}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub span: TextRange,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    pub fn new(span: TextRange, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }
}
