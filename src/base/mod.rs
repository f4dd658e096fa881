//! Foundation types shared by every later stage of the compiler.
//!
//! - [`FileId`] — interned file identifiers
//! - [`TextRange`], [`TextSize`] — byte-offset source positions
//! - [`LineCol`], [`LineIndex`] — line/column conversion for diagnostics
//! - [`Name`], [`Interner`] — string interning
//! - [`constants`] — ABI major version, compiler version, file extension
//!
//! This module has no dependencies on any other module in this crate.

pub mod constants;
mod file_id;
mod intern;
mod span;

pub use file_id::{FileId, FileTable};
pub use intern::{IStr, Interner, Name};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

pub use text_size;
