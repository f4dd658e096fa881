//! # daisyc
//!
//! Front and middle end for DAISY: dual-surface lexer and parser, module
//! resolver, type/generics checker, lexical borrow checker, typed IR with
//! lowering, and a C11 backend emitter, bound together by a per-module
//! build cache.
//!
//! ## Module structure (dependency order)
//!
//! ```text
//! driver    → CLI surface, pipeline orchestration
//!   ↓
//! cache     → keyed build artifact persistence
//!   ↓
//! emit      → C11 backend emitter, runtime symbol table
//!   ↓
//! ir        → typed SSA-like IR and lowering
//!   ↓
//! borrowck  → move state, region borrow sets
//!   ↓
//! hir       → bidirectional type checker, generics, diagnostics, salsa db
//!   ↓
//! resolve   → module graph over import/use
//!   ↓
//! project   → daisy.toml manifest, workspace
//!   ↓
//! syntax    → source loading, line index
//!   ↓
//! parser    → dual-surface grammar, single AST
//!   ↓
//! lexer     → logos tokenizer, shared across both surfaces
//!   ↓
//! base      → FileId, Name interning, TextRange
//! ```

pub mod base;
pub mod lexer;
pub mod parser;
pub mod syntax;
pub mod resolve;
pub mod project;
pub mod hir;
pub mod borrowck;
pub mod ir;
pub mod emit;
pub mod cache;
pub mod driver;

pub use base::{FileId, FileTable, Interner, LineCol, LineIndex, Name, TextRange, TextSize};
