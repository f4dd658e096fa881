//! Typed SSA-like IR and the lowering pass that produces it from the
//! borrow-checked AST. See [`value`] for the IR's shape and [`lower`] for
//! the AST-to-IR translation.

pub mod lower;
pub mod value;

pub use lower::lower_module;
pub use value::{Block, BlockId, Function, Inst, Module, Op, Terminator, ValueId};
