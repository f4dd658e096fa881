//! Semantic analysis: symbol tables, the checked-type representation,
//! bidirectional type checking, generics/trait-bound solving, structured
//! diagnostics, and the Salsa incremental layer that memoizes parsing and
//! checking per file.
//!
//! ## Layers
//!
//! ```text
//! FileText (input)
//!     │
//!     ▼
//! parse_file            ← parser::parse, memoized
//!     │
//!     ▼
//! check_file             ← Checker::check_module, memoized
//! ```

pub mod check;
pub mod db;
pub mod diagnostics;
pub mod generics;
pub mod symbols;
pub mod types;

pub use check::{ast_type_to_hir, Checker};
pub use db::{check_file, parse_file, CheckResult, FileText, ParseResult, RootDatabase};
pub use diagnostics::{Diagnostic, DiagnosticKind, Label};
pub use generics::{solve_bounds, BoundError, ImplEntry, MonoFunctionId, MonoTable};
pub use symbols::{ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use types::{substitute, unify, HirType, Substitution, TraitBound, TypeScheme};
