//! Module Resolver: follows `import`/`use` directives against search
//! paths handed in by the workspace collaborator, loading and parsing
//! each referenced module and rejecting import cycles.

pub mod module_resolver;
pub mod search_paths;

pub use module_resolver::{resolve, ModuleGraph, ModuleId, ModuleNode, ResolveError};
pub use search_paths::SearchPaths;
