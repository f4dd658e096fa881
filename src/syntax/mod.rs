//! Source Loader: reads `.dsy` files, normalizes line endings, and
//! detects per-line surface hints ahead of lexing.

pub mod loader;
pub mod source_file;

pub use loader::{collect_dsy_files, load, LoadError};
pub use source_file::{SourceFile, SurfaceHint};
