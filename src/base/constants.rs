//! Compiler-wide constants: versioning, source file extension, build layout.

/// Bumped whenever the C11 emitter's ABI (symbol naming, struct layout of
/// runtime-visible types) changes in a way old build-cache entries cannot
/// be trusted across.
pub const ABI_MAJOR: u32 = 1;

/// Compiler version string, folded into [`crate::cache::CacheKey`] so a
/// cache entry produced by a different compiler build is never reused.
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source file extension recognized by the Source Loader.
pub const SOURCE_EXTENSION: &str = "dsy";

/// Directory (relative to the workspace root) build artifacts are written
/// under by [`crate::cache::BuildCache`].
pub const BUILD_DIR: &str = "build";

/// Manifest file name read by [`crate::project::manifest`].
pub const MANIFEST_FILE: &str = "daisy.toml";
