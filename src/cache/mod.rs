//! Per-module build cache, keyed on source hash, ABI major, compiler
//! version, and active feature flags.

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::{AbiManifest, BuildCache, CacheError, CacheStatus, ProfileReport};
