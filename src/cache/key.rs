//! The build cache key: a module's source hash paired with everything
//! that can change what compiling it produces without changing its
//! bytes — the compiler version, its ABI major, and the active feature
//! flags.

use sha2::{Digest, Sha256};

use crate::base::constants::{ABI_MAJOR, COMPILER_VERSION};

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CacheKey {
    pub source_hash: String,
    pub abi_major: u32,
    pub compiler_version: String,
    pub feature_flags: String,
}

impl CacheKey {
    /// Hashes `source` with SHA-256 and canonicalizes `feature_flags` by
    /// sorting, so flag order never causes a spurious cache miss.
    pub fn new(source: &str, feature_flags: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let source_hash = format!("{:x}", hasher.finalize());

        let mut flags: Vec<&str> = feature_flags.to_vec();
        flags.sort_unstable();

        Self {
            source_hash,
            abi_major: ABI_MAJOR,
            compiler_version: COMPILER_VERSION.to_string(),
            feature_flags: flags.join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_source_and_flags_produce_the_same_key() {
        let a = CacheKey::new("fn f(): return 1", &["lto", "rt_checks"]);
        let b = CacheKey::new("fn f(): return 1", &["rt_checks", "lto"]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_source_produces_a_different_hash() {
        let a = CacheKey::new("fn f(): return 1", &[]);
        let b = CacheKey::new("fn f(): return 2", &[]);
        assert_ne!(a.source_hash, b.source_hash);
    }

    #[test]
    fn different_flags_produce_a_different_key() {
        let a = CacheKey::new("fn f(): return 1", &["lto"]);
        let b = CacheKey::new("fn f(): return 1", &[]);
        assert_ne!(a, b);
    }
}
