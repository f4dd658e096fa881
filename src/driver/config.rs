//! Compiler-wide configuration: version/ABI constants and the feature
//! flags that reach the emitter and the cache key.

use crate::base::constants::{ABI_MAJOR, COMPILER_VERSION};

/// The toggles named in the CLI contract: `--rt-checks`, `--sanitize
/// address`, LTO opt-in, plus the two auxiliary outputs `--emit-ir` and
/// `--profile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    pub runtime_checks: bool,
    pub lto: bool,
    pub sanitize_address: bool,
    pub emit_ir: bool,
    pub profile: bool,
}

impl FeatureFlags {
    /// Canonical flag names fed into [`crate::cache::CacheKey::new`] —
    /// only flags that change emitted code belong here; `--emit-ir` and
    /// `--profile` only affect auxiliary output, not the `.c` contents.
    pub fn cache_flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.runtime_checks {
            flags.push("rt_checks");
        }
        if self.lto {
            flags.push("lto");
        }
        if self.sanitize_address {
            flags.push("sanitize_address");
        }
        flags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    pub version: &'static str,
    pub abi_major: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            version: COMPILER_VERSION,
            abi_major: ABI_MAJOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_flags_only_include_codegen_affecting_toggles() {
        let flags = FeatureFlags {
            runtime_checks: true,
            emit_ir: true,
            profile: true,
            ..Default::default()
        };
        assert_eq!(flags.cache_flags(), vec!["rt_checks"]);
    }

    #[test]
    fn default_config_matches_base_constants() {
        let config = CompilerConfig::default();
        assert_eq!(config.abi_major, ABI_MAJOR);
        assert_eq!(config.version, COMPILER_VERSION);
    }
}
