//! Persists per-module build artifacts under `build/` and tells the
//! driver whether a module's previous output can be reused.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cache::key::CacheKey;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed cache entry at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A module's declared ABI: its name, ABI major, and exported function
/// signatures, persisted as `<module>.abi.json`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AbiManifest {
    pub module: String,
    pub abi_major: u32,
    pub exported_functions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct CacheEntry {
    key: CacheKey,
    c_path: PathBuf,
    ir_path: Option<PathBuf>,
    abi_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileReport {
    pub phases: Vec<(String, u64)>,
}

pub enum CacheStatus {
    Hit,
    Miss,
}

pub struct BuildCache {
    root: PathBuf,
}

impl BuildCache {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| CacheError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    fn path(&self, module: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{module}.{extension}"))
    }

    fn entry_path(&self, module: &str) -> PathBuf {
        self.path(module, "cache.json")
    }

    /// Checks a module's previous build entry against `key`. A missing
    /// or unreadable entry is treated as a miss, never an error — the
    /// driver simply regenerates.
    pub fn check(&self, module: &str, key: &CacheKey) -> CacheStatus {
        let path = self.entry_path(module);
        let Ok(text) = fs::read_to_string(&path) else {
            return CacheStatus::Miss;
        };
        match serde_json::from_str::<CacheEntry>(&text) {
            Ok(entry) if &entry.key == key => CacheStatus::Hit,
            _ => CacheStatus::Miss,
        }
    }

    /// Writes the emitted C source, optional IR dump, and ABI manifest
    /// for `module`, then records the cache entry that makes a future
    /// [`BuildCache::check`] call with the same key a hit.
    pub fn store(
        &self,
        module: &str,
        key: &CacheKey,
        c_source: &str,
        ir_dump: Option<&str>,
        abi: &AbiManifest,
    ) -> Result<(), CacheError> {
        let c_path = self.path(module, "c");
        self.write(&c_path, c_source)?;

        let ir_path = match ir_dump {
            Some(dump) => {
                let path = self.path(module, "ir.txt");
                self.write(&path, dump)?;
                Some(path)
            }
            None => None,
        };

        let abi_path = self.path(module, "abi.json");
        let abi_json = serde_json::to_string_pretty(abi).map_err(|source| CacheError::Corrupt {
            path: abi_path.clone(),
            source,
        })?;
        self.write(&abi_path, &abi_json)?;

        let entry = CacheEntry {
            key: key.clone(),
            c_path,
            ir_path,
            abi_path,
        };
        let entry_path = self.entry_path(module);
        let entry_json = serde_json::to_string_pretty(&entry).map_err(|source| CacheError::Corrupt {
            path: entry_path.clone(),
            source,
        })?;
        self.write(&entry_path, &entry_json)
    }

    /// One line per `unsafe` block: its justification, file, and span,
    /// as collected in [`crate::borrowck::BorrowChecker::unsafe_log`].
    pub fn write_unsafe_log(&self, module: &str, lines: &[String]) -> Result<(), CacheError> {
        let path = self.path(module, "unsafe.log");
        self.write(&path, &lines.join("\n"))
    }

    pub fn write_profile(&self, profile: &ProfileReport) -> Result<(), CacheError> {
        let path = self.root.join("profile.json");
        let json = serde_json::to_string_pretty(profile).map_err(|source| CacheError::Corrupt {
            path: path.clone(),
            source,
        })?;
        self.write(&path, &json)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), CacheError> {
        fs::write(path, contents).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn abi(module: &str) -> AbiManifest {
        AbiManifest {
            module: module.to_string(),
            abi_major: 1,
            exported_functions: vec!["f".to_string()],
        }
    }

    #[test]
    fn fresh_module_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = BuildCache::new(dir.path()).unwrap();
        let key = CacheKey::new("fn f(): return 1", &[]);
        assert!(matches!(cache.check("f", &key), CacheStatus::Miss));
    }

    #[test]
    fn stored_entry_with_matching_key_is_a_hit() {
        let dir = tempdir().unwrap();
        let cache = BuildCache::new(dir.path()).unwrap();
        let key = CacheKey::new("fn f(): return 1", &[]);
        cache.store("f", &key, "int64_t f(void) { return 1; }", None, &abi("f")).unwrap();
        assert!(matches!(cache.check("f", &key), CacheStatus::Hit));
    }

    #[test]
    fn changed_key_invalidates_the_entry() {
        let dir = tempdir().unwrap();
        let cache = BuildCache::new(dir.path()).unwrap();
        let key = CacheKey::new("fn f(): return 1", &[]);
        cache.store("f", &key, "...", None, &abi("f")).unwrap();
        let changed = CacheKey::new("fn f(): return 2", &[]);
        assert!(matches!(cache.check("f", &changed), CacheStatus::Miss));
    }

    #[test]
    fn unsafe_log_lines_are_persisted() {
        let dir = tempdir().unwrap();
        let cache = BuildCache::new(dir.path()).unwrap();
        cache
            .write_unsafe_log("f", &["released while borrowed (ok): raw pointer arithmetic".to_string()])
            .unwrap();
        let contents = fs::read_to_string(dir.path().join("f.unsafe.log")).unwrap();
        assert!(contents.contains("raw pointer arithmetic"));
    }
}
