//! Parses `daisy.toml`: package metadata, dependency version specs, and
//! workspace member globs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::base::constants::ABI_MAJOR;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("package `{package}` declares abi_major {found}, compiler is {expected}")]
    AbiIncompatible {
        package: String,
        found: u32,
        expected: u32,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub package: PackageSection,
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencySpec>,
    #[serde(default)]
    pub workspace: Option<WorkspaceSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageSection {
    pub name: String,
    pub version: String,
    /// Relative path to the entry module, defaulting to `src/main.dsy`.
    #[serde(default)]
    pub entry: Option<String>,
    /// ABI major version this package was built against, defaulting to the
    /// compiler's own. A mismatch against the compiler's ABI_MAJOR is an
    /// AbiIncompatible error and blocks the build.
    #[serde(default)]
    pub abi_major: Option<u32>,
}

/// Either a bare version string (`foo = "1.2"`) or a detailed table
/// (`foo = { version = "1.2", path = "../foo" }`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Version(String),
    Detailed {
        version: String,
        #[serde(default)]
        path: Option<String>,
    },
}

impl DependencySpec {
    pub fn version(&self) -> &str {
        match self {
            DependencySpec::Version(v) => v,
            DependencySpec::Detailed { version, .. } => version,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceSection {
    #[serde(default)]
    pub members: Vec<String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ManifestError> {
        toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn is_workspace(&self) -> bool {
        self.workspace.is_some()
    }

    pub fn entry_path(&self) -> &str {
        self.package.entry.as_deref().unwrap_or("src/main.dsy")
    }

    /// Checks the package's declared `abi_major` (if any) against the
    /// compiler's own, per the build-blocking ABI contract.
    pub fn check_abi(&self) -> Result<(), ManifestError> {
        match self.package.abi_major {
            Some(found) if found != ABI_MAJOR => Err(ManifestError::AbiIncompatible {
                package: self.package.name.clone(),
                found,
                expected: ABI_MAJOR,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_with_caret_dependency() {
        let toml = r#"
            [package]
            name = "demo"
            version = "0.1.0"

            [dependencies]
            collections = "^1.0"
        "#;
        let manifest = Manifest::parse(toml, Path::new("daisy.toml")).unwrap();
        assert_eq!(manifest.package.name, "demo");
        assert_eq!(manifest.dependencies.get("collections").unwrap().version(), "^1.0");
        assert!(!manifest.is_workspace());
    }

    #[test]
    fn parses_workspace_members() {
        let toml = r#"
            [package]
            name = "root"
            version = "0.1.0"

            [workspace]
            members = ["lib-a", "lib-b"]
        "#;
        let manifest = Manifest::parse(toml, Path::new("daisy.toml")).unwrap();
        assert!(manifest.is_workspace());
        assert_eq!(manifest.workspace.unwrap().members, vec!["lib-a", "lib-b"]);
    }

    #[test]
    fn default_entry_path_is_src_main() {
        let toml = "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n";
        let manifest = Manifest::parse(toml, Path::new("daisy.toml")).unwrap();
        assert_eq!(manifest.entry_path(), "src/main.dsy");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Manifest::parse("not valid toml =", Path::new("daisy.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn matching_abi_major_is_compatible() {
        let toml = format!(
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\nabi_major = {ABI_MAJOR}\n"
        );
        let manifest = Manifest::parse(&toml, Path::new("daisy.toml")).unwrap();
        assert!(manifest.check_abi().is_ok());
    }

    #[test]
    fn mismatched_abi_major_is_incompatible() {
        let toml = format!("[package]\nname = \"demo\"\nversion = \"0.1.0\"\nabi_major = {}\n", ABI_MAJOR + 1);
        let manifest = Manifest::parse(&toml, Path::new("daisy.toml")).unwrap();
        assert!(matches!(manifest.check_abi(), Err(ManifestError::AbiIncompatible { .. })));
    }

    #[test]
    fn absent_abi_major_is_compatible() {
        let toml = "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n";
        let manifest = Manifest::parse(toml, Path::new("daisy.toml")).unwrap();
        assert!(manifest.check_abi().is_ok());
    }
}
