//! Resolves a `daisy.toml` into a [`Workspace`] of one or more packages
//! and produces the [`SearchPaths`] the Module Resolver consumes.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::base::constants::MANIFEST_FILE;
use crate::project::manifest::{Manifest, ManifestError};
use crate::resolve::SearchPaths;

#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl Package {
    pub fn entry_file(&self) -> PathBuf {
        self.root.join(self.manifest.entry_path())
    }
}

#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub packages: Vec<Package>,
}

impl Workspace {
    /// Load the manifest at `root/daisy.toml`. A `[workspace]` table
    /// loads every listed member as its own package; otherwise `root`
    /// itself is the single package.
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = Manifest::load(&manifest_path)?;
        debug!(root = %root.display(), "loaded workspace manifest");

        let packages = if let Some(ws) = &manifest.workspace {
            let mut packages = Vec::with_capacity(ws.members.len());
            for member in &ws.members {
                let member_root = root.join(member);
                let member_manifest = Manifest::load(&member_root.join(MANIFEST_FILE))?;
                debug!(member = %member, "loaded workspace member");
                packages.push(Package {
                    name: member_manifest.package.name.clone(),
                    root: member_root,
                    manifest: member_manifest,
                });
            }
            packages
        } else {
            vec![Package {
                name: manifest.package.name.clone(),
                root: root.to_path_buf(),
                manifest,
            }]
        };

        Ok(Self {
            root: root.to_path_buf(),
            packages,
        })
    }

    /// One search-path root per package, in declaration order, for the
    /// Module Resolver to try `import`/`use` targets against.
    pub fn search_paths(&self) -> SearchPaths {
        SearchPaths::new(self.packages.iter().map(|p| p.root.clone()).collect())
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Checks every package's declared `abi_major` against the compiler's
    /// own, failing on the first mismatch found.
    pub fn check_abi(&self) -> Result<(), ManifestError> {
        for package in &self.packages {
            package.manifest.check_abi()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_single_package_workspace() {
        let dir = std::env::temp_dir().join("daisy_workspace_single");
        fs::create_dir_all(&dir).unwrap();
        write(&dir, "daisy.toml", "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n");

        let ws = Workspace::load(&dir).unwrap();
        assert_eq!(ws.packages.len(), 1);
        assert_eq!(ws.packages[0].name, "demo");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loads_workspace_members() {
        let dir = std::env::temp_dir().join("daisy_workspace_members");
        fs::create_dir_all(&dir).unwrap();
        write(
            &dir,
            "daisy.toml",
            "[package]\nname = \"root\"\nversion = \"0.1.0\"\n\n[workspace]\nmembers = [\"a\"]\n",
        );
        write(&dir, "a/daisy.toml", "[package]\nname = \"a\"\nversion = \"0.1.0\"\n");

        let ws = Workspace::load(&dir).unwrap();
        assert_eq!(ws.packages.len(), 1);
        assert!(ws.package("a").is_some());

        fs::remove_dir_all(&dir).ok();
    }
}
