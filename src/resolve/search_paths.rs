//! Module search paths, as handed in by the workspace collaborator
//! (`daisy.toml` members, dependency roots). The resolver itself never
//! discovers these paths; it only consumes them.

use std::path::{Path, PathBuf};

use crate::base::constants;

/// An ordered list of directories to try when resolving an `import`/`use`
/// path. Earlier entries shadow later ones.
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    roots: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn push(&mut self, root: PathBuf) {
        self.roots.push(root);
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve a dotted import path (`["a", "b", "c"]`) to a `.dsy` file
    /// under one of the search roots, trying each root in order.
    ///
    /// `a::b::c` is looked up as `<root>/a/b/c.dsy`.
    pub fn resolve(&self, segments: &[String]) -> Option<PathBuf> {
        for root in &self.roots {
            let candidate = self.candidate_path(root, segments);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    fn candidate_path(&self, root: &Path, segments: &[String]) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in segments {
            path.push(segment);
        }
        path.set_extension(constants::SOURCE_EXTENSION);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_first_matching_root() {
        let dir = std::env::temp_dir().join("daisy_search_paths_test");
        let nested = dir.join("a");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("b.dsy");
        fs::write(&file, "fn main() -> int:\n  return 0\n").unwrap();

        let paths = SearchPaths::new(vec![dir.clone()]);
        let segments = vec!["a".to_string(), "b".to_string()];
        assert_eq!(paths.resolve(&segments), Some(file));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_module_resolves_to_none() {
        let paths = SearchPaths::new(vec![PathBuf::from("/nonexistent/root")]);
        assert_eq!(paths.resolve(&["nope".to_string()]), None);
    }
}
