//! Follows `import`/`use` directives against [`SearchPaths`] to build the
//! module dependency graph, loading and parsing each module on first
//! reference and rejecting cycles.

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::base::FileTable;
use crate::parser::ast::Item;
use crate::parser::{self, Module as Ast, SyntaxError};
use crate::resolve::search_paths::SearchPaths;
use crate::syntax::{self, LoadError, SourceFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    #[cfg(test)]
    pub(crate) fn for_test(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for ModuleId {
    /// A placeholder id for symbols not owned by any loaded module (e.g.
    /// locals and parameters, which are only ever looked up by scope).
    fn default() -> Self {
        Self(0)
    }
}

/// One resolved module: its loaded source, parsed AST, and the
/// [`ModuleId`]s of the modules it imports, in declaration order.
pub struct ModuleNode {
    pub id: ModuleId,
    pub path: PathBuf,
    pub file: SourceFile,
    pub ast: Ast,
    pub syntax_errors: Vec<SyntaxError>,
    pub imports: Vec<ModuleId>,
}

#[derive(Default)]
pub struct ModuleGraph {
    nodes: Vec<ModuleNode>,
    by_path: FxHashMap<PathBuf, ModuleId>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ModuleId) -> &ModuleNode {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Modules in the order they were first loaded (leaves of the import
    /// graph tend to sort earlier, though this is not guaranteed for
    /// cyclic-looking diamonds).
    pub fn iter(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.iter()
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("cannot resolve import `{path}` from {from}")]
    NotFound { path: String, from: String },
    #[error("import cycle: {}", .cycle.join(" -> "))]
    ImportCycle { cycle: Vec<String> },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Load `entry` and every module it transitively imports, in depth-first
/// order, detecting import cycles.
pub fn resolve(
    files: &mut FileTable,
    search_paths: &SearchPaths,
    entry: &std::path::Path,
) -> Result<(ModuleGraph, ModuleId), ResolveError> {
    let mut graph = ModuleGraph::new();
    let mut marks: FxHashMap<PathBuf, Mark> = FxHashMap::default();
    let mut stack: Vec<PathBuf> = Vec::new();
    let entry_id = resolve_one(files, search_paths, entry, &mut graph, &mut marks, &mut stack)?;
    Ok((graph, entry_id))
}

fn resolve_one(
    files: &mut FileTable,
    search_paths: &SearchPaths,
    path: &std::path::Path,
    graph: &mut ModuleGraph,
    marks: &mut FxHashMap<PathBuf, Mark>,
    stack: &mut Vec<PathBuf>,
) -> Result<ModuleId, ResolveError> {
    let canonical = path.to_path_buf();

    if let Some(&id) = graph.by_path.get(&canonical) {
        return Ok(id);
    }

    match marks.get(&canonical) {
        Some(Mark::InProgress) => {
            let mut cycle: Vec<String> = stack
                .iter()
                .skip_while(|p| *p != canonical)
                .map(|p| p.display().to_string())
                .collect();
            cycle.push(canonical.display().to_string());
            return Err(ResolveError::ImportCycle { cycle });
        }
        Some(Mark::Done) => unreachable!("done modules are always present in graph.by_path"),
        None => {}
    }

    marks.insert(canonical.clone(), Mark::InProgress);
    stack.push(canonical.clone());

    let source_file = syntax::load(files, &canonical)?;
    let (ast, syntax_errors) = parser::parse(&source_file.text);

    let mut imports = Vec::with_capacity(ast.items.len());
    for item in &ast.items {
        if let Item::Import(import) = item {
            let target = search_paths.resolve(&import.path).ok_or_else(|| {
                ResolveError::NotFound {
                    path: import.path.join("::"),
                    from: canonical.display().to_string(),
                }
            })?;
            let child = resolve_one(files, search_paths, &target, graph, marks, stack)?;
            imports.push(child);
        }
    }

    stack.pop();
    marks.insert(canonical.clone(), Mark::Done);

    let id = ModuleId(graph.nodes.len() as u32);
    graph.nodes.push(ModuleNode {
        id,
        path: canonical.clone(),
        file: source_file,
        ast,
        syntax_errors,
        imports,
    });
    graph.by_path.insert(canonical, id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn resolves_single_module_with_no_imports() {
        let dir = std::env::temp_dir().join("daisy_resolve_single");
        fs::create_dir_all(&dir).unwrap();
        let entry = write(&dir, "main.dsy", "fn main() -> int:\n  return 0\n");

        let mut files = FileTable::new();
        let search_paths = SearchPaths::new(vec![dir.clone()]);
        let (graph, id) = resolve(&mut files, &search_paths, &entry).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.get(id).imports.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn follows_a_single_import() {
        let dir = std::env::temp_dir().join("daisy_resolve_import");
        fs::create_dir_all(&dir).unwrap();
        write(&dir, "helper.dsy", "fn helper() -> int:\n  return 1\n");
        let entry = write(
            &dir,
            "main.dsy",
            "import helper\nfn main() -> int:\n  return 0\n",
        );

        let mut files = FileTable::new();
        let search_paths = SearchPaths::new(vec![dir.clone()]);
        let (graph, id) = resolve(&mut files, &search_paths, &entry).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get(id).imports.len(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn detects_import_cycle() {
        let dir = std::env::temp_dir().join("daisy_resolve_cycle");
        fs::create_dir_all(&dir).unwrap();
        write(&dir, "a.dsy", "import b\nfn a() -> int:\n  return 0\n");
        let entry = write(&dir, "b.dsy", "import a\nfn b() -> int:\n  return 0\n");

        let mut files = FileTable::new();
        let search_paths = SearchPaths::new(vec![dir.clone()]);
        let err = resolve(&mut files, &search_paths, &entry).unwrap_err();
        assert!(matches!(err, ResolveError::ImportCycle { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_import_is_not_found() {
        let dir = std::env::temp_dir().join("daisy_resolve_missing");
        fs::create_dir_all(&dir).unwrap();
        let entry = write(
            &dir,
            "main.dsy",
            "import nope\nfn main() -> int:\n  return 0\n",
        );

        let mut files = FileTable::new();
        let search_paths = SearchPaths::new(vec![dir.clone()]);
        let err = resolve(&mut files, &search_paths, &entry).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));

        fs::remove_dir_all(&dir).ok();
    }
}
