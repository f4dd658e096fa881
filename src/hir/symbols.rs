//! Symbol table: an arena of [`Symbol`]s plus a scope chain, mirroring
//! the AST's lexical nesting (module → function → block).

use rustc_hash::FxHashMap;

use crate::base::TextRange;
use crate::hir::types::TypeScheme;
use crate::resolve::ModuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Struct,
    Enum,
    EnumVariant,
    Trait,
    Local,
    Param,
}

/// A named, typed thing: (fully-qualified name, kind, type scheme,
/// defining module, span). Lifetime is tied to its module: callers must
/// drop symbols from a module whose source hash changed and re-register.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub scheme: TypeScheme,
    pub module: ModuleId,
    pub span: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

struct Scope {
    parent: Option<ScopeId>,
    symbols: FxHashMap<String, SymbolId>,
}

/// Arena of symbols plus a scope chain, one [`SymbolTable`] per compiled
/// module graph. Built bottom-up during type checking: function/struct/
/// enum/trait headers are registered before bodies are checked, so
/// forward references within a module resolve.
pub struct SymbolTable {
    arena: Vec<Symbol>,
    scopes: Vec<Scope>,
    current: ScopeId,
    by_qname: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            scopes: vec![Scope {
                parent: None,
                symbols: FxHashMap::default(),
            }],
            current: ScopeId(0),
            by_qname: FxHashMap::default(),
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(self.current),
            symbols: FxHashMap::default(),
        });
        self.current = id;
        id
    }

    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.index()].parent {
            self.current = parent;
        }
    }

    pub fn insert(&mut self, scope: ScopeId, symbol: Symbol) -> SymbolId {
        let qname = symbol.qualified_name.clone();
        let name = symbol.name.clone();
        let id = SymbolId(self.arena.len() as u32);
        self.arena.push(symbol);
        self.scopes[scope.index()].symbols.insert(name, id);
        self.by_qname.insert(qname, id);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.index()]
    }

    pub fn find_by_qualified_name(&self, qname: &str) -> Option<SymbolId> {
        self.by_qname.get(qname).copied()
    }

    /// Walk the scope chain from `scope` looking for `name`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.index()];
            if let Some(&sym) = s.symbols.get(name) {
                return Some(sym);
            }
            current = s.parent;
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;
    use crate::hir::types::{HirType, TypeScheme};

    fn dummy_module() -> ModuleId {
        ModuleId::for_test(0)
    }

    fn local(name: &str, qname: &str, ty: HirType) -> Symbol {
        Symbol {
            name: name.into(),
            qualified_name: qname.into(),
            kind: SymbolKind::Local,
            scheme: TypeScheme::concrete(ty),
            module: dummy_module(),
            span: TextRange::new(TextSize::from(0), TextSize::from(1)),
        }
    }

    #[test]
    fn lookup_walks_parent_scopes() {
        let mut table = SymbolTable::new();
        let root = table.current_scope();
        table.insert(root, local("x", "m::x", HirType::Int));

        let child = table.enter_scope();
        let found = table.lookup(child, "x").map(|id| table.get(id).name.clone());
        assert_eq!(found, Some("x".into()));
        table.exit_scope();
    }

    #[test]
    fn shadowing_prefers_inner_scope() {
        let mut table = SymbolTable::new();
        let root = table.current_scope();
        table.insert(root, local("x", "m::x_outer", HirType::Int));
        let child = table.enter_scope();
        table.insert(child, local("x", "m::x_inner", HirType::Bool));

        let found = table.lookup(child, "x").unwrap();
        assert_eq!(table.get(found).qualified_name, "m::x_inner");
    }

    #[test]
    fn unresolved_name_is_none() {
        let table = SymbolTable::new();
        assert!(table.lookup(table.current_scope(), "nope").is_none());
    }
}
