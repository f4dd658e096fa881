//! Trait-bound solving and monomorphization bookkeeping.
//!
//! Bounds are solved with a small work-list unifier: each unresolved
//! `(param, trait)` obligation is matched against every `impl` in scope;
//! zero matches is `UnresolvedTraitBound`, more than one is
//! `AmbiguousImpl`. Successful monomorphizations are memoized by
//! `(generic_symbol, substitution)` so repeated instantiations with the
//! same concrete arguments share one emitted function.

use rustc_hash::FxHashMap;

use crate::hir::types::{HirType, Substitution, TraitBound};

/// One `impl TraitName for ForType` registered in scope.
#[derive(Debug, Clone)]
pub struct ImplEntry {
    pub trait_name: String,
    pub for_type: HirType,
}

#[derive(Debug)]
pub enum BoundError {
    Unresolved { param: String, trait_name: String },
    Ambiguous { param: String, trait_name: String, candidates: usize },
}

/// Check every bound in `bounds` against `impls`, with `subst` giving
/// the concrete type each generic parameter was unified to.
pub fn solve_bounds(
    bounds: &[TraitBound],
    subst: &Substitution,
    impls: &[ImplEntry],
) -> Result<(), BoundError> {
    for bound in bounds {
        let concrete = subst.get(&bound.param).cloned().unwrap_or_else(|| {
            HirType::Param(bound.param.clone())
        });
        let candidates: Vec<_> = impls
            .iter()
            .filter(|i| i.trait_name == bound.trait_name && i.for_type == concrete)
            .collect();
        match candidates.len() {
            0 => {
                return Err(BoundError::Unresolved {
                    param: bound.param.clone(),
                    trait_name: bound.trait_name.clone(),
                })
            }
            1 => continue,
            n => {
                return Err(BoundError::Ambiguous {
                    param: bound.param.clone(),
                    trait_name: bound.trait_name.clone(),
                    candidates: n,
                })
            }
        }
    }
    Ok(())
}

/// An opaque handle into the IR function table, assigned once per
/// distinct `(generic symbol, substitution)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonoFunctionId(u32);

impl MonoFunctionId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Maps `(qualified generic symbol name, substitution cache key)` to the
/// monomorphized IR function produced for that instantiation, so two
/// call sites with the same concrete type arguments share one function.
#[derive(Default)]
pub struct MonoTable {
    entries: FxHashMap<(String, String), MonoFunctionId>,
    next: u32,
}

impl MonoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing function id for this instantiation, or
    /// allocate and remember a fresh one.
    pub fn get_or_insert(&mut self, symbol: &str, subst: &Substitution) -> (MonoFunctionId, bool) {
        let key = (symbol.to_string(), subst.cache_key());
        if let Some(&id) = self.entries.get(&key) {
            return (id, false);
        }
        let id = MonoFunctionId(self.next);
        self.next += 1;
        self.entries.insert(key, id);
        (id, true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_bounds_accepts_single_matching_impl() {
        let bounds = vec![TraitBound { param: "T".into(), trait_name: "Show".into() }];
        let mut subst = Substitution::new();
        subst.insert("T", HirType::Int);
        let impls = vec![ImplEntry { trait_name: "Show".into(), for_type: HirType::Int }];
        assert!(solve_bounds(&bounds, &subst, &impls).is_ok());
    }

    #[test]
    fn solve_bounds_rejects_missing_impl() {
        let bounds = vec![TraitBound { param: "T".into(), trait_name: "Show".into() }];
        let mut subst = Substitution::new();
        subst.insert("T", HirType::Bool);
        let impls = vec![ImplEntry { trait_name: "Show".into(), for_type: HirType::Int }];
        assert!(matches!(
            solve_bounds(&bounds, &subst, &impls),
            Err(BoundError::Unresolved { .. })
        ));
    }

    #[test]
    fn solve_bounds_rejects_ambiguous_impls() {
        let bounds = vec![TraitBound { param: "T".into(), trait_name: "Show".into() }];
        let mut subst = Substitution::new();
        subst.insert("T", HirType::Int);
        let impls = vec![
            ImplEntry { trait_name: "Show".into(), for_type: HirType::Int },
            ImplEntry { trait_name: "Show".into(), for_type: HirType::Int },
        ];
        assert!(matches!(
            solve_bounds(&bounds, &subst, &impls),
            Err(BoundError::Ambiguous { .. })
        ));
    }

    #[test]
    fn mono_table_reuses_id_for_same_substitution() {
        let mut table = MonoTable::new();
        let mut subst = Substitution::new();
        subst.insert("T", HirType::Int);
        let (id1, inserted1) = table.get_or_insert("pkg::identity", &subst);
        let (id2, inserted2) = table.get_or_insert("pkg::identity", &subst);
        assert_eq!(id1, id2);
        assert!(inserted1);
        assert!(!inserted2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn mono_table_distinguishes_by_substitution() {
        let mut table = MonoTable::new();
        let mut subst_int = Substitution::new();
        subst_int.insert("T", HirType::Int);
        let mut subst_bool = Substitution::new();
        subst_bool.insert("T", HirType::Bool);
        let (id1, _) = table.get_or_insert("pkg::identity", &subst_int);
        let (id2, _) = table.get_or_insert("pkg::identity", &subst_bool);
        assert_ne!(id1, id2);
    }
}
