//! The checked-type representation: concrete types, generic parameters,
//! and a small structural unifier used by both bidirectional checking
//! and trait-bound solving.

use std::fmt;

use rustc_hash::FxHashMap;

/// A type as seen by the checker. `Param` only ever appears inside a
/// generic [`TypeScheme`]'s body; by the time a symbol is monomorphized
/// every `Param` has been substituted away.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HirType {
    Int,
    Bool,
    Str,
    Buffer,
    View,
    Tensor,
    Struct { name: String, args: Vec<HirType> },
    Enum { name: String, args: Vec<HirType> },
    Result { ok: Box<HirType>, err: Box<HirType> },
    Option { inner: Box<HirType> },
    Param(String),
}

impl fmt::Display for HirType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HirType::Int => write!(f, "int"),
            HirType::Bool => write!(f, "bool"),
            HirType::Str => write!(f, "str"),
            HirType::Buffer => write!(f, "buffer"),
            HirType::View => write!(f, "view"),
            HirType::Tensor => write!(f, "tensor"),
            HirType::Struct { name, args } | HirType::Enum { name, args } => {
                if args.is_empty() {
                    write!(f, "{name}")
                } else {
                    let parts: Vec<_> = args.iter().map(|a| a.to_string()).collect();
                    write!(f, "{name}<{}>", parts.join(", "))
                }
            }
            HirType::Result { ok, err } => write!(f, "Result<{ok}, {err}>"),
            HirType::Option { inner } => write!(f, "Option<{inner}>"),
            HirType::Param(name) => write!(f, "{name}"),
        }
    }
}

/// A trait bound on a generic parameter, e.g. `T: Trait`.
#[derive(Debug, Clone)]
pub struct TraitBound {
    pub param: String,
    pub trait_name: String,
}

/// A (possibly generic) function or type signature: its free type
/// parameters, their bounds, and a body type built from those
/// parameters. Monomorphizing a scheme substitutes concrete types for
/// every parameter, producing a closed [`HirType`].
#[derive(Debug, Clone)]
pub struct TypeScheme {
    pub params: Vec<String>,
    pub bounds: Vec<TraitBound>,
    pub body: HirType,
}

impl TypeScheme {
    pub fn concrete(ty: HirType) -> Self {
        Self {
            params: Vec::new(),
            bounds: Vec::new(),
            body: ty,
        }
    }

    pub fn generic(params: Vec<String>, bounds: Vec<TraitBound>, body: HirType) -> Self {
        Self {
            params,
            bounds,
            body,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.params.is_empty()
    }
}

/// A substitution from generic parameter name to concrete type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Substitution(FxHashMap<String, HirType>);

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param: impl Into<String>, ty: HirType) {
        self.0.insert(param.into(), ty);
    }

    pub fn get(&self, param: &str) -> Option<&HirType> {
        self.0.get(param)
    }

    /// A stable cache key for memoized monomorphization: parameter names
    /// sorted, paired with their substituted type's display form.
    pub fn cache_key(&self) -> String {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Replace every `Param` in `ty` using `subst`, leaving unmapped
/// parameters in place (used for partial substitution during solving).
pub fn substitute(ty: &HirType, subst: &Substitution) -> HirType {
    match ty {
        HirType::Param(name) => subst.get(name).cloned().unwrap_or_else(|| ty.clone()),
        HirType::Struct { name, args } => HirType::Struct {
            name: name.clone(),
            args: args.iter().map(|a| substitute(a, subst)).collect(),
        },
        HirType::Enum { name, args } => HirType::Enum {
            name: name.clone(),
            args: args.iter().map(|a| substitute(a, subst)).collect(),
        },
        HirType::Result { ok, err } => HirType::Result {
            ok: Box::new(substitute(ok, subst)),
            err: Box::new(substitute(err, subst)),
        },
        HirType::Option { inner } => HirType::Option {
            inner: Box::new(substitute(inner, subst)),
        },
        HirType::Int | HirType::Bool | HirType::Str | HirType::Buffer | HirType::View
        | HirType::Tensor => ty.clone(),
    }
}

/// Structural unification: walk `expected` and `actual` together,
/// recording a binding in `subst` the first time a `Param` is seen and
/// requiring exact structural agreement everywhere else.
pub fn unify(expected: &HirType, actual: &HirType, subst: &mut Substitution) -> bool {
    match (expected, actual) {
        (HirType::Param(name), other) | (other, HirType::Param(name)) => {
            match subst.get(name) {
                Some(bound) => bound == other,
                None => {
                    subst.insert(name.clone(), other.clone());
                    true
                }
            }
        }
        (HirType::Int, HirType::Int)
        | (HirType::Bool, HirType::Bool)
        | (HirType::Str, HirType::Str)
        | (HirType::Buffer, HirType::Buffer)
        | (HirType::View, HirType::View)
        | (HirType::Tensor, HirType::Tensor) => true,
        (
            HirType::Struct { name: n1, args: a1 },
            HirType::Struct { name: n2, args: a2 },
        )
        | (HirType::Enum { name: n1, args: a1 }, HirType::Enum { name: n2, args: a2 }) => {
            n1 == n2
                && a1.len() == a2.len()
                && a1.iter().zip(a2).all(|(x, y)| unify(x, y, subst))
        }
        (
            HirType::Result { ok: o1, err: e1 },
            HirType::Result { ok: o2, err: e2 },
        ) => unify(o1, o2, subst) && unify(e1, e2, subst),
        (HirType::Option { inner: i1 }, HirType::Option { inner: i2 }) => {
            unify(i1, i2, subst)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify_binds_param_to_concrete_type() {
        let mut subst = Substitution::new();
        assert!(unify(&HirType::Param("T".into()), &HirType::Int, &mut subst));
        assert_eq!(subst.get("T"), Some(&HirType::Int));
    }

    #[test]
    fn unify_rejects_conflicting_bindings() {
        let mut subst = Substitution::new();
        subst.insert("T", HirType::Int);
        assert!(!unify(&HirType::Param("T".into()), &HirType::Bool, &mut subst));
    }

    #[test]
    fn unify_recurses_into_struct_args() {
        let mut subst = Substitution::new();
        let expected = HirType::Struct {
            name: "Box".into(),
            args: vec![HirType::Param("T".into())],
        };
        let actual = HirType::Struct {
            name: "Box".into(),
            args: vec![HirType::Int],
        };
        assert!(unify(&expected, &actual, &mut subst));
        assert_eq!(subst.get("T"), Some(&HirType::Int));
    }

    #[test]
    fn unify_rejects_mismatched_struct_names() {
        let mut subst = Substitution::new();
        let a = HirType::Struct { name: "A".into(), args: vec![] };
        let b = HirType::Struct { name: "B".into(), args: vec![] };
        assert!(!unify(&a, &b, &mut subst));
    }

    #[test]
    fn substitute_replaces_param_with_bound_type() {
        let mut subst = Substitution::new();
        subst.insert("T", HirType::Bool);
        let ty = HirType::Option { inner: Box::new(HirType::Param("T".into())) };
        assert_eq!(substitute(&ty, &subst), HirType::Option { inner: Box::new(HirType::Bool) });
    }

    #[test]
    fn cache_key_is_stable_across_insertion_order() {
        let mut a = Substitution::new();
        a.insert("T", HirType::Int);
        a.insert("U", HirType::Bool);
        let mut b = Substitution::new();
        b.insert("U", HirType::Bool);
        b.insert("T", HirType::Int);
        assert_eq!(a.cache_key(), b.cache_key());
    }
}
