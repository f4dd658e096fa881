//! Bidirectional type checker: walks a parsed [`Module`], registers every
//! top-level declaration as a symbol before checking any bodies (so
//! forward references within a module resolve), then checks each
//! function body with a `check`/`synthesize` split. Errors are collected
//! as [`Diagnostic`]s rather than aborting on the first one, so a single
//! run reports everything wrong with a module.

use crate::hir::diagnostics::{Diagnostic, DiagnosticKind};
use crate::hir::generics::{solve_bounds, BoundError, ImplEntry, MonoTable};
use crate::hir::symbols::{ScopeId, Symbol, SymbolKind, SymbolTable};
use crate::hir::types::{substitute, unify, HirType, Substitution, TraitBound, TypeScheme};
use crate::parser::ast::{
    self, BinOp, Block, EnumDef, Expr, FunctionDef, ImplBlock, Item, Literal, MatchArm, Module,
    Pattern, Stmt, TraitDef, Type,
};
use crate::resolve::ModuleId;

pub fn ast_type_to_hir(ty: &Type) -> HirType {
    match ty {
        Type::Int => HirType::Int,
        Type::Bool => HirType::Bool,
        Type::Str => HirType::Str,
        Type::Buffer => HirType::Buffer,
        Type::View { .. } => HirType::View,
        Type::Tensor => HirType::Tensor,
        Type::Struct { name, args } => HirType::Struct {
            name: name.clone(),
            args: args.iter().map(ast_type_to_hir).collect(),
        },
        Type::Enum { name, args } => HirType::Enum {
            name: name.clone(),
            args: args.iter().map(ast_type_to_hir).collect(),
        },
        Type::Result { ok, err } => HirType::Result {
            ok: Box::new(ast_type_to_hir(ok)),
            err: Box::new(ast_type_to_hir(err)),
        },
        Type::Option { inner } => HirType::Option {
            inner: Box::new(ast_type_to_hir(inner)),
        },
        Type::Param(name) => HirType::Param(name.clone()),
    }
}

fn function_scheme(def: &FunctionDef) -> TypeScheme {
    let params = def.type_params.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
    let bounds = def
        .type_params
        .iter()
        .flat_map(|p| {
            p.bounds.iter().map(move |b| TraitBound {
                param: p.name.clone(),
                trait_name: b.clone(),
            })
        })
        .collect();
    let ret = def
        .return_type
        .as_ref()
        .map(ast_type_to_hir)
        .unwrap_or(HirType::Struct { name: "unit".into(), args: Vec::new() });
    let body = HirType::Struct {
        name: "Fn".into(),
        args: def
            .params
            .iter()
            .map(|p| ast_type_to_hir(&p.ty))
            .chain(std::iter::once(ret))
            .collect(),
    };
    if params.is_empty() {
        TypeScheme::concrete(body)
    } else {
        TypeScheme::generic(params, bounds, body)
    }
}

/// Registers declarations and checks bodies for one module, accumulating
/// diagnostics. The returned [`SymbolTable`] is retained by callers that
/// need to look up checked types after the fact (e.g. IR lowering).
pub struct Checker {
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
    impls: Vec<ImplEntry>,
    pub mono: MonoTable,
    enums: Vec<EnumDef>,
}

impl Checker {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            diagnostics: Vec::new(),
            impls: Vec::new(),
            mono: MonoTable::new(),
            enums: Vec::new(),
        }
    }

    fn error(&mut self, kind: DiagnosticKind, span: ast::Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(kind, span, message));
    }

    pub fn check_module(&mut self, module: &Module, module_id: ModuleId) {
        let root = self.symbols.current_scope();

        for item in &module.items {
            match item {
                Item::Function(def) => {
                    self.symbols.insert(
                        root,
                        Symbol {
                            name: def.name.clone(),
                            qualified_name: def.name.clone(),
                            kind: SymbolKind::Function,
                            scheme: function_scheme(def),
                            module: module_id,
                            span: def.span,
                        },
                    );
                }
                Item::Struct(def) => {
                    self.symbols.insert(
                        root,
                        Symbol {
                            name: def.name.clone(),
                            qualified_name: def.name.clone(),
                            kind: SymbolKind::Struct,
                            scheme: TypeScheme::concrete(HirType::Struct {
                                name: def.name.clone(),
                                args: def.type_params.iter().map(|p| HirType::Param(p.name.clone())).collect(),
                            }),
                            module: module_id,
                            span: def.span,
                        },
                    );
                }
                Item::Enum(def) => {
                    self.enums.push(def.clone());
                    self.symbols.insert(
                        root,
                        Symbol {
                            name: def.name.clone(),
                            qualified_name: def.name.clone(),
                            kind: SymbolKind::Enum,
                            scheme: TypeScheme::concrete(HirType::Enum {
                                name: def.name.clone(),
                                args: def.type_params.iter().map(|p| HirType::Param(p.name.clone())).collect(),
                            }),
                            module: module_id,
                            span: def.span,
                        },
                    );
                    for variant in &def.variants {
                        self.symbols.insert(
                            root,
                            Symbol {
                                name: variant.name.clone(),
                                qualified_name: format!("{}::{}", def.name, variant.name),
                                kind: SymbolKind::EnumVariant,
                                scheme: TypeScheme::concrete(HirType::Enum {
                                    name: def.name.clone(),
                                    args: Vec::new(),
                                }),
                                module: module_id,
                                span: def.span,
                            },
                        );
                    }
                }
                Item::Trait(_) | Item::Impl(_) | Item::Import(_) | Item::SurfaceDirective(_) => {}
            }
        }

        for item in &module.items {
            match item {
                Item::Impl(block) => self.register_impl(block),
                Item::Trait(def) => self.register_trait(def, root, module_id),
                _ => {}
            }
        }

        for item in &module.items {
            if let Item::Function(def) = item {
                self.check_function(def, root);
            }
        }
        for item in &module.items {
            if let Item::Impl(block) = item {
                for method in &block.methods {
                    self.check_function(method, root);
                }
            }
        }
    }

    fn register_impl(&mut self, block: &ImplBlock) {
        if let Some(trait_name) = &block.trait_name {
            self.impls.push(ImplEntry {
                trait_name: trait_name.clone(),
                for_type: ast_type_to_hir(&block.for_type),
            });
        }
    }

    fn register_trait(&mut self, def: &TraitDef, root: ScopeId, module_id: ModuleId) {
        self.symbols.insert(
            root,
            Symbol {
                name: def.name.clone(),
                qualified_name: def.name.clone(),
                kind: SymbolKind::Trait,
                scheme: TypeScheme::concrete(HirType::Struct {
                    name: def.name.clone(),
                    args: Vec::new(),
                }),
                module: module_id,
                span: def.span,
            },
        );
    }

    fn check_function(&mut self, def: &FunctionDef, root: ScopeId) {
        let scope = self.symbols.enter_scope();
        for param in &def.params {
            self.symbols.insert(
                scope,
                Symbol {
                    name: param.name.clone(),
                    qualified_name: param.name.clone(),
                    kind: SymbolKind::Param,
                    scheme: TypeScheme::concrete(ast_type_to_hir(&param.ty)),
                    module: ModuleId::default(),
                    span: def.span,
                },
            );
        }
        let expected_ret = def.return_type.as_ref().map(ast_type_to_hir);
        self.check_block(&def.body, scope, expected_ret.as_ref());
        self.symbols.exit_scope();
        let _ = root;
    }

    fn check_block(&mut self, block: &Block, scope: ScopeId, expected_ret: Option<&HirType>) {
        for stmt in &block.stmts {
            self.check_stmt(stmt, scope, expected_ret);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, scope: ScopeId, expected_ret: Option<&HirType>) {
        match stmt {
            Stmt::Let(let_stmt) => {
                let init_ty = self.synthesize(&let_stmt.init, scope);
                let declared = let_stmt.ty.as_ref().map(ast_type_to_hir);
                let final_ty = if let Some(declared) = declared {
                    let mut subst = Substitution::new();
                    if !unify(&declared, &init_ty, &mut subst) {
                        self.error(
                            DiagnosticKind::TypeMismatch,
                            let_stmt.span,
                            format!("expected `{declared}`, found `{init_ty}`"),
                        );
                    }
                    declared
                } else {
                    init_ty
                };
                self.symbols.insert(
                    scope,
                    Symbol {
                        name: let_stmt.name.clone(),
                        qualified_name: let_stmt.name.clone(),
                        kind: SymbolKind::Local,
                        scheme: TypeScheme::concrete(final_ty),
                        module: ModuleId::default(),
                        span: let_stmt.span,
                    },
                );
            }
            Stmt::AddAssign(assign) => {
                let target_ty = self.lookup_type(&assign.target, scope, assign.span);
                let value_ty = self.synthesize(&assign.value, scope);
                if let Some(target_ty) = target_ty {
                    let mut subst = Substitution::new();
                    if !unify(&target_ty, &value_ty, &mut subst) {
                        self.error(
                            DiagnosticKind::TypeMismatch,
                            assign.span,
                            format!("expected `{target_ty}`, found `{value_ty}`"),
                        );
                    }
                }
            }
            Stmt::If(if_stmt) => {
                let cond_ty = self.synthesize(&if_stmt.cond, scope);
                if cond_ty != HirType::Bool {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        if_stmt.cond.span(),
                        format!("expected `bool`, found `{cond_ty}`"),
                    );
                }
                let then_scope = self.symbols.enter_scope();
                self.check_block(&if_stmt.then_branch, then_scope, expected_ret);
                self.symbols.exit_scope();
                for (elif_cond, elif_body) in &if_stmt.elifs {
                    let elif_ty = self.synthesize(elif_cond, scope);
                    if elif_ty != HirType::Bool {
                        self.error(
                            DiagnosticKind::TypeMismatch,
                            elif_cond.span(),
                            format!("expected `bool`, found `{elif_ty}`"),
                        );
                    }
                    let elif_scope = self.symbols.enter_scope();
                    self.check_block(elif_body, elif_scope, expected_ret);
                    self.symbols.exit_scope();
                }
                if let Some(else_branch) = &if_stmt.else_branch {
                    let else_scope = self.symbols.enter_scope();
                    self.check_block(else_branch, else_scope, expected_ret);
                    self.symbols.exit_scope();
                }
            }
            Stmt::Repeat(repeat) => {
                let count_ty = self.synthesize(&repeat.count, scope);
                if count_ty != HirType::Int {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        repeat.count.span(),
                        format!("expected `int`, found `{count_ty}`"),
                    );
                }
                let body_scope = self.symbols.enter_scope();
                self.check_block(&repeat.body, body_scope, expected_ret);
                self.symbols.exit_scope();
            }
            Stmt::Return(ret) => {
                let actual = ret
                    .value
                    .as_ref()
                    .map(|e| self.synthesize(e, scope))
                    .unwrap_or(HirType::Struct { name: "unit".into(), args: Vec::new() });
                if let Some(expected) = expected_ret {
                    let mut subst = Substitution::new();
                    if !unify(expected, &actual, &mut subst) {
                        self.error(
                            DiagnosticKind::TypeMismatch,
                            ret.span,
                            format!("expected return type `{expected}`, found `{actual}`"),
                        );
                    }
                }
            }
            Stmt::Print(print) => {
                self.synthesize(&print.value, scope);
            }
            Stmt::Release(_) => {}
            Stmt::Match(match_stmt) => {
                let scrutinee_ty = self.synthesize(&match_stmt.scrutinee, scope);
                for arm in &match_stmt.arms {
                    let arm_scope = self.symbols.enter_scope();
                    self.bind_pattern(&arm.pattern, &scrutinee_ty, arm_scope);
                    if let Some(guard) = &arm.guard {
                        self.synthesize(guard, arm_scope);
                    }
                    self.check_block(&arm.body, arm_scope, expected_ret);
                    self.symbols.exit_scope();
                }
                self.check_exhaustive(&scrutinee_ty, &match_stmt.arms, match_stmt.span);
            }
            Stmt::Unsafe(unsafe_stmt) => {
                if unsafe_stmt.reason.trim().is_empty() {
                    self.error(
                        DiagnosticKind::UnsafeWithoutJustification,
                        unsafe_stmt.span,
                        "unsafe block requires a non-empty justification",
                    );
                }
                let body_scope = self.symbols.enter_scope();
                self.check_block(&unsafe_stmt.body, body_scope, expected_ret);
                self.symbols.exit_scope();
            }
            Stmt::Expr(expr) => {
                self.synthesize(expr, scope);
            }
            Stmt::SurfaceDirective { inner, .. } => {
                self.check_stmt(inner, scope, expected_ret);
            }
        }
    }

    fn lookup_type(&mut self, name: &str, scope: ScopeId, span: ast::Span) -> Option<HirType> {
        match self.symbols.lookup(scope, name) {
            Some(id) => Some(self.symbols.get(id).scheme.body.clone()),
            None => {
                self.error(DiagnosticKind::UnknownSymbol, span, format!("unknown symbol `{name}`"));
                None
            }
        }
    }

    fn bind_pattern(&mut self, pattern: &Pattern, scrutinee_ty: &HirType, scope: ScopeId) {
        match pattern {
            Pattern::Wildcard => {}
            Pattern::Bind(name) => {
                self.symbols.insert(
                    scope,
                    Symbol {
                        name: name.clone(),
                        qualified_name: name.clone(),
                        kind: SymbolKind::Local,
                        scheme: TypeScheme::concrete(scrutinee_ty.clone()),
                        module: ModuleId::default(),
                        span: ast::Span::new(0.into(), 0.into()),
                    },
                );
            }
            Pattern::Struct { fields, .. } => {
                for (_, sub) in fields {
                    self.bind_pattern(sub, &HirType::Param("_".into()), scope);
                }
            }
            Pattern::EnumVariant { fields, .. } => {
                for sub in fields {
                    self.bind_pattern(sub, &HirType::Param("_".into()), scope);
                }
            }
        }
    }

    fn check_exhaustive(&mut self, scrutinee_ty: &HirType, arms: &[MatchArm], span: ast::Span) {
        let HirType::Enum { name, .. } = scrutinee_ty else {
            return;
        };
        if arms.iter().any(|a| matches!(a.pattern, Pattern::Wildcard | Pattern::Bind(_)) && a.guard.is_none()) {
            return;
        }
        let Some(enum_def) = self.enums.iter().find(|e| &e.name == name) else {
            return;
        };
        let covered: Vec<&str> = arms
            .iter()
            .filter_map(|a| match &a.pattern {
                Pattern::EnumVariant { variant, .. } if a.guard.is_none() => Some(variant.as_str()),
                _ => None,
            })
            .collect();
        let missing: Vec<_> = enum_def
            .variants
            .iter()
            .filter(|v| !covered.contains(&v.name.as_str()))
            .map(|v| v.name.clone())
            .collect();
        if !missing.is_empty() {
            self.error(
                DiagnosticKind::NonExhaustiveMatch,
                span,
                format!("non-exhaustive match: missing variant(s) {}", missing.join(", ")),
            );
        }
    }

    fn synthesize(&mut self, expr: &Expr, scope: ScopeId) -> HirType {
        match expr {
            Expr::Literal(lit, _) => match lit {
                Literal::Int(_) => HirType::Int,
                Literal::Str(_) => HirType::Str,
                Literal::Bool(_) => HirType::Bool,
            },
            Expr::Path(segments, span) => {
                let name = segments.join("::");
                let short = segments.last().map(String::as_str).unwrap_or(&name);
                match self.symbols.lookup(scope, short) {
                    Some(id) => self.symbols.get(id).scheme.body.clone(),
                    None if short == "None" => HirType::Option {
                        inner: Box::new(HirType::Param("T".into())),
                    },
                    None => {
                        self.error(DiagnosticKind::UnknownSymbol, *span, format!("unknown symbol `{name}`"));
                        HirType::Param("?".into())
                    }
                }
            }
            Expr::Call { callee, args, span } => self.synthesize_call(callee, args, *span, scope),
            Expr::Binary { op, lhs, rhs, span } => {
                let lt = self.synthesize(lhs, scope);
                let rt = self.synthesize(rhs, scope);
                let mut subst = Substitution::new();
                if !unify(&lt, &rt, &mut subst) {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        *span,
                        format!("mismatched operand types `{lt}` and `{rt}`"),
                    );
                }
                match op {
                    BinOp::Eq
                    | BinOp::NotEq
                    | BinOp::Lt
                    | BinOp::LtEq
                    | BinOp::Gt
                    | BinOp::GtEq => HirType::Bool,
                    _ => lt,
                }
            }
            Expr::Logical { op: _, lhs, rhs, span } => {
                let lt = self.synthesize(lhs, scope);
                let rt = self.synthesize(rhs, scope);
                if lt != HirType::Bool {
                    self.error(DiagnosticKind::TypeMismatch, lhs.span(), format!("expected `bool`, found `{lt}`"));
                }
                if rt != HirType::Bool {
                    self.error(DiagnosticKind::TypeMismatch, rhs.span(), format!("expected `bool`, found `{rt}`"));
                }
                let _ = span;
                HirType::Bool
            }
            Expr::Move { src, .. } | Expr::Copy { src, .. } => self.synthesize(src, scope),
            Expr::BorrowExpr { target, .. } => {
                self.synthesize(target, scope);
                HirType::View
            }
            Expr::BufferCreate { size, span } => {
                let size_ty = self.synthesize(size, scope);
                if size_ty != HirType::Int {
                    self.error(DiagnosticKind::TypeMismatch, *span, format!("expected `int`, found `{size_ty}`"));
                }
                HirType::Buffer
            }
            Expr::Borrow { buffer, start, end, .. } => {
                let buf_ty = self.synthesize(buffer, scope);
                if buf_ty != HirType::Buffer {
                    self.error(DiagnosticKind::TypeMismatch, buffer.span(), format!("expected `buffer`, found `{buf_ty}`"));
                }
                self.synthesize(start, scope);
                self.synthesize(end, scope);
                HirType::View
            }
            Expr::Try { inner, span } => {
                let inner_ty = self.synthesize(inner, scope);
                match inner_ty {
                    HirType::Result { ok, .. } => *ok,
                    HirType::Option { inner } => *inner,
                    other => {
                        self.error(
                            DiagnosticKind::TypeMismatch,
                            *span,
                            format!("`try` requires a `Result` or `Option`, found `{other}`"),
                        );
                        HirType::Param("?".into())
                    }
                }
            }
            Expr::StructInit { name, fields, span } => {
                for (_, value) in fields {
                    self.synthesize(value, scope);
                }
                match self.symbols.find_by_qualified_name(name) {
                    Some(id) => self.symbols.get(id).scheme.body.clone(),
                    None => {
                        self.error(DiagnosticKind::UnknownSymbol, *span, format!("unknown struct `{name}`"));
                        HirType::Param("?".into())
                    }
                }
            }
        }
    }

    fn synthesize_call(&mut self, callee: &Expr, args: &[Expr], span: ast::Span, scope: ScopeId) -> HirType {
        let Expr::Path(segments, _) = callee else {
            return self.synthesize(callee, scope);
        };
        let name = segments.last().cloned().unwrap_or_default();

        match name.as_str() {
            "Ok" if args.len() == 1 => {
                let ok = self.synthesize(&args[0], scope);
                return HirType::Result { ok: Box::new(ok), err: Box::new(HirType::Param("E".into())) };
            }
            "Err" if args.len() == 1 => {
                let err = self.synthesize(&args[0], scope);
                return HirType::Result { ok: Box::new(HirType::Param("T".into())), err: Box::new(err) };
            }
            "Some" if args.len() == 1 => {
                let inner = self.synthesize(&args[0], scope);
                return HirType::Option { inner: Box::new(inner) };
            }
            _ => {}
        }

        let Some(symbol_id) = self.symbols.lookup(scope, &name) else {
            self.error(DiagnosticKind::UnknownSymbol, span, format!("unknown function `{name}`"));
            return HirType::Param("?".into());
        };
        let symbol = self.symbols.get(symbol_id).clone();
        if symbol.kind == SymbolKind::EnumVariant {
            return self.synthesize_enum_variant_call(&symbol, &name, args, span, scope);
        }
        let HirType::Struct { name: fn_tag, args: sig } = &symbol.scheme.body else {
            self.error(DiagnosticKind::TypeMismatch, span, format!("`{name}` is not callable"));
            return HirType::Param("?".into());
        };
        if fn_tag != "Fn" {
            self.error(DiagnosticKind::TypeMismatch, span, format!("`{name}` is not callable"));
            return HirType::Param("?".into());
        }
        if sig.is_empty() {
            self.error(DiagnosticKind::InternalError, span, "function signature missing return type");
            return HirType::Param("?".into());
        }
        let (param_tys, ret_ty) = sig.split_at(sig.len() - 1);
        if param_tys.len() != args.len() {
            self.error(
                DiagnosticKind::GenericArityMismatch,
                span,
                format!("`{name}` expects {} argument(s), found {}", param_tys.len(), args.len()),
            );
        }
        let mut subst = Substitution::new();
        for (param_ty, arg) in param_tys.iter().zip(args) {
            let arg_ty = self.synthesize(arg, scope);
            if !unify(param_ty, &arg_ty, &mut subst) {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    arg.span(),
                    format!("expected `{param_ty}`, found `{arg_ty}`"),
                );
            }
        }
        for extra in args.iter().skip(param_tys.len()) {
            self.synthesize(extra, scope);
        }

        if symbol.scheme.is_generic() {
            match solve_bounds(&symbol.scheme.bounds, &subst, &self.impls) {
                Ok(()) => {
                    self.mono.get_or_insert(&symbol.qualified_name, &subst);
                }
                Err(BoundError::Unresolved { param, trait_name }) => self.error(
                    DiagnosticKind::UnresolvedTraitBound,
                    span,
                    format!("no impl of `{trait_name}` found for `{param}`"),
                ),
                Err(BoundError::Ambiguous { param, trait_name, candidates }) => self.error(
                    DiagnosticKind::AmbiguousImpl,
                    span,
                    format!("{candidates} impls of `{trait_name}` match `{param}`"),
                ),
            }
        }

        substitute(&ret_ty[0], &subst)
    }

    /// `Enum::Variant(args)` surfaces as an ordinary call whose callee is a
    /// two-segment path; the symbol table resolves the variant name to an
    /// [`HirType::Enum`], not a `Fn` signature, so it's checked separately
    /// from [`Self::synthesize_call`]'s function-call path.
    fn synthesize_enum_variant_call(
        &mut self,
        symbol: &Symbol,
        variant_name: &str,
        args: &[Expr],
        span: ast::Span,
        scope: ScopeId,
    ) -> HirType {
        let HirType::Enum { name: enum_name, .. } = &symbol.scheme.body else {
            self.error(DiagnosticKind::InternalError, span, "enum variant symbol missing enum type");
            return HirType::Param("?".into());
        };
        let field_types = self
            .enums
            .iter()
            .find(|e| &e.name == enum_name)
            .and_then(|e| e.variants.iter().find(|v| v.name == variant_name))
            .map(|v| v.fields.clone())
            .unwrap_or_default();

        if field_types.len() != args.len() {
            self.error(
                DiagnosticKind::GenericArityMismatch,
                span,
                format!(
                    "`{enum_name}::{variant_name}` expects {} argument(s), found {}",
                    field_types.len(),
                    args.len()
                ),
            );
        }
        for (field_ty, arg) in field_types.iter().zip(args) {
            let expected = ast_type_to_hir(field_ty);
            let arg_ty = self.synthesize(arg, scope);
            if !unify(&expected, &arg_ty, &mut Substitution::new()) {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    arg.span(),
                    format!("expected `{expected}`, found `{arg_ty}`"),
                );
            }
        }
        for extra in args.iter().skip(field_types.len()) {
            self.synthesize(extra, scope);
        }

        symbol.scheme.body.clone()
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check_source(src: &str) -> Vec<Diagnostic> {
        let (module, syntax_errors) = parse(src);
        assert!(syntax_errors.is_empty(), "unexpected syntax errors: {syntax_errors:?}");
        let mut checker = Checker::new();
        checker.check_module(&module, ModuleId::default());
        checker.diagnostics
    }

    #[test]
    fn well_typed_function_has_no_diagnostics() {
        let diags = check_source("fn add(a: int, b: int) -> int:\n  return a + b\n");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn mismatched_return_type_is_reported() {
        let diags = check_source("fn f() -> int:\n  return true\n");
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::TypeMismatch));
    }

    #[test]
    fn unknown_symbol_is_reported() {
        let diags = check_source("fn f() -> int:\n  return nope\n");
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::UnknownSymbol));
    }

    #[test]
    fn ok_and_err_construct_a_result_without_a_declared_symbol() {
        let diags = check_source(
            "fn f() -> Result<int, str>:\n  return Ok(1)\nfn g() -> Result<int, str>:\n  return Err(\"boom\")\n",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn some_and_none_construct_an_option_without_a_declared_symbol() {
        let diags = check_source(
            "fn f() -> Option<int>:\n  return Some(1)\nfn g() -> Option<int>:\n  return None\n",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn wrong_argument_count_is_reported() {
        let diags = check_source(
            "fn helper(a: int) -> int:\n  return a\nfn main() -> int:\n  return helper(1, 2)\n",
        );
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::GenericArityMismatch));
    }

    #[test]
    fn unsafe_without_reason_is_reported() {
        let diags = check_source("fn f() -> int:\n  unsafe \"\":\n    return 0\n");
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::UnsafeWithoutJustification));
    }
}
