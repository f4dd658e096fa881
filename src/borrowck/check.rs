//! Walks a checked function body enforcing move-by-default semantics and
//! the per-region borrow alias rule. Runs after type checking and before
//! IR lowering, treating every elaborated form uniformly — an implicit
//! borrow produced by a call argument is checked the same way as an
//! explicit `borrow`.

use rustc_hash::FxHashMap;

use crate::base::TextRange;
use crate::borrowck::region::{Interval, OwnedView, RegionState};
use crate::borrowck::state::{MoveState, MoveTable};
use crate::hir::diagnostics::{Diagnostic, DiagnosticKind};
use crate::parser::ast::{
    BorrowKind, Expr, FunctionDef, Item, Literal, Module, Pattern, Stmt, Type,
};

/// `Copy` leaves are scalars and views; every other type (buffer, struct,
/// enum, tensor, `Result`, `Option`, an unresolved type parameter) moves
/// by default. Mirrors the data model's `Copy` marker without pulling in
/// `hir::types` — this pass stays decoupled from the checker's type
/// representation the same way it already is for everything else.
fn type_is_copy(ty: &Type) -> bool {
    matches!(ty, Type::Int | Type::Bool | Type::Str | Type::View { .. })
}

fn literal_int(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Literal(Literal::Int(n), _) => Some(*n),
        _ => None,
    }
}

fn single_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Path(segments, _) if segments.len() == 1 => Some(segments[0].as_str()),
        _ => None,
    }
}

pub struct BorrowChecker {
    pub diagnostics: Vec<Diagnostic>,
    /// Lines appended to the module's `unsafe.log` when a release inside
    /// an `unsafe` block waives a live-borrow conflict.
    pub unsafe_log: Vec<String>,
    moves: MoveTable,
    regions: FxHashMap<String, RegionState>,
    view_owner: FxHashMap<String, (String, Interval, BorrowKind)>,
    /// Whether each declared local's type is `Copy`, so a bare read of a
    /// non-`Copy` local into a new binding or call argument moves it
    /// without needing the explicit `move` keyword.
    local_copy: FxHashMap<String, bool>,
    in_unsafe: bool,
}

impl BorrowChecker {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            unsafe_log: Vec::new(),
            moves: MoveTable::new(),
            regions: FxHashMap::default(),
            view_owner: FxHashMap::default(),
            local_copy: FxHashMap::default(),
            in_unsafe: false,
        }
    }

    pub fn check_module(&mut self, module: &Module) {
        for item in &module.items {
            match item {
                Item::Function(def) => self.check_function(def),
                Item::Impl(block) => {
                    for method in &block.methods {
                        self.check_function(method);
                    }
                }
                _ => {}
            }
        }
    }

    fn check_function(&mut self, def: &FunctionDef) {
        self.moves = MoveTable::new();
        self.regions = FxHashMap::default();
        self.view_owner = FxHashMap::default();
        self.local_copy = FxHashMap::default();
        self.in_unsafe = false;
        for param in &def.params {
            self.moves.declare(&param.name);
            self.local_copy.insert(param.name.clone(), type_is_copy(&param.ty));
        }
        self.check_block(&def.body.stmts);
    }

    /// Best-effort Copy classification for a `let` binding with no
    /// explicit type annotation, read off the shape of its initializer.
    /// An unresolved path (a param or earlier local) inherits whatever
    /// this pass already recorded for it, defaulting to `Copy` for
    /// anything it can't see the declaration of.
    fn infer_copy(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Literal(..) => true,
            Expr::BufferCreate { .. } => false,
            Expr::Borrow { .. } | Expr::BorrowExpr { .. } => true,
            Expr::StructInit { .. } => false,
            Expr::Move { src, .. } | Expr::Copy { src, .. } => self.infer_copy(src),
            Expr::Path(segments, _) if segments.len() == 1 => {
                self.local_copy.get(&segments[0]).copied().unwrap_or(true)
            }
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Path(segments, _)
                    if matches!(segments.last().map(String::as_str), Some("Ok" | "Err" | "Some")) =>
                {
                    false
                }
                Expr::Path(segments, _) if segments.len() == 2 => false,
                _ => true,
            },
            _ => true,
        }
    }

    fn error(&mut self, kind: DiagnosticKind, span: TextRange, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(kind, span, message));
    }

    fn error_with_label(
        &mut self,
        kind: DiagnosticKind,
        span: TextRange,
        message: impl Into<String>,
        label_span: TextRange,
        label: impl Into<String>,
    ) {
        self.diagnostics
            .push(Diagnostic::new(kind, span, message).with_label(label_span, label));
    }

    fn check_block(&mut self, stmts: &[Stmt]) {
        let mut introduced = Vec::new();
        for stmt in stmts {
            self.check_stmt(stmt, &mut introduced);
        }
        for binding in introduced {
            self.release_view(&binding);
        }
    }

    fn release_view(&mut self, binding: &str) {
        if let Some((region, _, _)) = self.view_owner.remove(binding) {
            if let Some(state) = self.regions.get_mut(&region) {
                state.remove(binding);
            }
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, introduced: &mut Vec<String>) {
        match stmt {
            Stmt::Let(let_stmt) => {
                if self.view_owner.contains_key(&let_stmt.name) {
                    self.release_view(&let_stmt.name.clone());
                }
                self.check_expr(&let_stmt.init);
                if let Expr::Path(segments, span) = &let_stmt.init {
                    if segments.len() == 1
                        && !self.local_copy.get(&segments[0]).copied().unwrap_or(true)
                    {
                        self.moves.mark_moved(&segments[0], *span);
                    }
                }
                let copy = let_stmt
                    .ty
                    .as_ref()
                    .map(type_is_copy)
                    .unwrap_or_else(|| self.infer_copy(&let_stmt.init));
                match &let_stmt.init {
                    Expr::BufferCreate { size, .. } => {
                        let mut state = RegionState::new();
                        if let Some(size) = literal_int(size) {
                            state.set_size(size);
                        }
                        self.regions.insert(let_stmt.name.clone(), state);
                    }
                    Expr::Borrow { buffer, start, end, kind, span } => {
                        self.register_view(&let_stmt.name, buffer, start, end, *kind, *span);
                        introduced.push(let_stmt.name.clone());
                    }
                    Expr::BorrowExpr { kind, target, span } => {
                        self.register_whole_region_view(&let_stmt.name, target, *kind, *span);
                        introduced.push(let_stmt.name.clone());
                    }
                    _ => {}
                }
                self.moves.declare(&let_stmt.name);
                self.local_copy.insert(let_stmt.name.clone(), copy);
            }
            Stmt::AddAssign(assign) => {
                self.check_name_read(&assign.target, assign.span);
                self.check_expr(&assign.value);
            }
            Stmt::If(if_stmt) => {
                self.check_expr(&if_stmt.cond);
                let before_moves = self.moves.clone();
                let before_regions = self.regions.clone();

                self.check_block(&if_stmt.then_branch.stmts);
                let mut joined = self.moves.clone();

                for (cond, body) in &if_stmt.elifs {
                    self.moves = before_moves.clone();
                    self.regions = before_regions.clone();
                    self.check_expr(cond);
                    self.check_block(&body.stmts);
                    joined = MoveTable::join(&joined, &self.moves);
                }

                self.moves = before_moves.clone();
                self.regions = before_regions.clone();
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.check_block(&else_branch.stmts);
                    joined = MoveTable::join(&joined, &self.moves);
                } else {
                    joined = MoveTable::join(&joined, &before_moves);
                }

                self.moves = joined;
                self.regions = before_regions;
            }
            Stmt::Repeat(repeat) => {
                self.check_expr(&repeat.count);
                let before = self.moves.clone();
                self.check_block(&repeat.body.stmts);
                self.moves = MoveTable::join(&before, &self.moves);
            }
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.check_expr(value);
                }
            }
            Stmt::Print(print) => self.check_expr(&print.value),
            Stmt::Release(release) => {
                let live = self
                    .regions
                    .get(&release.target)
                    .map(|r| !r.is_empty())
                    .unwrap_or(false);
                if live {
                    if self.in_unsafe {
                        self.unsafe_log.push(format!(
                            "release {} waived ReleaseWithLiveBorrow",
                            release.target
                        ));
                    } else {
                        self.error(
                            DiagnosticKind::ReleaseWithLiveBorrow,
                            release.span,
                            format!("`{}` released while a borrow is still live", release.target),
                        );
                    }
                }
                self.moves.mark_consumed(&release.target);
            }
            Stmt::Match(match_stmt) => {
                self.check_expr(&match_stmt.scrutinee);
                let before_moves = self.moves.clone();
                let before_regions = self.regions.clone();
                let mut joined: Option<MoveTable> = None;
                for arm in &match_stmt.arms {
                    self.moves = before_moves.clone();
                    self.regions = before_regions.clone();
                    self.declare_pattern(&arm.pattern);
                    if let Some(guard) = &arm.guard {
                        self.check_expr(guard);
                    }
                    self.check_block(&arm.body.stmts);
                    joined = Some(match joined {
                        Some(acc) => MoveTable::join(&acc, &self.moves),
                        None => self.moves.clone(),
                    });
                }
                self.moves = joined.unwrap_or(before_moves);
                self.regions = before_regions;
            }
            Stmt::Unsafe(unsafe_stmt) => {
                let prev = self.in_unsafe;
                self.in_unsafe = true;
                self.check_block(&unsafe_stmt.body.stmts);
                self.in_unsafe = prev;
            }
            Stmt::Expr(expr) => self.check_expr(expr),
            Stmt::SurfaceDirective { inner, .. } => {
                self.check_stmt(inner, introduced);
            }
        }
    }

    fn declare_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Wildcard => {}
            Pattern::Bind(name) => self.moves.declare(name),
            Pattern::Struct { fields, .. } => {
                for (_, sub) in fields {
                    self.declare_pattern(sub);
                }
            }
            Pattern::EnumVariant { fields, .. } => {
                for sub in fields {
                    self.declare_pattern(sub);
                }
            }
        }
    }

    fn register_view(
        &mut self,
        view_name: &str,
        buffer: &Expr,
        start: &Expr,
        end: &Expr,
        kind: BorrowKind,
        span: TextRange,
    ) {
        self.check_expr(buffer);
        self.check_expr(start);
        self.check_expr(end);
        let Some(region_name) = single_name(buffer) else {
            return;
        };
        let (Some(s), Some(e)) = (literal_int(start), literal_int(end)) else {
            return;
        };
        self.register_view_interval(view_name, region_name, Interval { start: s, end: e }, kind, span);
    }

    /// A range-less `borrow r` spans the whole region: its interval is
    /// `[0, size)` where `size` is the buffer's declared size, known only
    /// when it was created with a literal-sized `buffer(N)`. Unresolvable
    /// sizes (a non-literal or unknown region) leave the borrow
    /// unregistered, same as an explicit range with non-literal bounds.
    fn register_whole_region_view(
        &mut self,
        view_name: &str,
        target: &Expr,
        kind: BorrowKind,
        span: TextRange,
    ) {
        self.check_expr(target);
        let Some(region_name) = single_name(target) else {
            return;
        };
        let Some(size) = self.regions.get(region_name).and_then(|r| r.size) else {
            return;
        };
        self.register_view_interval(view_name, region_name, Interval { start: 0, end: size }, kind, span);
    }

    fn register_view_interval(
        &mut self,
        view_name: &str,
        region_name: &str,
        interval: Interval,
        kind: BorrowKind,
        span: TextRange,
    ) {
        let view = OwnedView {
            binding: view_name.to_string(),
            interval,
            kind,
            span,
        };
        let region = self.regions.entry(region_name.to_string()).or_default();
        match region.borrow(view) {
            Ok(()) => {
                self.view_owner.insert(view_name.to_string(), (region_name.to_string(), interval, kind));
            }
            Err(existing) => {
                self.error_with_label(
                    DiagnosticKind::BorrowAliasConflict,
                    span,
                    format!("`{view_name}` conflicts with live borrow `{}`", existing.binding),
                    existing.span,
                    format!("`{}` borrowed here", existing.binding),
                );
            }
        }
    }

    fn check_name_read(&mut self, name: &str, span: TextRange) {
        match self.moves.state(name) {
            Some(MoveState::Moved(origin)) => {
                self.error_with_label(
                    DiagnosticKind::UseAfterMove,
                    span,
                    format!("use of moved value `{name}`"),
                    origin,
                    "moved here",
                );
            }
            Some(MoveState::Consumed) => {
                self.error(DiagnosticKind::UseAfterMove, span, format!("use of consumed value `{name}`"));
            }
            Some(MoveState::Owned) | None => {}
        }
    }

    fn check_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(..) => {}
            Expr::Path(segments, span) => {
                if segments.len() == 1 {
                    self.check_name_read(&segments[0], *span);
                }
            }
            Expr::Call { callee, args, .. } => {
                self.check_expr(callee);
                for arg in args {
                    self.check_expr(arg);
                    if let Expr::Path(segments, span) = arg {
                        if segments.len() == 1
                            && !self.local_copy.get(&segments[0]).copied().unwrap_or(true)
                        {
                            self.moves.mark_moved(&segments[0], *span);
                        }
                    }
                }
            }
            Expr::Binary { lhs, rhs, .. } | Expr::Logical { lhs, rhs, .. } => {
                self.check_expr(lhs);
                self.check_expr(rhs);
            }
            Expr::Move { src, span } => {
                if let Some(name) = single_name(src) {
                    self.check_name_read(name, *span);
                    self.moves.mark_moved(name, *span);
                } else {
                    self.check_expr(src);
                }
            }
            Expr::Copy { src, .. } => self.check_expr(src),
            Expr::BorrowExpr { target, .. } => self.check_expr(target),
            Expr::BufferCreate { size, .. } => self.check_expr(size),
            Expr::Borrow { buffer, start, end, .. } => {
                self.check_expr(buffer);
                self.check_expr(start);
                self.check_expr(end);
            }
            Expr::Try { inner, .. } => self.check_expr(inner),
            Expr::StructInit { fields, .. } => {
                for (_, value) in fields {
                    self.check_expr(value);
                }
            }
        }
    }
}

impl Default for BorrowChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check_source(src: &str) -> BorrowChecker {
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected syntax errors: {errors:?}");
        let mut checker = BorrowChecker::new();
        checker.check_module(&module);
        checker
    }

    #[test]
    fn use_after_move_is_rejected() {
        let checker = check_source(
            "fn f() -> int:\n  let a = buffer(8)\n  let b = move a\n  print str_len_of(a)\n  return 0\n",
        );
        assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UseAfterMove));
    }

    #[test]
    fn disjoint_borrows_are_accepted() {
        let checker = check_source(
            "fn f() -> int:\n  let r = buffer(8)\n  let v1 = borrow mut r[0..4]\n  let v2 = borrow r[4..8]\n  return 0\n",
        );
        assert!(checker.diagnostics.is_empty(), "{:?}", checker.diagnostics);
    }

    #[test]
    fn overlapping_mutable_borrows_conflict() {
        let checker = check_source(
            "fn f() -> int:\n  let r = buffer(8)\n  let v1 = borrow mut r[0..8]\n  let v2 = borrow r[0..4]\n  return 0\n",
        );
        assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::BorrowAliasConflict));
    }

    #[test]
    fn release_with_live_borrow_is_rejected_outside_unsafe() {
        let checker = check_source(
            "fn f() -> int:\n  let r = buffer(8)\n  let v = borrow r[0..8]\n  release r\n  return 0\n",
        );
        assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::ReleaseWithLiveBorrow));
    }

    #[test]
    fn bare_whole_region_borrow_is_registered_as_a_live_view() {
        let checker = check_source(
            "fn f() -> int:\n  let r = buffer(8)\n  let v = borrow r\n  release r\n  return 0\n",
        );
        assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::ReleaseWithLiveBorrow));
    }

    #[test]
    fn bare_whole_region_borrow_of_an_unknown_size_region_is_unregistered() {
        let checker = check_source(
            "fn f(n: int) -> int:\n  let r = buffer(n)\n  let v = borrow r\n  release r\n  return 0\n",
        );
        assert!(checker
            .diagnostics
            .iter()
            .all(|d| d.kind != DiagnosticKind::ReleaseWithLiveBorrow));
    }

    #[test]
    fn plain_rebinding_of_a_buffer_moves_it_without_the_move_keyword() {
        let checker = check_source(
            "fn f() -> int:\n  let a = buffer(8)\n  let b = a\n  release a\n  release b\n  return 0\n",
        );
        assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UseAfterMove));
    }

    #[test]
    fn passing_a_buffer_as_a_call_argument_moves_it_without_the_move_keyword() {
        let checker = check_source(
            "fn f() -> int:\n  let a = buffer(8)\n  print str_len_of(a)\n  release a\n  return 0\n",
        );
        assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UseAfterMove));
    }

    #[test]
    fn rebinding_a_scalar_does_not_move_it() {
        let checker = check_source(
            "fn f() -> int:\n  let a = 1\n  let b = a\n  return a + b\n",
        );
        assert!(checker.diagnostics.iter().all(|d| d.kind != DiagnosticKind::UseAfterMove));
    }

    #[test]
    fn unsafe_waives_release_with_live_borrow() {
        let checker = check_source(
            "fn f() -> int:\n  let r = buffer(8)\n  let v = borrow r[0..8]\n  unsafe \"audited\":\n    release r\n  return 0\n",
        );
        assert!(checker
            .diagnostics
            .iter()
            .all(|d| d.kind != DiagnosticKind::ReleaseWithLiveBorrow));
        assert_eq!(checker.unsafe_log.len(), 1);
    }
}
