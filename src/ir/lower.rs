//! Lowers a borrow-checked [`Module`](crate::parser::ast::Module) to the
//! typed IR in [`crate::ir::value`].
//!
//! This pass has its own small, local notion of expression types (see
//! [`FunctionLowering::expr_type`]) rather than consuming `hir::check`'s
//! diagnostics-oriented checker directly — the two passes stay loosely
//! coupled the same way `borrowck` does not reuse `hir`'s checked types,
//! so either can evolve without threading a shared type map through the
//! whole pipeline.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::hir::check::ast_type_to_hir;
use crate::hir::generics::MonoTable;
use crate::hir::types::{substitute, unify, HirType, Substitution};
use crate::ir::value::{Block, BlockId, Function, Inst, Module as IrModule, Op, Terminator, ValueId};
use crate::parser::ast::{
    self, Expr, FunctionDef, ImplBlock, Item, Literal, MatchArm, Pattern, Stmt,
};

/// Lowers every free function and impl method in `module`.
///
/// Generic functions (non-empty `type_params`) are never lowered eagerly:
/// each call site resolves its own [`Substitution`] from the argument
/// types it sees and asks `mono` for the per-substitution function,
/// lowering the body once per distinct substitution the first time it's
/// requested. This mirrors `hir::check`'s generic dispatch (structural
/// unification against the declared parameter types) without threading
/// the checker's own solved bounds through — the two passes stay loosely
/// coupled the same way the rest of this module already is.
pub fn lower_module(module: &ast::Module) -> IrModule {
    let mut return_types = FxHashMap::default();
    collect_return_types(module, &mut return_types);
    let enum_names: rustc_hash::FxHashSet<String> = module
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Enum(e) => Some(e.name.clone()),
            _ => None,
        })
        .collect();
    let mut generic_defs: FxHashMap<String, &FunctionDef> = FxHashMap::default();
    for item in &module.items {
        if let Item::Function(def) = item {
            if !def.type_params.is_empty() {
                generic_defs.insert(def.name.clone(), def);
            }
        }
    }

    let mono = RefCell::new(MonoTable::new());
    let extra = RefCell::new(Vec::new());

    let mut ir = IrModule::default();
    for item in &module.items {
        match item {
            Item::Function(def) => {
                if def.type_params.is_empty() {
                    ir.functions.push(
                        FunctionLowering::new(&return_types, &enum_names, &generic_defs, &mono, &extra)
                            .lower(def, &Substitution::new(), def.name.clone()),
                    );
                }
            }
            Item::Impl(block) => lower_impl_methods(
                block,
                &return_types,
                &enum_names,
                &generic_defs,
                &mono,
                &extra,
                &mut ir,
            ),
            Item::SurfaceDirective(_) | Item::Import(_) | Item::Struct(_) | Item::Enum(_)
            | Item::Trait(_) => {}
        }
    }
    ir.functions.extend(extra.into_inner());
    ir
}

fn lower_impl_methods<'a>(
    block: &'a ImplBlock,
    return_types: &'a FxHashMap<String, Option<HirType>>,
    enum_names: &'a rustc_hash::FxHashSet<String>,
    generic_defs: &'a FxHashMap<String, &'a FunctionDef>,
    mono: &'a RefCell<MonoTable>,
    extra: &'a RefCell<Vec<Function>>,
    ir: &mut IrModule,
) {
    for method in &block.methods {
        if method.type_params.is_empty() {
            ir.functions.push(
                FunctionLowering::new(return_types, enum_names, generic_defs, mono, extra)
                    .lower(method, &Substitution::new(), method.name.clone()),
            );
        }
    }
}

fn mangled_name(base: &str, id: crate::hir::generics::MonoFunctionId) -> String {
    format!("{base}__mono{}", id.index())
}

fn collect_return_types(module: &ast::Module, out: &mut FxHashMap<String, Option<HirType>>) {
    for item in &module.items {
        match item {
            Item::Function(def) => {
                out.insert(def.name.clone(), def.return_type.as_ref().map(ast_type_to_hir));
            }
            Item::Impl(block) => {
                for method in &block.methods {
                    out.insert(method.name.clone(), method.return_type.as_ref().map(ast_type_to_hir));
                }
            }
            _ => {}
        }
    }
}

struct FunctionLowering<'a> {
    return_types: &'a FxHashMap<String, Option<HirType>>,
    enum_names: &'a rustc_hash::FxHashSet<String>,
    generic_defs: &'a FxHashMap<String, &'a FunctionDef>,
    mono: &'a RefCell<MonoTable>,
    extra: &'a RefCell<Vec<Function>>,
    local_types: FxHashMap<String, HirType>,
    locals: FxHashMap<String, ValueId>,
    /// The size operand each buffer-typed local was created with, so a
    /// range-less `borrow r` can lower to the real `[0, size)` view
    /// instead of a zero-length one.
    buffer_sizes: FxHashMap<String, ValueId>,
    last_buffer_create_size: Option<ValueId>,
    blocks: Vec<Block>,
    current: BlockId,
    next_value: u32,
    next_block: u32,
}

impl<'a> FunctionLowering<'a> {
    fn new(
        return_types: &'a FxHashMap<String, Option<HirType>>,
        enum_names: &'a rustc_hash::FxHashSet<String>,
        generic_defs: &'a FxHashMap<String, &'a FunctionDef>,
        mono: &'a RefCell<MonoTable>,
        extra: &'a RefCell<Vec<Function>>,
    ) -> Self {
        Self {
            return_types,
            enum_names,
            generic_defs,
            mono,
            extra,
            local_types: FxHashMap::default(),
            locals: FxHashMap::default(),
            buffer_sizes: FxHashMap::default(),
            last_buffer_create_size: None,
            blocks: Vec::new(),
            current: BlockId(0),
            next_value: 0,
            next_block: 0,
        }
    }

    /// Lowers `def` under `subst` (empty for a non-generic function),
    /// producing a `Function` named `name` — the declared name for an
    /// ordinary function, or a mangled per-substitution name for a
    /// monomorphized generic instance. Every `Param` in a parameter or
    /// return type is substituted away before it ever reaches the IR.
    fn lower(mut self, def: &FunctionDef, subst: &Substitution, name: String) -> Function {
        let entry = self.new_block();
        self.current = entry;
        for param in &def.params {
            let ty = substitute(&ast_type_to_hir(&param.ty), subst);
            let id = self.fresh_value();
            self.locals.insert(param.name.clone(), id);
            self.local_types.insert(param.name.clone(), ty);
        }
        self.lower_block(&def.body);
        self.ensure_terminated(Terminator::Return(None));

        Function {
            name,
            params: def
                .params
                .iter()
                .map(|p| (p.name.clone(), substitute(&ast_type_to_hir(&p.ty), subst)))
                .collect(),
            return_type: def.return_type.as_ref().map(|t| substitute(&ast_type_to_hir(t), subst)),
            blocks: self.blocks,
            entry,
        }
    }

    fn fresh_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.blocks.push(Block::new(id));
        id
    }

    fn block_mut(&mut self, id: BlockId) -> &mut Block {
        self.blocks
            .iter_mut()
            .find(|b| b.id == id)
            .expect("block id always refers to a block created by this builder")
    }

    fn push(&mut self, op: Op, ty: Option<HirType>) -> ValueId {
        let id = self.fresh_value();
        let current = self.current;
        self.block_mut(current).insts.push(Inst { id, ty, op });
        id
    }

    /// Sets the current block's terminator, unless it was already given
    /// one (e.g. by a nested `return`) — later statements in a block
    /// that already returned are unreachable and simply dropped.
    fn ensure_terminated(&mut self, term: Terminator) {
        let current = self.current;
        let block = self.block_mut(current);
        if block.terminator == Terminator::Unreachable {
            block.terminator = term;
        }
    }

    fn is_terminated(&mut self) -> bool {
        let current = self.current;
        self.block_mut(current).terminator != Terminator::Unreachable
    }

    fn lower_block(&mut self, body: &ast::Block) {
        for stmt in &body.stmts {
            if self.is_terminated() {
                break;
            }
            self.lower_stmt(stmt);
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(let_stmt) => {
                self.last_buffer_create_size = None;
                let value = self.lower_expr(&let_stmt.init);
                let ty = let_stmt
                    .ty
                    .as_ref()
                    .map(ast_type_to_hir)
                    .or_else(|| self.expr_type(&let_stmt.init));
                self.locals.insert(let_stmt.name.clone(), value);
                if let Some(ty) = ty {
                    self.local_types.insert(let_stmt.name.clone(), ty);
                }
                if let Some(size) = self.last_buffer_create_size.take() {
                    self.buffer_sizes.insert(let_stmt.name.clone(), size);
                }
            }
            Stmt::AddAssign(assign) => {
                let current = self
                    .locals
                    .get(&assign.target)
                    .copied()
                    .unwrap_or_else(|| self.push(Op::ConstInt(0), Some(HirType::Int)));
                let rhs = self.lower_expr(&assign.value);
                let ty = self.local_types.get(&assign.target).cloned();
                let sum = self.push(
                    Op::BinOp {
                        op: ast::BinOp::Add,
                        lhs: current,
                        rhs,
                    },
                    ty,
                );
                self.locals.insert(assign.target.clone(), sum);
            }
            Stmt::If(if_stmt) => self.lower_if(if_stmt),
            Stmt::Repeat(repeat) => self.lower_repeat(repeat),
            Stmt::Return(ret) => {
                let value = ret.value.as_ref().map(|e| self.lower_expr(e));
                self.ensure_terminated(Terminator::Return(value));
            }
            Stmt::Print(print) => {
                let value = self.lower_expr(&print.value);
                self.push(
                    Op::Call {
                        callee: "daisy_print".into(),
                        args: vec![value],
                    },
                    None,
                );
            }
            Stmt::Release(release) => {
                let target = self
                    .locals
                    .get(&release.target)
                    .copied()
                    .unwrap_or_else(|| self.push(Op::ConstInt(0), Some(HirType::Int)));
                let ty = self.local_types.get(&release.target).cloned();
                let op = match ty {
                    Some(HirType::View) => Op::ViewRelease { view: target },
                    _ => Op::BufferRelease { buffer: target },
                };
                self.push(op, None);
            }
            Stmt::Match(match_stmt) => self.lower_match(match_stmt),
            Stmt::Unsafe(unsafe_stmt) => self.lower_block(&unsafe_stmt.body),
            Stmt::Expr(expr) => {
                self.lower_expr(expr);
            }
            Stmt::SurfaceDirective { inner, .. } => self.lower_stmt(inner),
        }
    }

    fn lower_if(&mut self, if_stmt: &ast::IfStmt) {
        let join = self.new_block();
        self.lower_branch_chain(
            std::iter::once((&if_stmt.cond, &if_stmt.then_branch))
                .chain(if_stmt.elifs.iter().map(|(c, b)| (c, b)))
                .collect::<Vec<_>>()
                .into_iter(),
            if_stmt.else_branch.as_ref(),
            join,
        );
    }

    fn lower_branch_chain<'b>(
        &mut self,
        mut arms: std::vec::IntoIter<(&'b Expr, &'b ast::Block)>,
        else_branch: Option<&'b ast::Block>,
        join: BlockId,
    ) {
        match arms.next() {
            Some((cond, body)) => {
                let cond_value = self.lower_expr(cond);
                let then_block = self.new_block();
                let else_block = self.new_block();
                self.ensure_terminated(Terminator::Branch {
                    cond: cond_value,
                    then_block,
                    else_block,
                });

                self.current = then_block;
                self.lower_block(body);
                self.ensure_terminated(Terminator::Jump(join));

                self.current = else_block;
                self.lower_branch_chain(arms, else_branch, join);
            }
            None => {
                if let Some(body) = else_branch {
                    self.lower_block(body);
                }
                self.ensure_terminated(Terminator::Jump(join));
            }
        }
        self.current = join;
    }

    /// `repeat N:` with a statically non-positive literal bound lowers to
    /// nothing — zero iterations, enforced without touching control flow.
    /// Otherwise a counting loop: a header block tests `i < N`, a body
    /// block runs the loop body and increments, and a latch edge feeds
    /// the updated counter back into the header's phi.
    fn lower_repeat(&mut self, repeat: &ast::RepeatStmt) {
        if let Expr::Literal(Literal::Int(n), _) = &repeat.count {
            if *n <= 0 {
                return;
            }
        }

        let entry = self.current;
        let count = self.lower_expr(&repeat.count);

        let header = self.new_block();
        let body = self.new_block();
        let exit = self.new_block();
        self.ensure_terminated(Terminator::Jump(header));

        self.current = header;
        let zero = self.push(Op::ConstInt(0), Some(HirType::Int));
        let counter = self.push(
            Op::Phi {
                incoming: vec![(entry, zero)],
            },
            Some(HirType::Int),
        );
        let cond = self.push(
            Op::BinOp {
                op: ast::BinOp::Lt,
                lhs: counter,
                rhs: count,
            },
            Some(HirType::Bool),
        );
        self.ensure_terminated(Terminator::Branch {
            cond,
            then_block: body,
            else_block: exit,
        });

        self.current = body;
        self.lower_block(&repeat.body);
        let one = self.push(Op::ConstInt(1), Some(HirType::Int));
        let next_counter = self.push(
            Op::BinOp {
                op: ast::BinOp::Add,
                lhs: counter,
                rhs: one,
            },
            Some(HirType::Int),
        );
        let latch = self.current;
        self.ensure_terminated(Terminator::Jump(header));
        self.add_phi_incoming(header, counter, latch, next_counter);

        self.current = exit;
    }

    fn add_phi_incoming(&mut self, block: BlockId, phi: ValueId, from: BlockId, value: ValueId) {
        let block = self.block_mut(block);
        for inst in &mut block.insts {
            if inst.id == phi {
                if let Op::Phi { incoming } = &mut inst.op {
                    incoming.push((from, value));
                }
                return;
            }
        }
    }

    fn lower_match(&mut self, match_stmt: &ast::MatchStmt) {
        let scrutinee = self.lower_expr(&match_stmt.scrutinee);
        let join = self.new_block();
        self.lower_match_arms(&match_stmt.arms, scrutinee, join);
    }

    fn lower_match_arms(&mut self, arms: &[MatchArm], scrutinee: ValueId, join: BlockId) {
        match arms.split_first() {
            Some((arm, rest)) => {
                self.bind_pattern(&arm.pattern, scrutinee);
                let arm_block = self.new_block();
                let next_block = self.new_block();
                match &arm.guard {
                    Some(guard) => {
                        self.current = arm_block;
                        let cond = self.lower_expr(guard);
                        let guard_body = self.new_block();
                        self.ensure_terminated(Terminator::Branch {
                            cond,
                            then_block: guard_body,
                            else_block: next_block,
                        });
                        self.current = guard_body;
                        self.lower_block(&arm.body);
                        self.ensure_terminated(Terminator::Jump(join));
                    }
                    None => {
                        self.current = arm_block;
                        self.lower_block(&arm.body);
                        self.ensure_terminated(Terminator::Jump(join));
                    }
                }
                self.current = next_block;
                self.lower_match_arms(rest, scrutinee, join);
            }
            None => {
                self.ensure_terminated(Terminator::Jump(join));
                self.current = join;
            }
        }
    }

    fn bind_pattern(&mut self, pattern: &Pattern, value: ValueId) {
        match pattern {
            Pattern::Wildcard => {}
            Pattern::Bind(name) => {
                self.locals.insert(name.clone(), value);
            }
            Pattern::Struct { fields, .. } => {
                for (_, inner) in fields {
                    self.bind_pattern(inner, value);
                }
            }
            Pattern::EnumVariant { fields, .. } => {
                for inner in fields {
                    self.bind_pattern(inner, value);
                }
            }
        }
    }

    fn lower_expr(&mut self, expr: &Expr) -> ValueId {
        match expr {
            Expr::Literal(Literal::Int(n), _) => self.push(Op::ConstInt(*n), Some(HirType::Int)),
            Expr::Literal(Literal::Bool(b), _) => self.push(Op::ConstBool(*b), Some(HirType::Bool)),
            Expr::Literal(Literal::Str(s), _) => {
                self.push(Op::ConstStr(s.clone()), Some(HirType::Str))
            }
            Expr::Path(segments, _) => {
                let name = segments.join(".");
                if segments.len() == 1 && segments[0] == "None" && !self.locals.contains_key(&name)
                {
                    return self.push(Op::OptionNone, None);
                }
                match self.locals.get(&name) {
                    Some(id) => *id,
                    None => self.push(Op::Use(ValueId(0)), None),
                }
            }
            Expr::Call { callee, args, .. } => self.lower_call(callee, args),
            Expr::Binary { op, lhs, rhs, .. } => {
                let lhs_ty = self.expr_type(lhs);
                let l = self.lower_expr(lhs);
                let r = self.lower_expr(rhs);
                let ty = match op {
                    ast::BinOp::Eq
                    | ast::BinOp::NotEq
                    | ast::BinOp::Lt
                    | ast::BinOp::LtEq
                    | ast::BinOp::Gt
                    | ast::BinOp::GtEq => Some(HirType::Bool),
                    _ => lhs_ty,
                };
                self.push(Op::BinOp { op: *op, lhs: l, rhs: r }, ty)
            }
            Expr::Logical { op, lhs, rhs, .. } => self.lower_logical(*op, lhs, rhs),
            Expr::Move { src, .. } | Expr::Copy { src, .. } => self.lower_expr(src),
            Expr::BorrowExpr { kind, target, .. } => {
                let buffer = self.lower_expr(target);
                let start = self.push(Op::ConstInt(0), Some(HirType::Int));
                let end = match target.as_ref() {
                    Expr::Path(segments, _) if segments.len() == 1 => {
                        self.buffer_sizes.get(&segments[0]).copied()
                    }
                    _ => None,
                }
                .unwrap_or(start);
                self.push(
                    Op::ViewBorrow {
                        buffer,
                        start,
                        end,
                        kind: *kind,
                    },
                    Some(HirType::View),
                )
            }
            Expr::BufferCreate { size, .. } => {
                let size = self.lower_expr(size);
                self.last_buffer_create_size = Some(size);
                self.push(Op::BufferCreate { size }, Some(HirType::Buffer))
            }
            Expr::Borrow {
                buffer,
                start,
                end,
                kind,
                ..
            } => {
                let buffer = self.lower_expr(buffer);
                let start = self.lower_expr(start);
                let end = self.lower_expr(end);
                self.push(
                    Op::ViewBorrow {
                        buffer,
                        start,
                        end,
                        kind: *kind,
                    },
                    Some(HirType::View),
                )
            }
            Expr::Try { inner, .. } => self.lower_try(inner),
            Expr::StructInit { name, fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|(n, e)| (n.clone(), self.lower_expr(e)))
                    .collect();
                self.push(
                    Op::StructInit {
                        name: name.clone(),
                        fields,
                    },
                    Some(HirType::Struct {
                        name: name.clone(),
                        args: Vec::new(),
                    }),
                )
            }
        }
    }

    fn lower_enum_init(&mut self, name: &str, variant: &str, args: &[Expr]) -> ValueId {
        let args = args.iter().map(|a| self.lower_expr(a)).collect();
        self.push(
            Op::EnumInit {
                name: name.to_string(),
                variant: variant.to_string(),
                args,
            },
            Some(HirType::Enum {
                name: name.to_string(),
                args: Vec::new(),
            }),
        )
    }

    fn lower_call(&mut self, callee: &Expr, args: &[Expr]) -> ValueId {
        if let Expr::Path(segments, _) = callee {
            if segments.len() == 2 && self.enum_names.contains(&segments[0]) {
                return self.lower_enum_init(&segments[0], &segments[1], args);
            }
        }
        let name = match callee {
            Expr::Path(segments, _) => segments.join("."),
            other => {
                let value = self.lower_expr(other);
                return self.push(
                    Op::Call {
                        callee: "daisy_call_indirect".into(),
                        args: vec![value],
                    },
                    None,
                );
            }
        };
        match name.as_str() {
            "Ok" => {
                let value = self.lower_expr(&args[0]);
                self.push(Op::ResultOk { value }, None)
            }
            "Err" => {
                let value = self.lower_expr(&args[0]);
                self.push(Op::ResultErr { value }, None)
            }
            "Some" => {
                let value = self.lower_expr(&args[0]);
                self.push(Op::OptionSome { value }, None)
            }
            "tensor.create" => {
                let rows = self.lower_expr(&args[0]);
                let cols = self.lower_expr(&args[1]);
                self.push(Op::TensorCreate { rows, cols }, Some(HirType::Tensor))
            }
            "tensor.matmul" => {
                let lhs = self.lower_expr(&args[0]);
                let rhs = self.lower_expr(&args[1]);
                self.push(Op::TensorMatmul { lhs, rhs }, Some(HirType::Tensor))
            }
            "channel.send" => {
                let channel = self.lower_expr(&args[0]);
                let value = self.lower_expr(&args[1]);
                self.push(Op::ChannelSend { channel, value }, None)
            }
            "channel.recv" => {
                let channel = self.lower_expr(&args[0]);
                self.push(Op::ChannelRecv { channel }, None)
            }
            _ => {
                if let Some(def) = self.generic_defs.get(&name).copied() {
                    return self.lower_generic_call(def, args);
                }
                let ret_ty = self.return_types.get(&name).cloned().flatten();
                let arg_values = args.iter().map(|a| self.lower_expr(a)).collect();
                self.push(
                    Op::Call {
                        callee: name,
                        args: arg_values,
                    },
                    ret_ty,
                )
            }
        }
    }

    /// Resolves the `Substitution` a generic call site needs by unifying
    /// each declared parameter type against the argument's locally
    /// inferred type, then asks `mono` for that instantiation's mangled
    /// function — lowering the body once, the first time it's requested,
    /// via a fresh `FunctionLowering` sharing this one's tables.
    fn lower_generic_call(&mut self, def: &FunctionDef, args: &[Expr]) -> ValueId {
        let mut subst = Substitution::new();
        for (param, arg) in def.params.iter().zip(args) {
            let declared = ast_type_to_hir(&param.ty);
            if let Some(actual) = self.expr_type(arg) {
                unify(&declared, &actual, &mut subst);
            }
        }

        let (id, is_new) = self.mono.borrow_mut().get_or_insert(&def.name, &subst);
        let mangled = mangled_name(&def.name, id);
        if is_new {
            let lowered = FunctionLowering::new(
                self.return_types,
                self.enum_names,
                self.generic_defs,
                self.mono,
                self.extra,
            )
            .lower(def, &subst, mangled.clone());
            self.extra.borrow_mut().push(lowered);
        }

        let arg_values = args.iter().map(|a| self.lower_expr(a)).collect();
        let ret_ty = def.return_type.as_ref().map(|t| substitute(&ast_type_to_hir(t), &subst));
        self.push(
            Op::Call {
                callee: mangled,
                args: arg_values,
            },
            ret_ty,
        )
    }

    /// Short-circuit evaluation: `a and b` only evaluates `b` if `a` is
    /// true, `a or b` only if `a` is false. Lowered as a branch and a
    /// phi rather than a plain `BinOp` so the emitter can skip `b`.
    fn lower_logical(&mut self, op: ast::LogicalOp, lhs: &Expr, rhs: &Expr) -> ValueId {
        let lhs_value = self.lower_expr(lhs);
        let lhs_block = self.current;
        let rhs_block = self.new_block();
        let join = self.new_block();

        let (then_block, else_block) = match op {
            ast::LogicalOp::And => (rhs_block, join),
            ast::LogicalOp::Or => (join, rhs_block),
        };
        self.ensure_terminated(Terminator::Branch {
            cond: lhs_value,
            then_block,
            else_block,
        });

        self.current = rhs_block;
        let rhs_value = self.lower_expr(rhs);
        let rhs_end = self.current;
        self.ensure_terminated(Terminator::Jump(join));

        self.current = join;
        self.push(
            Op::Phi {
                incoming: vec![(lhs_block, lhs_value), (rhs_end, rhs_value)],
            },
            Some(HirType::Bool),
        )
    }

    /// `try inner` propagates the error/none case as an early return and
    /// yields the unwrapped value otherwise. Which discriminant to test
    /// depends on `inner`'s static type; see [`Self::expr_type`].
    fn lower_try(&mut self, inner: &Expr) -> ValueId {
        let is_option = matches!(self.expr_type(inner), Some(HirType::Option { .. }));
        let value = self.lower_expr(inner);

        let ok_block = self.new_block();
        let err_block = self.new_block();

        if is_option {
            let is_some = self.push(Op::OptionIsSome { value }, Some(HirType::Bool));
            self.ensure_terminated(Terminator::Branch {
                cond: is_some,
                then_block: ok_block,
                else_block: err_block,
            });
            self.current = err_block;
            let none = self.push(Op::OptionNone, None);
            self.ensure_terminated(Terminator::Return(Some(none)));

            self.current = ok_block;
            self.push(Op::OptionUnwrap { value }, None)
        } else {
            let is_ok = self.push(Op::ResultIsOk { value }, Some(HirType::Bool));
            self.ensure_terminated(Terminator::Branch {
                cond: is_ok,
                then_block: ok_block,
                else_block: err_block,
            });
            self.current = err_block;
            let err = self.push(Op::ResultErr { value }, None);
            self.ensure_terminated(Terminator::Return(Some(err)));

            self.current = ok_block;
            self.push(Op::ResultUnwrap { value }, None)
        }
    }

    /// A best-effort, locally-scoped type synthesis used only to decide
    /// `try`'s discriminant and to seed `AddAssign`/binary op result
    /// types. Unlike `hir::check::Checker::synthesize` this never
    /// produces diagnostics — an unknown shape just falls through to
    /// `None`, and `try` defaults to the `Result` path (see
    /// `lower_try`).
    fn expr_type(&self, expr: &Expr) -> Option<HirType> {
        match expr {
            Expr::Literal(Literal::Int(_), _) => Some(HirType::Int),
            Expr::Literal(Literal::Bool(_), _) => Some(HirType::Bool),
            Expr::Literal(Literal::Str(_), _) => Some(HirType::Str),
            Expr::Path(segments, _) => self.local_types.get(&segments.join(".")).cloned(),
            Expr::Move { src, .. } | Expr::Copy { src, .. } => self.expr_type(src),
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Path(segments, _) if segments.len() == 1 && segments[0] == "Ok" => {
                    Some(HirType::Result { ok: Box::new(HirType::Int), err: Box::new(HirType::Int) })
                }
                Expr::Path(segments, _) if segments.len() == 1 && segments[0] == "Err" => {
                    Some(HirType::Result { ok: Box::new(HirType::Int), err: Box::new(HirType::Int) })
                }
                Expr::Path(segments, _) if segments.len() == 1 && segments[0] == "Some" => {
                    Some(HirType::Option { inner: Box::new(HirType::Int) })
                }
                Expr::Path(segments, _) => {
                    self.return_types.get(&segments.join(".")).cloned().flatten()
                }
                _ => None,
            },
            Expr::BufferCreate { .. } => Some(HirType::Buffer),
            Expr::Borrow { .. } | Expr::BorrowExpr { .. } => Some(HirType::View),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lower_source(src: &str) -> IrModule {
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        lower_module(&module)
    }

    #[test]
    fn ok_call_lowers_to_result_ok() {
        let ir = lower_source("fn f() -> Result<int, str>:\n    return Ok(1)\n");
        let f = &ir.functions[0];
        let entry = f.block(f.entry);
        assert!(entry.insts.iter().any(|i| matches!(i.op, Op::ResultOk { .. })));
    }

    #[test]
    fn bare_none_lowers_to_option_none() {
        let ir = lower_source("fn f() -> Option<int>:\n    return None\n");
        let f = &ir.functions[0];
        let entry = f.block(f.entry);
        assert!(entry.insts.iter().any(|i| matches!(i.op, Op::OptionNone)));
    }

    #[test]
    fn struct_literal_lowers_to_struct_init() {
        let ir = lower_source(
            "struct Point:\n    x: int\n    y: int\nfn origin() -> Point:\n    return Point { x: 0, y: 0 }\n",
        );
        let f = &ir.functions[0];
        let entry = f.block(f.entry);
        assert!(entry.insts.iter().any(|i| matches!(&i.op, Op::StructInit { name, .. } if name == "Point")));
    }

    #[test]
    fn enum_variant_call_lowers_to_enum_init() {
        let ir = lower_source(
            "enum Shape:\n    Circle(int)\n    Square(int)\nfn unit() -> Shape:\n    return Shape::Circle(1)\n",
        );
        let f = &ir.functions[0];
        let entry = f.block(f.entry);
        assert!(entry.insts.iter().any(
            |i| matches!(&i.op, Op::EnumInit { name, variant, .. } if name == "Shape" && variant == "Circle")
        ));
    }

    #[test]
    fn lowers_a_function_with_a_return() {
        let ir = lower_source("fn answer() -> int:\n    return 42\n");
        assert_eq!(ir.functions.len(), 1);
        let f = &ir.functions[0];
        assert_eq!(f.name, "answer");
        let entry = f.block(f.entry);
        assert!(matches!(entry.terminator, Terminator::Return(Some(_))));
    }

    #[test]
    fn zero_count_repeat_lowers_to_nothing() {
        let ir = lower_source("fn f():\n    repeat 0:\n        print 1\n");
        let f = &ir.functions[0];
        assert_eq!(f.blocks.len(), 1);
    }

    #[test]
    fn positive_count_repeat_builds_a_loop() {
        let ir = lower_source("fn f():\n    repeat 3:\n        print 1\n");
        let f = &ir.functions[0];
        assert!(f.blocks.len() > 1);
        let has_phi = f
            .blocks
            .iter()
            .flat_map(|b| &b.insts)
            .any(|i| matches!(i.op, Op::Phi { .. }));
        assert!(has_phi);
    }

    #[test]
    fn if_without_else_joins_both_paths() {
        let ir = lower_source("fn f():\n    if true:\n        print 1\n");
        let f = &ir.functions[0];
        assert!(f.blocks.len() >= 3);
    }

    #[test]
    fn generic_call_sites_expand_to_distinct_monomorphized_functions() {
        let ir = lower_source(
            "fn show<T>(value: T) -> int:\n    return 0\nfn main() -> int:\n    let a = show(1)\n    let b = show(true)\n    return a + b\n",
        );
        let mono_fns: Vec<_> = ir.functions.iter().filter(|f| f.name.starts_with("show__mono")).collect();
        assert_eq!(mono_fns.len(), 2, "expected one monomorphized `show` per distinct call-site type: {:?}", ir.functions.iter().map(|f| &f.name).collect::<Vec<_>>());
        assert!(mono_fns.iter().all(|f| f.params.iter().all(|(_, ty)| !matches!(ty, HirType::Param(_)))));
        assert!(ir.functions.iter().all(|f| f.name != "show"), "the undeclared generic template itself should never be emitted");
    }

    #[test]
    fn repeated_generic_call_with_the_same_type_reuses_one_function() {
        let ir = lower_source(
            "fn show<T>(value: T) -> int:\n    return 0\nfn main() -> int:\n    let a = show(1)\n    let b = show(2)\n    return a + b\n",
        );
        let mono_fns: Vec<_> = ir.functions.iter().filter(|f| f.name.starts_with("show__mono")).collect();
        assert_eq!(mono_fns.len(), 1);
    }
}
