//! Emits one C11 translation unit plus a public header per DAISY module.
//! Runtime services are only ever invoked by the fixed names in
//! [`crate::emit::runtime_symbols`] — this emitter never inlines runtime
//! logic, matching the contract in the original design.

use std::fmt::Write as _;

use crate::emit::config::EmitConfig;
use crate::hir::types::HirType;
use crate::ir::value::{BlockId, Function, Module as IrModule, Op, Terminator, ValueId};
use crate::parser::ast::BinOp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedModule {
    pub header: String,
    pub source: String,
}

/// C type for a DAISY surface type, per the argument-lowering table:
/// `int`/`bool` to a 64-bit integer, `string` to a runtime-owned byte
/// pointer, `buffer`/`view`/`tensor` to opaque-by-value structs.
fn c_type(ty: &HirType) -> String {
    match ty {
        HirType::Int | HirType::Bool => "int64_t".to_string(),
        HirType::Str => "const char*".to_string(),
        HirType::Buffer => "DaisyBuffer".to_string(),
        HirType::View => "DaisyView".to_string(),
        HirType::Tensor => "DaisyTensor".to_string(),
        HirType::Struct { name, .. } | HirType::Enum { name, .. } => format!("Daisy_{name}"),
        HirType::Result { .. } => "DaisyResult".to_string(),
        HirType::Option { .. } => "DaisyOption".to_string(),
        HirType::Param(_) => "void*".to_string(),
    }
}

fn c_return_type(ty: &Option<HirType>) -> String {
    ty.as_ref().map(c_type).unwrap_or_else(|| "void".to_string())
}

fn value_name(id: ValueId) -> String {
    format!("v{}", id.0)
}

fn block_label(id: BlockId) -> String {
    format!("block{}", id.0)
}

fn bin_op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Rem => "%",
        BinOp::Eq => "==",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::LtEq => "<=",
        BinOp::Gt => ">",
        BinOp::GtEq => ">=",
    }
}

fn escape_c_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub struct CEmitter {
    config: EmitConfig,
}

impl CEmitter {
    pub fn new(config: EmitConfig) -> Self {
        Self { config }
    }

    pub fn emit_module(&self, name: &str, module: &IrModule) -> EmittedModule {
        let guard = name.to_uppercase().replace(['.', '-'], "_");
        let mut header = String::new();
        let mut source = String::new();

        let _ = writeln!(header, "#ifndef DAISY_{guard}_H");
        let _ = writeln!(header, "#define DAISY_{guard}_H");
        let _ = writeln!(header, "#include \"daisy_runtime.h\"");
        let _ = writeln!(header);

        let _ = writeln!(source, "#include \"{name}.h\"");
        let _ = writeln!(source);

        for function in &module.functions {
            let signature = self.signature(function);
            let _ = writeln!(header, "{signature};");
            let _ = writeln!(source, "{signature} {{");
            self.emit_function_body(&mut source, function);
            let _ = writeln!(source, "}}");
            let _ = writeln!(source);
        }

        let _ = writeln!(header, "#endif");

        EmittedModule { header, source }
    }

    fn signature(&self, function: &Function) -> String {
        let params: Vec<String> = function
            .params
            .iter()
            .map(|(name, ty)| format!("{} {name}", c_type(ty)))
            .collect();
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        format!(
            "{} {}({params})",
            c_return_type(&function.return_type),
            function.name
        )
    }

    fn emit_function_body(&self, out: &mut String, function: &Function) {
        for (name, _) in &function.params {
            let _ = writeln!(out, "    int64_t {name}_arg = {name};");
        }
        self.declare_phis(out, function);

        let _ = writeln!(out, "    goto {};", block_label(function.entry));
        for block in &function.blocks {
            let _ = writeln!(out, "{}:", block_label(block.id));
            for inst in &block.insts {
                self.emit_inst(out, &inst.id, &inst.ty, &inst.op);
            }
            self.emit_phi_assignments(out, function, block.id);
            self.emit_terminator(out, &block.terminator);
        }
    }

    /// Every value a [`Op::Phi`] ever resolves to is declared once at
    /// function entry; predecessor blocks assign into it right before
    /// jumping, since plain C `goto` has no SSA join construct.
    fn declare_phis(&self, out: &mut String, function: &Function) {
        for block in &function.blocks {
            for inst in &block.insts {
                if let Op::Phi { .. } = &inst.op {
                    let ty = inst.ty.as_ref().map(c_type).unwrap_or_else(|| "int64_t".to_string());
                    let _ = writeln!(out, "    {ty} {} = 0;", value_name(inst.id));
                }
            }
        }
    }

    fn emit_phi_assignments(&self, out: &mut String, function: &Function, from: BlockId) {
        for block in &function.blocks {
            for inst in &block.insts {
                if let Op::Phi { incoming } = &inst.op {
                    for (pred, value) in incoming {
                        if *pred == from {
                            let _ = writeln!(
                                out,
                                "    {} = {};",
                                value_name(inst.id),
                                value_name(*value)
                            );
                        }
                    }
                }
            }
        }
    }

    fn guard(&self, out: &mut String, tag: &str) {
        if self.config.runtime_checks {
            let _ = writeln!(out, "    daisy_rt_check(\"{tag}\");");
        }
    }

    fn emit_inst(&self, out: &mut String, id: &ValueId, ty: &Option<HirType>, op: &Op) {
        let v = value_name(*id);
        let decl = ty.as_ref().map(c_type);
        match op {
            Op::ConstInt(n) => {
                let _ = writeln!(out, "    int64_t {v} = {n};");
            }
            Op::ConstBool(b) => {
                let _ = writeln!(out, "    int64_t {v} = {};", if *b { 1 } else { 0 });
            }
            Op::ConstStr(s) => {
                let _ = writeln!(out, "    const char* {v} = \"{}\";", escape_c_string(s));
            }
            Op::Use(src) => {
                let ty = decl.unwrap_or_else(|| "int64_t".to_string());
                let _ = writeln!(out, "    {ty} {v} = {};", value_name(*src));
            }
            Op::BinOp { op, lhs, rhs } => {
                let ty = decl.unwrap_or_else(|| "int64_t".to_string());
                let _ = writeln!(
                    out,
                    "    {ty} {v} = {} {} {};",
                    value_name(*lhs),
                    bin_op_symbol(*op),
                    value_name(*rhs)
                );
            }
            Op::Call { callee, args } => {
                let args = args.iter().map(|a| value_name(*a)).collect::<Vec<_>>().join(", ");
                match decl {
                    Some(ty) => {
                        let _ = writeln!(out, "    {ty} {v} = {callee}({args});");
                    }
                    None => {
                        let _ = writeln!(out, "    {callee}({args});");
                    }
                }
            }
            Op::BufferCreate { size } => {
                self.guard(out, "buffer.create");
                let _ = writeln!(out, "    DaisyBuffer {v} = daisy_buffer_create({});", value_name(*size));
            }
            Op::BufferRelease { buffer } => {
                let _ = writeln!(out, "    daisy_buffer_release({});", value_name(*buffer));
            }
            Op::ViewBorrow { buffer, start, end, kind } => {
                self.guard(out, "view.borrow");
                let mutable = if *kind == crate::parser::ast::BorrowKind::Mut { 1 } else { 0 };
                let _ = writeln!(
                    out,
                    "    DaisyView {v} = daisy_view_borrow({}, {}, {}, {mutable});",
                    value_name(*buffer),
                    value_name(*start),
                    value_name(*end)
                );
            }
            Op::ViewRelease { view } => {
                let _ = writeln!(out, "    daisy_view_release({});", value_name(*view));
            }
            Op::TensorCreate { rows, cols } => {
                let _ = writeln!(
                    out,
                    "    DaisyTensor {v} = daisy_tensor_create({}, {});",
                    value_name(*rows),
                    value_name(*cols)
                );
            }
            Op::TensorMatmul { lhs, rhs } => {
                let _ = writeln!(
                    out,
                    "    DaisyTensor {v} = daisy_tensor_matmul({}, {});",
                    value_name(*lhs),
                    value_name(*rhs)
                );
            }
            Op::ChannelSend { channel, value } => {
                let _ = writeln!(
                    out,
                    "    daisy_channel_send({}, {});",
                    value_name(*channel),
                    value_name(*value)
                );
            }
            Op::ChannelRecv { channel } => {
                let ty = decl.unwrap_or_else(|| "int64_t".to_string());
                let _ = writeln!(out, "    {ty} {v} = daisy_channel_recv({});", value_name(*channel));
            }
            Op::ResultOk { value } => {
                let _ = writeln!(out, "    DaisyResult {v} = daisy_result_ok({});", value_name(*value));
            }
            Op::ResultErr { value } => {
                let _ = writeln!(out, "    DaisyResult {v} = daisy_result_err({});", value_name(*value));
            }
            Op::ResultIsOk { value } => {
                let _ = writeln!(out, "    int64_t {v} = daisy_result_is_ok({});", value_name(*value));
            }
            Op::ResultUnwrap { value } => {
                let ty = decl.unwrap_or_else(|| "int64_t".to_string());
                let _ = writeln!(out, "    {ty} {v} = daisy_result_unwrap({});", value_name(*value));
            }
            Op::OptionSome { value } => {
                let _ = writeln!(out, "    DaisyOption {v} = daisy_option_some({});", value_name(*value));
            }
            Op::OptionNone => {
                let _ = writeln!(out, "    DaisyOption {v} = daisy_option_none();");
            }
            Op::OptionIsSome { value } => {
                let _ = writeln!(out, "    int64_t {v} = daisy_option_is_some({});", value_name(*value));
            }
            Op::OptionUnwrap { value } => {
                let ty = decl.unwrap_or_else(|| "int64_t".to_string());
                let _ = writeln!(out, "    {ty} {v} = daisy_option_unwrap({});", value_name(*value));
            }
            Op::StructInit { name, fields } => {
                let args = fields
                    .iter()
                    .map(|(_, val)| value_name(*val))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(out, "    Daisy_{name} {v} = Daisy_{name}_new({args});");
            }
            Op::EnumInit { name, variant, args } => {
                let args = args.iter().map(|a| value_name(*a)).collect::<Vec<_>>().join(", ");
                let _ = writeln!(out, "    Daisy_{name} {v} = Daisy_{name}_{variant}({args});");
            }
            Op::Phi { .. } => {
                // Declared at function entry and assigned by predecessors;
                // nothing to emit at the join point itself.
            }
        }
    }

    fn emit_terminator(&self, out: &mut String, terminator: &Terminator) {
        match terminator {
            Terminator::Jump(target) => {
                let _ = writeln!(out, "    goto {};", block_label(*target));
            }
            Terminator::Branch { cond, then_block, else_block } => {
                let _ = writeln!(
                    out,
                    "    if ({}) goto {}; else goto {};",
                    value_name(*cond),
                    block_label(*then_block),
                    block_label(*else_block)
                );
            }
            Terminator::Return(Some(value)) => {
                let _ = writeln!(out, "    return {};", value_name(*value));
            }
            Terminator::Return(None) => {
                let _ = writeln!(out, "    return;");
            }
            Terminator::Unreachable => {
                let _ = writeln!(out, "    daisy_panic(\"unreachable\");");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::lower::lower_module;
    use crate::parser::parse;

    fn emit_source(src: &str, config: EmitConfig) -> EmittedModule {
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let ir = lower_module(&module);
        CEmitter::new(config).emit_module("demo", &ir)
    }

    #[test]
    fn emits_a_header_guard_and_signature() {
        let out = emit_source("fn answer() -> int:\n    return 42\n", EmitConfig::default());
        assert!(out.header.contains("DAISY_DEMO_H"));
        assert!(out.header.contains("int64_t answer(void);"));
        assert!(out.source.contains("return v"));
    }

    #[test]
    fn runtime_checks_insert_a_guard_before_buffer_create() {
        let src = "fn f():\n    let b: buffer = buffer(8)\n    release b\n";
        let out = emit_source(src, EmitConfig::new(true, false));
        assert!(out.source.contains("daisy_rt_check(\"buffer.create\")"));
    }

    #[test]
    fn without_runtime_checks_no_guard_is_emitted() {
        let src = "fn f():\n    let b: buffer = buffer(8)\n    release b\n";
        let out = emit_source(src, EmitConfig::default());
        assert!(!out.source.contains("daisy_rt_check"));
    }
}
