//! Renders an AST back to canonical English-surface source text.
//!
//! Reparsing the output of [`pretty_print`] must yield an AST equal to the
//! one that produced it: `parse(pretty(parse(s))) == parse(s)`.

use std::fmt::Write;

use crate::parser::ast::*;

pub fn pretty_print(module: &Module) -> String {
    let mut out = String::new();
    for item in &module.items {
        write_item(&mut out, item, 0);
        out.push('\n');
    }
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_item(out: &mut String, item: &Item, level: usize) {
    match item {
        Item::Import(i) => {
            indent(out, level);
            let kw = if i.is_use { "use" } else { "import" };
            let _ = write!(out, "{kw} {}", i.path.join("::"));
            if let Some(alias) = &i.alias {
                let _ = write!(out, " as {alias}");
            }
            out.push('\n');
        }
        Item::Function(f) => write_function(out, f, level),
        Item::Struct(s) => {
            indent(out, level);
            let _ = writeln!(out, "struct {}{}:", s.name, type_params_str(&s.type_params));
            for field in &s.fields {
                indent(out, level + 1);
                let _ = writeln!(out, "{}: {}", field.name, type_str(&field.ty));
            }
        }
        Item::Enum(e) => {
            indent(out, level);
            let _ = writeln!(out, "enum {}{}:", e.name, type_params_str(&e.type_params));
            for variant in &e.variants {
                indent(out, level + 1);
                if variant.fields.is_empty() {
                    let _ = writeln!(out, "{}", variant.name);
                } else {
                    let fields: Vec<_> = variant.fields.iter().map(type_str).collect();
                    let _ = writeln!(out, "{}({})", variant.name, fields.join(", "));
                }
            }
        }
        Item::Trait(t) => {
            indent(out, level);
            let _ = writeln!(out, "trait {}:", t.name);
            for m in &t.methods {
                write_function(out, m, level + 1);
            }
        }
        Item::Impl(i) => {
            indent(out, level);
            match &i.trait_name {
                Some(tr) => {
                    let _ = writeln!(out, "impl {} for {}:", tr, type_str(&i.for_type));
                }
                None => {
                    let _ = writeln!(out, "impl {}:", type_str(&i.for_type));
                }
            }
            for m in &i.methods {
                write_function(out, m, level + 1);
            }
        }
        Item::SurfaceDirective(d) => {
            indent(out, level);
            let tag = match d.surface {
                Surface::English => "영어:",
                Surface::Korean => "한국어:",
            };
            let _ = writeln!(out, "{tag}");
        }
    }
}

fn type_params_str(params: &[TypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let parts: Vec<_> = params
        .iter()
        .map(|p| {
            if p.bounds.is_empty() {
                p.name.clone()
            } else {
                format!("{}: {}", p.name, p.bounds.join(" + "))
            }
        })
        .collect();
    format!("<{}>", parts.join(", "))
}

fn write_function(out: &mut String, f: &FunctionDef, level: usize) {
    indent(out, level);
    if f.is_public {
        out.push_str("pub ");
    }
    let params: Vec<_> = f
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, type_str(&p.ty)))
        .collect();
    let _ = write!(
        out,
        "fn {}{}({})",
        f.name,
        type_params_str(&f.type_params),
        params.join(", ")
    );
    if let Some(ret) = &f.return_type {
        let _ = write!(out, " -> {}", type_str(ret));
    }
    out.push_str(":\n");
    write_block(out, &f.body, level + 1);
}

fn write_block(out: &mut String, block: &Block, level: usize) {
    for stmt in &block.stmts {
        write_stmt(out, stmt, level);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    match stmt {
        Stmt::Let(s) => {
            indent(out, level);
            let _ = write!(out, "let {}", s.name);
            if let Some(ty) = &s.ty {
                let _ = write!(out, ": {}", type_str(ty));
            }
            let _ = writeln!(out, " = {}", expr_str(&s.init));
        }
        Stmt::AddAssign(s) => {
            indent(out, level);
            let _ = writeln!(out, "{} += {}", s.target, expr_str(&s.value));
        }
        Stmt::If(s) => {
            indent(out, level);
            let _ = writeln!(out, "if {}:", expr_str(&s.cond));
            write_block(out, &s.then_branch, level + 1);
            for (cond, body) in &s.elifs {
                indent(out, level);
                let _ = writeln!(out, "elif {}:", expr_str(cond));
                write_block(out, body, level + 1);
            }
            if let Some(e) = &s.else_branch {
                indent(out, level);
                out.push_str("else:\n");
                write_block(out, e, level + 1);
            }
        }
        Stmt::Repeat(s) => {
            indent(out, level);
            let _ = writeln!(out, "repeat {}:", expr_str(&s.count));
            write_block(out, &s.body, level + 1);
        }
        Stmt::Return(s) => {
            indent(out, level);
            match &s.value {
                Some(v) => {
                    let _ = writeln!(out, "return {}", expr_str(v));
                }
                None => out.push_str("return\n"),
            }
        }
        Stmt::Print(s) => {
            indent(out, level);
            let _ = writeln!(out, "print {}", expr_str(&s.value));
        }
        Stmt::Release(s) => {
            indent(out, level);
            let _ = writeln!(out, "release {}", s.target);
        }
        Stmt::Match(s) => {
            indent(out, level);
            let _ = writeln!(out, "match {}:", expr_str(&s.scrutinee));
            for arm in &s.arms {
                indent(out, level + 1);
                let _ = write!(out, "case {}", pattern_str(&arm.pattern));
                if let Some(g) = &arm.guard {
                    let _ = write!(out, " if {}", expr_str(g));
                }
                out.push_str(":\n");
                write_block(out, &arm.body, level + 2);
            }
        }
        Stmt::Unsafe(s) => {
            indent(out, level);
            let _ = writeln!(out, "unsafe \"{}\":", s.reason);
            write_block(out, &s.body, level + 1);
        }
        Stmt::Expr(e) => {
            indent(out, level);
            let _ = writeln!(out, "{}", expr_str(e));
        }
        Stmt::SurfaceDirective { surface, inner, .. } => {
            indent(out, level);
            let tag = match surface {
                Surface::English => "영어: ",
                Surface::Korean => "한국어: ",
            };
            out.push_str(tag);
            let mut rest = String::new();
            write_stmt(&mut rest, inner, 0);
            out.push_str(rest.trim_start());
        }
    }
}

fn pattern_str(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Wildcard => "_".to_string(),
        Pattern::Bind(name) => name.clone(),
        Pattern::Struct { name, fields } => {
            let parts: Vec<_> = fields
                .iter()
                .map(|(n, p)| format!("{n}: {}", pattern_str(p)))
                .collect();
            format!("{name} {{ {} }}", parts.join(", "))
        }
        Pattern::EnumVariant {
            name,
            variant,
            fields,
        } => {
            if fields.is_empty() {
                format!("{name}::{variant}")
            } else {
                let parts: Vec<_> = fields.iter().map(pattern_str).collect();
                format!("{name}::{variant}({})", parts.join(", "))
            }
        }
    }
}

fn type_str(ty: &Type) -> String {
    match ty {
        Type::Int => "int".to_string(),
        Type::Bool => "bool".to_string(),
        Type::Str => "str".to_string(),
        Type::Buffer => "buffer".to_string(),
        Type::View { .. } => "view".to_string(),
        Type::Tensor => "tensor".to_string(),
        Type::Struct { name, .. } | Type::Enum { name, .. } => name.clone(),
        Type::Result { ok, err } => format!("Result<{}, {}>", type_str(ok), type_str(err)),
        Type::Option { inner } => format!("Option<{}>", type_str(inner)),
        Type::Param(name) => name.clone(),
    }
}

fn expr_str(expr: &Expr) -> String {
    match expr {
        Expr::Literal(Literal::Int(v), _) => v.to_string(),
        Expr::Literal(Literal::Str(v), _) => format!("\"{v}\""),
        Expr::Literal(Literal::Bool(v), _) => v.to_string(),
        Expr::Path(segs, _) => segs.join("::"),
        Expr::Call { callee, args, .. } => {
            let parts: Vec<_> = args.iter().map(expr_str).collect();
            format!("{}({})", expr_str(callee), parts.join(", "))
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            format!("{} {} {}", expr_str(lhs), bin_op_str(*op), expr_str(rhs))
        }
        Expr::Logical { op, lhs, rhs, .. } => {
            let op_str = match op {
                LogicalOp::And => "and",
                LogicalOp::Or => "or",
            };
            format!("{} {op_str} {}", expr_str(lhs), expr_str(rhs))
        }
        Expr::Move { src, .. } => format!("move {}", expr_str(src)),
        Expr::Copy { src, .. } => expr_str(src),
        Expr::BorrowExpr { kind, target, .. } => {
            format!("borrow {}{}", borrow_kind_str(*kind), expr_str(target))
        }
        Expr::BufferCreate { size, .. } => format!("buffer({})", expr_str(size)),
        Expr::Borrow {
            buffer,
            start,
            end,
            kind,
            ..
        } => format!(
            "borrow {}{}[{}..{}]",
            borrow_kind_str(*kind),
            expr_str(buffer),
            expr_str(start),
            expr_str(end)
        ),
        Expr::Try { inner, .. } => format!("try {}", expr_str(inner)),
        Expr::StructInit { name, fields, .. } => {
            let parts: Vec<_> = fields
                .iter()
                .map(|(n, e)| format!("{n}: {}", expr_str(e)))
                .collect();
            format!("{name} {{ {} }}", parts.join(", "))
        }
    }
}

fn bin_op_str(op: BinOp) -> &'static str {
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

fn borrow_kind_str(kind: BorrowKind) -> &'static str {
    match kind {
        BorrowKind::Mut => "mut ",
        BorrowKind::Immut => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parser::parse;

    #[test]
    fn round_trips_hello_english() {
        let src = "fn main() -> int:\n  print \"hi\"\n  return 0\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty());
        let printed = pretty_print(&module);
        let (reparsed, errors2) = parse(&printed);
        assert!(errors2.is_empty(), "{errors2:?}");
        assert_eq!(module, reparsed);
    }
}
