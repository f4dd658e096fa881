//! The unified AST both surfaces construct.
//!
//! Tagged variants, immutable after parsing. Neither surface owns its own
//! tree shape — see [`crate::parser::surface`] for the dispatch that
//! feeds this one constructor set from either grammar.

use crate::base::TextRange;

pub type Span = TextRange;

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Import(Import),
    Function(FunctionDef),
    Struct(StructDef),
    Enum(EnumDef),
    Trait(TraitDef),
    Impl(ImplBlock),
    /// A line pinned to one surface by an explicit directive; carried in
    /// the tree only as a marker so round-tripping can reproduce it, per
    /// the Surface Equivalence invariant's "modulo SurfaceDirective"
    /// clause.
    SurfaceDirective(SurfaceDirective),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    English,
    Korean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDirective {
    pub surface: Surface,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: Vec<String>,
    pub alias: Option<String>,
    pub is_use: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub is_public: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub is_public: bool,
    pub type_params: Vec<TypeParam>,
    pub fields: Vec<FieldDef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub name: String,
    pub fields: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub is_public: bool,
    pub type_params: Vec<TypeParam>,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitDef {
    pub name: String,
    pub methods: Vec<FunctionDef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplBlock {
    pub trait_name: Option<String>,
    pub for_type: Type,
    pub methods: Vec<FunctionDef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    AddAssign(AddAssignStmt),
    If(IfStmt),
    Repeat(RepeatStmt),
    Return(ReturnStmt),
    Print(PrintStmt),
    Release(ReleaseStmt),
    Match(MatchStmt),
    Unsafe(UnsafeStmt),
    Expr(Expr),
    /// A statement whose surface was pinned by an explicit `영어:`/`한국어:`
    /// directive rather than inferred from its shape. Kept as a distinct
    /// node so two ASTs can be compared modulo directive placement without
    /// losing the directive's own span for diagnostics.
    SurfaceDirective {
        surface: Surface,
        inner: Box<Stmt>,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: String,
    pub ty: Option<Type>,
    pub init: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddAssignStmt {
    pub target: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Block,
    pub elifs: Vec<(Expr, Block)>,
    pub else_branch: Option<Block>,
    pub span: Span,
}

/// `Repeat{count_expr|loop_var,body}`. An implicit loop-variable bound is
/// rejected at parse time (`AmbiguousRepeatBound`, see DESIGN.md); this
/// variant therefore always carries an explicit `count` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStmt {
    pub count: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseStmt {
    pub target: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStmt {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsafeStmt {
    pub reason: String,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Wildcard,
    Bind(String),
    Struct {
        name: String,
        fields: Vec<(String, Pattern)>,
    },
    EnumVariant {
        name: String,
        variant: String,
        fields: Vec<Pattern>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowKind {
    Immut,
    Mut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),
    Path(Vec<String>, Span),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Move {
        src: Box<Expr>,
        span: Span,
    },
    Copy {
        src: Box<Expr>,
        span: Span,
    },
    BorrowExpr {
        kind: BorrowKind,
        target: Box<Expr>,
        span: Span,
    },
    BufferCreate {
        size: Box<Expr>,
        span: Span,
    },
    Borrow {
        buffer: Box<Expr>,
        start: Box<Expr>,
        end: Box<Expr>,
        kind: BorrowKind,
        span: Span,
    },
    Try {
        inner: Box<Expr>,
        span: Span,
    },
    StructInit {
        name: String,
        fields: Vec<(String, Expr)>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, s)
            | Expr::Path(_, s)
            | Expr::Call { span: s, .. }
            | Expr::Binary { span: s, .. }
            | Expr::Logical { span: s, .. }
            | Expr::Move { span: s, .. }
            | Expr::Copy { span: s, .. }
            | Expr::BorrowExpr { span: s, .. }
            | Expr::BufferCreate { span: s, .. }
            | Expr::Borrow { span: s, .. }
            | Expr::Try { span: s, .. }
            | Expr::StructInit { span: s, .. } => *s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Bool,
    Str,
    Buffer,
    View { lifetime: Option<String> },
    Tensor,
    Struct { name: String, args: Vec<Type> },
    Enum { name: String, args: Vec<Type> },
    Result { ok: Box<Type>, err: Box<Type> },
    Option { inner: Box<Type> },
    Param(String),
}
