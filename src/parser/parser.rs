//! Recursive-descent parser: one token-shape dispatch, one AST constructor
//! set. Blocks are delimited by 2-space indentation, offside-rule style,
//! rather than braces, so block boundaries are computed line-by-line up
//! front instead of being recognized by the grammar itself.

use crate::base::TextSize;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::parser::ast::*;
use crate::parser::errors::SyntaxError;

struct LogicalLine<'a> {
    indent: usize,
    tokens: Vec<Token<'a>>,
    line_start: u32,
}

fn split_lines(source: &str) -> Vec<LogicalLine<'_>> {
    let mut lines = Vec::new();
    let mut offset: u32 = 0;
    for raw in source.split('\n') {
        let leading = raw.len() - raw.trim_start_matches(' ').len();
        let indent = leading / 2;
        let trimmed = raw.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            let content_offset = offset + leading as u32;
            let mut tokens = tokenize(trimmed);
            for t in &mut tokens {
                t.range += TextSize::from(content_offset);
            }
            lines.push(LogicalLine {
                indent,
                tokens,
                line_start: content_offset,
            });
        }
        offset += raw.len() as u32 + 1;
    }
    lines
}

pub struct Parser<'a> {
    lines: Vec<LogicalLine<'a>>,
    pos: usize,
    pub errors: Vec<SyntaxError>,
    /// Names declared by the `<...>` clause of the function/struct/enum
    /// currently being parsed; `parse_type_tokens` consults this so a
    /// bare name matching one parses to `Type::Param` instead of an
    /// ordinary (zero-argument) `Type::Struct`.
    type_params_in_scope: Vec<String>,
}

type PResult<T> = Result<T, SyntaxError>;

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: split_lines(source),
            pos: 0,
            errors: Vec::new(),
            type_params_in_scope: Vec::new(),
        }
    }

    fn peek_line(&self) -> Option<&LogicalLine<'a>> {
        self.lines.get(self.pos)
    }

    fn line_indent(&self) -> usize {
        self.peek_line().map(|l| l.indent).unwrap_or(0)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.lines.len()
    }

    fn span_of(&self, tokens: &[Token<'a>]) -> Span {
        match (tokens.first(), tokens.last()) {
            (Some(f), Some(l)) => f.range.cover(l.range),
            _ => Span::empty(TextSize::from(0)),
        }
    }

    /// Parse a whole module: every top-level item at indent 0.
    pub fn parse_module(&mut self) -> Module {
        let mut items = Vec::new();
        while !self.at_eof() {
            if self.line_indent() != 0 {
                // Stray indented line at top level: record and skip to
                // resynchronize at the next statement boundary.
                let line = &self.lines[self.pos];
                self.errors.push(SyntaxError::new(
                    self.span_of(&line.tokens),
                    "top-level item",
                    "indented line",
                ));
                self.pos += 1;
                continue;
            }
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.errors.push(e);
                    self.pos += 1;
                }
            }
        }
        let span = if items.is_empty() {
            Span::empty(TextSize::from(0))
        } else {
            item_span(items.first().unwrap()).cover(item_span(items.last().unwrap()))
        };
        Module { items, span }
    }

    fn parse_item(&mut self) -> PResult<Item> {
        let line = &self.lines[self.pos];
        let first = line.tokens.first().map(|t| t.kind);
        match first {
            Some(TokenKind::EnglishDirective) | Some(TokenKind::KoreanDirective) => {
                let surface = if first == Some(TokenKind::EnglishDirective) {
                    Surface::English
                } else {
                    Surface::Korean
                };
                let span = self.span_of(&line.tokens);
                self.pos += 1;
                Ok(Item::SurfaceDirective(SurfaceDirective { surface, span }))
            }
            Some(TokenKind::PubKw) | Some(TokenKind::FnKw) => self.parse_function().map(Item::Function),
            Some(TokenKind::FunctionKoKw) => self.parse_function().map(Item::Function),
            Some(TokenKind::StructKw) => self.parse_struct().map(Item::Struct),
            Some(TokenKind::EnumKw) => self.parse_enum().map(Item::Enum),
            Some(TokenKind::TraitKw) => self.parse_trait().map(Item::Trait),
            Some(TokenKind::ImplKw) => self.parse_impl().map(Item::Impl),
            Some(TokenKind::ImportKw) | Some(TokenKind::UseKw) => self.parse_import().map(Item::Import),
            _ => {
                let span = self.span_of(&line.tokens);
                self.pos += 1;
                Err(SyntaxError::new(span, "item", "expression"))
            }
        }
    }

    fn parse_import(&mut self) -> PResult<Import> {
        let line = &self.lines[self.pos];
        let span = self.span_of(&line.tokens);
        let is_use = line.tokens[0].kind == TokenKind::UseKw;
        let mut path = Vec::new();
        let mut alias = None;
        let mut i = 1;
        while i < line.tokens.len() {
            match line.tokens[i].kind {
                TokenKind::Ident | TokenKind::HangulIdent => path.push(line.tokens[i].text.to_string()),
                TokenKind::AsKw => {
                    if let Some(t) = line.tokens.get(i + 1) {
                        alias = Some(t.text.to_string());
                        i += 1;
                    }
                }
                TokenKind::ColonColon | TokenKind::Dot => {}
                _ => {}
            }
            i += 1;
        }
        self.pos += 1;
        Ok(Import {
            path,
            alias,
            is_use,
            span,
        })
    }

    fn parse_type_params(&self, tokens: &[Token<'a>], start: usize) -> (Vec<TypeParam>, usize) {
        let mut params = Vec::new();
        let mut i = start;
        if tokens.get(i).map(|t| t.kind) != Some(TokenKind::Lt) {
            return (params, i);
        }
        i += 1;
        while i < tokens.len() && tokens[i].kind != TokenKind::Gt {
            if matches!(tokens[i].kind, TokenKind::Ident | TokenKind::HangulIdent) {
                let name = tokens[i].text.to_string();
                let mut bounds = Vec::new();
                i += 1;
                if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Colon) {
                    i += 1;
                    loop {
                        if let Some(t) = tokens.get(i) {
                            if matches!(t.kind, TokenKind::Ident | TokenKind::HangulIdent) {
                                bounds.push(t.text.to_string());
                                i += 1;
                            }
                        }
                        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Plus) {
                            i += 1;
                            continue;
                        }
                        break;
                    }
                }
                params.push(TypeParam { name, bounds });
            }
            if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Comma) {
                i += 1;
            }
        }
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Gt) {
            i += 1;
        }
        (params, i)
    }

    /// Parses a type, including a `<...>` generic argument list. `Result`
    /// takes two arguments (ok, err); `Option` takes one; any other name
    /// with arguments is a generic `Struct` (the parser can't yet tell
    /// struct from enum, so both share `Type::Struct` until resolution).
    fn parse_type_tokens(&self, tokens: &[Token<'a>], start: usize) -> (Type, usize) {
        let mut i = start;
        let name = tokens.get(i).map(|t| t.text).unwrap_or("");
        i += 1;

        let mut args = Vec::new();
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Lt) {
            i += 1;
            while tokens.get(i).map(|t| t.kind) != Some(TokenKind::Gt) && i < tokens.len() {
                let (arg, ni) = self.parse_type_tokens(tokens, i);
                args.push(arg);
                i = ni;
                if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Comma) {
                    i += 1;
                }
            }
            if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Gt) {
                i += 1;
            }
        }

        let ty = if self.type_params_in_scope.iter().any(|p| p == name) {
            Type::Param(name.to_string())
        } else {
            match name {
            "int" => Type::Int,
            "bool" => Type::Bool,
            "str" => Type::Str,
            "buffer" => Type::Buffer,
            "view" => Type::View { lifetime: None },
            "tensor" => Type::Tensor,
            "Result" => {
                let mut it = args.into_iter();
                let ok = it.next().unwrap_or(Type::Int);
                let err = it.next().unwrap_or(Type::Str);
                Type::Result {
                    ok: Box::new(ok),
                    err: Box::new(err),
                }
            }
            "Option" => {
                let inner = args.into_iter().next().unwrap_or(Type::Int);
                Type::Option {
                    inner: Box::new(inner),
                }
            }
            other => Type::Struct {
                name: other.to_string(),
                args,
            },
            }
        };
        (ty, i)
    }

    fn parse_function(&mut self) -> PResult<FunctionDef> {
        let line_idx = self.pos;
        let tokens = self.lines[line_idx].tokens.clone();
        let span = self.span_of(&tokens);
        let mut i = 0;
        let mut is_public = false;
        if tokens[i].kind == TokenKind::PubKw {
            is_public = true;
            i += 1;
        }
        let korean = tokens[i].kind == TokenKind::FunctionKoKw;
        if korean {
            self.type_params_in_scope.clear();
            i += 1; // 함수
            let name = tokens
                .get(i)
                .map(|t| t.text.to_string())
                .ok_or_else(|| SyntaxError::new(span, "function name", "end of line"))?;
            i += 1;
            // skip to 정의 ... ':'
            self.pos += 1;
            let body = self.parse_block(self.lines[line_idx].indent + 1);
            return Ok(FunctionDef {
                name,
                is_public,
                type_params: Vec::new(),
                params: Vec::new(),
                return_type: None,
                body,
                span,
            });
        }
        i += 1; // fn
        let name = tokens
            .get(i)
            .map(|t| t.text.to_string())
            .ok_or_else(|| SyntaxError::new(span, "function name", "end of line"))?;
        i += 1;
        let (type_params, ni) = self.parse_type_params(&tokens, i);
        i = ni;
        self.type_params_in_scope = type_params.iter().map(|p| p.name.clone()).collect();
        if tokens.get(i).map(|t| t.kind) != Some(TokenKind::LParen) {
            self.type_params_in_scope.clear();
            return Err(SyntaxError::new(span, "(", "other token"));
        }
        i += 1;
        let mut params = Vec::new();
        while tokens.get(i).map(|t| t.kind) != Some(TokenKind::RParen) && i < tokens.len() {
            if let Some(t) = tokens.get(i) {
                if matches!(t.kind, TokenKind::Ident | TokenKind::HangulIdent) {
                    let pname = t.text.to_string();
                    i += 1;
                    if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Colon) {
                        i += 1;
                        let (ty, ni) = self.parse_type_tokens(&tokens, i);
                        i = ni;
                        params.push(Param { name: pname, ty });
                    }
                }
            }
            if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Comma) {
                i += 1;
            }
        }
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::RParen) {
            i += 1;
        }
        let mut return_type = None;
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Arrow) {
            i += 1;
            let (ty, ni) = self.parse_type_tokens(&tokens, i);
            return_type = Some(ty);
            i = ni;
        }
        let _ = i;
        self.pos += 1;
        let body = self.parse_block(self.lines[line_idx].indent + 1);
        self.type_params_in_scope.clear();
        Ok(FunctionDef {
            name,
            is_public,
            type_params,
            params,
            return_type,
            body,
            span,
        })
    }

    fn parse_struct(&mut self) -> PResult<StructDef> {
        let tokens = self.lines[self.pos].tokens.clone();
        let span = self.span_of(&tokens);
        let indent = self.lines[self.pos].indent;
        let name = tokens
            .get(1)
            .map(|t| t.text.to_string())
            .ok_or_else(|| SyntaxError::new(span, "struct name", "end of line"))?;
        let (type_params, _) = self.parse_type_params(&tokens, 2);
        self.type_params_in_scope = type_params.iter().map(|p| p.name.clone()).collect();
        self.pos += 1;
        let mut fields = Vec::new();
        while !self.at_eof() && self.line_indent() > indent {
            let ftoks = self.lines[self.pos].tokens.clone();
            if let Some(fname) = ftoks.first() {
                if matches!(fname.kind, TokenKind::Ident | TokenKind::HangulIdent) {
                    if ftoks.get(1).map(|t| t.kind) == Some(TokenKind::Colon) {
                        let (ty, _) = self.parse_type_tokens(&ftoks, 2);
                        fields.push(FieldDef {
                            name: fname.text.to_string(),
                            ty,
                        });
                    }
                }
            }
            self.pos += 1;
        }
        self.type_params_in_scope.clear();
        Ok(StructDef {
            name,
            is_public: false,
            type_params,
            fields,
            span,
        })
    }

    fn parse_enum(&mut self) -> PResult<EnumDef> {
        let tokens = self.lines[self.pos].tokens.clone();
        let span = self.span_of(&tokens);
        let indent = self.lines[self.pos].indent;
        let name = tokens
            .get(1)
            .map(|t| t.text.to_string())
            .ok_or_else(|| SyntaxError::new(span, "enum name", "end of line"))?;
        let (type_params, _) = self.parse_type_params(&tokens, 2);
        self.type_params_in_scope = type_params.iter().map(|p| p.name.clone()).collect();
        self.pos += 1;
        let mut variants = Vec::new();
        while !self.at_eof() && self.line_indent() > indent {
            let vtoks = self.lines[self.pos].tokens.clone();
            if let Some(vname) = vtoks.first() {
                if matches!(vname.kind, TokenKind::Ident | TokenKind::HangulIdent) {
                    let mut fields = Vec::new();
                    let mut i = 1;
                    if vtoks.get(i).map(|t| t.kind) == Some(TokenKind::LParen) {
                        i += 1;
                        while vtoks.get(i).map(|t| t.kind) != Some(TokenKind::RParen) && i < vtoks.len() {
                            let (ty, ni) = self.parse_type_tokens(&vtoks, i);
                            fields.push(ty);
                            i = ni;
                            if vtoks.get(i).map(|t| t.kind) == Some(TokenKind::Comma) {
                                i += 1;
                            }
                        }
                    }
                    variants.push(EnumVariant {
                        name: vname.text.to_string(),
                        fields,
                    });
                }
            }
            self.pos += 1;
        }
        self.type_params_in_scope.clear();
        Ok(EnumDef {
            name,
            is_public: false,
            type_params,
            variants,
            span,
        })
    }

    fn parse_trait(&mut self) -> PResult<TraitDef> {
        let tokens = self.lines[self.pos].tokens.clone();
        let span = self.span_of(&tokens);
        let indent = self.lines[self.pos].indent;
        let name = tokens
            .get(1)
            .map(|t| t.text.to_string())
            .ok_or_else(|| SyntaxError::new(span, "trait name", "end of line"))?;
        self.pos += 1;
        let mut methods = Vec::new();
        while !self.at_eof() && self.line_indent() > indent {
            if self.lines[self.pos].tokens.first().map(|t| t.kind) == Some(TokenKind::FnKw) {
                methods.push(self.parse_function()?);
            } else {
                self.pos += 1;
            }
        }
        Ok(TraitDef {
            name,
            methods,
            span,
        })
    }

    fn parse_impl(&mut self) -> PResult<ImplBlock> {
        let tokens = self.lines[self.pos].tokens.clone();
        let span = self.span_of(&tokens);
        let indent = self.lines[self.pos].indent;
        let first_name = tokens
            .get(1)
            .map(|t| t.text.to_string())
            .ok_or_else(|| SyntaxError::new(span, "type name", "end of line"))?;
        let (trait_name, for_type) = if tokens.get(2).map(|t| t.kind) == Some(TokenKind::ForKw) {
            let for_name = tokens
                .get(3)
                .map(|t| t.text.to_string())
                .unwrap_or_default();
            (
                Some(first_name),
                Type::Struct {
                    name: for_name,
                    args: Vec::new(),
                },
            )
        } else {
            (
                None,
                Type::Struct {
                    name: first_name,
                    args: Vec::new(),
                },
            )
        };
        self.pos += 1;
        let mut methods = Vec::new();
        while !self.at_eof() && self.line_indent() > indent {
            if self.lines[self.pos].tokens.first().map(|t| t.kind) == Some(TokenKind::FnKw) {
                methods.push(self.parse_function()?);
            } else {
                self.pos += 1;
            }
        }
        Ok(ImplBlock {
            trait_name,
            for_type,
            methods,
            span,
        })
    }

    /// Parse every statement strictly deeper than `indent - 1`, i.e. at
    /// exactly `indent` (a shallower line ends the block).
    fn parse_block(&mut self, indent: usize) -> Block {
        let mut stmts = Vec::new();
        let start = self.lines.get(self.pos).map(|l| l.line_start).unwrap_or(0);
        while !self.at_eof() && self.line_indent() >= indent {
            match self.parse_stmt(indent) {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.pos += 1;
                }
            }
        }
        let end = stmts
            .last()
            .map(|s| stmt_span(s).end())
            .unwrap_or(TextSize::from(start));
        Block {
            stmts,
            span: Span::new(TextSize::from(start), end),
        }
    }

    fn parse_stmt(&mut self, indent: usize) -> PResult<Stmt> {
        let tokens = self.lines[self.pos].tokens.clone();
        let span = self.span_of(&tokens);

        if let Some(first) = tokens.first() {
            if matches!(
                first.kind,
                TokenKind::EnglishDirective | TokenKind::KoreanDirective
            ) {
                let surface = if first.kind == TokenKind::EnglishDirective {
                    Surface::English
                } else {
                    Surface::Korean
                };
                let rest = &tokens[1..];
                let inner = self.parse_stmt_tokens(rest, span, indent)?;
                self.pos += 1;
                return Ok(Stmt::SurfaceDirective {
                    surface,
                    inner: Box::new(inner),
                    span,
                });
            }
        }

        let stmt = self.parse_stmt_tokens(&tokens, span, indent)?;
        self.pos += 1;
        Ok(stmt)
    }

    fn parse_stmt_tokens(&mut self, tokens: &[Token<'a>], span: Span, indent: usize) -> PResult<Stmt> {
        use TokenKind::*;

        match tokens.first().map(|t| t.kind) {
            Some(LetKw) => self.parse_let(tokens, span),
            Some(ReturnKw) => {
                let value = if tokens.len() > 1 {
                    Some(self.parse_expr_tokens(&tokens[1..])?)
                } else {
                    None
                };
                Ok(Stmt::Return(ReturnStmt { value, span }))
            }
            Some(PrintKw) => {
                let value = self.parse_expr_tokens(&tokens[1..])?;
                Ok(Stmt::Print(PrintStmt { value, span }))
            }
            Some(ReleaseKw) => {
                let target = tokens
                    .get(1)
                    .map(|t| t.text.to_string())
                    .ok_or_else(|| SyntaxError::new(span, "identifier", "end of line"))?;
                Ok(Stmt::Release(ReleaseStmt { target, span }))
            }
            Some(IfKw) => self.parse_if(tokens, span, indent),
            Some(RepeatKw) => self.parse_repeat(tokens, span, indent),
            Some(MatchKw) => self.parse_match(tokens, span, indent),
            Some(UnsafeKw) => self.parse_unsafe(tokens, span, indent),
            Some(Ident) if tokens.get(1).map(|t| t.kind) == Some(Plus)
                && tokens.get(2).map(|t| t.kind) == Some(Eq) =>
            {
                let target = tokens[0].text.to_string();
                let value = self.parse_expr_tokens(&tokens[3..])?;
                Ok(Stmt::AddAssign(AddAssignStmt {
                    target,
                    value,
                    span,
                }))
            }
            // Korean-surface statements, selected by predicate keyword
            // anywhere on the line (see `parser::surface`).
            _ if tokens.iter().any(|t| t.kind == RepeatKoKw)
                && tokens.last().map(|t| t.kind) == Some(Colon) =>
            {
                self.parse_repeat_ko(tokens, span, indent)
            }
            _ if tokens.iter().any(|t| t.kind == SetKoKw) => self.parse_let_ko(tokens, span),
            _ if tokens.iter().any(|t| t.kind == ReturnKoKw) => {
                let value = self.parse_expr_before(tokens, ReturnKoKw)?;
                Ok(Stmt::Return(ReturnStmt {
                    value: Some(value),
                    span,
                }))
            }
            _ if tokens.iter().any(|t| t.kind == PrintKoKw) => {
                let value = self.parse_expr_before(tokens, PrintKoKw)?;
                Ok(Stmt::Print(PrintStmt { value, span }))
            }
            _ if tokens.iter().any(|t| t.kind == ReleaseKoKw) => {
                let target = tokens
                    .first()
                    .map(|t| t.text.to_string())
                    .ok_or_else(|| SyntaxError::new(span, "identifier", "end of line"))?;
                Ok(Stmt::Release(ReleaseStmt { target, span }))
            }
            _ if tokens.iter().any(|t| t.kind == AddAssignKoKw) => {
                let target = tokens
                    .first()
                    .map(|t| t.text.to_string())
                    .ok_or_else(|| SyntaxError::new(span, "identifier", "end of line"))?;
                let value = self.parse_expr_before(tokens, AddAssignKoKw)?;
                Ok(Stmt::AddAssign(AddAssignStmt {
                    target,
                    value,
                    span,
                }))
            }
            _ => {
                let expr = self.parse_expr_tokens(tokens)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_let(&mut self, tokens: &[Token<'a>], span: Span) -> PResult<Stmt> {
        let name = tokens
            .get(1)
            .map(|t| t.text.to_string())
            .ok_or_else(|| SyntaxError::new(span, "identifier", "end of line"))?;
        let mut i = 2;
        let mut ty = None;
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::Colon) {
            i += 1;
            let (t, ni) = self.parse_type_tokens(tokens, i);
            ty = Some(t);
            i = ni;
        }
        if tokens.get(i).map(|t| t.kind) != Some(TokenKind::Eq) {
            return Err(SyntaxError::new(span, "=", "other token"));
        }
        i += 1;
        let init = self.parse_expr_tokens(&tokens[i..])?;
        Ok(Stmt::Let(LetStmt {
            name,
            ty,
            init,
            span,
        }))
    }

    /// `X를 Y로 설정한다` ≡ `let X = Y`.
    fn parse_let_ko(&mut self, tokens: &[Token<'a>], span: Span) -> PResult<Stmt> {
        let name = tokens
            .first()
            .map(|t| t.text.to_string())
            .ok_or_else(|| SyntaxError::new(span, "identifier", "end of line"))?;
        let set_pos = tokens
            .iter()
            .position(|t| t.kind == TokenKind::SetKoKw)
            .ok_or_else(|| SyntaxError::new(span, "설정한다", "end of line"))?;
        // slice between the subject particle and the 로 particle before 설정한다
        let mut end = set_pos;
        while end > 0 && tokens[end - 1].kind == TokenKind::ParticleRo {
            end -= 1;
            break;
        }
        let start = 2.min(end); // skip subject ident + its particle
        let init = self.parse_expr_tokens(&tokens[start..end])?;
        Ok(Stmt::Let(LetStmt {
            name,
            ty: None,
            init,
            span,
        }))
    }

    /// Everything before the given Korean predicate keyword is the
    /// expression, subject particle included — the expression grammar
    /// ignores the trailing particle token naturally since it never
    /// appears in an operator position.
    fn parse_expr_before(&mut self, tokens: &[Token<'a>], stop: TokenKind) -> PResult<Expr> {
        let pos = tokens
            .iter()
            .position(|t| t.kind == stop)
            .unwrap_or(tokens.len());
        self.parse_expr_tokens(&tokens[..pos])
    }

    fn parse_if(&mut self, tokens: &[Token<'a>], span: Span, indent: usize) -> PResult<Stmt> {
        let colon_pos = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Colon)
            .ok_or_else(|| SyntaxError::new(span, ":", "end of line"))?;
        let cond = self.parse_expr_tokens(&tokens[1..colon_pos])?;
        self.pos += 1;
        let then_branch = self.parse_block(indent + 1);
        let mut elifs = Vec::new();
        let mut else_branch = None;
        loop {
            match self.peek_line().map(|l| l.tokens.first().map(|t| t.kind)) {
                Some(Some(TokenKind::ElifKw)) if self.line_indent() == indent => {
                    let etoks = self.lines[self.pos].tokens.clone();
                    let cpos = etoks
                        .iter()
                        .position(|t| t.kind == TokenKind::Colon)
                        .ok_or_else(|| SyntaxError::new(span, ":", "end of line"))?;
                    let econd = self.parse_expr_tokens(&etoks[1..cpos])?;
                    self.pos += 1;
                    let eb = self.parse_block(indent + 1);
                    elifs.push((econd, eb));
                }
                Some(Some(TokenKind::ElseKw)) if self.line_indent() == indent => {
                    self.pos += 1;
                    else_branch = Some(self.parse_block(indent + 1));
                    break;
                }
                _ => break,
            }
        }
        Ok(Stmt::If(IfStmt {
            cond,
            then_branch,
            elifs,
            else_branch,
            span,
        }))
    }

    fn parse_repeat(&mut self, tokens: &[Token<'a>], span: Span, indent: usize) -> PResult<Stmt> {
        let colon_pos = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Colon)
            .ok_or_else(|| SyntaxError::new(span, ":", "end of line"))?;
        let count_tokens = &tokens[1..colon_pos];
        if count_tokens.is_empty() {
            return Err(SyntaxError::new(
                span,
                "explicit repeat bound",
                "implicit loop variable (AmbiguousRepeatBound)",
            ));
        }
        let count = self.parse_expr_tokens(count_tokens)?;
        self.pos += 1;
        let body = self.parse_block(indent + 1);
        Ok(Stmt::Repeat(RepeatStmt { count, body, span }))
    }

    /// `N번 반복한다:` ≡ `repeat N:`.
    fn parse_repeat_ko(&mut self, tokens: &[Token<'a>], span: Span, indent: usize) -> PResult<Stmt> {
        let kw_pos = tokens
            .iter()
            .position(|t| t.kind == TokenKind::RepeatKoKw)
            .ok_or_else(|| SyntaxError::new(span, "반복한다", "end of line"))?;
        if kw_pos == 0 {
            return Err(SyntaxError::new(
                span,
                "explicit repeat bound",
                "implicit loop variable (AmbiguousRepeatBound)",
            ));
        }
        let count = self.parse_expr_tokens(&tokens[..kw_pos])?;
        self.pos += 1;
        let body = self.parse_block(indent + 1);
        Ok(Stmt::Repeat(RepeatStmt { count, body, span }))
    }

    fn parse_match(&mut self, tokens: &[Token<'a>], span: Span, indent: usize) -> PResult<Stmt> {
        let colon_pos = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Colon)
            .ok_or_else(|| SyntaxError::new(span, ":", "end of line"))?;
        let scrutinee = self.parse_expr_tokens(&tokens[1..colon_pos])?;
        self.pos += 1;
        let mut arms = Vec::new();
        while !self.at_eof() && self.line_indent() == indent + 1 {
            let arm_tokens = self.lines[self.pos].tokens.clone();
            if arm_tokens.first().map(|t| t.kind) != Some(TokenKind::CaseKw) {
                break;
            }
            let arm_colon = arm_tokens
                .iter()
                .position(|t| t.kind == TokenKind::Colon)
                .ok_or_else(|| SyntaxError::new(span, ":", "end of line"))?;
            let (pattern, guard) = self.parse_pattern_and_guard(&arm_tokens[1..arm_colon])?;
            self.pos += 1;
            let body = self.parse_block(indent + 2);
            arms.push(MatchArm {
                pattern,
                guard,
                body,
            });
        }
        Ok(Stmt::Match(MatchStmt {
            scrutinee,
            arms,
            span,
        }))
    }

    fn parse_pattern_and_guard(&mut self, tokens: &[Token<'a>]) -> PResult<(Pattern, Option<Expr>)> {
        if tokens.is_empty() {
            return Ok((Pattern::Wildcard, None));
        }
        let if_pos = tokens.iter().position(|t| t.kind == TokenKind::IfKw);
        let (pat_tokens, guard) = if let Some(p) = if_pos {
            let g = self.parse_expr_tokens(&tokens[p + 1..])?;
            (&tokens[..p], Some(g))
        } else {
            (tokens, None)
        };
        let pattern = self.parse_pattern_tokens(pat_tokens);
        Ok((pattern, guard))
    }

    fn parse_pattern_tokens(&self, tokens: &[Token<'a>]) -> Pattern {
        if tokens.is_empty() {
            return Pattern::Wildcard;
        }
        if tokens.len() == 1 && tokens[0].text == "_" {
            return Pattern::Wildcard;
        }
        if tokens.len() == 1 {
            return Pattern::Bind(tokens[0].text.to_string());
        }
        if tokens.len() >= 3 && tokens[1].kind == TokenKind::ColonColon {
            return Pattern::EnumVariant {
                name: tokens[0].text.to_string(),
                variant: tokens[2].text.to_string(),
                fields: Vec::new(),
            };
        }
        Pattern::Bind(tokens[0].text.to_string())
    }

    fn parse_unsafe(&mut self, tokens: &[Token<'a>], span: Span, indent: usize) -> PResult<Stmt> {
        let reason = tokens
            .iter()
            .find(|t| t.kind == TokenKind::String)
            .map(|t| t.text.trim_matches('"').to_string())
            .ok_or_else(|| {
                SyntaxError::new(span, "string justification", "unsafe block without one")
            })?;
        self.pos += 1;
        let body = self.parse_block(indent + 1);
        Ok(Stmt::Unsafe(UnsafeStmt {
            reason,
            body,
            span,
        }))
    }

    // -----------------------------------------------------------------
    // Expressions — precedence climbing shared by both surfaces. Every
    // expression, regardless of which statement-level keyword routed to
    // it, is parsed by this one chain.
    // -----------------------------------------------------------------

    fn parse_expr_tokens(&mut self, tokens: &[Token<'a>]) -> PResult<Expr> {
        let mut sub = ExprParser::new(tokens);
        let expr = sub.parse_or()?;
        self.errors.extend(sub.errors);
        Ok(expr)
    }
}

struct ExprParser<'a, 'b> {
    tokens: &'b [Token<'a>],
    pos: usize,
    errors: Vec<SyntaxError>,
}

impl<'a, 'b> ExprParser<'a, 'b> {
    fn new(tokens: &'b [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let t = self.tokens.get(self.pos).copied();
        self.pos += 1;
        t
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(TokenKind::OrKw) {
            self.bump();
            let rhs = self.parse_and()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Logical {
                op: LogicalOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.peek() == Some(TokenKind::AndKw) {
            self.bump();
            let rhs = self.parse_equality()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Logical {
                op: LogicalOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::EqEq) => BinOp::Eq,
                Some(TokenKind::BangEq) => BinOp::NotEq,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_relational()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Lt) => BinOp::Lt,
                Some(TokenKind::LtEq) => BinOp::LtEq,
                Some(TokenKind::Gt) => BinOp::Gt,
                Some(TokenKind::GtEq) => BinOp::GtEq,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_additive()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::Percent) => BinOp::Rem,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_unary()?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(TokenKind::MoveKw) => {
                let start = self.bump().unwrap();
                let src = self.parse_unary()?;
                let span = start.range.cover(src.span());
                Ok(Expr::Move {
                    src: Box::new(src),
                    span,
                })
            }
            Some(TokenKind::TryKw) => {
                let start = self.bump().unwrap();
                let inner = self.parse_unary()?;
                let span = start.range.cover(inner.span());
                Ok(Expr::Try {
                    inner: Box::new(inner),
                    span,
                })
            }
            Some(TokenKind::BorrowKw) => self.parse_borrow(),
            Some(TokenKind::BufferKw) => self.parse_buffer_create(),
            _ => self.parse_postfix(),
        }
    }

    /// `borrow mut R[A..B]` / `borrow R[A..B]` / `borrow R` (whole-region
    /// immutable borrow, start/end default to the region's bounds at
    /// check time).
    fn parse_borrow(&mut self) -> PResult<Expr> {
        let start_tok = self.bump().unwrap();
        let kind = if self.peek() == Some(TokenKind::MutKw) {
            self.bump();
            BorrowKind::Mut
        } else {
            BorrowKind::Immut
        };
        let buffer = self.parse_postfix()?;
        if self.peek() == Some(TokenKind::LBracket) {
            self.bump();
            let start = self.parse_additive()?;
            if self.peek() == Some(TokenKind::DotDot) {
                self.bump();
            }
            let end = self.parse_additive()?;
            if self.peek() == Some(TokenKind::RBracket) {
                self.bump();
            }
            let span = start_tok.range.cover(end.span());
            Ok(Expr::Borrow {
                buffer: Box::new(buffer),
                start: Box::new(start),
                end: Box::new(end),
                kind,
                span,
            })
        } else {
            let span = start_tok.range.cover(buffer.span());
            Ok(Expr::BorrowExpr {
                kind,
                target: Box::new(buffer),
                span,
            })
        }
    }

    fn parse_buffer_create(&mut self) -> PResult<Expr> {
        let start = self.bump().unwrap();
        if self.peek() == Some(TokenKind::LParen) {
            self.bump();
        }
        let size = self.parse_additive()?;
        let end_span = size.span();
        if self.peek() == Some(TokenKind::RParen) {
            self.bump();
        }
        Ok(Expr::BufferCreate {
            size: Box::new(size),
            span: start.range.cover(end_span),
        })
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(TokenKind::LParen) => {
                    self.bump();
                    let mut args = Vec::new();
                    while self.peek() != Some(TokenKind::RParen) && self.pos < self.tokens.len() {
                        args.push(self.parse_or()?);
                        if self.peek() == Some(TokenKind::Comma) {
                            self.bump();
                        }
                    }
                    let end_span = self.tokens.get(self.pos).map(|t| t.range).unwrap_or(expr.span());
                    if self.peek() == Some(TokenKind::RParen) {
                        self.bump();
                    }
                    let span = expr.span().cover(end_span);
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self
            .bump()
            .ok_or_else(|| SyntaxError::new(Span::empty(TextSize::from(0)), "expression", "end of line"))?;
        match tok.kind {
            TokenKind::Integer => {
                let value: i64 = tok.text.parse().unwrap_or(0);
                Ok(Expr::Literal(Literal::Int(value), tok.range))
            }
            TokenKind::String => {
                let text = tok.text[1..tok.text.len() - 1].to_string();
                Ok(Expr::Literal(Literal::Str(text), tok.range))
            }
            TokenKind::TrueKw => Ok(Expr::Literal(Literal::Bool(true), tok.range)),
            TokenKind::FalseKw => Ok(Expr::Literal(Literal::Bool(false), tok.range)),
            TokenKind::Ident | TokenKind::HangulIdent => {
                let mut path = vec![tok.text.to_string()];
                let mut span = tok.range;
                while self.peek() == Some(TokenKind::ColonColon) {
                    self.bump();
                    if let Some(t) = self.bump() {
                        path.push(t.text.to_string());
                        span = span.cover(t.range);
                    }
                }
                if path.len() == 1 && self.peek() == Some(TokenKind::LBrace) {
                    return self.parse_struct_init(path.remove(0), span);
                }
                Ok(Expr::Path(path, span))
            }
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                if self.peek() == Some(TokenKind::RParen) {
                    self.bump();
                }
                Ok(inner)
            }
            other => Err(SyntaxError::new(
                tok.range,
                "expression",
                format!("{other:?}"),
            )),
        }
    }

    /// `Name { field: expr, ... }`, the `{` already peeked but not consumed.
    fn parse_struct_init(&mut self, name: String, mut span: Span) -> PResult<Expr> {
        self.bump();
        let mut fields = Vec::new();
        while self.peek() != Some(TokenKind::RBrace) && self.pos < self.tokens.len() {
            let field_name = self
                .bump()
                .ok_or_else(|| SyntaxError::new(span, "field name", "end of line"))?
                .text
                .to_string();
            if self.peek() == Some(TokenKind::Colon) {
                self.bump();
            }
            let value = self.parse_or()?;
            fields.push((field_name, value));
            if self.peek() == Some(TokenKind::Comma) {
                self.bump();
            }
        }
        if let Some(end) = self.tokens.get(self.pos) {
            span = span.cover(end.range);
        }
        if self.peek() == Some(TokenKind::RBrace) {
            self.bump();
        }
        Ok(Expr::StructInit { name, fields, span })
    }
}

fn item_span(item: &Item) -> Span {
    match item {
        Item::Import(i) => i.span,
        Item::Function(f) => f.span,
        Item::Struct(s) => s.span,
        Item::Enum(e) => e.span,
        Item::Trait(t) => t.span,
        Item::Impl(i) => i.span,
        Item::SurfaceDirective(d) => d.span,
    }
}

fn stmt_span(stmt: &Stmt) -> Span {
    match stmt {
        Stmt::Let(s) => s.span,
        Stmt::AddAssign(s) => s.span,
        Stmt::If(s) => s.span,
        Stmt::Repeat(s) => s.span,
        Stmt::Return(s) => s.span,
        Stmt::Print(s) => s.span,
        Stmt::Release(s) => s.span,
        Stmt::Match(s) => s.span,
        Stmt::Unsafe(s) => s.span,
        Stmt::Expr(e) => e.span(),
        Stmt::SurfaceDirective { span, .. } => *span,
    }
}

/// Parse a complete source file into a [`Module`], collecting recoverable
/// syntax errors rather than stopping at the first one: on an error the
/// parser advances to the next statement boundary and keeps going.
pub fn parse(source: &str) -> (Module, Vec<SyntaxError>) {
    let mut parser = Parser::new(source);
    let module = parser.parse_module();
    (module, parser.errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hello_english() {
        let src = "fn main() -> int:\n  print \"hi\"\n  return 0\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(module.items.len(), 1);
        match &module.items[0] {
            Item::Function(f) => {
                assert_eq!(f.name, "main");
                assert_eq!(f.body.stmts.len(), 2);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parses_let_and_add_assign() {
        let src = "fn f() -> int:\n  let x = 1\n  x += 2\n  return x\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        if let Item::Function(f) = &module.items[0] {
            assert!(matches!(f.body.stmts[0], Stmt::Let(_)));
            assert!(matches!(f.body.stmts[1], Stmt::AddAssign(_)));
        }
    }

    #[test]
    fn parses_result_and_option_return_types() {
        let src = "fn f() -> Result<int, str>:\n  return Ok(1)\nfn g() -> Option<int>:\n  return Some(1)\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let Item::Function(f) = &module.items[0] else { panic!("expected function") };
        assert_eq!(
            f.return_type,
            Some(Type::Result { ok: Box::new(Type::Int), err: Box::new(Type::Str) })
        );
        let Item::Function(g) = &module.items[1] else { panic!("expected function") };
        assert_eq!(g.return_type, Some(Type::Option { inner: Box::new(Type::Int) }));
    }

    #[test]
    fn parses_struct_literal_fields() {
        let src = "struct Point:\n  x: int\n  y: int\nfn origin() -> Point:\n  return Point { x: 0, y: 0 }\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let Item::Function(f) = &module.items[1] else { panic!("expected function") };
        let Stmt::Return(ret) = &f.body.stmts[0] else { panic!("expected return") };
        let Some(Expr::StructInit { name, fields, .. }) = &ret.value else {
            panic!("expected struct init, got {:?}", ret.value)
        };
        assert_eq!(name, "Point");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "x");
    }

    #[test]
    fn parses_enum_variant_call_as_a_path_call() {
        let src = "enum Shape:\n  Circle(int)\n  Square(int)\nfn unit() -> Shape:\n  return Shape::Circle(1)\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let Item::Function(f) = &module.items[1] else { panic!("expected function") };
        let Stmt::Return(ret) = &f.body.stmts[0] else { panic!("expected return") };
        let Some(Expr::Call { callee, args, .. }) = &ret.value else {
            panic!("expected call, got {:?}", ret.value)
        };
        let Expr::Path(segments, _) = callee.as_ref() else { panic!("expected path callee") };
        assert_eq!(segments, &vec!["Shape".to_string(), "Circle".to_string()]);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn parses_if_elif_else() {
        let src =
            "fn f() -> int:\n  if x > 0:\n    return 1\n  elif x < 0:\n    return -1\n  else:\n    return 0\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        if let Item::Function(f) = &module.items[0] {
            if let Stmt::If(s) = &f.body.stmts[0] {
                assert_eq!(s.elifs.len(), 1);
                assert!(s.else_branch.is_some());
            } else {
                panic!("expected if statement");
            }
        }
    }

    #[test]
    fn rejects_implicit_repeat_bound() {
        let src = "fn f() -> int:\n  repeat:\n    print 1\n  return 0\n";
        let (_, errors) = parse(src);
        assert!(!errors.is_empty());
    }

    #[test]
    fn parses_unsafe_with_justification() {
        let src = "fn f() -> int:\n  unsafe \"audited\":\n    release r\n  return 0\n";
        let (module, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        if let Item::Function(f) = &module.items[0] {
            assert!(matches!(f.body.stmts[0], Stmt::Unsafe(_)));
        }
    }
}
