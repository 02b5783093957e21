use minic_lex::{Token, TokenKind};
use minic_util::Span;

use crate::cst::*;
use crate::error::ParseError;

type PResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over Mini's token stream, implementing the
/// grammar of spec.md §6 directly:
/// `Program = struct-decl* global-decl* function-decl+`.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(mut self) -> PResult<Program> {
        let mut structs = Vec::new();
        while self.check(&TokenKind::Struct) {
            structs.push(self.parse_struct()?);
        }

        let mut globals = Vec::new();
        while self.check(&TokenKind::Int) || self.check(&TokenKind::Bool) || self.at_struct_type() {
            globals.push(self.parse_global()?);
        }

        let mut functions = Vec::new();
        while self.check(&TokenKind::Fun) {
            functions.push(self.parse_function()?);
        }
        self.expect(&TokenKind::Eof)?;

        Ok(Program { structs, globals, functions })
    }

    // --- top-level declarations ---

    fn parse_struct(&mut self) -> PResult<StructDecl> {
        let start = self.current().span;
        self.bump(); // `struct`
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let field_span_start = self.current().span;
            let ty = self.parse_type()?;
            let field_name = self.expect_ident()?;
            self.expect(&TokenKind::Semi)?;
            fields.push(FieldDecl {
                ty,
                name: field_name,
                span: field_span_start.merge(self.prev_span()),
            });
        }
        self.expect(&TokenKind::RBrace)?;
        self.expect(&TokenKind::Semi)?;

        Ok(StructDecl { name, fields, span: start.merge(self.prev_span()) })
    }

    fn parse_global(&mut self) -> PResult<GlobalDecl> {
        let start = self.current().span;
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Semi)?;
        Ok(GlobalDecl { ty, name, span: start.merge(self.prev_span()) })
    }

    fn parse_function(&mut self) -> PResult<FunctionDecl> {
        let start = self.current().span;
        self.bump(); // `fun`
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let pspan = self.current().span;
                let ty = self.parse_type()?;
                let pname = self.expect_ident()?;
                params.push(Param { ty, name: pname, span: pspan.merge(self.prev_span()) });
                if self.check(&TokenKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        let return_type = self.parse_return_type()?;
        self.expect(&TokenKind::LBrace)?;

        let mut locals = Vec::new();
        while self.at_local_decl() {
            let lspan = self.current().span;
            let ty = self.parse_type()?;
            let lname = self.expect_ident()?;
            self.expect(&TokenKind::Semi)?;
            locals.push(LocalDecl { ty, name: lname, span: lspan.merge(self.prev_span()) });
        }

        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            body.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(FunctionDecl {
            name,
            params,
            return_type,
            locals,
            body,
            span: start.merge(self.prev_span()),
        })
    }

    /// A local declaration starts like a global one (`type ident ;`), and is
    /// distinguished from the first statement only by lookahead: statements
    /// never start with a bare type keyword followed directly by an
    /// identifier and `;`/`,`-free continuation, since assignment targets
    /// are always `ident` or `ident.field`, not a type keyword.
    fn at_local_decl(&self) -> bool {
        (self.check(&TokenKind::Int) || self.check(&TokenKind::Bool) || self.at_struct_type())
            && matches!(self.peek(1).kind, TokenKind::Ident(_))
    }

    fn at_struct_type(&self) -> bool {
        self.check(&TokenKind::Struct) && matches!(self.peek(1).kind, TokenKind::Ident(_))
    }

    fn parse_type(&mut self) -> PResult<TypeName> {
        if self.eat(&TokenKind::Int) {
            Ok(TypeName::Int)
        } else if self.eat(&TokenKind::Bool) {
            Ok(TypeName::Bool)
        } else if self.eat(&TokenKind::Struct) {
            let name = self.expect_ident()?;
            Ok(TypeName::Struct(name))
        } else {
            Err(self.expected("a type"))
        }
    }

    /// Return type additionally allows a bare identifier meaning `void`
    /// is absent only in the degenerate zero-keyword case; Mini has no
    /// `void` keyword in source (spec.md §6), so an omitted return type
    /// position can't occur here — callers always see `int`, `bool`,
    /// `struct Name`, or the literal word `void`.
    fn parse_return_type(&mut self) -> PResult<TypeName> {
        if self.check(&TokenKind::Int) || self.check(&TokenKind::Bool) || self.check(&TokenKind::Struct) {
            self.parse_type()
        } else if let TokenKind::Ident(sym) = self.current().kind {
            if sym.eq_str("void") {
                self.bump();
                Ok(TypeName::Void)
            } else {
                Err(self.expected("a return type"))
            }
        } else {
            Err(self.expected("a return type"))
        }
    }

    // --- statements ---

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        match self.current().kind {
            TokenKind::If => self.parse_if(start),
            TokenKind::While => self.parse_while(start),
            TokenKind::Return => self.parse_return(start),
            TokenKind::Print => self.parse_print(start, false),
            TokenKind::Println => self.parse_print(start, true),
            TokenKind::Read => self.parse_read_stmt(start),
            TokenKind::Delete => self.parse_delete(start),
            _ => self.parse_assign_or_invoke(start),
        }
    }

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_if(&mut self, start: Span) -> PResult<Stmt> {
        self.bump();
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If { cond, then_block, else_block, span: start.merge(self.prev_span()) })
    }

    fn parse_while(&mut self, start: Span) -> PResult<Stmt> {
        self.bump();
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, span: start.merge(self.prev_span()) })
    }

    fn parse_return(&mut self, start: Span) -> PResult<Stmt> {
        self.bump();
        let expr = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt::Return { expr, span: start.merge(self.prev_span()) })
    }

    fn parse_print(&mut self, start: Span, newline: bool) -> PResult<Stmt> {
        self.bump();
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt::Print { expr, newline, span: start.merge(self.prev_span()) })
    }

    /// `read` as a statement is `read lvalue ;`; as an expression (spec.md
    /// §9 open question (a)) it's the bare keyword appearing anywhere an
    /// expression is expected. `parse_stmt` only reaches here when `read`
    /// starts a statement, so no lookahead is needed to disambiguate.
    fn parse_read_stmt(&mut self, start: Span) -> PResult<Stmt> {
        self.bump();
        let lvalue = self.parse_lvalue()?;
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt::Read { lvalue, span: start.merge(self.prev_span()) })
    }

    fn parse_delete(&mut self, start: Span) -> PResult<Stmt> {
        self.bump();
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt::Delete { expr, span: start.merge(self.prev_span()) })
    }

    fn parse_assign_or_invoke(&mut self, start: Span) -> PResult<Stmt> {
        let expr = self.parse_expr()?;
        if self.eat(&TokenKind::Eq) {
            let lvalue = Self::expr_to_lvalue(expr)?;
            let rhs = self.parse_expr()?;
            self.expect(&TokenKind::Semi)?;
            Ok(Stmt::Assign { lvalue, expr: rhs, span: start.merge(self.prev_span()) })
        } else {
            self.expect(&TokenKind::Semi)?;
            Ok(Stmt::Invoke { expr, span: start.merge(self.prev_span()) })
        }
    }

    fn expr_to_lvalue(expr: Expr) -> PResult<Lvalue> {
        match expr {
            Expr::Var(name, span) => Ok(Lvalue::Var(name, span)),
            Expr::FieldRead(base, field, span) => {
                Ok(Lvalue::Field(Box::new(Self::expr_to_lvalue(*base)?), field, span))
            }
            other => Err(ParseError::UnexpectedToken {
                found: "an expression that is not assignable".to_string(),
                line: other.span().line,
                column: other.span().column,
                span: other.span(),
            }),
        }
    }

    fn parse_lvalue(&mut self) -> PResult<Lvalue> {
        let span = self.current().span;
        let name = self.expect_ident()?;
        let mut lv = Lvalue::Var(name, span);
        while self.eat(&TokenKind::Dot) {
            let field = self.expect_ident()?;
            lv = Lvalue::Field(Box::new(lv), field, span.merge(self.prev_span()));
        }
        Ok(lv)
    }

    // --- expressions (precedence climbing) ---

    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.parse_and()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.parse_equality()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.current().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_relational()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_additive()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_unary()?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        if self.eat(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(Expr::Unary(UnOp::Neg, Box::new(operand), span));
        }
        if self.eat(&TokenKind::Bang) {
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(Expr::Unary(UnOp::Not, Box::new(operand), span));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let field = self.expect_ident()?;
                let span = expr.span().merge(self.prev_span());
                expr = Expr::FieldRead(Box::new(expr), field, span);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        match self.current().kind {
            TokenKind::IntLiteral(n) => {
                self.bump();
                Ok(Expr::IntLit(n, start))
            }
            TokenKind::True => {
                self.bump();
                Ok(Expr::BoolLit(true, start))
            }
            TokenKind::False => {
                self.bump();
                Ok(Expr::BoolLit(false, start))
            }
            TokenKind::Null => {
                self.bump();
                Ok(Expr::Null(start))
            }
            TokenKind::Read => {
                self.bump();
                Ok(Expr::ReadInt(start))
            }
            TokenKind::New => {
                self.bump();
                let name = self.expect_ident()?;
                Ok(Expr::New(name, start.merge(self.prev_span())))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(inner), start.merge(self.prev_span())))
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.eat(&TokenKind::LParen) {
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if self.eat(&TokenKind::Comma) {
                                continue;
                            }
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                    Ok(Expr::Call(name, args, start.merge(self.prev_span())))
                } else {
                    Ok(Expr::Var(name, start))
                }
            }
            _ => Err(self.expected("an expression")),
        }
    }

    // --- token stream plumbing ---

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.bump())
        } else {
            Err(self.expected(&kind.describe()))
        }
    }

    fn expect_ident(&mut self) -> PResult<minic_util::Symbol> {
        if let TokenKind::Ident(sym) = self.current().kind {
            self.bump();
            Ok(sym)
        } else {
            Err(self.expected("an identifier"))
        }
    }

    fn expected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        if tok.kind == TokenKind::Eof {
            ParseError::UnexpectedEof { span: tok.span }
        } else {
            ParseError::Expected {
                expected: expected.to_string(),
                found: tok.kind.describe(),
                line: tok.span.line,
                column: tok.span.column,
                span: tok.span,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_lex::Lexer;

    fn parse(src: &str) -> PResult<Program> {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_minimal_main() {
        let program = parse("fun main() int { return 0; }").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].body.len(), 1);
    }

    #[test]
    fn parses_struct_with_self_reference() {
        let program = parse("struct N { int v; struct N next; }; fun main() int { return 0; }").unwrap();
        assert_eq!(program.structs.len(), 1);
        assert_eq!(program.structs[0].fields.len(), 2);
    }

    #[test]
    fn parses_global_and_local_declarations() {
        let program = parse(
            "int g; fun main() int { int x; x = g; return x; }",
        )
        .unwrap();
        assert_eq!(program.globals.len(), 1);
        assert_eq!(program.functions[0].locals.len(), 1);
    }

    #[test]
    fn arithmetic_precedence_matches_c_like_rules() {
        let program = parse("fun main() int { int x; x = 3 + 4 * 2; return x; }").unwrap();
        match &program.functions[0].body[0] {
            Stmt::Assign { expr, .. } => match expr {
                Expr::Binary(BinOp::Add, _, rhs, _) => {
                    assert!(matches!(**rhs, Expr::Binary(BinOp::Mul, _, _, _)));
                }
                other => panic!("expected addition at top, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn parses_call_as_statement_and_expression() {
        let program = parse(
            "fun f() int { return 1; } fun main() int { f(); return f(); }",
        )
        .unwrap();
        assert!(matches!(program.functions[1].body[0], Stmt::Invoke { .. }));
        assert!(matches!(
            program.functions[1].body[1],
            Stmt::Return { expr: Some(Expr::Call(..)), .. }
        ));
    }

    #[test]
    fn parses_if_else_and_while() {
        let program = parse(
            "fun main() int { if (true) { return 1; } else { return 0; } while (false) { } return 0; }",
        )
        .unwrap();
        assert!(matches!(program.functions[0].body[0], Stmt::If { .. }));
        assert!(matches!(program.functions[0].body[1], Stmt::While { .. }));
    }

    #[test]
    fn parses_new_delete_and_field_access() {
        let program = parse(
            "struct N { int v; }; fun main() int { struct N a; a = new N; a.v = 1; delete a; return a.v; }",
        )
        .unwrap();
        assert_eq!(program.functions[0].locals.len(), 1);
        assert!(matches!(program.functions[0].body[0], Stmt::Assign { .. }));
        assert!(matches!(program.functions[0].body[2], Stmt::Delete { .. }));
    }

    #[test]
    fn read_parses_as_statement_and_expression() {
        let program = parse(
            "fun main() int { int x; read x; x = read; return x; }",
        )
        .unwrap();
        assert!(matches!(program.functions[0].body[0], Stmt::Read { .. }));
        assert!(matches!(
            program.functions[0].body[1],
            Stmt::Assign { expr: Expr::ReadInt(_), .. }
        ));
    }

    #[test]
    fn unexpected_token_is_reported() {
        let err = parse("fun main() int { return 0 }").unwrap_err();
        assert!(matches!(err, ParseError::Expected { .. }));
    }
}
