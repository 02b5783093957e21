//! Concrete syntax tree produced by [`crate::Parser`].
//!
//! Mirrors the shape of the AST `minic-ast` builds (spec.md §3.5), but keeps
//! one purely syntactic node — [`Expr::Paren`] — that the AST builder
//! discards, since the grammar is unambiguous LL(1) and nothing else round
//! trips the Cst back to text.

use minic_util::{Span, Symbol};

#[derive(Debug, Clone)]
pub struct Program {
    pub structs: Vec<StructDecl>,
    pub globals: Vec<GlobalDecl>,
    pub functions: Vec<FunctionDecl>,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub ty: TypeName,
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct GlobalDecl {
    pub ty: TypeName,
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_type: TypeName,
    pub locals: Vec<LocalDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeName,
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LocalDecl {
    pub ty: TypeName,
    pub name: Symbol,
    pub span: Span,
}

/// A type as written in source; `minic-ast` resolves `Struct` names against
/// the struct table and rejects `Void` everywhere but a return-type position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Bool,
    Struct(Symbol),
    Void,
}

#[derive(Debug, Clone)]
pub enum Lvalue {
    Var(Symbol, Span),
    Field(Box<Lvalue>, Symbol, Span),
}

impl Lvalue {
    pub fn span(&self) -> Span {
        match self {
            Lvalue::Var(_, span) => *span,
            Lvalue::Field(_, _, span) => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Assign {
        lvalue: Lvalue,
        expr: Expr,
        span: Span,
    },
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    Return {
        expr: Option<Expr>,
        span: Span,
    },
    Print {
        expr: Expr,
        newline: bool,
        span: Span,
    },
    Read {
        lvalue: Lvalue,
        span: Span,
    },
    Delete {
        expr: Expr,
        span: Span,
    },
    /// A bare call expression used as a statement; `expr` is always
    /// `Expr::Call`.
    Invoke {
        expr: Expr,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i32, Span),
    BoolLit(bool, Span),
    Null(Span),
    Var(Symbol, Span),
    FieldRead(Box<Expr>, Symbol, Span),
    Binary(BinOp, Box<Expr>, Box<Expr>, Span),
    Unary(UnOp, Box<Expr>, Span),
    Call(Symbol, Vec<Expr>, Span),
    New(Symbol, Span),
    ReadInt(Span),
    /// Parenthesized sub-expression; discarded by the AST builder.
    Paren(Box<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit(_, s)
            | Expr::BoolLit(_, s)
            | Expr::Null(s)
            | Expr::Var(_, s)
            | Expr::FieldRead(_, _, s)
            | Expr::Binary(_, _, _, s)
            | Expr::Unary(_, _, s)
            | Expr::Call(_, _, s)
            | Expr::New(_, s)
            | Expr::ReadInt(s)
            | Expr::Paren(_, s) => *s,
        }
    }
}
