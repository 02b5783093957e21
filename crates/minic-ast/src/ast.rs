//! The typed AST (spec.md §3.5).
//!
//! Nodes are produced by [`crate::builder::build`] with `ty` fields set to
//! [`Type::Error`]; the semantic analyzer overwrites them in place once it
//! has determined the real type, so the same tree serves as both the
//! builder's output and the analyzer's "typed AST" result.

use minic_util::{Span, Symbol};

use crate::types::Type;

#[derive(Debug, Clone)]
pub struct Program {
    pub structs: Vec<StructDef>,
    pub globals: Vec<GlobalDef>,
    pub functions: Vec<FunctionDef>,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: Symbol,
    pub fields: Vec<FieldDef>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct GlobalDef {
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Symbol,
    pub params: Vec<ParamDef>,
    pub return_type: Type,
    pub locals: Vec<LocalDef>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `slot` is the fp-relative byte offset the semantic analyzer assigns by
/// declaration order (spec.md §4.4.1); `0` until analysis runs.
#[derive(Debug, Clone)]
pub struct ParamDef {
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
    pub slot: i32,
}

/// See [`ParamDef::slot`].
#[derive(Debug, Clone)]
pub struct LocalDef {
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
    pub slot: i32,
}

/// The left-hand side of an assignment, or the target of a `read`
/// (spec.md §3.5).
#[derive(Debug, Clone)]
pub enum Lvalue {
    Var { name: Symbol, ty: Type, span: Span },
    Field { base: Box<Lvalue>, field: Symbol, ty: Type, span: Span },
}

impl Lvalue {
    pub fn ty(&self) -> &Type {
        match self {
            Lvalue::Var { ty, .. } => ty,
            Lvalue::Field { ty, .. } => ty,
        }
    }

    pub fn ty_mut(&mut self) -> &mut Type {
        match self {
            Lvalue::Var { ty, .. } => ty,
            Lvalue::Field { ty, .. } => ty,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Lvalue::Var { span, .. } => *span,
            Lvalue::Field { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Assign { lvalue: Lvalue, expr: Expr, span: Span },
    If { cond: Expr, then_block: Vec<Stmt>, else_block: Option<Vec<Stmt>>, span: Span },
    While { cond: Expr, body: Vec<Stmt>, span: Span },
    Return { expr: Option<Expr>, span: Span },
    Print { expr: Expr, newline: bool, span: Span },
    Read { lvalue: Lvalue, span: Span },
    Delete { expr: Expr, span: Span },
    /// A bare call expression used as a statement; `expr` is always
    /// `Expr::Call`.
    Invoke { expr: Expr, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Print { span, .. }
            | Stmt::Read { span, .. }
            | Stmt::Delete { span, .. }
            | Stmt::Invoke { span, .. } => *span,
        }
    }
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
    IntLit { value: i32, span: Span },
    BoolLit { value: bool, span: Span },
    Null { span: Span },
    Var { name: Symbol, ty: Type, span: Span },
    FieldRead { base: Box<Expr>, field: Symbol, ty: Type, span: Span },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, ty: Type, span: Span },
    Unary { op: UnOp, operand: Box<Expr>, ty: Type, span: Span },
    Call { name: Symbol, args: Vec<Expr>, ty: Type, span: Span },
    New { struct_name: Symbol, ty: Type, span: Span },
    ReadInt { span: Span },
    /// Placeholder left where a sub-expression failed to type-check, so
    /// codegen never sees this tree (spec.md §7: errors short-circuit
    /// code generation entirely).
    Error { span: Span },
}

impl Expr {
    pub fn ty(&self) -> Type {
        match self {
            Expr::IntLit { .. } => Type::Int,
            Expr::BoolLit { .. } => Type::Bool,
            Expr::Null { .. } => Type::Null,
            Expr::Var { ty, .. }
            | Expr::FieldRead { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::New { ty, .. } => ty.clone(),
            Expr::ReadInt { .. } => Type::Int,
            Expr::Error { .. } => Type::Error,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit { span, .. }
            | Expr::BoolLit { span, .. }
            | Expr::Null { span, .. }
            | Expr::Var { span, .. }
            | Expr::FieldRead { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. }
            | Expr::New { span, .. }
            | Expr::ReadInt { span, .. }
            | Expr::Error { span, .. } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expr_ty_reads_embedded_annotation() {
        let span = Span::DUMMY;
        let mut expr = Expr::Var { name: Symbol::intern("x"), ty: Type::Error, span };
        assert_eq!(expr.ty(), Type::Error);
        if let Expr::Var { ty, .. } = &mut expr {
            *ty = Type::Int;
        }
        assert_eq!(expr.ty(), Type::Int);
    }

    #[test]
    fn literal_types_are_fixed() {
        assert_eq!(Expr::IntLit { value: 1, span: Span::DUMMY }.ty(), Type::Int);
        assert_eq!(Expr::BoolLit { value: true, span: Span::DUMMY }.ty(), Type::Bool);
        assert_eq!(Expr::Null { span: Span::DUMMY }.ty(), Type::Null);
    }
}
