//! AST Builder (spec.md §4.1): lifts a [`minic_par::cst::Program`] into the
//! typed AST of [`crate::ast`].
//!
//! Total over any parse tree the parser can produce; malformed trees are
//! the parser's responsibility (spec.md §4.1). The only purely syntactic
//! node discarded here is [`minic_par::cst::Expr::Paren`] — everything else
//! in the Cst already matches the AST shape one-for-one.

use minic_par::cst;

use crate::ast::*;
use crate::types::Type;

pub fn build(program: cst::Program) -> Program {
    Program {
        structs: program.structs.into_iter().map(lower_struct).collect(),
        globals: program.globals.into_iter().map(lower_global).collect(),
        functions: program.functions.into_iter().map(lower_function).collect(),
    }
}

fn lower_type(ty: cst::TypeName) -> Type {
    match ty {
        cst::TypeName::Int => Type::Int,
        cst::TypeName::Bool => Type::Bool,
        cst::TypeName::Struct(name) => Type::Struct(name),
        cst::TypeName::Void => Type::Void,
    }
}

fn lower_struct(decl: cst::StructDecl) -> StructDef {
    StructDef {
        name: decl.name,
        fields: decl
            .fields
            .into_iter()
            .map(|f| FieldDef { name: f.name, ty: lower_type(f.ty), span: f.span })
            .collect(),
        span: decl.span,
    }
}

fn lower_global(decl: cst::GlobalDecl) -> GlobalDef {
    GlobalDef { name: decl.name, ty: lower_type(decl.ty), span: decl.span }
}

fn lower_function(decl: cst::FunctionDecl) -> FunctionDef {
    FunctionDef {
        name: decl.name,
        params: decl
            .params
            .into_iter()
            .map(|p| ParamDef { name: p.name, ty: lower_type(p.ty), span: p.span, slot: 0 })
            .collect(),
        return_type: lower_type(decl.return_type),
        locals: decl
            .locals
            .into_iter()
            .map(|l| LocalDef { name: l.name, ty: lower_type(l.ty), span: l.span, slot: 0 })
            .collect(),
        body: decl.body.into_iter().map(lower_stmt).collect(),
        span: decl.span,
    }
}

fn lower_lvalue(lvalue: cst::Lvalue) -> Lvalue {
    match lvalue {
        cst::Lvalue::Var(name, span) => Lvalue::Var { name, ty: Type::Error, span },
        cst::Lvalue::Field(base, field, span) => {
            Lvalue::Field { base: Box::new(lower_lvalue(*base)), field, ty: Type::Error, span }
        }
    }
}

fn lower_stmt(stmt: cst::Stmt) -> Stmt {
    match stmt {
        cst::Stmt::Assign { lvalue, expr, span } => {
            Stmt::Assign { lvalue: lower_lvalue(lvalue), expr: lower_expr(expr), span }
        }
        cst::Stmt::If { cond, then_block, else_block, span } => Stmt::If {
            cond: lower_expr(cond),
            then_block: then_block.into_iter().map(lower_stmt).collect(),
            else_block: else_block.map(|b| b.into_iter().map(lower_stmt).collect()),
            span,
        },
        cst::Stmt::While { cond, body, span } => {
            Stmt::While { cond: lower_expr(cond), body: body.into_iter().map(lower_stmt).collect(), span }
        }
        cst::Stmt::Return { expr, span } => Stmt::Return { expr: expr.map(lower_expr), span },
        cst::Stmt::Print { expr, newline, span } => {
            Stmt::Print { expr: lower_expr(expr), newline, span }
        }
        cst::Stmt::Read { lvalue, span } => Stmt::Read { lvalue: lower_lvalue(lvalue), span },
        cst::Stmt::Delete { expr, span } => Stmt::Delete { expr: lower_expr(expr), span },
        cst::Stmt::Invoke { expr, span } => Stmt::Invoke { expr: lower_expr(expr), span },
    }
}

fn lower_binop(op: cst::BinOp) -> BinOp {
    match op {
        cst::BinOp::Add => BinOp::Add,
        cst::BinOp::Sub => BinOp::Sub,
        cst::BinOp::Mul => BinOp::Mul,
        cst::BinOp::Div => BinOp::Div,
        cst::BinOp::Lt => BinOp::Lt,
        cst::BinOp::Gt => BinOp::Gt,
        cst::BinOp::Le => BinOp::Le,
        cst::BinOp::Ge => BinOp::Ge,
        cst::BinOp::Eq => BinOp::Eq,
        cst::BinOp::Ne => BinOp::Ne,
        cst::BinOp::And => BinOp::And,
        cst::BinOp::Or => BinOp::Or,
    }
}

fn lower_unop(op: cst::UnOp) -> UnOp {
    match op {
        cst::UnOp::Neg => UnOp::Neg,
        cst::UnOp::Not => UnOp::Not,
    }
}

fn lower_expr(expr: cst::Expr) -> Expr {
    match expr {
        cst::Expr::IntLit(value, span) => Expr::IntLit { value, span },
        cst::Expr::BoolLit(value, span) => Expr::BoolLit { value, span },
        cst::Expr::Null(span) => Expr::Null { span },
        cst::Expr::Var(name, span) => Expr::Var { name, ty: Type::Error, span },
        cst::Expr::FieldRead(base, field, span) => Expr::FieldRead {
            base: Box::new(lower_expr(*base)),
            field,
            ty: Type::Error,
            span,
        },
        cst::Expr::Binary(op, lhs, rhs, span) => Expr::Binary {
            op: lower_binop(op),
            lhs: Box::new(lower_expr(*lhs)),
            rhs: Box::new(lower_expr(*rhs)),
            ty: Type::Error,
            span,
        },
        cst::Expr::Unary(op, operand, span) => Expr::Unary {
            op: lower_unop(op),
            operand: Box::new(lower_expr(*operand)),
            ty: Type::Error,
            span,
        },
        cst::Expr::Call(name, args, span) => Expr::Call {
            name,
            args: args.into_iter().map(lower_expr).collect(),
            ty: Type::Error,
            span,
        },
        cst::Expr::New(struct_name, span) => Expr::New { struct_name, ty: Type::Error, span },
        cst::Expr::ReadInt(span) => Expr::ReadInt { span },
        // The one purely syntactic node: unwrap and keep the inner span.
        cst::Expr::Paren(inner, _) => lower_expr(*inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_lex::Lexer;
    use minic_par::Parser;

    fn build_source(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize().unwrap();
        let cst = Parser::new(tokens).parse_program().unwrap();
        build(cst)
    }

    #[test]
    fn lifts_struct_global_and_function() {
        let program = build_source(
            "struct N { int v; struct N next; }; int g; fun main() int { return g; }",
        );
        assert_eq!(program.structs.len(), 1);
        assert_eq!(program.structs[0].fields.len(), 2);
        assert_eq!(program.globals.len(), 1);
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn unannotated_vars_start_as_error_type() {
        let program = build_source("fun main() int { int x; x = 1; return x; }");
        match &program.functions[0].body[0] {
            Stmt::Assign { lvalue, .. } => assert_eq!(*lvalue.ty(), Type::Error),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn discards_parenthesized_grouping() {
        let program = build_source("fun main() int { return (1 + 2); }");
        match &program.functions[0].body[0] {
            Stmt::Return { expr: Some(Expr::Binary { .. }), .. } => {}
            other => panic!("expected a bare binary expression, got {other:?}"),
        }
    }
}
