//! Return-reachability check (spec.md §4.3.3).
//!
//! A syntactic check, deliberately over-approximate: loop-only returns are
//! rejected, matching the source language's behavior.

use minic_ast::ast::Stmt;

/// Whether `stmts`, taken as a function body or a nested block, returns on
/// every path reaching its end.
pub fn block_returns(stmts: &[Stmt]) -> bool {
    match stmts.last() {
        Some(Stmt::Return { .. }) => true,
        Some(Stmt::If { then_block, else_block, .. }) => {
            let then_returns = block_returns(then_block);
            let else_returns = else_block.as_deref().is_some_and(block_returns);
            then_returns && else_returns
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_ast::ast::Expr;
    use minic_util::Span;

    fn ret() -> Stmt {
        Stmt::Return { expr: None, span: Span::DUMMY }
    }

    fn invoke() -> Stmt {
        Stmt::Invoke {
            expr: Expr::Call { name: minic_util::Symbol::intern("f"), args: vec![], ty: minic_ast::types::Type::Void, span: Span::DUMMY },
            span: Span::DUMMY,
        }
    }

    #[test]
    fn empty_block_does_not_return() {
        assert!(!block_returns(&[]));
    }

    #[test]
    fn trailing_return_returns() {
        assert!(block_returns(&[invoke(), ret()]));
    }

    #[test]
    fn trailing_non_return_does_not_return() {
        assert!(!block_returns(&[ret(), invoke()]));
    }

    #[test]
    fn if_returns_only_when_both_branches_return() {
        let both = Stmt::If {
            cond: Expr::BoolLit { value: true, span: Span::DUMMY },
            then_block: vec![ret()],
            else_block: Some(vec![ret()]),
            span: Span::DUMMY,
        };
        assert!(block_returns(&[both]));

        let missing_else = Stmt::If {
            cond: Expr::BoolLit { value: true, span: Span::DUMMY },
            then_block: vec![ret()],
            else_block: None,
            span: Span::DUMMY,
        };
        assert!(!block_returns(&[missing_else]));
    }

    #[test]
    fn while_never_contributes_even_with_unconditional_true() {
        let loop_only = Stmt::While {
            cond: Expr::BoolLit { value: true, span: Span::DUMMY },
            body: vec![ret()],
            span: Span::DUMMY,
        };
        assert!(!block_returns(&[loop_only]));
    }
}
