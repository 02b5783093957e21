//! The semantic analyzer (spec.md §4.3): name resolution, type checking, and
//! frame-layout assignment, driven in the five passes §4.3 lays out.
//!
//! Frame layout is nominally the code generator's job (spec.md §4.4), but
//! this analyzer computes it anyway: parameter/local declaration order is
//! already walked here to build the scope stack, and re-deriving the same
//! `-4*(i+1)` formula in `minic-codegen` would just be the same computation
//! twice. `ParamDef::slot`/`LocalDef::slot` are written here and read
//! verbatim by codegen.

use minic_ast::ast::{self, BinOp, Expr, FunctionDef, GlobalDef, Lvalue, Program, Stmt, UnOp};
use minic_ast::scope::{StorageClass, ValueScopeStack};
use minic_ast::types::{FunctionSignature, FunctionTable, StructTable, Type};
use minic_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, DiagnosticKind, Handler};
use minic_util::{Span, Symbol};

use crate::returns::block_returns;

/// The result of successful semantic analysis: the AST with every `ty` field
/// and frame slot filled in, plus the struct/function tables codegen needs
/// for layout and call lowering.
pub struct AnalyzedProgram {
    pub program: Program,
    pub structs: StructTable,
    pub functions: FunctionTable,
}

/// Runs all five passes over `program`, reporting every diagnostic found
/// rather than stopping at the first (spec.md §7). Returns `None` if any
/// error was reported; analysis never panics on malformed-but-parseable
/// input.
pub fn analyze(mut program: Program, handler: &Handler) -> Option<AnalyzedProgram> {
    let mut structs = StructTable::new();
    let mut functions = FunctionTable::new();

    collect_structs(&program, &mut structs, handler);
    resolve_struct_fields(&program, &structs, handler);
    collect_functions(&program, &mut functions, handler);
    resolve_function_signatures(&program, &structs, handler);

    let mut analyzer = SemanticAnalyzer {
        structs,
        functions,
        scopes: ValueScopeStack::new(),
        handler,
        current_return_type: Type::Void,
    };
    analyzer.analyze_globals(&mut program.globals);
    for function in &mut program.functions {
        analyzer.analyze_function(function);
    }

    if handler.has_errors() {
        None
    } else {
        Some(AnalyzedProgram { program, structs: analyzer.structs, functions: analyzer.functions })
    }
}

fn collect_structs(program: &Program, structs: &mut StructTable, handler: &Handler) {
    for decl in &program.structs {
        let mut seen = std::collections::HashSet::new();
        for field in &decl.fields {
            if !seen.insert(field.name) {
                emit(
                    handler,
                    DiagnosticKind::DuplicateInScope,
                    field.span,
                    format!("field `{}` is already declared in struct `{}`", field.name, decl.name),
                );
            }
        }

        let fields = decl.fields.iter().map(|f| (f.name, f.ty.clone())).collect();
        if structs.insert(decl.name, fields).is_err() {
            emit(
                handler,
                DiagnosticKind::DuplicateStruct,
                decl.span,
                format!("struct `{}` is already declared", decl.name),
            );
        }
    }
}

fn resolve_struct_fields(program: &Program, structs: &StructTable, handler: &Handler) {
    for decl in &program.structs {
        for field in &decl.fields {
            check_type_resolves(&field.ty, field.span, structs, handler);
        }
    }
}

fn collect_functions(program: &Program, functions: &mut FunctionTable, handler: &Handler) {
    for decl in &program.functions {
        let signature = FunctionSignature {
            name: decl.name,
            params: decl.params.iter().map(|p| p.ty.clone()).collect(),
            return_type: decl.return_type.clone(),
        };
        if functions.insert(signature).is_err() {
            emit(
                handler,
                DiagnosticKind::DuplicateFunction,
                decl.span,
                format!("function `{}` is already declared", decl.name),
            );
        }
    }
}

/// Not its own pass in spec.md §4.3, but needed before any call site can be
/// checked: a parameter or return type naming an unknown struct has to be
/// caught once, here, rather than re-reported at every call site.
fn resolve_function_signatures(program: &Program, structs: &StructTable, handler: &Handler) {
    for decl in &program.functions {
        for param in &decl.params {
            check_type_resolves(&param.ty, param.span, structs, handler);
        }
        check_type_resolves(&decl.return_type, decl.span, structs, handler);
    }
}

fn check_type_resolves(ty: &Type, span: Span, structs: &StructTable, handler: &Handler) {
    if let Type::Struct(name) = ty {
        if !structs.contains(*name) {
            emit(handler, DiagnosticKind::UnknownStruct, span, format!("unknown struct `{}`", name));
        }
    }
}

fn emit(handler: &Handler, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
    DiagnosticBuilder::error(message).code(DiagnosticCode::new(kind)).span(span).emit(handler);
}

struct SemanticAnalyzer<'a> {
    structs: StructTable,
    functions: FunctionTable,
    scopes: ValueScopeStack,
    handler: &'a Handler,
    current_return_type: Type,
}

impl<'a> SemanticAnalyzer<'a> {
    fn emit(&self, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
        emit(self.handler, kind, span, message);
    }

    fn declare(&mut self, name: Symbol, ty: Type, class: StorageClass, slot: i32, span: Span) {
        if self.scopes.declare(name, ty, class, slot).is_err() {
            self.emit(DiagnosticKind::DuplicateInScope, span, format!("`{}` is already declared in this scope", name));
        }
    }

    /// Globals live in a single scope pushed once and never popped — every
    /// function body sees it as the outermost frame (spec.md §3.4).
    fn analyze_globals(&mut self, globals: &mut [GlobalDef]) {
        self.scopes.push();
        for global in globals.iter() {
            check_type_resolves(&global.ty, global.span, &self.structs, self.handler);
            self.declare(global.name, global.ty.clone(), StorageClass::Global, 0, global.span);
        }
    }

    fn analyze_function(&mut self, function: &mut FunctionDef) {
        check_type_resolves(&function.return_type, function.span, &self.structs, self.handler);
        self.current_return_type = function.return_type.clone();

        self.scopes.push();

        for (i, param) in function.params.iter_mut().enumerate() {
            // Only the first 8 parameters arrive in a0..a7 and get copied
            // into a negative-offset frame slot by the prologue. The 9th
            // and later stay where the caller left them, in its outgoing
            // argument area just above the saved `ra` (spec.md §8 boundary
            // behavior), so their slot is a positive fp-offset instead.
            param.slot = if i < 8 { -4 * (i as i32 + 1) } else { 8 + 4 * (i as i32 - 8) };
            self.declare(param.name, param.ty.clone(), StorageClass::Parameter, param.slot, param.span);
        }

        let param_count = (function.params.len().min(8)) as i32;
        for (j, local) in function.locals.iter_mut().enumerate() {
            check_type_resolves(&local.ty, local.span, &self.structs, self.handler);
            local.slot = -4 * (param_count + j as i32 + 1);
            self.declare(local.name, local.ty.clone(), StorageClass::Local, local.slot, local.span);
        }

        for stmt in &mut function.body {
            self.analyze_stmt(stmt);
        }

        if function.return_type != Type::Void && !block_returns(&function.body) {
            self.emit(
                DiagnosticKind::MissingReturn,
                function.span,
                format!("function `{}` does not return on all paths", function.name),
            );
        }

        self.scopes.pop();
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Assign { lvalue, expr, span } => {
                let lvalue_ty = self.analyze_lvalue(lvalue);
                let expr_ty = self.analyze_expr(expr);
                if !lvalue_ty.assignable_from(&expr_ty) {
                    self.emit(
                        DiagnosticKind::TypeMismatch,
                        *span,
                        format!("cannot assign `{}` to `{}`", expr_ty.describe(), lvalue_ty.describe()),
                    );
                }
            }
            Stmt::If { cond, then_block, else_block, span } => {
                self.check_condition(cond, *span);
                // Mini has no block-scoped declarations (spec.md §6: locals
                // attach only to the function, before its first statement),
                // so nested blocks don't get their own scope.
                for s in then_block.iter_mut() {
                    self.analyze_stmt(s);
                }
                if let Some(else_block) = else_block {
                    for s in else_block.iter_mut() {
                        self.analyze_stmt(s);
                    }
                }
            }
            Stmt::While { cond, body, span } => {
                self.check_condition(cond, *span);
                for s in body.iter_mut() {
                    self.analyze_stmt(s);
                }
            }
            Stmt::Return { expr, span } => self.analyze_return(expr, *span),
            Stmt::Print { expr, span, .. } => {
                let ty = self.analyze_expr(expr);
                if ty != Type::Int && ty != Type::Error {
                    self.emit(DiagnosticKind::InvalidPrintOperand, *span, "`print`/`println` requires an `int` operand");
                }
            }
            Stmt::Read { lvalue, span } => {
                let ty = self.analyze_lvalue(lvalue);
                if ty != Type::Int && ty != Type::Error {
                    self.emit(DiagnosticKind::InvalidReadTarget, *span, "`read` target must be `int`");
                }
            }
            Stmt::Delete { expr, span } => {
                let ty = self.analyze_expr(expr);
                if !matches!(ty, Type::Struct(_) | Type::Error) {
                    self.emit(DiagnosticKind::InvalidDelete, *span, "`delete` requires a struct-typed operand");
                }
            }
            Stmt::Invoke { expr, .. } => {
                self.analyze_expr(expr);
            }
        }
    }

    fn check_condition(&mut self, cond: &mut Expr, span: Span) {
        let ty = self.analyze_expr(cond);
        if ty != Type::Bool && ty != Type::Error {
            self.emit(DiagnosticKind::InvalidCondition, span, "condition must be `bool`");
        }
    }

    fn analyze_return(&mut self, expr: &mut Option<Expr>, span: Span) {
        let return_ty = self.current_return_type.clone();
        match expr {
            None => {
                if return_ty != Type::Void {
                    self.emit(DiagnosticKind::InvalidReturn, span, "missing return value");
                }
            }
            Some(e) => {
                let e_ty = self.analyze_expr(e);
                if return_ty == Type::Void {
                    self.emit(DiagnosticKind::InvalidReturn, span, "void function must not return a value");
                } else if !return_ty.assignable_from(&e_ty) {
                    self.emit(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("expected return type `{}`, found `{}`", return_ty.describe(), e_ty.describe()),
                    );
                }
            }
        }
    }

    fn analyze_lvalue(&mut self, lvalue: &mut Lvalue) -> Type {
        match lvalue {
            Lvalue::Var { name, ty, span } => {
                *ty = self.resolve_name(*name, *span);
                ty.clone()
            }
            Lvalue::Field { base, field, ty, span } => {
                let base_ty = self.analyze_lvalue(base);
                *ty = self.resolve_field(&base_ty, *field, *span);
                ty.clone()
            }
        }
    }

    fn analyze_expr(&mut self, expr: &mut Expr) -> Type {
        match expr {
            Expr::IntLit { .. } => Type::Int,
            Expr::BoolLit { .. } => Type::Bool,
            Expr::Null { .. } => Type::Null,
            Expr::ReadInt { .. } => Type::Int,
            Expr::Error { .. } => Type::Error,
            Expr::Var { name, ty, span } => {
                *ty = self.resolve_name(*name, *span);
                ty.clone()
            }
            Expr::FieldRead { base, field, ty, span } => {
                let base_ty = self.analyze_expr(base);
                *ty = self.resolve_field(&base_ty, *field, *span);
                ty.clone()
            }
            Expr::Binary { op, lhs, rhs, ty, span } => {
                let lhs_ty = self.analyze_expr(lhs);
                let rhs_ty = self.analyze_expr(rhs);
                *ty = self.check_binary(*op, &lhs_ty, &rhs_ty, *span);
                ty.clone()
            }
            Expr::Unary { op, operand, ty, span } => {
                let operand_ty = self.analyze_expr(operand);
                *ty = self.check_unary(*op, &operand_ty, *span);
                ty.clone()
            }
            Expr::Call { name, args, ty, span } => {
                *ty = self.check_call(*name, args, *span);
                ty.clone()
            }
            Expr::New { struct_name, ty, span } => {
                *ty = if self.structs.contains(*struct_name) {
                    Type::Struct(*struct_name)
                } else {
                    self.emit(DiagnosticKind::UnknownStruct, *span, format!("unknown struct `{}`", struct_name));
                    Type::Error
                };
                ty.clone()
            }
        }
    }

    fn resolve_name(&mut self, name: Symbol, span: Span) -> Type {
        match self.scopes.resolve(name) {
            Some(entry) => entry.ty.clone(),
            None => {
                self.emit(DiagnosticKind::UnknownName, span, format!("unknown name `{}`", name));
                Type::Error
            }
        }
    }

    fn resolve_field(&mut self, base_ty: &Type, field: Symbol, span: Span) -> Type {
        match base_ty {
            Type::Error => Type::Error,
            Type::Struct(struct_name) => match self.structs.field_type(*struct_name, field) {
                Ok(ty) => ty,
                Err(_) => {
                    self.emit(DiagnosticKind::UnknownField, span, format!("struct `{}` has no field `{}`", struct_name, field));
                    Type::Error
                }
            },
            other => {
                self.emit(
                    DiagnosticKind::TypeMismatch,
                    span,
                    format!("cannot access field `{}` on non-struct type `{}`", field, other.describe()),
                );
                Type::Error
            }
        }
    }

    fn check_call(&mut self, name: Symbol, args: &mut [Expr], span: Span) -> Type {
        let arg_types: Vec<Type> = args.iter_mut().map(|a| self.analyze_expr(a)).collect();

        let Some(signature) = self.functions.get(name).cloned() else {
            self.emit(DiagnosticKind::UnknownFunction, span, format!("unknown function `{}`", name));
            return Type::Error;
        };

        if signature.params.len() != arg_types.len() {
            self.emit(
                DiagnosticKind::ArityMismatch,
                span,
                format!(
                    "function `{}` expects {} argument(s), found {}",
                    name,
                    signature.params.len(),
                    arg_types.len()
                ),
            );
        } else {
            for (param_ty, arg_ty) in signature.params.iter().zip(arg_types.iter()) {
                if !param_ty.assignable_from(arg_ty) {
                    self.emit(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("expected `{}`, found `{}`", param_ty.describe(), arg_ty.describe()),
                    );
                }
            }
        }

        signature.return_type
    }

    fn check_binary(&mut self, op: BinOp, lhs: &Type, rhs: &Type, span: Span) -> Type {
        let either_error = *lhs == Type::Error || *rhs == Type::Error;
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                if either_error || (*lhs == Type::Int && *rhs == Type::Int) {
                    Type::Int
                } else {
                    self.emit(DiagnosticKind::TypeMismatch, span, "arithmetic operator requires `int` operands");
                    Type::Error
                }
            }
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                if either_error || (*lhs == Type::Int && *rhs == Type::Int) {
                    Type::Bool
                } else {
                    self.emit(DiagnosticKind::TypeMismatch, span, "comparison operator requires `int` operands");
                    Type::Error
                }
            }
            BinOp::Eq | BinOp::Ne => {
                if lhs.comparable_with(rhs) {
                    Type::Bool
                } else {
                    self.emit(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("cannot compare `{}` with `{}`", lhs.describe(), rhs.describe()),
                    );
                    Type::Error
                }
            }
            BinOp::And | BinOp::Or => {
                if either_error || (*lhs == Type::Bool && *rhs == Type::Bool) {
                    Type::Bool
                } else {
                    self.emit(DiagnosticKind::TypeMismatch, span, "logical operator requires `bool` operands");
                    Type::Error
                }
            }
        }
    }

    fn check_unary(&mut self, op: UnOp, operand: &Type, span: Span) -> Type {
        match op {
            UnOp::Neg => {
                if *operand == Type::Int || *operand == Type::Error {
                    Type::Int
                } else {
                    self.emit(DiagnosticKind::TypeMismatch, span, "unary `-` requires an `int` operand");
                    Type::Error
                }
            }
            UnOp::Not => {
                if *operand == Type::Bool || *operand == Type::Error {
                    Type::Bool
                } else {
                    self.emit(DiagnosticKind::TypeMismatch, span, "unary `!` requires a `bool` operand");
                    Type::Error
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_lex::Lexer;
    use minic_par::Parser;

    fn analyze_source(src: &str) -> (Option<AnalyzedProgram>, Handler) {
        let tokens = Lexer::new(src).tokenize().unwrap();
        let cst = Parser::new(tokens).parse_program().unwrap();
        let program = minic_ast::build(cst);
        let handler = Handler::new();
        let result = analyze(program, &handler);
        (result, handler)
    }

    #[test]
    fn accepts_well_typed_program() {
        let (result, handler) = analyze_source(
            "int g;
             fun add(int a, int b) int { return a + b; }
             fun main() int { g = add(1, 2); return g; }",
        );
        assert!(!handler.has_errors());
        assert!(result.is_some());
    }

    #[test]
    fn rejects_type_mismatched_assignment() {
        let (result, handler) = analyze_source("fun main() int { bool b; b = 1; return 0; }");
        assert!(handler.has_errors());
        assert!(result.is_none());
        assert!(handler.diagnostics().iter().any(|d| d.code.map(|c| c.kind()) == Some(DiagnosticKind::TypeMismatch)));
    }

    #[test]
    fn rejects_missing_return_on_some_path() {
        let (_, handler) = analyze_source("fun main() int { if (true) { return 1; } }");
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.code.map(|c| c.kind()) == Some(DiagnosticKind::MissingReturn)));
    }

    #[test]
    fn rejects_unknown_name() {
        let (_, handler) = analyze_source("fun main() int { return missing; }");
        assert!(handler.diagnostics().iter().any(|d| d.code.map(|c| c.kind()) == Some(DiagnosticKind::UnknownName)));
    }

    #[test]
    fn rejects_arity_mismatch() {
        let (_, handler) = analyze_source(
            "fun add(int a, int b) int { return a + b; }
             fun main() int { return add(1); }",
        );
        assert!(handler.diagnostics().iter().any(|d| d.code.map(|c| c.kind()) == Some(DiagnosticKind::ArityMismatch)));
    }

    #[test]
    fn assigns_fp_relative_slots_to_params_then_locals() {
        let tokens = Lexer::new("fun f(int a, int b) int { int c; return a; }").tokenize().unwrap();
        let cst = Parser::new(tokens).parse_program().unwrap();
        let program = minic_ast::build(cst);
        let handler = Handler::new();
        let analyzed = analyze(program, &handler).unwrap();
        let function = &analyzed.program.functions[0];
        assert_eq!(function.params[0].slot, -4);
        assert_eq!(function.params[1].slot, -8);
        assert_eq!(function.locals[0].slot, -12);
    }

    #[test]
    fn null_is_assignable_to_struct_field() {
        let (result, handler) = analyze_source(
            "struct Node { int v; struct Node next; };
             fun main() int { struct Node n; n = new Node; n.next = null; return n.v; }",
        );
        assert!(!handler.has_errors());
        assert!(result.is_some());
    }

    #[test]
    fn local_shadows_global_of_the_same_name() {
        let (result, handler) = analyze_source(
            "int x;
             fun main() int { int x; x = 1; return x; }",
        );
        assert!(!handler.has_errors());
        assert!(result.is_some());
    }
}
