//! RV32IM assembly emission (spec.md §4.4).
//!
//! Walks the validated [`minic_ast::ast::Program`] and writes GNU-style
//! RISC-V assembly text directly; no intermediate representation. The
//! generator trusts the semantic analyzer completely (spec.md §4.4.5): any
//! invariant violation here is a bug, reported as [`crate::error::CodeGenError`]
//! rather than recovered from.

use std::collections::HashMap;
use std::fmt::Write as _;

use minic_ast::ast::{BinOp, Expr, FunctionDef, Lvalue, Program, Stmt, UnOp};
use minic_ast::types::{FunctionTable, StructTable, Type};
use minic_util::Symbol;

use crate::error::{CodeGenError, Result};

/// Where a value named in a `Var`/`Lvalue::Var` node lives, for the
/// purposes of emitting a load or store.
#[derive(Clone, Copy)]
enum VarLoc {
    Global,
    /// fp-relative byte offset; negative for locals and the first 8
    /// parameters, positive for the 9th parameter and later (spec.md §8
    /// boundary behavior — those stay in the caller's outgoing-argument
    /// area instead of being copied into this frame).
    Frame(i32),
}

/// Lowers an analyzed program to a single assembly text blob: a `.data`
/// section with one cell per global, then a `.text` section with one label
/// per function.
pub fn generate(program: &Program, structs: &StructTable, functions: &FunctionTable) -> Result<String> {
    let mut gen = Emitter { structs, functions, out: String::new(), label_counter: 0 };
    gen.emit_data(program)?;
    gen.emit_text(program)?;
    Ok(gen.out)
}

struct Emitter<'a> {
    structs: &'a StructTable,
    functions: &'a FunctionTable,
    out: String,
    label_counter: u32,
}

impl<'a> Emitter<'a> {
    fn emit_data(&mut self, program: &Program) -> Result<()> {
        writeln!(self.out, "  .data").map_err(fmt_err)?;
        for global in &program.globals {
            writeln!(self.out, "global_{}: .word 0", global.name).map_err(fmt_err)?;
        }
        writeln!(self.out).map_err(fmt_err)?;
        Ok(())
    }

    fn emit_text(&mut self, program: &Program) -> Result<()> {
        writeln!(self.out, "  .text").map_err(fmt_err)?;
        writeln!(self.out, "  .globl main").map_err(fmt_err)?;
        for function in &program.functions {
            self.emit_function(program, function)?;
        }
        Ok(())
    }

    fn emit_function(&mut self, program: &Program, function: &FunctionDef) -> Result<()> {
        self.label_counter = 0;

        let mut vars: HashMap<Symbol, VarLoc> = HashMap::new();
        for global in &program.globals {
            vars.insert(global.name, VarLoc::Global);
        }
        for param in &function.params {
            vars.insert(param.name, VarLoc::Frame(param.slot));
        }
        for local in &function.locals {
            vars.insert(local.name, VarLoc::Frame(local.slot));
        }

        let register_params = function.params.len().min(8);
        let frame_slots = register_params + function.locals.len();
        let frame_size = 4 * frame_slots as i32;

        writeln!(self.out, "{}:", function.name).map_err(fmt_err)?;
        writeln!(self.out, "  addi sp, sp, -8").map_err(fmt_err)?;
        writeln!(self.out, "  sw ra, 4(sp)").map_err(fmt_err)?;
        writeln!(self.out, "  sw fp, 0(sp)").map_err(fmt_err)?;
        writeln!(self.out, "  addi fp, sp, 0").map_err(fmt_err)?;
        if frame_size > 0 {
            writeln!(self.out, "  addi sp, sp, -{}", frame_size).map_err(fmt_err)?;
        }
        for (i, param) in function.params.iter().enumerate().take(8) {
            writeln!(self.out, "  sw a{}, {}(fp)", i, param.slot).map_err(fmt_err)?;
        }

        let mut body = FunctionBody { emitter: self, vars: &vars };
        for stmt in &function.body {
            body.emit_stmt(stmt)?;
        }

        self.emit_epilogue()
    }

    fn emit_epilogue(&mut self) -> Result<()> {
        writeln!(self.out, "  addi sp, fp, 0").map_err(fmt_err)?;
        writeln!(self.out, "  lw fp, 0(sp)").map_err(fmt_err)?;
        writeln!(self.out, "  lw ra, 4(sp)").map_err(fmt_err)?;
        writeln!(self.out, "  addi sp, sp, 8").map_err(fmt_err)?;
        writeln!(self.out, "  jr ra").map_err(fmt_err)?;
        Ok(())
    }

    fn fresh_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }
}

fn fmt_err(e: std::fmt::Error) -> CodeGenError {
    CodeGenError::Internal(e.to_string())
}

/// Per-function lowering: everything that needs the variable map and label
/// counter, factored out of [`Emitter`] so its methods can borrow `vars`
/// immutably while still writing through `emitter`.
struct FunctionBody<'a, 'b> {
    emitter: &'b mut Emitter<'a>,
    vars: &'b HashMap<Symbol, VarLoc>,
}

impl<'a, 'b> FunctionBody<'a, 'b> {
    fn w(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.emitter.out, "  {}", line.as_ref()).map_err(fmt_err)
    }

    fn push_t0(&mut self) -> Result<()> {
        self.w("addi sp, sp, -4")?;
        self.w("sw t0, 0(sp)")
    }

    fn pop_t1(&mut self) -> Result<()> {
        self.w("lw t1, 0(sp)")?;
        self.w("addi sp, sp, 4")
    }

    fn pop_t2(&mut self) -> Result<()> {
        self.w("lw t2, 0(sp)")?;
        self.w("addi sp, sp, 4")
    }

    fn var_loc(&self, name: Symbol) -> Result<VarLoc> {
        self.vars.get(&name).copied().ok_or(CodeGenError::UnresolvedName(name))
    }

    fn emit_var_load(&mut self, name: Symbol) -> Result<()> {
        match self.var_loc(name)? {
            VarLoc::Global => {
                self.w(format!("la t0, global_{}", name))?;
                self.w("lw t0, 0(t0)")
            }
            VarLoc::Frame(slot) => self.w(format!("lw t0, {}(fp)", slot)),
        }
    }

    fn emit_var_store(&mut self, name: Symbol) -> Result<()> {
        match self.var_loc(name)? {
            VarLoc::Global => {
                self.w(format!("la t2, global_{}", name))?;
                self.w("sw t0, 0(t2)")
            }
            VarLoc::Frame(slot) => self.w(format!("sw t0, {}(fp)", slot)),
        }
    }

    fn field_offset(&self, struct_name: Symbol, field: Symbol) -> Result<u32> {
        self.emitter
            .structs
            .field_index(struct_name, field)
            .map(|i| 4 * i as u32)
            .map_err(|_| CodeGenError::UnknownField(struct_name, field))
    }

    fn struct_name_of(ty: &Type) -> Result<Symbol> {
        match ty {
            Type::Struct(name) => Ok(*name),
            _ => Err(CodeGenError::NotAStruct),
        }
    }

    // --- statements ---

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { lvalue, expr, .. } => self.emit_assign(lvalue, expr),
            Stmt::If { cond, then_block, else_block, .. } => self.emit_if(cond, then_block, else_block.as_deref()),
            Stmt::While { cond, body, .. } => self.emit_while(cond, body),
            Stmt::Return { expr, .. } => self.emit_return(expr.as_ref()),
            Stmt::Print { expr, newline, .. } => self.emit_print(expr, *newline),
            Stmt::Read { lvalue, .. } => self.emit_read(lvalue),
            Stmt::Delete { expr, .. } => self.emit_delete(expr),
            Stmt::Invoke { expr, .. } => self.emit_expr(expr),
        }
    }

    fn emit_assign(&mut self, lvalue: &Lvalue, expr: &Expr) -> Result<()> {
        match lvalue {
            Lvalue::Var { name, .. } => {
                self.emit_expr(expr)?;
                self.emit_var_store(*name)
            }
            Lvalue::Field { base, field, .. } => {
                self.emit_field_address(base, *field)?;
                self.push_t0()?;
                self.emit_expr(expr)?;
                self.pop_t2()?;
                self.w("sw t0, 0(t2)")
            }
        }
    }

    /// Leaves the address of `base.field` in `t0`.
    fn emit_field_address(&mut self, base: &Lvalue, field: Symbol) -> Result<()> {
        self.emit_lvalue_load(base)?;
        let struct_name = Self::struct_name_of(base.ty())?;
        let offset = self.field_offset(struct_name, field)?;
        if offset != 0 {
            self.w(format!("addi t0, t0, {}", offset))?;
        }
        Ok(())
    }

    /// Loads the *value* of an lvalue (used when it's a prefix of a longer
    /// field chain, e.g. the `a.b` in `a.b.c = ...`).
    fn emit_lvalue_load(&mut self, lvalue: &Lvalue) -> Result<()> {
        match lvalue {
            Lvalue::Var { name, .. } => self.emit_var_load(*name),
            Lvalue::Field { base, field, .. } => {
                self.emit_lvalue_load(base)?;
                let struct_name = Self::struct_name_of(base.ty())?;
                let offset = self.field_offset(struct_name, *field)?;
                self.w(format!("lw t0, {}(t0)", offset))
            }
        }
    }

    fn emit_if(&mut self, cond: &Expr, then_block: &[Stmt], else_block: Option<&[Stmt]>) -> Result<()> {
        self.emit_expr(cond)?;
        let end_label = self.emitter.fresh_label();
        match else_block {
            None => {
                self.w(format!("beq t0, x0, {}", end_label))?;
                for s in then_block {
                    self.emit_stmt(s)?;
                }
                writeln!(self.emitter.out, "{}:", end_label).map_err(fmt_err)
            }
            Some(else_block) => {
                let else_label = self.emitter.fresh_label();
                self.w(format!("beq t0, x0, {}", else_label))?;
                for s in then_block {
                    self.emit_stmt(s)?;
                }
                self.w(format!("j {}", end_label))?;
                writeln!(self.emitter.out, "{}:", else_label).map_err(fmt_err)?;
                for s in else_block {
                    self.emit_stmt(s)?;
                }
                writeln!(self.emitter.out, "{}:", end_label).map_err(fmt_err)
            }
        }
    }

    fn emit_while(&mut self, cond: &Expr, body: &[Stmt]) -> Result<()> {
        let top_label = self.emitter.fresh_label();
        let end_label = self.emitter.fresh_label();
        writeln!(self.emitter.out, "{}:", top_label).map_err(fmt_err)?;
        self.emit_expr(cond)?;
        self.w(format!("beq t0, x0, {}", end_label))?;
        for s in body {
            self.emit_stmt(s)?;
        }
        self.w(format!("j {}", top_label))?;
        writeln!(self.emitter.out, "{}:", end_label).map_err(fmt_err)
    }

    fn emit_return(&mut self, expr: Option<&Expr>) -> Result<()> {
        if let Some(expr) = expr {
            self.emit_expr(expr)?;
            self.w("mv a0, t0")?;
        }
        self.emitter.emit_epilogue()
    }

    fn emit_print(&mut self, expr: &Expr, newline: bool) -> Result<()> {
        self.emit_expr(expr)?;
        self.w("mv a0, t0")?;
        self.w(if newline { "jal print_int_newline" } else { "jal print_int" })
    }

    fn emit_read(&mut self, lvalue: &Lvalue) -> Result<()> {
        self.w("jal read_int")?;
        self.w("mv t0, a0")?;
        match lvalue {
            Lvalue::Var { name, .. } => self.emit_var_store(*name),
            Lvalue::Field { base, field, .. } => {
                self.push_t0()?;
                self.emit_field_address(base, *field)?;
                self.w("mv t2, t0")?;
                self.pop_t1()?;
                self.w("sw t1, 0(t2)")
            }
        }
    }

    fn emit_delete(&mut self, expr: &Expr) -> Result<()> {
        self.emit_expr(expr)?;
        self.w("mv a0, t0")?;
        self.w("jal free")
    }

    // --- expressions ---

    fn emit_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::IntLit { value, .. } => self.w(format!("li t0, {}", value)),
            Expr::BoolLit { value, .. } => self.w(format!("li t0, {}", if *value { 1 } else { 0 })),
            Expr::Null { .. } => self.w("li t0, 0"),
            Expr::ReadInt { .. } => {
                self.w("jal read_int")?;
                self.w("mv t0, a0")
            }
            Expr::Var { name, .. } => self.emit_var_load(*name),
            Expr::FieldRead { base, field, .. } => {
                self.emit_expr(base)?;
                let struct_name = Self::struct_name_of(&base.ty())?;
                let offset = self.field_offset(struct_name, *field)?;
                self.w(format!("lw t0, {}(t0)", offset))
            }
            Expr::Unary { op, operand, .. } => self.emit_unary(*op, operand),
            Expr::Binary { op, lhs, rhs, .. } => self.emit_binary(*op, lhs, rhs),
            Expr::New { struct_name, .. } => self.emit_new(*struct_name),
            Expr::Call { name, args, .. } => self.emit_call(*name, args),
            Expr::Error { .. } => Err(CodeGenError::Internal(
                "code generation reached an Expr::Error node; analysis should have rejected this program".into(),
            )),
        }
    }

    fn emit_unary(&mut self, op: UnOp, operand: &Expr) -> Result<()> {
        self.emit_expr(operand)?;
        match op {
            UnOp::Neg => self.w("neg t0, t0"),
            UnOp::Not => self.w("xori t0, t0, 1"),
        }
    }

    fn emit_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<()> {
        self.emit_expr(lhs)?;
        self.push_t0()?;
        self.emit_expr(rhs)?;
        self.pop_t1()?;
        // t1 = lhs, t0 = rhs.
        match op {
            BinOp::Add => self.w("add t0, t1, t0"),
            BinOp::Sub => self.w("sub t0, t1, t0"),
            BinOp::Mul => self.w("mul t0, t1, t0"),
            BinOp::Div => self.w("div t0, t1, t0"),
            BinOp::Lt => self.w("slt t0, t1, t0"),
            BinOp::Gt => self.w("slt t0, t0, t1"),
            BinOp::Le => {
                self.w("slt t0, t0, t1")?;
                self.w("xori t0, t0, 1")
            }
            BinOp::Ge => {
                self.w("slt t0, t1, t0")?;
                self.w("xori t0, t0, 1")
            }
            BinOp::Eq => {
                self.w("sub t0, t1, t0")?;
                self.w("seqz t0, t0")
            }
            BinOp::Ne => {
                self.w("sub t0, t1, t0")?;
                self.w("snez t0, t0")
            }
            BinOp::And => self.w("and t0, t1, t0"),
            BinOp::Or => self.w("or t0, t1, t0"),
        }
    }

    fn emit_new(&mut self, struct_name: Symbol) -> Result<()> {
        let info = self.emitter.structs.get(struct_name).ok_or(CodeGenError::UnknownStruct(struct_name))?;
        self.w(format!("li a0, {}", info.size()))?;
        self.w("jal malloc")?;
        self.w("mv t0, a0")
    }

    fn emit_call(&mut self, name: Symbol, args: &[Expr]) -> Result<()> {
        if !self.emitter.functions.contains(name) {
            return Err(CodeGenError::UnknownFunction(name));
        }

        let n = args.len();
        let extra = n.saturating_sub(8);
        if extra > 0 {
            self.w(format!("addi sp, sp, -{}", 4 * extra))?;
        }
        for (i, arg) in args.iter().enumerate() {
            self.emit_expr(arg)?;
            if i < 8 {
                self.push_t0()?;
            } else {
                // The extra-argument region was reserved before any
                // register-argument pushes; by the time this runs, those
                // pushes put the current `sp` exactly `4*i` below the slot
                // this argument belongs in (see DESIGN.md).
                self.w(format!("sw t0, {}(sp)", 4 * i))?;
            }
        }
        for i in (0..n.min(8)).rev() {
            self.w(format!("lw a{}, 0(sp)", i))?;
            self.w("addi sp, sp, 4")?;
        }
        self.w(format!("jal {}", name))?;
        if extra > 0 {
            self.w(format!("addi sp, sp, {}", 4 * extra))?;
        }
        self.w("mv t0, a0")
    }
}
