//! minic-ast — the typed AST (spec.md §3.5), the AST Builder that produces
//! it from a [`minic_par::cst::Program`] (spec.md §4.1), and the Type &
//! Scope Model shared by `minic-sem` and `minic-codegen` (spec.md §4.2).

pub mod ast;
pub mod builder;
pub mod scope;
pub mod types;

pub use builder::build;
