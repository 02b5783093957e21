//! minic-sem — the semantic analyzer (spec.md §4.3): name resolution, type
//! checking, return-path checking, and frame-slot assignment over the
//! [`minic_ast::ast::Program`] produced by `minic-ast`'s builder.
//!
//! Analysis never aborts on the first error: every pass keeps going and
//! records diagnostics on the [`minic_util::diagnostic::Handler`] it's
//! given, so a single invocation reports everything wrong with a program at
//! once (spec.md §7). [`analyzer::analyze`] returns `None` once the handler
//! has recorded anything, which is the driver's signal not to run codegen.

pub mod analyzer;
pub mod returns;

pub use analyzer::{analyze, AnalyzedProgram};
