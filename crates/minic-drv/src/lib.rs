//! minic-drv — the compiler driver (spec.md §6, expanded by SPEC_FULL.md
//! §4.5/§4.7): parses the command line, reads the source file, runs the
//! pipeline (lex → parse → build AST → analyze → generate), and writes the
//! resulting `.s` file.
//!
//! Two separate error channels, kept apart deliberately (SPEC_FULL.md
//! §4.6): a failed read of the source file, or an internal codegen bug, is
//! a `thiserror` [`DriverError`] turned into a process exit code; a
//! malformed *Mini program* is a list of [`minic_util::diagnostic::Diagnostic`]s
//! printed to stderr, which isn't a driver failure at all — it's the
//! pipeline doing its job.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use thiserror::Error;
use tracing::{debug, warn};

use minic_lex::{LexError, Lexer};
use minic_par::{ParseError, Parser as MiniParser};
use minic_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, DiagnosticKind, Handler};
use minic_util::Span;

/// `minic <source-file> [--emit-ast] [--emit-symbols] [-o <path>]`
/// (spec.md §6's CLI clause).
#[derive(Debug, ClapParser)]
#[command(name = "minic", about = "Compiles Mini source to RV32IM assembly")]
struct Cli {
    /// Mini source file to compile.
    input_file: PathBuf,

    /// Output assembly path (defaults to the input's basename with `.s`).
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Dump the built AST to stdout before analysis.
    #[arg(long = "emit-ast")]
    emit_ast: bool,

    /// Dump the struct/function symbol tables to stdout after analysis.
    #[arg(long = "emit-symbols")]
    emit_symbols: bool,
}

/// Driver configuration (SPEC_FULL.md §4.7). No optimization levels, no
/// target triples, no multi-file compilation — Mini has none of those.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: Option<PathBuf>,
    pub emit_ast: bool,
    pub emit_symbols: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            input_file: cli.input_file,
            output_file: cli.output_file,
            emit_ast: cli.emit_ast,
            emit_symbols: cli.emit_symbols,
        }
    }
}

impl Config {
    fn resolved_output_path(&self) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => self.input_file.with_extension("s"),
        }
    }
}

/// Driver-internal failures: I/O and programmer bugs, never a malformed
/// Mini program (that's a [`minic_util::diagnostic::Diagnostic`] list
/// instead, printed separately — see module docs).
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("couldn't read `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("couldn't write `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    CodeGen(#[from] minic_codegen::CodeGenError),
}

/// Parses argv, runs the compiler, and maps the outcome to a process exit
/// code: 0 on success, 1 if the Mini program had diagnostics, 2 on a
/// driver-internal failure (spec.md §6).
pub fn run() -> ExitCode {
    init_logging();

    let config = Config::from(Cli::parse());
    match compile(&config) {
        Ok(CompileOutcome::Wrote(path)) => {
            debug!(path = %path.display(), "wrote assembly");
            ExitCode::SUCCESS
        }
        Ok(CompileOutcome::HadDiagnostics(count)) => {
            warn!(count, "compilation failed with diagnostics");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

enum CompileOutcome {
    Wrote(PathBuf),
    HadDiagnostics(usize),
}

fn compile(config: &Config) -> Result<CompileOutcome, DriverError> {
    let source = std::fs::read_to_string(&config.input_file)
        .map_err(|source| DriverError::Read { path: config.input_file.clone(), source })?;

    let handler = Handler::new();

    debug!(file = %config.input_file.display(), "tokenizing");
    let tokens = match Lexer::new(&source).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            emit_lex_error(&handler, e);
            print_diagnostics(&handler);
            return Ok(CompileOutcome::HadDiagnostics(handler.error_count()));
        }
    };

    debug!(count = tokens.len(), "parsing");
    let cst = match MiniParser::new(tokens).parse_program() {
        Ok(cst) => cst,
        Err(e) => {
            emit_parse_error(&handler, e);
            print_diagnostics(&handler);
            return Ok(CompileOutcome::HadDiagnostics(handler.error_count()));
        }
    };

    let program = minic_ast::build(cst);
    if config.emit_ast {
        println!("{program:#?}");
    }

    debug!("analyzing");
    let Some(analyzed) = minic_sem::analyze(program, &handler) else {
        print_diagnostics(&handler);
        return Ok(CompileOutcome::HadDiagnostics(handler.error_count()));
    };

    if config.emit_symbols {
        print_symbol_tables(&analyzed);
    }

    debug!("generating assembly");
    let asm = minic_codegen::generate(&analyzed.program, &analyzed.structs, &analyzed.functions)?;

    // The generated program calls `read_int`/`print_int`/`print_int_newline`/
    // `malloc`/`free` and is entered via the runtime's `_start`, none of which
    // the generator itself defines (spec.md §1/§6). Appending the runtime
    // text turns the single `.s` file into something a RISC-V assembler and
    // linker can build standalone, with no second file to track.
    let linked = format!("{asm}\n  # ---- runtime ----\n{}\n", minic_runtime::RUNTIME_ASM);

    let output_path = config.resolved_output_path();
    std::fs::write(&output_path, linked)
        .map_err(|source| DriverError::Write { path: output_path.clone(), source })?;

    Ok(CompileOutcome::Wrote(output_path))
}

/// Turns a lexer failure into the `LexUnexpectedChar` diagnostic it
/// corresponds to (SPEC_FULL.md §4.6): ambient lexer errors join the same
/// stderr-in-source-order reporting path as semantic ones.
fn emit_lex_error(handler: &Handler, err: LexError) {
    let LexError::UnexpectedChar { found, line, column } = err;
    let message = format!("unexpected character {found:?}");
    let span = Span::point(line, column);
    DiagnosticBuilder::error(message)
        .code(DiagnosticCode::new(DiagnosticKind::LexUnexpectedChar))
        .span(span)
        .emit(handler);
}

/// Turns a parser failure into its matching `Parse*` diagnostic kind, same
/// reasoning as [`emit_lex_error`].
fn emit_parse_error(handler: &Handler, err: ParseError) {
    let (message, span, kind) = match err {
        ParseError::Expected { expected, found, span, .. } => {
            (format!("expected {expected}, found {found}"), span, DiagnosticKind::ParseExpectedToken)
        }
        ParseError::UnexpectedToken { found, span, .. } => {
            (format!("unexpected {found}"), span, DiagnosticKind::ParseUnexpectedToken)
        }
        ParseError::UnexpectedEof { span } => {
            ("unexpected end of file".to_string(), span, DiagnosticKind::ParseUnexpectedEof)
        }
    };
    DiagnosticBuilder::error(message).code(DiagnosticCode::new(kind)).span(span).emit(handler);
}

/// Diagnostics are printed in source order (spec.md §7).
fn print_diagnostics(handler: &Handler) {
    for diagnostic in handler.diagnostics() {
        let code = diagnostic
            .code
            .map(|c| format!("[{c}] "))
            .unwrap_or_default();
        eprintln!(
            "{}: {}{} (line {}, column {})",
            diagnostic.level, code, diagnostic.message, diagnostic.span.line, diagnostic.span.column
        );
        for note in &diagnostic.notes {
            eprintln!("  note: {note}");
        }
        for help in &diagnostic.helps {
            eprintln!("  help: {help}");
        }
    }
}

fn print_symbol_tables(analyzed: &minic_sem::AnalyzedProgram) {
    println!("-- structs --");
    for info in analyzed.structs.iter_in_declaration_order() {
        println!("{info:#?}");
    }
    println!("-- functions --");
    for function in &analyzed.program.functions {
        println!(
            "{}({} params) -> {:?}",
            function.name,
            function.params.len(),
            function.return_type
        );
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(path: &str) -> Config {
        Config { input_file: PathBuf::from(path), output_file: None, emit_ast: false, emit_symbols: false }
    }

    #[test]
    fn default_output_path_swaps_extension() {
        let config = config_for("programs/fib.mini");
        assert_eq!(config.resolved_output_path(), PathBuf::from("programs/fib.s"));
    }

    #[test]
    fn explicit_output_path_wins() {
        let mut config = config_for("programs/fib.mini");
        config.output_file = Some(PathBuf::from("out/custom.s"));
        assert_eq!(config.resolved_output_path(), PathBuf::from("out/custom.s"));
    }

    #[test]
    fn missing_source_file_is_a_read_error() {
        let config = config_for("does/not/exist.mini");
        let err = compile(&config).unwrap_err();
        assert!(matches!(err, DriverError::Read { .. }));
    }

    #[test]
    fn type_mismatch_produces_diagnostics_and_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.mini");
        std::fs::write(&input, "int x; fun main() int { x = true; return 0; }").unwrap();

        let config = Config { input_file: input, output_file: None, emit_ast: false, emit_symbols: false };
        let outcome = compile(&config).unwrap();
        assert!(matches!(outcome, CompileOutcome::HadDiagnostics(1)));
        assert!(!config.resolved_output_path().exists());
    }

    #[test]
    fn well_typed_program_writes_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ok.mini");
        std::fs::write(&input, "fun main() int { println 1 + 2; return 0; }").unwrap();

        let config = Config { input_file: input, output_file: None, emit_ast: false, emit_symbols: false };
        let outcome = compile(&config).unwrap();
        let CompileOutcome::Wrote(path) = outcome else { panic!("expected Wrote") };
        let asm = std::fs::read_to_string(path).unwrap();
        assert!(asm.contains("main:"));
    }
}
