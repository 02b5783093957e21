//! End-to-end CLI tests: invoke the
//! `minic` binary as a subprocess against real Mini source files and assert
//! on the emitted assembly text or diagnostic output. No RISC-V toolchain
//! is invoked — these check what the compiler produced, not what running it
//! would compute (SPEC_FULL.md §4.8).
//!
//! Covers the six scenarios spec.md §8 names: arithmetic, linked-list
//! allocation, recursion, the type-mismatch and missing-return error cases,
//! and scope shadowing.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn minic() -> Command {
    Command::cargo_bin("minic").unwrap()
}

fn write_source(dir: &std::path::Path, name: &str, src: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, src).unwrap();
    path
}

#[test]
fn arithmetic_scenario_compiles_successfully() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "arith.mini",
        "fun main() int { int x; x = 3 + 4 * 2; println x; return 0; }",
    );

    minic().arg(&input).assert().success();

    let asm = std::fs::read_to_string(input.with_extension("s")).unwrap();
    assert!(asm.contains("mul t0"));
    assert!(asm.contains("jal print_int_newline"));
}

#[test]
fn linked_list_allocation_scenario_compiles_successfully() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "list.mini",
        "struct Node { int value; struct Node next; };
         fun main() int {
             struct Node head;
             head = new Node;
             head.value = 1;
             head.next = null;
             println head.value;
             delete head;
             return 0;
         }",
    );

    minic().arg(&input).assert().success();

    let asm = std::fs::read_to_string(input.with_extension("s")).unwrap();
    assert!(asm.contains("jal malloc"));
    assert!(asm.contains("jal free"));
}

#[test]
fn recursion_scenario_compiles_successfully() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "fact.mini",
        "fun factorial(int n) int {
             if (n <= 1) { return 1; }
             return n * factorial(n - 1);
         }
         fun main() int { println factorial(6); return 0; }",
    );

    minic().arg(&input).assert().success();

    let asm = std::fs::read_to_string(input.with_extension("s")).unwrap();
    assert!(asm.contains("jal factorial"));
}

#[test]
fn type_mismatch_is_reported_and_produces_no_assembly() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "bad_type.mini", "int x; fun main() int { x = true; return 0; }");

    minic()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("type-mismatch"));

    assert!(!input.with_extension("s").exists());
}

#[test]
fn missing_return_is_reported_and_produces_no_assembly() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "no_return.mini",
        "fun needs_value() int { int x; x = 1; }
         fun main() int { return needs_value(); }",
    );

    minic()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing-return"));

    assert!(!input.with_extension("s").exists());
}

#[test]
fn local_shadowing_a_global_compiles_successfully() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "shadow.mini",
        "int counter;
         fun main() int { int counter; counter = 5; return counter; }",
    );

    minic().arg(&input).assert().success();

    let asm = std::fs::read_to_string(input.with_extension("s")).unwrap();
    assert!(asm.contains("global_counter: .word 0"));
}

#[test]
fn emit_ast_flag_dumps_the_tree_to_stdout() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "ast.mini", "fun main() int { return 0; }");

    minic()
        .arg(&input)
        .arg("--emit-ast")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program"));
}

#[test]
fn custom_output_path_is_honored() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "out.mini", "fun main() int { return 0; }");
    let output = dir.path().join("renamed.s");

    minic().arg(&input).arg("-o").arg(&output).assert().success();

    assert!(output.exists());
}
