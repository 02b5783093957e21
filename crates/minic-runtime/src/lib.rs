//! minic-runtime — the RV32IM runtime Mini programs link against
//! (spec.md §1/§6): `read_int`, `print_int`, `print_int_newline`,
//! `malloc`, `free`, and the `_start` glue that calls `main` and exits
//! with its return value.
//!
//! This crate carries no compiler logic. The runtime itself is
//! hand-written assembly text in `runtime/runtime.s` at the workspace
//! root, embedded here as a string constant so the driver can append it
//! to a compiled program's `.s` text without shelling out to find it on
//! disk.

/// The runtime's assembly source, verbatim.
///
/// The driver concatenates this after a generated program's `.s` output,
/// producing a single file a RISC-V assembler/linker can turn into a
/// runnable binary. See spec.md §6 for the ABI contract each symbol below
/// implements.
pub const RUNTIME_ASM: &str = include_str!("../../../runtime/runtime.s");

/// The symbols [`RUNTIME_ASM`] defines, for callers that want to check a
/// generated program only calls what the runtime actually provides.
pub const RUNTIME_SYMBOLS: &[&str] =
    &["read_int", "print_int", "print_int_newline", "malloc", "free"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_defines_every_advertised_symbol() {
        for symbol in RUNTIME_SYMBOLS {
            assert!(
                RUNTIME_ASM.contains(&format!(".globl {symbol}")),
                "runtime.s is missing `.globl {symbol}`"
            );
        }
    }

    #[test]
    fn runtime_defines_an_entry_point() {
        assert!(RUNTIME_ASM.contains(".globl _start"));
    }
}
