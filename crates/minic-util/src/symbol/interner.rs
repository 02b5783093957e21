//! String interner backing [`super::Symbol`].
//!
//! Mini compiles one file in one thread (spec.md §5), so there is no reason
//! to pay for lock-free concurrent structures here: a single [`Mutex`]
//! guarding a plain hash map and a `Vec` of leaked `&'static str` is as fast
//! as anything else for a single-threaded lexer's interning rate, and far
//! simpler to read.

use rustc_hash::FxHashMap;
use std::sync::{LazyLock, Mutex};

use super::{InternerStats, Symbol, KNOWN_SYMBOLS};

pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

struct Inner {
    /// string -> symbol index, for interning lookups.
    by_str: FxHashMap<&'static str, u32>,
    /// symbol index -> string, for [`StringTable::get`].
    by_index: Vec<&'static str>,
    hits: usize,
    misses: usize,
}

/// Global string table. Strings are leaked to obtain `'static` references;
/// this is fine because interned strings live for the whole compilation.
pub struct StringTable {
    inner: Mutex<Inner>,
}

impl StringTable {
    fn new() -> Self {
        let mut by_str = FxHashMap::default();
        let mut by_index = Vec::with_capacity(KNOWN_SYMBOLS.len());

        for (idx, &word) in KNOWN_SYMBOLS.iter().enumerate() {
            by_str.insert(word, idx as u32);
            by_index.push(word);
        }

        Self {
            inner: Mutex::new(Inner {
                by_str,
                by_index,
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn intern(&self, string: &str) -> Symbol {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&index) = inner.by_str.get(string) {
            inner.hits += 1;
            return Symbol { index };
        }

        inner.misses += 1;
        let leaked: &'static str = Box::leak(string.to_string().into_boxed_str());
        let index = inner.by_index.len() as u32;
        inner.by_index.push(leaked);
        inner.by_str.insert(leaked, index);
        Symbol { index }
    }

    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        let inner = self.inner.lock().unwrap();
        inner.by_index.get(symbol.index as usize).copied()
    }

    pub fn stats(&self) -> InternerStats {
        let inner = self.inner.lock().unwrap();
        InternerStats {
            count: inner.by_index.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols_are_preinterned_in_declared_order() {
        for (idx, &word) in KNOWN_SYMBOLS.iter().enumerate() {
            let sym = STRING_TABLE.intern(word);
            assert_eq!(sym.index as usize, idx);
        }
    }

    #[test]
    fn interning_same_string_is_idempotent() {
        let a = STRING_TABLE.intern("frobnicate");
        let b = STRING_TABLE.intern("frobnicate");
        assert_eq!(a, b);
    }

    #[test]
    fn get_roundtrips_through_intern() {
        let sym = STRING_TABLE.intern("roundtrip_target");
        assert_eq!(STRING_TABLE.get(sym), Some("roundtrip_target"));
    }

    #[test]
    fn unicode_strings_roundtrip() {
        for s in ["你好", "🦀", "Привет"] {
            let sym = STRING_TABLE.intern(s);
            assert_eq!(STRING_TABLE.get(sym), Some(s));
        }
    }

    #[test]
    fn stats_count_includes_known_symbols() {
        let stats = STRING_TABLE.stats();
        assert!(stats.count >= KNOWN_SYMBOLS.len());
    }
}
