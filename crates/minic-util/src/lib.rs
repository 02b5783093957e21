//! minic-util — shared foundation types for the Mini compiler.
//!
//! Every other `minic-*` crate depends on this one for: interned
//! identifiers ([`symbol`]), source locations ([`span`]), diagnostic
//! reporting ([`diagnostic`]), and typed index vectors ([`index_vec`]).
//! Nothing in here knows about the Mini language itself.

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};

/// Defines a newtype index backed by `u32` and implementing [`Idx`].
#[macro_export]
macro_rules! define_idx {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $crate::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                assert!(idx <= u32::MAX as usize, "{} index overflow", stringify!($name));
                $name(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}
