//! Carton - The shared toolbox for Vellum.
//!
//! Foundational re-exports and small utilities shared by every Vellum crate,
//! much like a carton (artist's portfolio case) holds the tools an artist
//! reaches for on every piece of work.
//!
//! # Modules
//!
//! - **dom_tag_config**: HTML / SVG / void tag classification
//! - **general**: naming helpers and identifier predicates
//! - **hash**: xxHash3 fingerprints for generated text
//! - **js**: lightweight JavaScript token scanner

pub mod dom_tag_config;
pub mod general;
pub mod hash;
pub mod js;

// Re-export compact_str::CompactString for convenience
pub use compact_str::{format_compact, CompactString};

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

/// Build a string of `len` ASCII spaces.
///
/// Used wherever a span has to be blanked without shifting later offsets.
#[inline]
pub fn blank(len: usize) -> String {
    " ".repeat(len)
}
