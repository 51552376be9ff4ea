// crates/nucleoid-store/src/lib.rs
//
// nucleoid-store: Record storage layer for Nucleoid.
//
// Provides the in-memory reference implementation of the `CompoundStore`
// seam, plus catalog storage (biochemical groups, therapeutic areas,
// diseases, studies) and compound search for the dashboard.

pub mod memory;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::{MemoryStore, SearchFilters};
