// crates/nucleoid-core/src/lib.rs
//
// nucleoid-core: Core types, content hashing, and trait seams for the
// Nucleoid compound synchronization protocol.
//
// This is the leaf crate the rest of the workspace depends on. It defines
// the compound data model, the canonical content hasher, the error type,
// and the store/transport trait interfaces.

pub mod catalog;
pub mod compound;
pub mod error;
pub mod hash;
pub mod stats;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use nucleoid_core::CompoundRecord;`

// Compound types
pub use compound::{CompoundRecord, CompoundSummary};

// Catalog types
pub use catalog::{BiochemicalGroup, Disease, Study, TherapeuticArea};

// Content hashing
pub use hash::{content_hash, sha256_hex};

// Error type
pub use error::NucleoidError;

// Round statistics
pub use stats::SyncRoundStats;

// Traits
pub use traits::{BroadcastResult, CompoundStore, SyncTransport};
