// crates/nucleoid-wire/src/lib.rs
//
// nucleoid-wire: Sync message envelope and byte codec for Nucleoid.
//
// Defines the envelope exchanged between instances (a closed set of tagged
// payload variants) and its integrity-checked (de)serialization to bytes.

pub mod codec;
pub mod envelope;

// Re-export key types for ergonomic access from downstream crates.
pub use codec::{decode, encode};
pub use envelope::{MessageType, SyncEnvelope, SyncPayload};
