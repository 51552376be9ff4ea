// crates/nucleoid-sync/src/lib.rs
//
// nucleoid-sync: Conflict resolution and round coordination for the
// Nucleoid compound synchronization protocol.
//
// The coordinator drives bounded synchronization rounds against a peer
// set; the resolver decides adopt/keep/conflict per record; the responder
// serves the passive side; the local transport wires instances together
// in-process for tests and embedders.

pub mod config;
pub mod coordinator;
pub mod resolve;
pub mod responder;
pub mod transport;

// Re-export key types for ergonomic access from downstream crates.
pub use config::SyncConfig;
pub use coordinator::{run_sync_loop, SyncCoordinator};
pub use resolve::{resolve, Decision};
pub use responder::{spawn_responder, SyncResponder};
pub use transport::{InboundMessage, LocalChannel, LocalHub};
