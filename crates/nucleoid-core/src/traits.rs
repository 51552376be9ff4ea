// crates/nucleoid-core/src/traits.rs

use std::time::Duration;

use async_trait::async_trait;

use crate::compound::{CompoundRecord, CompoundSummary};
use crate::error::NucleoidError;

/// Trait for compound record storage.
///
/// Implemented by nucleoid-store (in-memory backend); concrete persistent
/// backends plug in behind the same seam.
#[async_trait]
pub trait CompoundStore: Send + Sync {
    /// Look up a record by its natural key.
    async fn find_by_name(&self, name: &str) -> Result<Option<CompoundRecord>, NucleoidError>;

    /// Insert the record if `name` is absent, otherwise update its fields
    /// and bump the version. Recomputes the content hash either way and
    /// returns the stored record. The whole operation is atomic: a reader
    /// never observes a half-updated record.
    async fn upsert(&self, record: CompoundRecord) -> Result<CompoundRecord, NucleoidError>;

    /// List `{name, content_hash, updated_at, version}` summaries for every
    /// record, sorted by name. Deterministic given the same store state.
    async fn list_summaries(&self) -> Result<Vec<CompoundSummary>, NucleoidError>;
}

/// Per-peer result of a broadcast: the peer id and the send outcome.
pub type BroadcastResult = (String, Result<(), NucleoidError>);

/// Trait for the point-to-point message channel to a set of peers.
///
/// The synchronization protocol assumes a reliable transport that frames
/// whole messages; this seam is what a concrete network layer implements.
/// Within one round the coordinator issues at most one in-flight exchange
/// per peer, so response matching is unambiguous.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Identifiers of every reachable peer.
    fn peer_ids(&self) -> Vec<String>;

    /// Send `bytes` to `peer` and await its reply, bounded by `timeout`.
    ///
    /// Returns `PeerTimeoutError` when no reply arrives in time; a reply
    /// arriving after the timeout is abandoned.
    async fn exchange(
        &self,
        peer: &str,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, NucleoidError>;

    /// Send `bytes` to `peer` without awaiting a reply.
    async fn send(&self, peer: &str, bytes: &[u8]) -> Result<(), NucleoidError>;

    /// Send `bytes` to every peer, returning per-peer results. One peer's
    /// failure never affects delivery to the others.
    async fn broadcast(&self, bytes: &[u8]) -> Vec<BroadcastResult>;
}
