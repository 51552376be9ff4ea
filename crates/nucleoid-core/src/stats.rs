// crates/nucleoid-core/src/stats.rs

use serde::{Deserialize, Serialize};

/// Ephemeral result of one synchronization round.
///
/// Created at round start, mutated only by the coordinator during that
/// round, returned (and logged) at round end. Not persisted. A round with
/// `errors > 0` is still a successful round: partial synchronization is
/// expected and normal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncRoundStats {
    /// Records for which a `compound_request` was emitted.
    pub requested: u64,
    /// Records successfully merged into the local store.
    pub received: u64,
    /// Records the resolver could not order (left untouched).
    pub conflicts: u64,
    /// Per-peer and per-record failures tallied during the round.
    pub errors: u64,
}

impl SyncRoundStats {
    /// Fold another stats object (e.g. one peer's tally) into this one.
    pub fn absorb(&mut self, other: &SyncRoundStats) {
        self.requested += other.requested;
        self.received += other.received;
        self.conflicts += other.conflicts;
        self.errors += other.errors;
    }
}
