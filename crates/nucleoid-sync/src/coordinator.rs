// crates/nucleoid-sync/src/coordinator.rs
//
// Drives one synchronization round against the peer set:
// announce local state, resolve remote summaries, request and merge
// adoptable records, and report statistics.
//
// Phases per peer: Announcing -> Awaiting responses -> Requesting ->
// Merging; one Completing broadcast closes the round. Peers proceed
// concurrently, but each peer sees at most one in-flight exchange at a
// time, and at most one round runs per instance.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use nucleoid_core::compound::CompoundRecord;
use nucleoid_core::error::NucleoidError;
use nucleoid_core::stats::SyncRoundStats;
use nucleoid_core::traits::{CompoundStore, SyncTransport};
use nucleoid_wire::{codec, SyncEnvelope, SyncPayload};

use crate::config::SyncConfig;
use crate::resolve::{self, Decision};

/// Orchestrates synchronization rounds for one instance.
///
/// Owns its peer collection explicitly — callers pass the peer set in at
/// construction rather than having it read from ambient process-wide state.
pub struct SyncCoordinator {
    node_id: String,
    peers: Vec<String>,
    store: Arc<dyn CompoundStore>,
    transport: Arc<dyn SyncTransport>,
    config: SyncConfig,
    /// Held for an entire round: at most one round in flight per instance.
    round_gate: tokio::sync::Mutex<()>,
}

impl SyncCoordinator {
    pub fn new(
        node_id: impl Into<String>,
        peers: Vec<String>,
        store: Arc<dyn CompoundStore>,
        transport: Arc<dyn SyncTransport>,
        config: SyncConfig,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            peers,
            store,
            transport,
            config,
            round_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// This instance's stable identifier.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// The peer set this coordinator synchronizes against.
    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// The round configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one synchronization round and return its statistics.
    ///
    /// Never fails: every per-peer and per-record error is tallied into
    /// `stats.errors` and logged. A round with `errors > 0` is still a
    /// successful round — partial synchronization is expected and normal.
    pub async fn sync_round(&self) -> SyncRoundStats {
        let _round = self.round_gate.lock().await;
        let mut stats = SyncRoundStats::default();

        // Announcing: one deterministic snapshot of local state, built
        // once and sent to every peer.
        let summaries = match self.store.list_summaries().await {
            Ok(summaries) => summaries,
            Err(e) => {
                tracing::warn!("{}: cannot snapshot local state: {}", self.node_id, e);
                stats.errors += 1;
                return stats;
            }
        };
        let announce_bytes = match SyncEnvelope::new(
            self.node_id.clone(),
            SyncPayload::CompoundAnnounce { records: summaries },
        )
        .and_then(|envelope| codec::encode(&envelope))
        {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("{}: cannot build announce: {}", self.node_id, e);
                stats.errors += 1;
                return stats;
            }
        };

        // One task per peer; a peer's failure never aborts the others.
        // Names claimed for adoption this round: two peers announcing the
        // same absent record must produce exactly one request and merge.
        let claimed: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let mut tasks = JoinSet::new();
        for peer in self.peers.clone() {
            let node_id = self.node_id.clone();
            let store = Arc::clone(&self.store);
            let transport = Arc::clone(&self.transport);
            let config = self.config;
            let bytes = announce_bytes.clone();
            let claimed = Arc::clone(&claimed);
            tasks.spawn(async move {
                sync_with_peer(&node_id, &peer, &store, &transport, &config, &bytes, &claimed)
                    .await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(peer_stats) => stats.absorb(&peer_stats),
                Err(e) => {
                    tracing::warn!("{}: peer task failed: {}", self.node_id, e);
                    stats.errors += 1;
                }
            }
        }

        // Completing: fire-and-forget to the owned peer set; delivery
        // failures do not change the round's outcome.
        match SyncEnvelope::new(
            self.node_id.clone(),
            SyncPayload::SyncComplete { stats },
        )
        .and_then(|envelope| codec::encode(&envelope))
        {
            Ok(bytes) => {
                for peer in &self.peers {
                    if let Err(e) = self.transport.send(peer, &bytes).await {
                        tracing::debug!("{}: sync_complete to {} failed: {}", self.node_id, peer, e);
                    }
                }
            }
            Err(e) => {
                tracing::debug!("{}: cannot build sync_complete: {}", self.node_id, e);
            }
        }

        tracing::info!(
            "{}: round finished: requested={} received={} conflicts={} errors={}",
            self.node_id,
            stats.requested,
            stats.received,
            stats.conflicts,
            stats.errors
        );
        stats
    }
}

/// Synchronize against a single peer; returns this peer's stats tally.
///
/// `claimed` is the round-wide set of names already being adopted from
/// some peer; a name claimed by a failed request stays claimed and is
/// retried next round.
async fn sync_with_peer(
    node_id: &str,
    peer: &str,
    store: &Arc<dyn CompoundStore>,
    transport: &Arc<dyn SyncTransport>,
    config: &SyncConfig,
    announce_bytes: &[u8],
    claimed: &Mutex<HashSet<String>>,
) -> SyncRoundStats {
    let mut stats = SyncRoundStats::default();

    // Announcing / awaiting: the peer's reply to our announce is its own
    // announce. A late reply is abandoned with the timed-out exchange and
    // reconsidered next round.
    let reply = match transport
        .exchange(peer, announce_bytes, config.announce_timeout())
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("{}: announce exchange with {} failed: {}", node_id, peer, e);
            stats.errors += 1;
            return stats;
        }
    };
    let remote_records = match codec::decode(&reply) {
        Ok(envelope) => match envelope.payload {
            SyncPayload::CompoundAnnounce { records } => records,
            other => {
                tracing::warn!(
                    "{}: expected announce from {}, got {}",
                    node_id,
                    peer,
                    other.message_type().as_str()
                );
                stats.errors += 1;
                return stats;
            }
        },
        Err(e) => {
            tracing::warn!("{}: discarding reply from {}: {}", node_id, peer, e);
            stats.errors += 1;
            return stats;
        }
    };

    // Requesting / merging, one record at a time.
    for remote in remote_records {
        let local = match store.find_by_name(&remote.name).await {
            Ok(local) => local,
            Err(e) => {
                tracing::warn!("{}: lookup of {} failed: {}", node_id, remote.name, e);
                stats.errors += 1;
                continue;
            }
        };

        match resolve::resolve(local.as_ref(), &remote) {
            Decision::KeepLocal => {}
            Decision::Conflict => {
                let conflict = NucleoidError::Conflict(format!(
                    "{} diverged from {} without an orderable timestamp",
                    remote.name, peer
                ));
                tracing::warn!("{}: {}; record left untouched", node_id, conflict);
                stats.conflicts += 1;
            }
            Decision::AdoptRemote => {
                let mut claims = claimed.lock().await;
                if !claims.insert(remote.name.clone()) {
                    // Another peer task is already adopting this name.
                    tracing::debug!(
                        "{}: {} already being adopted this round, skipping copy from {}",
                        node_id,
                        remote.name,
                        peer
                    );
                    continue;
                }
                drop(claims);
                stats.requested += 1;
                match request_record(node_id, peer, &remote.name, transport, config).await {
                    Ok(record) => {
                        // Validate-then-commit is one atomic store call; a
                        // cancelled round never leaves a partial merge.
                        match store.upsert(record).await {
                            Ok(merged) => {
                                tracing::debug!(
                                    "{}: merged {} v{} from {}",
                                    node_id,
                                    merged.name,
                                    merged.version,
                                    peer
                                );
                                stats.received += 1;
                            }
                            Err(e) => {
                                tracing::warn!(
                                    "{}: merge of {} failed: {}",
                                    node_id,
                                    remote.name,
                                    e
                                );
                                stats.errors += 1;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            "{}: request of {} from {} failed: {}",
                            node_id,
                            remote.name,
                            peer,
                            e
                        );
                        stats.errors += 1;
                    }
                }
            }
        }
    }

    stats
}

/// Request one full record from a peer and validate the reply.
async fn request_record(
    node_id: &str,
    peer: &str,
    name: &str,
    transport: &Arc<dyn SyncTransport>,
    config: &SyncConfig,
) -> Result<CompoundRecord, NucleoidError> {
    let request = SyncEnvelope::new(
        node_id.to_string(),
        SyncPayload::CompoundRequest {
            name: name.to_string(),
        },
    )?;
    let reply = transport
        .exchange(peer, &codec::encode(&request)?, config.request_timeout())
        .await?;

    match codec::decode(&reply)?.payload {
        SyncPayload::CompoundData { record } if record.name == name => Ok(record),
        SyncPayload::CompoundData { record } => Err(NucleoidError::MalformedMessage(format!(
            "requested {} but peer sent {}",
            name, record.name
        ))),
        other => Err(NucleoidError::MalformedMessage(format!(
            "expected compound_data, got {}",
            other.message_type().as_str()
        ))),
    }
}

/// Run scheduled rounds forever, one per configured interval.
///
/// The round gate serializes these with any manually triggered rounds on
/// the same coordinator.
pub async fn run_sync_loop(coordinator: Arc<SyncCoordinator>) {
    let mut interval = tokio::time::interval(coordinator.config().sync_interval());
    loop {
        interval.tick().await;
        let stats = coordinator.sync_round().await;
        if stats.errors > 0 {
            tracing::warn!(
                "{}: scheduled round completed with {} errors",
                coordinator.node_id(),
                stats.errors
            );
        }
    }
}
