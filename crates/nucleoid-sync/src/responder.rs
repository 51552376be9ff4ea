// crates/nucleoid-sync/src/responder.rs
//
// The passive side of the protocol: serve inbound envelopes from peers.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use nucleoid_core::error::NucleoidError;
use nucleoid_core::traits::CompoundStore;
use nucleoid_wire::{codec, SyncEnvelope, SyncPayload};

use crate::transport::InboundMessage;

/// Serves a node's side of inbound sync traffic against its record store.
pub struct SyncResponder {
    node_id: String,
    store: Arc<dyn CompoundStore>,
}

impl SyncResponder {
    pub fn new(node_id: impl Into<String>, store: Arc<dyn CompoundStore>) -> Self {
        Self {
            node_id: node_id.into(),
            store,
        }
    }

    /// Handle one inbound message; returns the encoded reply, if any.
    ///
    /// - `compound_announce`: reply with our own announce, so the sender
    ///   can resolve against our state;
    /// - `compound_request`: reply with `compound_data` for the named
    ///   record; an absent record draws no reply and the requester's
    ///   bounded wait expires;
    /// - `compound_data` / `sync_complete`: consumed, no reply.
    pub async fn handle(&self, bytes: &[u8]) -> Result<Option<Vec<u8>>, NucleoidError> {
        let envelope = codec::decode(bytes)?;
        let sender = envelope.sender_id.clone();

        match envelope.payload {
            SyncPayload::CompoundAnnounce { records } => {
                tracing::debug!(
                    "{}: announce from {} with {} records",
                    self.node_id,
                    sender,
                    records.len()
                );
                let summaries = self.store.list_summaries().await?;
                let reply = SyncEnvelope::new(
                    self.node_id.clone(),
                    SyncPayload::CompoundAnnounce { records: summaries },
                )?;
                Ok(Some(codec::encode(&reply)?))
            }
            SyncPayload::CompoundRequest { name } => {
                match self.store.find_by_name(&name).await? {
                    Some(record) => {
                        tracing::debug!("{}: serving {} to {}", self.node_id, name, sender);
                        let reply = SyncEnvelope::new(
                            self.node_id.clone(),
                            SyncPayload::CompoundData { record },
                        )?;
                        Ok(Some(codec::encode(&reply)?))
                    }
                    None => {
                        tracing::warn!(
                            "{}: {} requested unknown record {}",
                            self.node_id,
                            sender,
                            name
                        );
                        Ok(None)
                    }
                }
            }
            SyncPayload::CompoundData { record } => {
                // Data arrives as an exchange reply, not through the inbox;
                // an unsolicited copy is consumed and dropped.
                tracing::debug!(
                    "{}: unsolicited compound_data for {} from {}",
                    self.node_id,
                    record.name,
                    sender
                );
                Ok(None)
            }
            SyncPayload::SyncComplete { stats } => {
                tracing::debug!("{}: peer {} completed a round: {:?}", self.node_id, sender, stats);
                Ok(None)
            }
        }
    }
}

/// Spawn a task that serves a node's inbox until it closes.
///
/// Decode failures and reply-delivery failures are logged and tallied
/// against nothing — the requester observes them as a timeout.
pub fn spawn_responder(
    responder: SyncResponder,
    mut inbox: mpsc::Receiver<InboundMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            match responder.handle(&message.bytes).await {
                Ok(Some(reply_bytes)) => {
                    if let Some(reply) = message.reply {
                        if reply.send(reply_bytes).is_err() {
                            tracing::debug!(
                                "{}: {} abandoned the exchange before the reply",
                                responder.node_id,
                                message.from
                            );
                        }
                    }
                }
                Ok(None) => {
                    // Dropping message.reply (if any) lets the requester's
                    // bounded wait expire.
                }
                Err(e) => {
                    tracing::warn!(
                        "{}: discarding message from {}: {}",
                        responder.node_id,
                        message.from,
                        e
                    );
                }
            }
        }
    })
}
