// crates/nucleoid-sync/src/transport.rs
//
// In-process transport: a hub of per-node mailboxes wired with
// mpsc/oneshot channels.
//
// This is the reference implementation of the `SyncTransport` seam for
// tests and in-process embedders. A concrete network layer implements the
// same trait; it is assumed reliable and message-framed either way.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use nucleoid_core::error::NucleoidError;
use nucleoid_core::traits::{BroadcastResult, SyncTransport};

/// Mailbox capacity per node.
const INBOX_CAPACITY: usize = 64;

/// A message delivered to a node's inbox.
#[derive(Debug)]
pub struct InboundMessage {
    /// Sender's node id.
    pub from: String,
    /// The encoded envelope.
    pub bytes: Vec<u8>,
    /// Present for request/response exchanges; absent for one-way sends.
    /// Dropping it abandons the exchange (the requester times out).
    pub reply: Option<oneshot::Sender<Vec<u8>>>,
}

/// Shared routing table: node id to inbox sender.
#[derive(Debug, Default)]
pub struct LocalHub {
    inboxes: RwLock<HashMap<String, mpsc::Sender<InboundMessage>>>,
}

impl LocalHub {
    /// Create a new hub with no nodes.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a node, returning its transport handle and inbox receiver.
    ///
    /// Re-registering an id replaces the previous inbox.
    pub fn register(
        self: &Arc<Self>,
        node_id: impl Into<String>,
    ) -> (LocalChannel, mpsc::Receiver<InboundMessage>) {
        let node_id = node_id.into();
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        self.inboxes
            .write()
            .expect("RwLock poisoned")
            .insert(node_id.clone(), tx);

        let channel = LocalChannel {
            node_id,
            hub: Arc::clone(self),
        };
        (channel, rx)
    }

    /// Look up a node's inbox sender.
    fn inbox(&self, node_id: &str) -> Option<mpsc::Sender<InboundMessage>> {
        self.inboxes
            .read()
            .expect("RwLock poisoned")
            .get(node_id)
            .cloned()
    }

    /// All registered node ids, sorted for determinism.
    fn node_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inboxes
            .read()
            .expect("RwLock poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

/// One node's handle onto the hub.
#[derive(Debug, Clone)]
pub struct LocalChannel {
    node_id: String,
    hub: Arc<LocalHub>,
}

impl LocalChannel {
    /// This node's id.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Deliver a message to `peer`'s inbox.
    async fn deliver(
        &self,
        peer: &str,
        bytes: &[u8],
        reply: Option<oneshot::Sender<Vec<u8>>>,
    ) -> Result<(), NucleoidError> {
        let inbox = self
            .hub
            .inbox(peer)
            .ok_or_else(|| NucleoidError::Transport(format!("unknown peer: {}", peer)))?;
        inbox
            .send(InboundMessage {
                from: self.node_id.clone(),
                bytes: bytes.to_vec(),
                reply,
            })
            .await
            .map_err(|_| NucleoidError::Transport(format!("peer {} inbox closed", peer)))
    }
}

#[async_trait]
impl SyncTransport for LocalChannel {
    fn peer_ids(&self) -> Vec<String> {
        self.hub
            .node_ids()
            .into_iter()
            .filter(|id| id != &self.node_id)
            .collect()
    }

    async fn exchange(
        &self,
        peer: &str,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, NucleoidError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.deliver(peer, bytes, Some(reply_tx)).await?;

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            // The peer dropped the reply handle without answering.
            Ok(Err(_)) => Err(NucleoidError::Transport(format!(
                "peer {} closed the exchange without replying",
                peer
            ))),
            // A reply arriving after this point is abandoned with reply_rx.
            Err(_) => Err(NucleoidError::PeerTimeout(format!(
                "no reply from peer {} within {:?}",
                peer, timeout
            ))),
        }
    }

    async fn send(&self, peer: &str, bytes: &[u8]) -> Result<(), NucleoidError> {
        self.deliver(peer, bytes, None).await
    }

    async fn broadcast(&self, bytes: &[u8]) -> Vec<BroadcastResult> {
        let mut results = Vec::new();
        for peer in self.peer_ids() {
            let result = self.send(&peer, bytes).await;
            results.push((peer, result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exchange_delivers_and_returns_reply() {
        let hub = LocalHub::new();
        let (a, _a_rx) = hub.register("node-a");
        let (_b, mut b_rx) = hub.register("node-b");

        tokio::spawn(async move {
            let msg = b_rx.recv().await.expect("message");
            assert_eq!(msg.from, "node-a");
            assert_eq!(msg.bytes, b"ping");
            msg.reply.expect("reply handle").send(b"pong".to_vec()).ok();
        });

        let reply = a
            .exchange("node-b", b"ping", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, b"pong");
    }

    #[tokio::test]
    async fn exchange_times_out_when_peer_never_replies() {
        let hub = LocalHub::new();
        let (a, _a_rx) = hub.register("node-a");
        // node-b registered but never serves its inbox.
        let (_b, _b_rx) = hub.register("node-b");

        let err = a
            .exchange("node-b", b"ping", Duration::from_millis(20))
            .await
            .unwrap_err();
        match err {
            NucleoidError::PeerTimeout(_) => {}
            other => panic!("Expected PeerTimeout, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_peer_is_a_transport_error() {
        let hub = LocalHub::new();
        let (a, _a_rx) = hub.register("node-a");

        let err = a.send("node-z", b"hello").await.unwrap_err();
        match err {
            NucleoidError::Transport(msg) => assert!(msg.contains("node-z")),
            other => panic!("Expected Transport, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn peer_ids_excludes_self_and_is_sorted() {
        let hub = LocalHub::new();
        let (b, _b_rx) = hub.register("node-b");
        let (_c, _c_rx) = hub.register("node-c");
        let (_a, _a_rx) = hub.register("node-a");

        assert_eq!(b.peer_ids(), vec!["node-a".to_string(), "node-c".to_string()]);
    }

    #[tokio::test]
    async fn broadcast_reports_per_peer_results() {
        let hub = LocalHub::new();
        let (a, _a_rx) = hub.register("node-a");
        let (_b, b_rx) = hub.register("node-b");
        let (_c, _c_rx) = hub.register("node-c");

        // node-b's inbox is gone; node-c's is alive.
        drop(b_rx);

        let results = a.broadcast(b"announce").await;
        assert_eq!(results.len(), 2);
        let b_result = results.iter().find(|(id, _)| id == "node-b").unwrap();
        assert!(b_result.1.is_err());
        let c_result = results.iter().find(|(id, _)| id == "node-c").unwrap();
        assert!(c_result.1.is_ok());
    }
}
