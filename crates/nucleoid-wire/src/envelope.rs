// crates/nucleoid-wire/src/envelope.rs
//
// The sync message envelope: one self-describing unit per transport message.
//
// The payload is a closed set of tagged variants, one per message type, each
// with a fixed field set. This is what makes malformed-message detection
// deterministic instead of ad-hoc key lookups into a loose dictionary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nucleoid_core::compound::{CompoundRecord, CompoundSummary};
use nucleoid_core::error::NucleoidError;
use nucleoid_core::stats::SyncRoundStats;

/// The four recognized envelope types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    CompoundAnnounce,
    CompoundRequest,
    CompoundData,
    SyncComplete,
}

impl MessageType {
    /// Wire tag for this message type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::CompoundAnnounce => "compound_announce",
            MessageType::CompoundRequest => "compound_request",
            MessageType::CompoundData => "compound_data",
            MessageType::SyncComplete => "sync_complete",
        }
    }

    /// Parse a wire tag, rejecting anything outside the recognized set.
    pub fn parse(tag: &str) -> Result<Self, NucleoidError> {
        match tag {
            "compound_announce" => Ok(MessageType::CompoundAnnounce),
            "compound_request" => Ok(MessageType::CompoundRequest),
            "compound_data" => Ok(MessageType::CompoundData),
            "sync_complete" => Ok(MessageType::SyncComplete),
            other => Err(NucleoidError::UnknownMessageType(other.to_string())),
        }
    }
}

/// Type-dependent payload, adjacently tagged so the wire form carries
/// sibling `message_type` and `payload` fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "message_type", content = "payload", rename_all = "snake_case")]
pub enum SyncPayload {
    /// Local state summary, one entry per record.
    CompoundAnnounce { records: Vec<CompoundSummary> },
    /// Request for the full record with the given name.
    CompoundRequest { name: String },
    /// Full record, answering a request.
    CompoundData { record: CompoundRecord },
    /// End-of-round marker with the sender's final statistics.
    SyncComplete { stats: SyncRoundStats },
}

impl SyncPayload {
    /// The message type this payload belongs to.
    pub fn message_type(&self) -> MessageType {
        match self {
            SyncPayload::CompoundAnnounce { .. } => MessageType::CompoundAnnounce,
            SyncPayload::CompoundRequest { .. } => MessageType::CompoundRequest,
            SyncPayload::CompoundData { .. } => MessageType::CompoundData,
            SyncPayload::SyncComplete { .. } => MessageType::SyncComplete,
        }
    }
}

/// A message exchanged between two instances.
///
/// Constructed immediately before send and immutable thereafter: the
/// envelope hash is computed once, at construction, over the canonical form
/// of the other fields. It detects tamper/corruption in transit — it is not
/// a cryptographic signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncEnvelope {
    /// Stable identifier of the originating instance.
    pub sender_id: String,
    /// Creation time, ISO-8601 UTC on the wire.
    pub timestamp: DateTime<Utc>,
    /// Tagged payload; serializes as sibling `message_type` + `payload`.
    #[serde(flatten)]
    pub payload: SyncPayload,
    /// SHA-256 hex over the canonical serialization of the other fields.
    pub envelope_hash: String,
}

impl SyncEnvelope {
    /// Construct an envelope for `payload`, stamping the current time and
    /// computing the integrity hash over the final field values.
    pub fn new(sender_id: impl Into<String>, payload: SyncPayload) -> Result<Self, NucleoidError> {
        let sender_id = sender_id.into();
        let timestamp = Utc::now();
        let envelope_hash = crate::codec::envelope_hash(&sender_id, &timestamp, &payload)?;
        Ok(Self {
            sender_id,
            timestamp,
            payload,
            envelope_hash,
        })
    }

    /// The envelope's message type.
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_tags_round_trip() {
        for tag in [
            "compound_announce",
            "compound_request",
            "compound_data",
            "sync_complete",
        ] {
            let parsed = MessageType::parse(tag).unwrap();
            assert_eq!(parsed.as_str(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = MessageType::parse("compound_delete").unwrap_err();
        match err {
            NucleoidError::UnknownMessageType(tag) => assert_eq!(tag, "compound_delete"),
            other => panic!("Expected UnknownMessageType, got: {:?}", other),
        }
    }

    #[test]
    fn new_envelope_carries_a_hash() {
        let envelope = SyncEnvelope::new(
            "node-a",
            SyncPayload::CompoundRequest {
                name: "Aspirin".to_string(),
            },
        )
        .unwrap();

        assert_eq!(envelope.message_type(), MessageType::CompoundRequest);
        assert_eq!(envelope.envelope_hash.len(), 64);
    }
}
