// crates/nucleoid-wire/src/codec.rs
//
// Bidirectional mapping between a SyncEnvelope and a byte sequence.
//
// The wire form is canonical JSON: serde_json's Value map is BTree-backed,
// so serializing through Value yields lexicographic key order at every
// nesting level. The envelope hash is SHA-256 hex over the canonical
// serialization of everything except the hash field itself.
//
// There is no partial or streaming decode — the transport is assumed to
// deliver a full envelope as one framed unit.

use chrono::{DateTime, Utc};
use serde_json::Value;

use nucleoid_core::error::NucleoidError;
use nucleoid_core::hash::sha256_hex;

use crate::envelope::{MessageType, SyncEnvelope, SyncPayload};

/// Compute the integrity hash for an envelope under construction.
///
/// Canonical form: `{message_type, payload, sender_id, timestamp}` with
/// sorted keys, serialized as JSON.
pub fn envelope_hash(
    sender_id: &str,
    timestamp: &DateTime<Utc>,
    payload: &SyncPayload,
) -> Result<String, NucleoidError> {
    // The adjacently tagged payload serializes to sibling
    // `message_type` + `payload` entries; add the remaining fields.
    let mut value = serde_json::to_value(payload)?;
    let fields = value
        .as_object_mut()
        .ok_or_else(|| NucleoidError::Serialization("payload is not an object".to_string()))?;
    fields.insert("sender_id".to_string(), Value::String(sender_id.to_string()));
    fields.insert("timestamp".to_string(), serde_json::to_value(timestamp)?);

    let canonical = serde_json::to_string(&value)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Serialize an envelope to bytes.
///
/// Serializes through `Value` so field order is canonical; the integrity
/// hash was computed at construction over the same canonical form.
pub fn encode(envelope: &SyncEnvelope) -> Result<Vec<u8>, NucleoidError> {
    let value = serde_json::to_value(envelope)?;
    Ok(serde_json::to_vec(&value)?)
}

/// Parse bytes into an envelope, verifying structure and integrity.
///
/// Failure taxonomy, checked in order:
/// - `MalformedMessage`: unparseable bytes or a missing required field;
/// - `Integrity`: recomputed hash over the decoded non-hash fields does not
///   match the transmitted `envelope_hash`;
/// - `UnknownMessageType`: hash-valid message whose type tag is outside the
///   recognized set (e.g. a peer speaking a newer protocol revision);
/// - `MalformedMessage`: payload does not match the fixed field set for its
///   message type.
pub fn decode(bytes: &[u8]) -> Result<SyncEnvelope, NucleoidError> {
    let mut value: Value = serde_json::from_slice(bytes)
        .map_err(|e| NucleoidError::MalformedMessage(format!("unparseable envelope: {}", e)))?;

    let fields = value
        .as_object_mut()
        .ok_or_else(|| NucleoidError::MalformedMessage("envelope is not an object".to_string()))?;

    // Structural checks first: every required field must be present.
    let transmitted_hash = match fields.remove("envelope_hash") {
        Some(Value::String(h)) => h,
        Some(_) => {
            return Err(NucleoidError::MalformedMessage(
                "envelope_hash is not a string".to_string(),
            ))
        }
        None => {
            return Err(NucleoidError::MalformedMessage(
                "missing required field: envelope_hash".to_string(),
            ))
        }
    };
    for required in ["message_type", "sender_id", "timestamp", "payload"] {
        if !fields.contains_key(required) {
            return Err(NucleoidError::MalformedMessage(format!(
                "missing required field: {}",
                required
            )));
        }
    }

    // Integrity: recompute over the decoded non-hash fields. `value` is
    // already in canonical form (BTree-backed map, hash field removed).
    let canonical = serde_json::to_string(&value)?;
    let computed_hash = sha256_hex(canonical.as_bytes());
    if computed_hash != transmitted_hash {
        return Err(NucleoidError::Integrity(format!(
            "envelope hash mismatch: computed {}, transmitted {}",
            computed_hash, transmitted_hash
        )));
    }

    // Type recognition, then payload validation against the closed set.
    let type_tag = value
        .get("message_type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            NucleoidError::MalformedMessage("message_type is not a string".to_string())
        })?;
    MessageType::parse(type_tag)?;

    if let Some(fields) = value.as_object_mut() {
        fields.insert("envelope_hash".to_string(), Value::String(transmitted_hash));
    }
    serde_json::from_value(value)
        .map_err(|e| NucleoidError::MalformedMessage(format!("invalid envelope fields: {}", e)))
}
