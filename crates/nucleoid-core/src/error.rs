use thiserror::Error;

/// Error types shared across the Nucleoid synchronization core.
#[derive(Debug, Error)]
pub enum NucleoidError {
    /// Envelope hash mismatch on decode (tampered or corrupted message).
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Unparseable message or missing required field.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Message type is not one of the recognized envelope types.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// No response from a peer within the phase timeout.
    #[error("Peer timeout: {0}")]
    PeerTimeout(String),

    /// Conflict resolver could not order local and remote versions.
    #[error("Unresolved conflict: {0}")]
    Conflict(String),

    /// Record store error (lookup, commit, constraint violation).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport error (send/broadcast failure, unknown peer).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error (unreadable or unparseable config file).
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for NucleoidError {
    fn from(e: serde_json::Error) -> Self {
        NucleoidError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_name_the_concern() {
        let conflict = NucleoidError::Conflict("Morphine diverged".to_string());
        assert_eq!(conflict.to_string(), "Unresolved conflict: Morphine diverged");

        let timeout = NucleoidError::PeerTimeout("node-b".to_string());
        assert_eq!(timeout.to_string(), "Peer timeout: node-b");

        let config = NucleoidError::Config("missing file".to_string());
        assert_eq!(config.to_string(), "Config error: missing file");
    }

    #[test]
    fn serde_json_errors_convert_to_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{]").unwrap_err();
        let err: NucleoidError = parse_err.into();
        match err {
            NucleoidError::Serialization(_) => {}
            other => panic!("Expected Serialization, got: {:?}", other),
        }
    }
}
