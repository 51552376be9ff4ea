// crates/nucleoid-sync/src/resolve.rs
//
// Conflict resolution: decide what to do with a remote version of a record.
//
// Last-write-wins by wall-clock timestamp. Simple and adequate for this
// layer, but explicitly not a correctness guarantee under clock skew: that
// is a documented limitation of the protocol, not a hidden bug.

use nucleoid_core::compound::{CompoundRecord, CompoundSummary};

/// What to do with a remote version of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Request the full remote record and merge it locally.
    AdoptRemote,
    /// Keep the local record; no request is made.
    KeepLocal,
    /// The two versions cannot be ordered. Surfaced to the caller and
    /// never auto-resolved here — the record is left untouched pending
    /// manual or future-round resolution.
    Conflict,
}

/// Decide between a local record (if any) and a remote summary.
///
/// Rules, in order:
/// 1. no local record with that name — adopt the remote;
/// 2. identical content hashes — keep local (already in sync), regardless
///    of timestamps;
/// 3. hashes differ and the remote timestamp is missing — conflict;
/// 4. hashes differ and the remote is strictly newer — adopt the remote;
/// 5. otherwise (local newer or equal) — keep local.
pub fn resolve(local: Option<&CompoundRecord>, remote: &CompoundSummary) -> Decision {
    let Some(local) = local else {
        return Decision::AdoptRemote;
    };

    if local.content_hash == remote.content_hash {
        return Decision::KeepLocal;
    }

    match remote.updated_at {
        None => Decision::Conflict,
        Some(remote_ts) if remote_ts > local.updated_at => Decision::AdoptRemote,
        Some(_) => Decision::KeepLocal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn local_record(name: &str) -> CompoundRecord {
        let mut record = CompoundRecord::new(name);
        record.description = Some("local".to_string());
        record.touch();
        record
    }

    fn summary_of(record: &CompoundRecord) -> CompoundSummary {
        record.summary()
    }

    #[test]
    fn absent_local_adopts_remote() {
        let remote = summary_of(&local_record("Aspirin"));
        assert_eq!(resolve(None, &remote), Decision::AdoptRemote);
    }

    #[test]
    fn identical_hashes_keep_local_regardless_of_timestamps() {
        let local = local_record("Glucose");
        let mut remote = summary_of(&local);
        // Remote claims to be much newer; with equal content that is a no-op.
        remote.updated_at = Some(local.updated_at + Duration::hours(6));
        assert_eq!(resolve(Some(&local), &remote), Decision::KeepLocal);
    }

    #[test]
    fn newer_remote_with_different_hash_is_adopted() {
        let local = local_record("Caffeine");
        let mut remote = summary_of(&local);
        remote.content_hash = "f".repeat(64);
        remote.updated_at = Some(local.updated_at + Duration::seconds(5));
        assert_eq!(resolve(Some(&local), &remote), Decision::AdoptRemote);
    }

    #[test]
    fn older_remote_with_different_hash_keeps_local() {
        let local = local_record("Caffeine");
        let mut remote = summary_of(&local);
        remote.content_hash = "f".repeat(64);
        remote.updated_at = Some(local.updated_at - Duration::seconds(5));
        assert_eq!(resolve(Some(&local), &remote), Decision::KeepLocal);
    }

    #[test]
    fn equal_timestamps_with_different_hash_keep_local() {
        let local = local_record("Caffeine");
        let mut remote = summary_of(&local);
        remote.content_hash = "f".repeat(64);
        remote.updated_at = Some(local.updated_at);
        assert_eq!(resolve(Some(&local), &remote), Decision::KeepLocal);
    }

    #[test]
    fn missing_remote_timestamp_with_different_hash_is_a_conflict() {
        let local = local_record("Morphine");
        let mut remote = summary_of(&local);
        remote.content_hash = "f".repeat(64);
        remote.updated_at = None;
        assert_eq!(resolve(Some(&local), &remote), Decision::Conflict);
    }

    #[test]
    fn missing_remote_timestamp_with_equal_hash_is_still_a_no_op() {
        // Rule 2 wins before timestamps are even consulted.
        let local = local_record("Morphine");
        let mut remote = summary_of(&local);
        remote.updated_at = None;
        assert_eq!(resolve(Some(&local), &remote), Decision::KeepLocal);
    }
}
