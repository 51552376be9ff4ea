// crates/nucleoid-core/src/compound.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hash;

/// A compound record — the unit of synchronization.
///
/// Records are keyed by `name`, the globally unique, case-sensitive natural
/// key. Local auto-increment ids are deliberately absent: they are not
/// comparable across independently-seeded catalogs, so peers identify
/// records by name alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompoundRecord {
    /// Natural key, unique within a store and across peers.
    pub name: String,

    // Synchronization-relevant fields. These (and only these) feed the
    // content hash.
    /// Molecular formula, e.g. "C9H8O4".
    pub molecular_formula: Option<String>,
    /// Molecular weight in g/mol.
    pub molecular_weight: Option<f64>,
    /// CAS registry number.
    pub cas_number: Option<String>,
    /// SMILES notation.
    pub smiles: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Clinical phase: "Preclinical", "Phase I".."Phase III", "Approved".
    pub clinical_phase: Option<String>,
    /// Mechanism of action.
    pub mechanism_of_action: Option<String>,
    /// Stable reference to a biochemical group by name (not a local
    /// numeric foreign key — those do not survive crossing instances).
    pub biochemical_group_reference: Option<String>,
    /// Stable references to therapeutic areas by name. A set: membership
    /// matters, order does not.
    pub therapeutic_area_references: BTreeSet<String>,

    // Bookkeeping fields, excluded from the content hash.
    /// Creation timestamp (local bookkeeping, not synchronized).
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp. Monotonically non-decreasing under local
    /// edits; never regressed backward by a merge.
    pub updated_at: DateTime<Utc>,
    /// Who created the record locally, if known.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Local mutation counter, incremented on every mutation.
    pub version: u64,
    /// Content hash of the synchronization-relevant fields, recomputed
    /// immediately after any mutation.
    pub content_hash: String,
}

impl CompoundRecord {
    /// Create a new record with the given name, empty fields, and a valid
    /// content hash. `version` starts at 1.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut record = Self {
            name: name.into(),
            molecular_formula: None,
            molecular_weight: None,
            cas_number: None,
            smiles: None,
            description: None,
            clinical_phase: None,
            mechanism_of_action: None,
            biochemical_group_reference: None,
            therapeutic_area_references: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            created_by: None,
            version: 1,
            content_hash: String::new(),
        };
        record.content_hash = hash::content_hash(&record);
        record
    }

    /// Recompute the content hash and bump the version after a local
    /// mutation. Must be called before the record becomes visible to
    /// synchronization.
    pub fn touch(&mut self) {
        self.content_hash = hash::content_hash(self);
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Copy the synchronization-relevant fields from `other` into `self`,
    /// leaving identity and bookkeeping untouched. Used when merging an
    /// adopted remote record into an existing local one.
    pub fn adopt_fields_from(&mut self, other: &CompoundRecord) {
        self.molecular_formula = other.molecular_formula.clone();
        self.molecular_weight = other.molecular_weight;
        self.cas_number = other.cas_number.clone();
        self.smiles = other.smiles.clone();
        self.description = other.description.clone();
        self.clinical_phase = other.clinical_phase.clone();
        self.mechanism_of_action = other.mechanism_of_action.clone();
        self.biochemical_group_reference = other.biochemical_group_reference.clone();
        self.therapeutic_area_references = other.therapeutic_area_references.clone();
    }

    /// Build the announce-payload summary for this record.
    pub fn summary(&self) -> CompoundSummary {
        CompoundSummary {
            name: self.name.clone(),
            content_hash: self.content_hash.clone(),
            updated_at: Some(self.updated_at),
            version: self.version,
        }
    }
}

/// The per-record shape of a `compound_announce` payload.
///
/// `updated_at` is optional: a peer may announce a record whose timestamp is
/// missing or unparseable, and the conflict resolver must be able to see
/// that rather than invent an ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompoundSummary {
    pub name: String,
    pub content_hash: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_valid_hash_and_version_one() {
        let record = CompoundRecord::new("Aspirin");
        assert_eq!(record.version, 1);
        assert_eq!(record.content_hash, hash::content_hash(&record));
        assert_eq!(record.content_hash.len(), 64);
    }

    #[test]
    fn touch_bumps_version_and_refreshes_hash() {
        let mut record = CompoundRecord::new("Aspirin");
        let before = record.content_hash.clone();

        record.molecular_formula = Some("C9H8O4".to_string());
        record.touch();

        assert_eq!(record.version, 2);
        assert_ne!(record.content_hash, before);
        assert_eq!(record.content_hash, hash::content_hash(&record));
    }

    #[test]
    fn adopt_fields_preserves_identity_and_bookkeeping() {
        let mut local = CompoundRecord::new("Caffeine");
        local.description = Some("local description".to_string());
        local.touch();
        let local_version = local.version;
        let local_created = local.created_at;

        let mut remote = CompoundRecord::new("Caffeine");
        remote.description = Some("remote description".to_string());
        remote
            .therapeutic_area_references
            .insert("Neurology".to_string());
        remote.touch();

        local.adopt_fields_from(&remote);

        assert_eq!(local.name, "Caffeine");
        assert_eq!(local.version, local_version);
        assert_eq!(local.created_at, local_created);
        assert_eq!(local.description.as_deref(), Some("remote description"));
        assert!(local
            .therapeutic_area_references
            .contains("Neurology"));
    }

    #[test]
    fn summary_carries_hash_and_timestamp() {
        let record = CompoundRecord::new("Glucose");
        let summary = record.summary();
        assert_eq!(summary.name, "Glucose");
        assert_eq!(summary.content_hash, record.content_hash);
        assert_eq!(summary.updated_at, Some(record.updated_at));
        assert_eq!(summary.version, 1);
    }
}
