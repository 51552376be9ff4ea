// crates/nucleoid-core/src/hash.rs
//
// Canonical content hashing for compound records.
//
// Two independently-created records with identical synchronization-relevant
// field values must hash identically regardless of field-assignment order or
// record origin. Canonical form: field-name -> value mapping with
// lexicographic key order, therapeutic areas sorted, serialized as JSON,
// SHA-256 over the UTF-8 bytes, lowercase hex.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::compound::CompoundRecord;

/// Compute the content hash of a record's synchronization-relevant fields.
///
/// Identity (`name`) and bookkeeping (`created_*`, `updated_at`, `version`,
/// `content_hash`) are excluded: hash equality must imply content equality
/// independent of where or when the record was saved, and the hash must not
/// feed on itself.
pub fn content_hash(record: &CompoundRecord) -> String {
    let mut fields: BTreeMap<&str, Value> = BTreeMap::new();
    fields.insert("biochemical_group_reference", json!(record.biochemical_group_reference));
    fields.insert("cas_number", json!(record.cas_number));
    fields.insert("clinical_phase", json!(record.clinical_phase));
    fields.insert("description", json!(record.description));
    fields.insert("mechanism_of_action", json!(record.mechanism_of_action));
    fields.insert("molecular_formula", json!(record.molecular_formula));
    fields.insert("molecular_weight", json!(record.molecular_weight));
    fields.insert("smiles", json!(record.smiles));
    // BTreeSet iterates in lexicographic order, which is the canonical order.
    let areas: Vec<&String> = record.therapeutic_area_references.iter().collect();
    fields.insert("therapeutic_area_references", json!(areas));

    // BTreeMap serializes keys in lexicographic order, so the string form
    // is canonical without further sorting.
    let canonical = serde_json::to_string(&fields)
        .unwrap_or_else(|_| unreachable!("JSON-native field values always serialize"));
    sha256_hex(canonical.as_bytes())
}

/// SHA-256 of `bytes`, rendered as a 64-character lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
