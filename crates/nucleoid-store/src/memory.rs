// crates/nucleoid-store/src/memory.rs
//
// In-memory compound record store.
//
// Reference implementation of the `CompoundStore` seam: a RwLock-guarded
// map keyed by compound name. Every mutation happens inside one write-lock
// critical section, so a merge is atomic — readers never observe a
// half-updated record — and an interrupted caller cannot leave one behind.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use nucleoid_core::catalog::{BiochemicalGroup, Disease, Study, TherapeuticArea};
use nucleoid_core::compound::{CompoundRecord, CompoundSummary};
use nucleoid_core::error::NucleoidError;
use nucleoid_core::hash;
use nucleoid_core::traits::CompoundStore;

/// Filters for compound search, mirroring the dashboard's search form.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Restrict to compounds referencing this biochemical group.
    pub biochemical_group: Option<String>,
    /// Restrict to compounds in this clinical phase.
    pub clinical_phase: Option<String>,
    /// Restrict to compounds with molecular weight in `[min, max]`.
    pub molecular_weight_range: Option<(f64, f64)>,
}

/// In-memory store for compound records and catalog entities.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Compound records keyed by name (the natural key).
    compounds: RwLock<HashMap<String, CompoundRecord>>,
    /// Catalog entities keyed by their unique names/titles.
    groups: RwLock<HashMap<String, BiochemicalGroup>>,
    areas: RwLock<HashMap<String, TherapeuticArea>>,
    diseases: RwLock<HashMap<String, Disease>>,
    studies: RwLock<HashMap<String, Study>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compound records currently stored.
    pub async fn compound_count(&self) -> usize {
        self.compounds.read().await.len()
    }

    /// Insert or replace a biochemical group by name.
    pub async fn put_group(&self, group: BiochemicalGroup) {
        self.groups.write().await.insert(group.name.clone(), group);
    }

    /// Insert or replace a therapeutic area by name.
    pub async fn put_area(&self, area: TherapeuticArea) {
        self.areas.write().await.insert(area.name.clone(), area);
    }

    /// Insert or replace a disease by name.
    pub async fn put_disease(&self, disease: Disease) {
        self.diseases.write().await.insert(disease.name.clone(), disease);
    }

    /// Insert or replace a study by title.
    pub async fn put_study(&self, study: Study) {
        self.studies.write().await.insert(study.title.clone(), study);
    }

    /// List biochemical groups sorted by name.
    pub async fn list_groups(&self) -> Vec<BiochemicalGroup> {
        let mut groups: Vec<BiochemicalGroup> =
            self.groups.read().await.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    /// List therapeutic areas sorted by name.
    pub async fn list_areas(&self) -> Vec<TherapeuticArea> {
        let mut areas: Vec<TherapeuticArea> =
            self.areas.read().await.values().cloned().collect();
        areas.sort_by(|a, b| a.name.cmp(&b.name));
        areas
    }

    /// List diseases sorted by name.
    pub async fn list_diseases(&self) -> Vec<Disease> {
        let mut diseases: Vec<Disease> =
            self.diseases.read().await.values().cloned().collect();
        diseases.sort_by(|a, b| a.name.cmp(&b.name));
        diseases
    }

    /// List studies sorted by title.
    pub async fn list_studies(&self) -> Vec<Study> {
        let mut studies: Vec<Study> =
            self.studies.read().await.values().cloned().collect();
        studies.sort_by(|a, b| a.title.cmp(&b.title));
        studies
    }

    /// Search compounds by free-text query and optional filters.
    ///
    /// Every whitespace-separated term must match (case-insensitively) at
    /// least one of: name, molecular formula, description, or mechanism of
    /// action. Filters narrow further. Results are sorted by name.
    pub async fn search(&self, query: &str, filters: &SearchFilters) -> Vec<CompoundRecord> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        let compounds = self.compounds.read().await;
        let mut matches: Vec<CompoundRecord> = compounds
            .values()
            .filter(|c| terms.iter().all(|t| term_matches(c, t)))
            .filter(|c| filter_matches(c, filters))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches
    }
}

/// Whether a single lowercase search term matches any searchable field.
fn term_matches(record: &CompoundRecord, term: &str) -> bool {
    let haystacks = [
        Some(record.name.as_str()),
        record.molecular_formula.as_deref(),
        record.description.as_deref(),
        record.mechanism_of_action.as_deref(),
    ];
    haystacks
        .iter()
        .flatten()
        .any(|h| h.to_lowercase().contains(term))
}

/// Whether a record passes every set filter.
fn filter_matches(record: &CompoundRecord, filters: &SearchFilters) -> bool {
    if let Some(group) = &filters.biochemical_group {
        if record.biochemical_group_reference.as_deref() != Some(group.as_str()) {
            return false;
        }
    }
    if let Some(phase) = &filters.clinical_phase {
        if record.clinical_phase.as_deref() != Some(phase.as_str()) {
            return false;
        }
    }
    if let Some((min_mw, max_mw)) = filters.molecular_weight_range {
        match record.molecular_weight {
            Some(mw) if mw >= min_mw && mw <= max_mw => {}
            _ => return false,
        }
    }
    true
}

#[async_trait]
impl CompoundStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<CompoundRecord>, NucleoidError> {
        Ok(self.compounds.read().await.get(name).cloned())
    }

    async fn upsert(&self, record: CompoundRecord) -> Result<CompoundRecord, NucleoidError> {
        let mut compounds = self.compounds.write().await;

        let mut stored = match compounds.get(&record.name) {
            // Existing record: keep identity and local bookkeeping, adopt
            // the incoming synchronization fields, bump the version.
            Some(existing) => {
                let mut updated = existing.clone();
                updated.adopt_fields_from(&record);
                updated.version = existing.version + 1;
                updated
            }
            // New record: local history starts at version 1 regardless of
            // what the incoming copy claims.
            None => {
                let mut inserted = record.clone();
                inserted.version = 1;
                inserted
            }
        };

        // Recompute the hash before the record becomes visible, and never
        // move updated_at backward relative to the incoming copy.
        stored.content_hash = hash::content_hash(&stored);
        let now = Utc::now();
        stored.updated_at = record.updated_at.max(now);

        compounds.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn list_summaries(&self) -> Result<Vec<CompoundSummary>, NucleoidError> {
        let compounds = self.compounds.read().await;
        let mut summaries: Vec<CompoundSummary> =
            compounds.values().map(|c| c.summary()).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_compound(name: &str, formula: &str, weight: f64) -> CompoundRecord {
        let mut record = CompoundRecord::new(name);
        record.molecular_formula = Some(formula.to_string());
        record.molecular_weight = Some(weight);
        record.touch();
        record
    }

    #[tokio::test]
    async fn upsert_inserts_at_version_one() {
        let store = MemoryStore::new();
        let mut incoming = make_compound("Aspirin", "C9H8O4", 180.16);
        incoming.version = 17; // a remote copy's local counter is meaningless here

        let stored = store.upsert(incoming).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.content_hash, nucleoid_core::content_hash(&stored));

        let found = store.find_by_name("Aspirin").await.unwrap().unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn upsert_updates_fields_and_bumps_version() {
        let store = MemoryStore::new();
        store
            .upsert(make_compound("Caffeine", "C8H10N4O2", 194.19))
            .await
            .unwrap();

        let mut update = make_compound("Caffeine", "C8H10N4O2", 194.19);
        update.description = Some("CNS stimulant".to_string());
        update.touch();

        let stored = store.upsert(update).await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.description.as_deref(), Some("CNS stimulant"));
    }

    #[tokio::test]
    async fn upsert_never_regresses_updated_at() {
        let store = MemoryStore::new();
        let mut incoming = make_compound("Glucose", "C6H12O6", 180.16);
        // An adopted record may carry a future timestamp from a skewed peer
        // clock; the stored record must keep it.
        let future = Utc::now() + chrono::Duration::hours(1);
        incoming.updated_at = future;

        let stored = store.upsert(incoming).await.unwrap();
        assert_eq!(stored.updated_at, future);
    }

    #[tokio::test]
    async fn list_summaries_is_sorted_by_name() {
        let store = MemoryStore::new();
        store.upsert(make_compound("Morphine", "C17H19NO3", 285.34)).await.unwrap();
        store.upsert(make_compound("Aspirin", "C9H8O4", 180.16)).await.unwrap();
        store.upsert(make_compound("Glucose", "C6H12O6", 180.16)).await.unwrap();

        let summaries = store.list_summaries().await.unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin", "Glucose", "Morphine"]);
    }

    #[tokio::test]
    async fn search_requires_every_term_to_match() {
        let store = MemoryStore::new();
        let mut aspirin = make_compound("Aspirin", "C9H8O4", 180.16);
        aspirin.description = Some("Analgesic and antipyretic".to_string());
        aspirin.touch();
        store.upsert(aspirin).await.unwrap();

        let mut ibuprofen = make_compound("Ibuprofen", "C13H18O2", 206.28);
        ibuprofen.description = Some("Analgesic NSAID".to_string());
        ibuprofen.touch();
        store.upsert(ibuprofen).await.unwrap();

        let hits = store.search("analgesic", &SearchFilters::default()).await;
        assert_eq!(hits.len(), 2);

        let hits = store
            .search("analgesic antipyretic", &SearchFilters::default())
            .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Aspirin");

        let hits = store.search("ANALGESIC nsaid", &SearchFilters::default()).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ibuprofen");
    }

    #[tokio::test]
    async fn search_applies_filters() {
        let store = MemoryStore::new();
        let mut a = make_compound("Aspirin", "C9H8O4", 180.16);
        a.clinical_phase = Some("Approved".to_string());
        a.biochemical_group_reference = Some("Salicylates".to_string());
        a.touch();
        store.upsert(a).await.unwrap();

        let mut b = make_compound("Candidate-12", "C20H25N3O", 323.43);
        b.clinical_phase = Some("Phase II".to_string());
        b.touch();
        store.upsert(b).await.unwrap();

        let filters = SearchFilters {
            clinical_phase: Some("Approved".to_string()),
            ..Default::default()
        };
        let hits = store.search("", &filters).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Aspirin");

        let filters = SearchFilters {
            molecular_weight_range: Some((300.0, 400.0)),
            ..Default::default()
        };
        let hits = store.search("", &filters).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Candidate-12");

        let filters = SearchFilters {
            biochemical_group: Some("Salicylates".to_string()),
            ..Default::default()
        };
        let hits = store.search("", &filters).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Aspirin");
    }

    #[tokio::test]
    async fn catalog_listings_are_sorted() {
        let store = MemoryStore::new();
        store.put_group(BiochemicalGroup::new("Peptides", "biologic", "#2196f3")).await;
        store.put_group(BiochemicalGroup::new("Alkaloids", "natural", "#4caf50")).await;
        store.put_area(TherapeuticArea::new("Oncology")).await;
        store.put_area(TherapeuticArea::new("Cardiology")).await;
        store.put_disease(Disease::new("Hypertension")).await;
        store.put_study(Study::new("Aspirin in primary prevention")).await;

        let groups = store.list_groups().await;
        assert_eq!(groups[0].name, "Alkaloids");
        assert_eq!(groups[1].name, "Peptides");

        let areas = store.list_areas().await;
        assert_eq!(areas[0].name, "Cardiology");
        assert_eq!(areas[1].name, "Oncology");

        assert_eq!(store.list_diseases().await.len(), 1);
        assert_eq!(store.list_studies().await.len(), 1);
    }
}
