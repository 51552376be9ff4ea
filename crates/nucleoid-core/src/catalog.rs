// crates/nucleoid-core/src/catalog.rs
//
// Catalog entities referenced by compound records.
//
// These are catalog-local: they are not synchronized between peers.
// Compounds reference them by stable name, so a merged record can point at
// a group or area that the local catalog has not seeded yet — dangling
// references are allowed and resolve once the catalog catches up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A biochemical group, e.g. "Alkaloids" or "Peptides".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiochemicalGroup {
    /// Unique group name; the stable reference compounds carry.
    pub name: String,
    /// Display category for the periodic-table style dashboard.
    pub category: String,
    /// Hex color code, e.g. "#4caf50".
    pub color: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A therapeutic area a compound may target, e.g. "Oncology".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TherapeuticArea {
    /// Unique area name; the stable reference compounds carry.
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A disease a compound may treat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Disease {
    /// Unique disease name.
    pub name: String,
    pub description: Option<String>,
    /// ICD-10 code, if assigned.
    pub icd_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A clinical study or research paper associated with compounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Study {
    pub title: String,
    /// "clinical_trial", "preclinical", or "research_paper".
    pub study_type: Option<String>,
    /// For clinical trials: "Phase I" through "Phase IV".
    pub phase: Option<String>,
    /// "ongoing", "completed", or "terminated".
    pub status: Option<String>,
    pub principal_investigator: Option<String>,
    pub institution: Option<String>,
    pub pubmed_id: Option<String>,
    pub doi: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BiochemicalGroup {
    pub fn new(name: impl Into<String>, category: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            color: color.into(),
            description: None,
            created_at: Utc::now(),
        }
    }
}

impl TherapeuticArea {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            created_at: Utc::now(),
        }
    }
}

impl Disease {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icd_code: None,
            created_at: Utc::now(),
        }
    }
}

impl Study {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            study_type: None,
            phase: None,
            status: None,
            principal_investigator: None,
            institution: None,
            pubmed_id: None,
            doi: None,
            created_at: Utc::now(),
        }
    }
}
