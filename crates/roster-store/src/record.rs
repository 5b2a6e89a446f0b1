//! Conversion between `Candidate` and its persisted row form.

use roster_core::Candidate;
use serde::{Deserialize, Serialize};

use crate::client::{TableRow, Version};
use crate::tables::CANDIDATE_PARTITION;

/// A field-level decode problem that degraded to a default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeWarning {
    pub field: &'static str,
    pub detail: String,
}

/// Persisted form of a candidate: one row in the candidates table.
///
/// The row key doubles as the email, so the record carries no separate
/// email column. List fields are stored as JSON text columns to keep the
/// row itself flat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateRecord {
    pub partition_key: String,
    pub row_key: String,
    pub version: Version,
    pub first_name: String,
    pub last_name: String,
    pub current_role: String,
    pub skills_json: String,
    pub spoken_languages_json: String,
}

impl CandidateRecord {
    /// Encode a candidate for storage. Serializing a list of strings cannot
    /// fail, so neither can this.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            partition_key: CANDIDATE_PARTITION.to_string(),
            row_key: candidate.email.clone(),
            version: Version::default(),
            first_name: candidate.first_name.clone(),
            last_name: candidate.last_name.clone(),
            current_role: candidate.current_role.clone(),
            skills_json: encode_list(&candidate.skills),
            spoken_languages_json: encode_list(&candidate.spoken_languages),
        }
    }

    /// Decode back to a candidate.
    ///
    /// Malformed JSON in a list column degrades to an empty list for that
    /// field and is reported as a warning; the record itself always decodes.
    /// A corrupted auxiliary column must not block visibility of the
    /// candidate's core attributes.
    pub fn to_candidate(&self) -> (Candidate, Vec<DecodeWarning>) {
        let mut warnings = Vec::new();
        let skills = decode_list("skills_json", &self.skills_json, &mut warnings);
        let spoken_languages = decode_list(
            "spoken_languages_json",
            &self.spoken_languages_json,
            &mut warnings,
        );
        let candidate = Candidate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.row_key.clone(),
            current_role: self.current_role.clone(),
            skills,
            spoken_languages,
        };
        (candidate, warnings)
    }
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn decode_list(
    field: &'static str,
    json: &str,
    warnings: &mut Vec<DecodeWarning>,
) -> Vec<String> {
    if json.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(json) {
        Ok(items) => items,
        Err(e) => {
            warnings.push(DecodeWarning {
                field,
                detail: e.to_string(),
            });
            Vec::new()
        }
    }
}

impl TableRow for CandidateRecord {
    fn partition_key(&self) -> &str {
        &self.partition_key
    }

    fn row_key(&self) -> &str {
        &self.row_key
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}
