//! Domain types for Roster.

use serde::{Deserialize, Serialize};

/// A candidate profile.
///
/// The email is the unique identity; everything else is descriptive.
/// Deserialization accepts snake_case, camelCase, and PascalCase field
/// names (seed documents come from a mix of sources), and any omitted
/// field defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Candidate {
    #[serde(alias = "firstName", alias = "FirstName")]
    pub first_name: String,
    #[serde(alias = "lastName", alias = "LastName")]
    pub last_name: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "currentRole", alias = "CurrentRole")]
    pub current_role: String,
    /// Ordered list of skills.
    #[serde(alias = "Skills")]
    pub skills: Vec<String>,
    /// Ordered list of spoken languages.
    #[serde(alias = "spokenLanguages", alias = "SpokenLanguages")]
    pub spoken_languages: Vec<String>,
}

impl Candidate {
    /// Display name derived from first and last name (never stored).
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
