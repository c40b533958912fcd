//! CV record schema.
//!
//! The whole record is a tree of typed sections. Every leaf is a string that
//! defaults to empty, and every struct is `#[serde(default)]` so partial or
//! older JSON decodes cleanly — missing keys are backfilled instead of
//! rejected. Year-keyed collections use a parsed integer key internally;
//! serde_json maps integer keys to plain digit strings at the JSON boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Year bucket key. Digit-only input is enforced at the edit boundary
/// (`collections::parse_year`); everything past that point is numeric.
pub type Year = u32;

/// The fixed proficiency scale, ordered from strongest to weakest. Language
/// proficiency fields only ever hold one of these values.
pub const PROFICIENCY_LEVELS: [&str; 6] = [
    "C2 (proficient)",
    "C1 (proficient)",
    "B2 (independent)",
    "B1 (independent)",
    "A2 (basic)",
    "A1 (basic)",
];

pub fn is_proficiency_level(value: &str) -> bool {
    PROFICIENCY_LEVELS.contains(&value)
}

fn default_proficiency() -> String {
    PROFICIENCY_LEVELS[0].to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub nationality: String,
    pub dob: String,
    pub current_address: String,
    pub permanent_address: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Languages {
    pub mother_tongue: String,
    #[serde(default = "default_proficiency")]
    pub english_listening: String,
    #[serde(default = "default_proficiency")]
    pub english_reading: String,
    #[serde(default = "default_proficiency")]
    pub english_speaking: String,
    #[serde(default = "default_proficiency")]
    pub english_writing: String,
    #[serde(default = "default_proficiency")]
    pub hindi_listening: String,
    #[serde(default = "default_proficiency")]
    pub hindi_reading: String,
    #[serde(default = "default_proficiency")]
    pub hindi_speaking: String,
    #[serde(default = "default_proficiency")]
    pub hindi_writing: String,
}

impl Default for Languages {
    fn default() -> Self {
        Languages {
            mother_tongue: String::new(),
            english_listening: default_proficiency(),
            english_reading: default_proficiency(),
            english_speaking: default_proficiency(),
            english_writing: default_proficiency(),
            hindi_listening: default_proficiency(),
            hindi_reading: default_proficiency(),
            hindi_speaking: default_proficiency(),
            hindi_writing: default_proficiency(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub duration: String,
    pub position: String,
    pub employer: String,
    pub activity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub duration: String,
    pub qualification: String,
    pub thesis_title: String,
    pub organization: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Publication {
    pub authors: String,
    pub title: String,
    pub journal: String,
    pub url: String,
    pub impact_factor: String,
    pub citations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Publications {
    pub under_review: Vec<Publication>,
    pub by_year: BTreeMap<Year, Vec<Publication>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceProceeding {
    pub authors: String,
    pub title: String,
    pub venue: String,
    pub url: String,
    pub citations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    pub authors: String,
    pub title: String,
    pub publisher: String,
    pub year: String,
    pub isbn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceActivity {
    pub date: String,
    pub role: String,
    pub event: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Talk {
    pub date: String,
    pub title: String,
    pub event: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Editorial {
    pub date: String,
    pub role: String,
    pub journal: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewEntry {
    pub year: String,
    pub count: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicActivities {
    pub conferences: Vec<ConferenceActivity>,
    pub talks: Vec<Talk>,
    pub editorial: Vec<Editorial>,
    pub profiles: Vec<Profile>,
    pub reviews: Vec<ReviewEntry>,
    pub journals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grant {
    pub duration: String,
    pub agency: String,
    pub category: String,
    pub number: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    pub year: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantsAwards {
    pub grants: Vec<Grant>,
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Software {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub h_index: String,
    pub researchgate_score: String,
    pub programming_languages: String,
    pub softwares: Vec<Software>,
    pub parallel_computing: String,
    pub experiments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Membership {
    pub name: String,
    pub url: String,
    pub details: String,
}

/// Root of the CV tree. The editing session owns exactly one of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvRecord {
    pub personal_info: PersonalInfo,
    pub languages: Languages,
    pub professional_experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub publications: Publications,
    pub conference_proceedings: BTreeMap<Year, Vec<ConferenceProceeding>>,
    pub book: Book,
    pub academic_activities: AcademicActivities,
    pub grants_awards: GrantsAwards,
    pub skills: Skills,
    pub memberships: Vec<Membership>,
    /// ISO-8601, set only at save time.
    pub last_updated: String,
}

impl CvRecord {
    /// Restores the record invariants after a tolerant decode: an emptied
    /// year bucket must not linger as an empty sequence. Missing sections and
    /// leaf fields are already backfilled by `serde(default)`; this only
    /// prunes. Idempotent.
    pub fn normalize(&mut self) {
        self.publications.by_year.retain(|_, pubs| !pubs.is_empty());
        self.conference_proceedings.retain(|_, confs| !confs.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_has_empty_leaves() {
        let record = CvRecord::default();
        assert_eq!(record.personal_info.name, "");
        assert_eq!(record.languages.mother_tongue, "");
        assert_eq!(record.book.isbn, "");
        assert_eq!(record.skills.h_index, "");
        assert!(record.professional_experience.is_empty());
        assert!(record.publications.by_year.is_empty());
        assert_eq!(record.last_updated, "");
    }

    #[test]
    fn test_proficiency_defaults_to_strongest_level() {
        let langs = Languages::default();
        assert_eq!(langs.english_listening, "C2 (proficient)");
        assert_eq!(langs.hindi_writing, "C2 (proficient)");
        assert!(is_proficiency_level(&langs.english_reading));
        assert!(!is_proficiency_level("C3 (superhuman)"));
    }

    #[test]
    fn test_normalize_prunes_empty_year_buckets() {
        let mut record = CvRecord::default();
        record.publications.by_year.insert(2023, vec![]);
        record
            .publications
            .by_year
            .insert(2024, vec![Publication::default()]);
        record.conference_proceedings.insert(2020, vec![]);

        record.normalize();

        assert!(!record.publications.by_year.contains_key(&2023));
        assert!(record.publications.by_year.contains_key(&2024));
        assert!(record.conference_proceedings.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut record = CvRecord::default();
        record.publications.by_year.insert(1999, vec![]);
        record
            .publications
            .by_year
            .insert(2024, vec![Publication::default()]);

        record.normalize();
        let once = record.clone();
        record.normalize();
        assert_eq!(record, once);
    }
}
