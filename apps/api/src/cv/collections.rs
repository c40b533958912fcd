//! Nested-collection editing operations.
//!
//! Every editable sequence in the record supports append / update / remove.
//! Append pushes a fully-defaulted entry and returns its index. Update
//! patches only the named fields. Remove shifts later entries down and, for
//! year-keyed collections, deletes the year key once its bucket empties.
//!
//! Year-bucket creation requires a non-empty all-digit year string; anything
//! else is silently refused (the operation is a no-op, logged at warn).
//! Out-of-range indices and missing buckets on update/remove are programming
//! errors and panic.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::cv::models::{
    Award, ConferenceActivity, ConferenceProceeding, CvRecord, Editorial, Education, Experience,
    Grant, Membership, Profile, Publication, ReviewEntry, Software, Talk, Year,
};

/// Every collection an editing session can target. Deserializes from the
/// snake_case path segment in the collection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    ProfessionalExperience,
    Education,
    /// `publications.under_review`
    UnderReview,
    /// `publications.by_year` — year-keyed
    ByYear,
    /// year-keyed
    ConferenceProceedings,
    Conferences,
    Talks,
    Editorial,
    Profiles,
    Reviews,
    /// Sequence of bare strings; updates patch through the `"value"` key.
    Journals,
    Grants,
    Awards,
    Softwares,
    Memberships,
}

/// Accepts only non-empty all-digit year strings.
pub fn parse_year(raw: &str) -> Option<Year> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Field-level patching for collection entries. Returns false for a field
/// name the entry does not have.
trait PatchFields {
    fn set_field(&mut self, name: &str, value: String) -> bool;
}

macro_rules! patchable {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl PatchFields for $ty {
            fn set_field(&mut self, name: &str, value: String) -> bool {
                match name {
                    $(stringify!($field) => {
                        self.$field = value;
                        true
                    })+
                    _ => false,
                }
            }
        }
    };
}

patchable!(Experience { duration, position, employer, activity });
patchable!(Education { duration, qualification, thesis_title, organization });
patchable!(Publication { authors, title, journal, url, impact_factor, citations });
patchable!(ConferenceProceeding { authors, title, venue, url, citations });
patchable!(ConferenceActivity { date, role, event, url });
patchable!(Talk { date, title, event, url });
patchable!(Editorial { date, role, journal, url });
patchable!(Profile { name, url });
patchable!(ReviewEntry { year, count });
patchable!(Grant { duration, agency, category, number, amount });
patchable!(Award { year, description });
patchable!(Software { name, url });
patchable!(Membership { name, url, details });

fn push_default<T: Default>(items: &mut Vec<T>) -> usize {
    items.push(T::default());
    items.len() - 1
}

fn append_to_bucket<T: Default>(
    map: &mut BTreeMap<Year, Vec<T>>,
    year: Option<&str>,
) -> Option<usize> {
    let Some(year) = year.and_then(parse_year) else {
        warn!(year = ?year, "refusing year-bucket append: year must be a non-empty digit string");
        return None;
    };
    let bucket = map.entry(year).or_default();
    bucket.push(T::default());
    Some(bucket.len() - 1)
}

fn bucket_mut<'a, T>(map: &'a mut BTreeMap<Year, Vec<T>>, year: Option<&str>) -> &'a mut Vec<T> {
    let year = year
        .and_then(parse_year)
        .unwrap_or_else(|| panic!("year-bucket operation without a valid year: {year:?}"));
    map.get_mut(&year)
        .unwrap_or_else(|| panic!("no bucket for year {year}"))
}

fn patch<T: PatchFields>(items: &mut [T], index: usize, fields: &BTreeMap<String, String>) {
    let item = &mut items[index];
    for (name, value) in fields {
        if !item.set_field(name, value.clone()) {
            warn!(field = %name, "ignoring unknown field in collection update");
        }
    }
}

fn remove_from_bucket<T>(map: &mut BTreeMap<Year, Vec<T>>, year: Option<&str>, index: usize) {
    let parsed = year
        .and_then(parse_year)
        .unwrap_or_else(|| panic!("year-bucket operation without a valid year: {year:?}"));
    let bucket = map
        .get_mut(&parsed)
        .unwrap_or_else(|| panic!("no bucket for year {parsed}"));
    bucket.remove(index);
    if bucket.is_empty() {
        map.remove(&parsed);
    }
}

impl CvRecord {
    /// Appends a fully-defaulted entry to the targeted collection and returns
    /// its index. Returns `None` when a year-keyed target is missing a valid
    /// year (the operation is refused, not an error).
    pub fn append_item(&mut self, kind: CollectionKind, year: Option<&str>) -> Option<usize> {
        match kind {
            CollectionKind::ProfessionalExperience => {
                Some(push_default(&mut self.professional_experience))
            }
            CollectionKind::Education => Some(push_default(&mut self.education)),
            CollectionKind::UnderReview => Some(push_default(&mut self.publications.under_review)),
            CollectionKind::ByYear => append_to_bucket(&mut self.publications.by_year, year),
            CollectionKind::ConferenceProceedings => {
                append_to_bucket(&mut self.conference_proceedings, year)
            }
            CollectionKind::Conferences => {
                Some(push_default(&mut self.academic_activities.conferences))
            }
            CollectionKind::Talks => Some(push_default(&mut self.academic_activities.talks)),
            CollectionKind::Editorial => {
                Some(push_default(&mut self.academic_activities.editorial))
            }
            CollectionKind::Profiles => Some(push_default(&mut self.academic_activities.profiles)),
            CollectionKind::Reviews => Some(push_default(&mut self.academic_activities.reviews)),
            CollectionKind::Journals => {
                self.academic_activities.journals.push(String::new());
                Some(self.academic_activities.journals.len() - 1)
            }
            CollectionKind::Grants => Some(push_default(&mut self.grants_awards.grants)),
            CollectionKind::Awards => Some(push_default(&mut self.grants_awards.awards)),
            CollectionKind::Softwares => Some(push_default(&mut self.skills.softwares)),
            CollectionKind::Memberships => Some(push_default(&mut self.memberships)),
        }
    }

    /// Overwrites only the named fields on the entry at `index`. Unknown
    /// field names are dropped with a warning.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range, or when a year-keyed target has a
    /// missing, malformed, or absent year — callers pass indices and years
    /// read from the current record.
    pub fn update_item(
        &mut self,
        kind: CollectionKind,
        year: Option<&str>,
        index: usize,
        fields: &BTreeMap<String, String>,
    ) {
        match kind {
            CollectionKind::ProfessionalExperience => {
                patch(&mut self.professional_experience, index, fields)
            }
            CollectionKind::Education => patch(&mut self.education, index, fields),
            CollectionKind::UnderReview => patch(&mut self.publications.under_review, index, fields),
            CollectionKind::ByYear => {
                patch(bucket_mut(&mut self.publications.by_year, year), index, fields)
            }
            CollectionKind::ConferenceProceedings => {
                patch(bucket_mut(&mut self.conference_proceedings, year), index, fields)
            }
            CollectionKind::Conferences => {
                patch(&mut self.academic_activities.conferences, index, fields)
            }
            CollectionKind::Talks => patch(&mut self.academic_activities.talks, index, fields),
            CollectionKind::Editorial => {
                patch(&mut self.academic_activities.editorial, index, fields)
            }
            CollectionKind::Profiles => patch(&mut self.academic_activities.profiles, index, fields),
            CollectionKind::Reviews => patch(&mut self.academic_activities.reviews, index, fields),
            CollectionKind::Journals => {
                // Bare strings: the new text arrives under the "value" key.
                if let Some(value) = fields.get("value") {
                    self.academic_activities.journals[index] = value.clone();
                } else {
                    warn!("journal update without a \"value\" field");
                }
            }
            CollectionKind::Grants => patch(&mut self.grants_awards.grants, index, fields),
            CollectionKind::Awards => patch(&mut self.grants_awards.awards, index, fields),
            CollectionKind::Softwares => patch(&mut self.skills.softwares, index, fields),
            CollectionKind::Memberships => patch(&mut self.memberships, index, fields),
        }
    }

    /// Removes the entry at `index`, shifting later entries down. Deletes the
    /// year key when a year bucket empties.
    ///
    /// # Panics
    ///
    /// Same contract as [`CvRecord::update_item`].
    pub fn remove_item(&mut self, kind: CollectionKind, year: Option<&str>, index: usize) {
        match kind {
            CollectionKind::ProfessionalExperience => {
                self.professional_experience.remove(index);
            }
            CollectionKind::Education => {
                self.education.remove(index);
            }
            CollectionKind::UnderReview => {
                self.publications.under_review.remove(index);
            }
            CollectionKind::ByYear => remove_from_bucket(&mut self.publications.by_year, year, index),
            CollectionKind::ConferenceProceedings => {
                remove_from_bucket(&mut self.conference_proceedings, year, index)
            }
            CollectionKind::Conferences => {
                self.academic_activities.conferences.remove(index);
            }
            CollectionKind::Talks => {
                self.academic_activities.talks.remove(index);
            }
            CollectionKind::Editorial => {
                self.academic_activities.editorial.remove(index);
            }
            CollectionKind::Profiles => {
                self.academic_activities.profiles.remove(index);
            }
            CollectionKind::Reviews => {
                self.academic_activities.reviews.remove(index);
            }
            CollectionKind::Journals => {
                self.academic_activities.journals.remove(index);
            }
            CollectionKind::Grants => {
                self.grants_awards.grants.remove(index);
            }
            CollectionKind::Awards => {
                self.grants_awards.awards.remove(index);
            }
            CollectionKind::Softwares => {
                self.skills.softwares.remove(index);
            }
            CollectionKind::Memberships => {
                self.memberships.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2024"), Some(2024));
        assert_eq!(parse_year("0042"), Some(42));
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("20x4"), None);
        assert_eq!(parse_year("-2024"), None);
        assert_eq!(parse_year("２０２４"), None); // full-width digits
    }

    #[test]
    fn test_append_returns_new_index() {
        let mut record = CvRecord::default();
        assert_eq!(
            record.append_item(CollectionKind::ProfessionalExperience, None),
            Some(0)
        );
        assert_eq!(
            record.append_item(CollectionKind::ProfessionalExperience, None),
            Some(1)
        );
        assert_eq!(record.professional_experience.len(), 2);
        assert_eq!(record.professional_experience[1].position, "");
    }

    #[test]
    fn test_append_then_remove_restores_length() {
        let mut record = CvRecord::default();
        record.append_item(CollectionKind::Memberships, None);
        let before = record.memberships.len();
        let index = record.append_item(CollectionKind::Memberships, None).unwrap();
        record.remove_item(CollectionKind::Memberships, None, index);
        assert_eq!(record.memberships.len(), before);
    }

    #[test]
    fn test_year_bucket_append_creates_bucket() {
        let mut record = CvRecord::default();
        let index = record.append_item(CollectionKind::ByYear, Some("2024"));
        assert_eq!(index, Some(0));
        assert_eq!(record.publications.by_year[&2024].len(), 1);
    }

    #[test]
    fn test_year_bucket_rejects_non_digit_year() {
        let mut record = CvRecord::default();
        assert_eq!(record.append_item(CollectionKind::ByYear, Some("20 24")), None);
        assert_eq!(record.append_item(CollectionKind::ByYear, Some("")), None);
        assert_eq!(record.append_item(CollectionKind::ByYear, None), None);
        assert!(record.publications.by_year.is_empty());
    }

    #[test]
    fn test_removing_last_item_deletes_year_key() {
        let mut record = CvRecord::default();
        record.append_item(CollectionKind::ByYear, Some("2024"));
        record.remove_item(CollectionKind::ByYear, Some("2024"), 0);
        assert!(!record.publications.by_year.contains_key(&2024));
    }

    #[test]
    fn test_remove_keeps_year_key_while_bucket_nonempty() {
        let mut record = CvRecord::default();
        record.append_item(CollectionKind::ConferenceProceedings, Some("2023"));
        record.append_item(CollectionKind::ConferenceProceedings, Some("2023"));
        record.remove_item(CollectionKind::ConferenceProceedings, Some("2023"), 0);
        assert_eq!(record.conference_proceedings[&2023].len(), 1);
    }

    #[test]
    fn test_update_patches_only_named_fields() {
        let mut record = CvRecord::default();
        record.append_item(CollectionKind::UnderReview, None);
        record.update_item(
            CollectionKind::UnderReview,
            None,
            0,
            &fields(&[("title", "Deep CV"), ("journal", "Nature")]),
        );
        let publication = &record.publications.under_review[0];
        assert_eq!(publication.title, "Deep CV");
        assert_eq!(publication.journal, "Nature");
        assert_eq!(publication.authors, "");
    }

    #[test]
    fn test_update_ignores_unknown_fields() {
        let mut record = CvRecord::default();
        record.append_item(CollectionKind::Softwares, None);
        record.update_item(
            CollectionKind::Softwares,
            None,
            0,
            &fields(&[("name", "octave"), ("license", "GPL")]),
        );
        assert_eq!(record.skills.softwares[0].name, "octave");
    }

    #[test]
    fn test_journals_are_bare_strings() {
        let mut record = CvRecord::default();
        let index = record.append_item(CollectionKind::Journals, None).unwrap();
        assert_eq!(record.academic_activities.journals[index], "");
        record.update_item(
            CollectionKind::Journals,
            None,
            index,
            &fields(&[("value", "Physics of Fluids")]),
        );
        assert_eq!(record.academic_activities.journals[0], "Physics of Fluids");
        record.remove_item(CollectionKind::Journals, None, 0);
        assert!(record.academic_activities.journals.is_empty());
    }

    #[test]
    fn test_remove_shifts_later_indices_down() {
        let mut record = CvRecord::default();
        record.append_item(CollectionKind::Education, None);
        record.append_item(CollectionKind::Education, None);
        record.update_item(
            CollectionKind::Education,
            None,
            1,
            &fields(&[("qualification", "PhD")]),
        );
        record.remove_item(CollectionKind::Education, None, 0);
        assert_eq!(record.education.len(), 1);
        assert_eq!(record.education[0].qualification, "PhD");
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_remove_panics() {
        let mut record = CvRecord::default();
        record.remove_item(CollectionKind::Education, None, 0);
    }

    #[test]
    #[should_panic]
    fn test_update_missing_year_bucket_panics() {
        let mut record = CvRecord::default();
        record.update_item(CollectionKind::ByYear, Some("2024"), 0, &BTreeMap::new());
    }
}
