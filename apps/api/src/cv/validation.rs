//! Record validation.
//!
//! All rules are evaluated in full and every violation is reported together;
//! nothing here panics or returns early. Validation errors are data — they
//! block save/export but are never raised as control flow.

use std::sync::LazyLock;

use regex::Regex;

use crate::cv::models::CvRecord;

// Permissive URL shape: optional http(s) scheme, a host with at least one
// dot, then optionally a path/query/fragment. Label classes are ASCII only,
// so non-ASCII hosts fail.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?[0-9A-Za-z_-]+(\.[0-9A-Za-z_-]+)+[/#?]?.*$")
        .expect("URL pattern compiles")
});

/// Empty strings are valid — URL fields are all optional.
pub fn is_valid_url(url: &str) -> bool {
    url.is_empty() || URL_RE.is_match(url)
}

fn check_url(errors: &mut Vec<String>, context: String, url: &str) {
    if !url.is_empty() && !is_valid_url(url) {
        errors.push(format!("Invalid URL in {context}: {url}"));
    }
}

/// Checks required fields and URL syntax across the whole record, returning
/// every violation. An empty result means the record may be saved/exported.
pub fn validate(record: &CvRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if record.personal_info.name.is_empty() {
        errors.push("Full Name is required.".to_string());
    }
    if record.languages.mother_tongue.is_empty() {
        errors.push("Mother Tongue is required.".to_string());
    }

    for publication in &record.publications.under_review {
        check_url(
            &mut errors,
            "Under Review Publication".to_string(),
            &publication.url,
        );
    }
    for (year, publications) in &record.publications.by_year {
        for publication in publications {
            check_url(
                &mut errors,
                format!("Publication (Year {year})"),
                &publication.url,
            );
        }
    }
    for (year, proceedings) in &record.conference_proceedings {
        for proceeding in proceedings {
            check_url(
                &mut errors,
                format!("Conference Proceeding (Year {year})"),
                &proceeding.url,
            );
        }
    }
    for profile in &record.academic_activities.profiles {
        check_url(&mut errors, "Scholarly Profile".to_string(), &profile.url);
    }
    for talk in &record.academic_activities.talks {
        check_url(&mut errors, "Invited Talk".to_string(), &talk.url);
    }
    for editorial in &record.academic_activities.editorial {
        check_url(&mut errors, "Editorial Work".to_string(), &editorial.url);
    }
    for membership in &record.memberships {
        check_url(&mut errors, "Membership".to_string(), &membership.url);
    }
    for software in &record.skills.softwares {
        check_url(&mut errors, "Software".to_string(), &software.url);
    }

    errors
}
