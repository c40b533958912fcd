//! JSON codec for the CV record.
//!
//! Encoding is the full normalized tree, pretty-printed. Decoding tolerates
//! partial or older records: `serde(default)` backfills every missing section
//! and leaf, and `normalize()` runs on every decode path.

use crate::cv::models::CvRecord;

/// Serializes the full record tree to pretty-printed JSON.
pub fn encode(record: &CvRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

/// Parses a record from JSON text and normalizes it. Unknown keys are
/// ignored, absent keys are backfilled with defaults.
pub fn decode(text: &str) -> Result<CvRecord, serde_json::Error> {
    let mut record: CvRecord = serde_json::from_str(text)?;
    record.normalize();
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::models::Publication;

    #[test]
    fn test_round_trip_equals_normalized() {
        let mut record = CvRecord::default();
        record.personal_info.name = "Ada Lovelace".to_string();
        record.publications.by_year.insert(
            2024,
            vec![Publication {
                title: "Notes on the Analytical Engine".to_string(),
                ..Default::default()
            }],
        );
        record.normalize();

        let text = encode(&record).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_backfills_missing_sections_and_leaves() {
        let text = r#"{
            "personal_info": {"name": "Ada"},
            "publications": {"under_review": [{"title": "T"}]}
        }"#;
        let record = decode(text).unwrap();
        assert_eq!(record.personal_info.name, "Ada");
        assert_eq!(record.personal_info.email, "");
        assert_eq!(record.languages.english_speaking, "C2 (proficient)");
        assert_eq!(record.publications.under_review[0].title, "T");
        assert_eq!(record.publications.under_review[0].authors, "");
        assert_eq!(record.book.publisher, "");
        assert!(record.memberships.is_empty());
    }

    #[test]
    fn test_decode_parses_digit_string_year_keys() {
        let text = r#"{"publications": {"by_year": {"2024": [{"title": "T"}]}}}"#;
        let record = decode(text).unwrap();
        assert_eq!(record.publications.by_year[&2024].len(), 1);
    }

    #[test]
    fn test_decode_prunes_empty_year_buckets() {
        let text = r#"{"conference_proceedings": {"2019": []}}"#;
        let record = decode(text).unwrap();
        assert!(record.conference_proceedings.is_empty());
    }

    #[test]
    fn test_encode_writes_year_keys_as_digit_strings() {
        let mut record = CvRecord::default();
        record
            .publications
            .by_year
            .insert(2024, vec![Publication::default()]);
        let text = encode(&record).unwrap();
        assert!(text.contains("\"2024\""));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(decode("{not json").is_err());
    }
}
