//! Single-table persisted store.
//!
//! A store is a self-contained SQLite file the user uploads and downloads:
//! one table mapping a filename to its raw text content plus a creation
//! timestamp. Writes are whole-row upserts inside one transaction. Store
//! files are named with a coarse per-minute timestamp; a second write within
//! the same minute lands on the same path and overwrites the rows.

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection};

pub const DATA_FILENAME: &str = "cv_data.json";
pub const TEMPLATE_FILENAME: &str = "cv_template.tex";
pub const STYLE_FILENAME: &str = "cv_style.sty";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cv_files (
    filename TEXT PRIMARY KEY,
    content TEXT,
    created_at TEXT
)
"#;

/// One row of the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub content: String,
    pub created_at: String,
}

/// `<prefix><YYYYMMDDHHMM>.db`
pub fn db_filename(prefix: &str, at: DateTime<Local>) -> String {
    format!("{prefix}{}.db", at.format("%Y%m%d%H%M"))
}

/// Upserts the given files into the store at `path`, creating the file and
/// table as needed. All rows share one `created_at` and commit together.
pub fn write_store(path: &Path, files: &[(&str, &str)]) -> Result<(), rusqlite::Error> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let tx = conn.transaction()?;
    let created_at = Utc::now().to_rfc3339();
    for (filename, content) in files {
        tx.execute(
            "INSERT OR REPLACE INTO cv_files (filename, content, created_at) VALUES (?1, ?2, ?3)",
            params![filename, content, created_at],
        )?;
    }
    tx.commit()
}

/// Reads every row of the store at `path`.
pub fn read_store(path: &Path) -> Result<Vec<StoredFile>, rusqlite::Error> {
    let conn = Connection::open(path)?;
    let mut stmt = conn.prepare("SELECT filename, content, created_at FROM cv_files")?;
    let rows = stmt.query_map([], |row| {
        Ok(StoredFile {
            filename: row.get(0)?,
            content: row.get(1)?,
            created_at: row.get(2)?,
        })
    })?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_db_filename_uses_minute_precision() {
        let at = Local.with_ymd_and_hms(2025, 3, 7, 14, 5, 59).unwrap();
        assert_eq!(db_filename("cv", at), "cv202503071405.db");
        assert_eq!(db_filename("publications_", at), "publications_202503071405.db");
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.db");

        write_store(
            &path,
            &[
                (DATA_FILENAME, "{}"),
                (TEMPLATE_FILENAME, "\\documentclass{article}"),
                (STYLE_FILENAME, "% style"),
            ],
        )
        .unwrap();

        let rows = read_store(&path).unwrap();
        assert_eq!(rows.len(), 3);
        let content_of = |name: &str| {
            rows.iter()
                .find(|row| row.filename == name)
                .map(|row| row.content.clone())
                .unwrap()
        };
        assert_eq!(content_of(DATA_FILENAME), "{}");
        assert_eq!(content_of(TEMPLATE_FILENAME), "\\documentclass{article}");
        assert_eq!(content_of(STYLE_FILENAME), "% style");
        assert!(rows.iter().all(|row| !row.created_at.is_empty()));
    }

    #[test]
    fn test_upsert_replaces_row_with_later_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.db");

        write_store(&path, &[(DATA_FILENAME, "first")]).unwrap();
        let first = read_store(&path).unwrap().remove(0);

        std::thread::sleep(std::time::Duration::from_millis(10));
        write_store(&path, &[(DATA_FILENAME, "second")]).unwrap();

        let rows = read_store(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "second");

        let t0 = DateTime::parse_from_rfc3339(&first.created_at).unwrap();
        let t1 = DateTime::parse_from_rfc3339(&rows[0].created_at).unwrap();
        assert!(t1 > t0);
    }

    #[test]
    fn test_read_rejects_non_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, "this is not sqlite").unwrap();
        assert!(read_store(&path).is_err());
    }
}
