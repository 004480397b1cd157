use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::store::{append_row, open_reader, parse_id};

pub const RESUME_HEADER: [&str; 3] = ["id", "resumename", "ocr_result"];

/// One extracted resume. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: u64,
    #[serde(rename = "resumename")]
    pub filename: String,
    #[serde(rename = "ocr_result")]
    pub text: String,
}

/// `id,resumename,ocr_result` CSV store.
#[derive(Debug, Clone)]
pub struct ResumeStore {
    path: PathBuf,
}

impl ResumeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// 1 for a missing or header-only store, otherwise last row's id + 1.
    pub fn next_id(&self) -> Result<u64, StoreError> {
        let Some(mut reader) = open_reader(&self.path)? else {
            return Ok(1);
        };

        let mut last: Option<u64> = None;
        for row in reader.records() {
            let row = row?;
            if let Some(raw) = row.get(0) {
                last = Some(parse_id(&self.path, raw)?);
            }
        }
        Ok(last.map_or(1, |id| id + 1))
    }

    /// Appends one row and syncs it before returning.
    pub fn append(&self, id: u64, filename: &str, text: &str) -> Result<(), StoreError> {
        let record = ResumeRecord {
            id,
            filename: filename.to_string(),
            text: text.to_string(),
        };
        append_row(&self.path, &RESUME_HEADER, &record)
    }

    /// Every record, in file order.
    pub fn load_all(&self) -> Result<Vec<ResumeRecord>, StoreError> {
        let Some(mut reader) = open_reader(&self.path)? else {
            return Ok(Vec::new());
        };
        reader
            .deserialize::<ResumeRecord>()
            .map(|row| row.map_err(StoreError::from))
            .collect()
    }

    /// Filenames already extracted, so re-runs only pick up new PDFs.
    pub fn known_filenames(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|record| record.filename)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ResumeStore {
        ResumeStore::new(dir.path().join("ocr_results.csv"))
    }

    #[test]
    fn test_next_id_is_one_for_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).next_id().unwrap(), 1);
    }

    #[test]
    fn test_next_id_is_one_for_header_only_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "id,resumename,ocr_result\n").unwrap();
        assert_eq!(store.next_id().unwrap(), 1);
    }

    #[test]
    fn test_next_id_follows_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "id,resumename,ocr_result\n1,a.pdf,alpha\n2,b.pdf,beta\n7,c.pdf,gamma\n",
        )
        .unwrap();
        assert_eq!(store.next_id().unwrap(), 8);
    }

    #[test]
    fn test_append_writes_header_once_and_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.append(1, "alice.pdf", "Rust, Go").unwrap();
        store.append(2, "bob.pdf", "line one\nline \"two\", quoted").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("id,resumename,ocr_result\n"));
        assert_eq!(raw.matches("id,resumename").count(), 1);

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text, "line one\nline \"two\", quoted");
        assert_eq!(store.next_id().unwrap(), 3);
    }

    #[test]
    fn test_empty_text_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append(1, "blank.pdf", "").unwrap();
        let records = store.load_all().unwrap();
        assert_eq!(records[0].text, "");
    }

    #[test]
    fn test_append_to_existing_header_only_file_keeps_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "id,resumename,ocr_result\n").unwrap();

        store.append(1, "a.pdf", "text").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "id,resumename,ocr_result\n1,a.pdf,text\n");
    }

    #[test]
    fn test_torn_trailing_row_is_ignored_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append(1, "a.pdf", "alpha").unwrap();
        // Crash mid-append: the row never got its terminator.
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(store.path())
            .unwrap();
        std::io::Write::write_all(&mut file, b"2,b.pdf,partial te").unwrap();
        drop(file);

        assert_eq!(store.next_id().unwrap(), 2);
        assert_eq!(store.known_filenames().unwrap(), HashSet::from(["a.pdf".to_string()]));

        store.append(2, "c.pdf", "gamma").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "id,resumename,ocr_result\n1,a.pdf,alpha\n2,c.pdf,gamma\n");
        let ids: Vec<u64> = store.load_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.next_id().unwrap(), 3);
    }

    #[test]
    fn test_torn_header_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "id,resumen").unwrap();

        assert_eq!(store.next_id().unwrap(), 1);
        store.append(1, "a.pdf", "text").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "id,resumename,ocr_result\n1,a.pdf,text\n");
    }

    #[test]
    fn test_known_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append(1, "a.pdf", "x").unwrap();
        store.append(2, "b.pdf", "y").unwrap();

        let known = store.known_filenames().unwrap();
        assert!(known.contains("a.pdf"));
        assert!(known.contains("b.pdf"));
        assert_eq!(known.len(), 2);
    }

    #[test]
    fn test_malformed_id_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "id,resumename,ocr_result\nabc,a.pdf,x\n").unwrap();
        let err = store.next_id().unwrap_err();
        assert!(matches!(err, StoreError::MalformedId { .. }));
    }
}
