use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::evaluation::AuditStatus;
use crate::store::{append_row, open_reader, parse_id};

pub const VERDICT_HEADER: [&str; 5] = ["id", "resumename", "score", "status", "evaluation"];

/// One evaluated resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub id: u64,
    #[serde(rename = "resumename")]
    pub filename: String,
    /// Numeric text scraped from the evaluation, or "N/A".
    pub score: String,
    pub status: AuditStatus,
    #[serde(rename = "evaluation")]
    pub evaluation_text: String,
}

/// `id,resumename,score,status,evaluation` CSV store.
#[derive(Debug, Clone)]
pub struct VerdictStore {
    path: PathBuf,
}

impl VerdictStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &VerdictRecord) -> Result<(), StoreError> {
        append_row(&self.path, &VERDICT_HEADER, record)
    }

    /// Ids that already have a verdict row.
    pub fn evaluated_ids(&self) -> Result<HashSet<u64>, StoreError> {
        let Some(mut reader) = open_reader(&self.path)? else {
            return Ok(HashSet::new());
        };

        let mut ids = HashSet::new();
        for row in reader.records() {
            let row = row?;
            if let Some(raw) = row.get(0) {
                ids.insert(parse_id(&self.path, raw)?);
            }
        }
        Ok(ids)
    }

    pub fn load_all(&self) -> Result<Vec<VerdictRecord>, StoreError> {
        let Some(mut reader) = open_reader(&self.path)? else {
            return Ok(Vec::new());
        };
        reader
            .deserialize::<VerdictRecord>()
            .map(|row| row.map_err(StoreError::from))
            .collect()
    }
}
