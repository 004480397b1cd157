//! Append-only CSV stores.
//!
//! Every append writes the header if the file is new or empty, writes exactly
//! one row at the end of the last complete row, then flushes and fsyncs before
//! returning. Files are never rewritten; the only truncation is dropping a
//! torn trailing row left by a crash mid-append.

pub mod resume_store;
pub mod verdict_store;

use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::errors::StoreError;

pub use resume_store::ResumeStore;
pub use verdict_store::{VerdictRecord, VerdictStore};

/// Appends one serialized row (plus `header` when the file is empty) and syncs it to disk.
fn append_row<R: Serialize>(path: &Path, header: &[&str], row: &R) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;

    let mut existing = Vec::new();
    file.read_to_end(&mut existing)?;
    let complete = complete_prefix_len(&existing);
    if complete < existing.len() {
        warn!(
            "Discarding {} bytes of torn trailing row in {:?}",
            existing.len() - complete,
            path
        );
        file.set_len(complete as u64)?;
    }
    file.seek(SeekFrom::Start(complete as u64))?;
    let needs_header = complete == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(header)?;
    }
    writer.serialize(row)?;
    writer.flush()?;

    let file: File = writer.into_inner()?;
    file.sync_all()?;
    Ok(())
}

/// Opens a reader over the complete rows of `path`, or `None` if the store does not exist yet.
/// A torn trailing row is left out.
fn open_reader(path: &Path) -> Result<Option<csv::Reader<Cursor<Vec<u8>>>>, StoreError> {
    let mut bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    bytes.truncate(complete_prefix_len(&bytes));

    Ok(Some(
        csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(Cursor::new(bytes)),
    ))
}

/// Length of the leading run of newline-terminated records.
/// A newline inside a quoted field does not end a record.
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let mut in_quotes = false;
    let mut end = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => end = i + 1,
            _ => {}
        }
    }
    end
}

/// Parses the `id` column of a raw row.
fn parse_id(path: &Path, value: &str) -> Result<u64, StoreError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| StoreError::MalformedId {
            path: path.to_path_buf(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_prefix_stops_at_last_terminated_row() {
        let raw = b"id,resumename,ocr_result\n1,a.pdf,alpha\n2,b.pdf,partial te";
        assert_eq!(complete_prefix_len(raw), "id,resumename,ocr_result\n1,a.pdf,alpha\n".len());
    }

    #[test]
    fn test_complete_prefix_ignores_newline_inside_quotes() {
        let raw = b"id,resumename,ocr_result\n1,a.pdf,\"line one\nline";
        assert_eq!(complete_prefix_len(raw), "id,resumename,ocr_result\n".len());
    }

    #[test]
    fn test_complete_prefix_keeps_quoted_multiline_rows() {
        let raw = b"h\n1,a.pdf,\"x\ny, \"\"q\"\"\"\n";
        assert_eq!(complete_prefix_len(raw), raw.len());
    }

    #[test]
    fn test_complete_prefix_of_unterminated_header_is_zero() {
        assert_eq!(complete_prefix_len(b"id,resumename"), 0);
        assert_eq!(complete_prefix_len(b""), 0);
    }
}
