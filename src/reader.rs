//! Tolerant reader for raw extracts of unknown delimiter and encoding.
//!
//! [`read_table`] walks [`READ_ATTEMPTS`] in order and returns the first
//! parse that completes without error. Output quality (e.g. a single wide
//! column because the delimiter was wrong) is not judged; the
//! schema reconciliation step is responsible for required columns.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8_INIT, WINDOWS_1252_INIT};
use log::{debug, info};

use crate::{
    data::raw_cell,
    error::UnreadableSourceError,
    frame::Frame,
    io_utils,
};

#[derive(Debug, Clone, Copy)]
pub struct ReadAttempt {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

/// `WINDOWS_1252` is what the WHATWG `latin1` label resolves to.
pub static READ_ATTEMPTS: &[ReadAttempt] = &[
    ReadAttempt {
        delimiter: b'|',
        encoding: &UTF_8_INIT,
    },
    ReadAttempt {
        delimiter: b',',
        encoding: &UTF_8_INIT,
    },
    ReadAttempt {
        delimiter: b';',
        encoding: &UTF_8_INIT,
    },
    ReadAttempt {
        delimiter: b',',
        encoding: &WINDOWS_1252_INIT,
    },
    ReadAttempt {
        delimiter: b';',
        encoding: &WINDOWS_1252_INIT,
    },
];

pub fn read_table(path: &Path) -> Result<Frame> {
    read_table_with(path, READ_ATTEMPTS)
}

pub fn read_table_with(path: &Path, attempts: &[ReadAttempt]) -> Result<Frame> {
    let mut last_error = anyhow!("No read attempts configured");
    for attempt in attempts {
        match read_with(path, *attempt) {
            Ok(frame) => {
                info!(
                    "Read {:?} with delimiter '{}' and encoding {}: {} column(s), {} row(s)",
                    path,
                    io_utils::printable_delimiter(attempt.delimiter),
                    attempt.encoding.name(),
                    frame.columns().len(),
                    frame.len()
                );
                return Ok(frame);
            }
            Err(err) => {
                debug!(
                    "Attempt delimiter '{}' / {} failed for {:?}: {err:#}",
                    io_utils::printable_delimiter(attempt.delimiter),
                    attempt.encoding.name(),
                    path
                );
                last_error = err;
            }
        }
    }
    Err(UnreadableSourceError {
        path: path.to_path_buf(),
        attempts: attempts.len(),
        source: last_error,
    }
    .into())
}

fn read_with(path: &Path, attempt: ReadAttempt) -> Result<Frame> {
    let mut reader = io_utils::open_csv_reader_from_path(path, attempt.delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, attempt.encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let width = headers.len();
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let line = row_idx + 2;
        let record = record.with_context(|| format!("Reading row {line}"))?;
        if record.len() > width {
            return Err(anyhow!(
                "Expected {width} field(s) in line {line}, saw {}",
                record.len()
            ));
        }
        let decoded = io_utils::decode_record(&record, attempt.encoding)
            .with_context(|| format!("Decoding row {line}"))?;
        let mut row = decoded.iter().map(|field| raw_cell(field)).collect::<Vec<_>>();
        row.resize(width, None);
        rows.push(row);
    }
    Ok(Frame::from_text(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn pipe_delimited_utf8_wins_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a|b\n1|ñ\n").unwrap();
        let frame = read_table(&path).unwrap();
        assert_eq!(frame.column_names(), vec!["a", "b"]);
        assert_eq!(frame.value(0, "b"), Some(&Value::String("ñ".to_string())));
    }

    #[test]
    fn comma_file_parses_as_single_column_under_pipe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();
        let frame = read_table(&path).unwrap();
        assert_eq!(frame.column_names(), vec!["a,b"]);
    }

    #[test]
    fn ragged_rows_force_the_next_attempt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a,b\n1,2|3|4\n").unwrap();
        let frame = read_table(&path).unwrap();
        assert_eq!(frame.column_names(), vec!["a", "b"]);
        assert_eq!(frame.value(0, "b"), Some(&Value::String("2|3|4".to_string())));
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a|b|c\n1|2\n").unwrap();
        let frame = read_table(&path).unwrap();
        assert_eq!(frame.value(0, "c"), None);
    }

    #[test]
    fn zero_byte_file_reads_as_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "").unwrap();
        let frame = read_table(&path).unwrap();
        assert!(frame.columns().is_empty());
        assert!(frame.is_empty());
    }

    #[test]
    fn exhausted_attempts_surface_unreadable_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, b"a\n\xff\n").unwrap();
        let err = read_table_with(&path, &READ_ATTEMPTS[..3]).unwrap_err();
        let unreadable = err
            .downcast_ref::<UnreadableSourceError>()
            .expect("typed error");
        assert_eq!(unreadable.attempts, 3);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.downcast_ref::<UnreadableSourceError>().is_some());
    }
}
