//! I/O utilities for CSV reading, writing, decoding, and file publication.
//!
//! All file I/O in promo-dataset flows through this module. It provides:
//!
//! - **Reader construction**: `open_csv_reader` over raw bytes, decoding
//!   happening per field so a single reader can be retried under several
//!   encodings.
//! - **Decoding**: strict field decoding via `encoding_rs`; malformed input is
//!   an error rather than a replacement character.
//! - **Publication**: `publish_csv` writes into a sibling temporary file and
//!   renames it over the destination, so readers never observe a partial file.
//! - **Table detection**: which file extensions count as tabular extracts.

use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::Encoding;
use tempfile::NamedTempFile;

pub const OUTPUT_DELIMITER: u8 = b',';

const TABLE_EXTENSIONS: &[&str] = &["csv", "txt", "tsv", "psv"];

pub fn is_table_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TABLE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    let mut decoded = decode_record(&headers, encoding)?;
    if let Some(first) = decoded.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(decoded)
}

/// Writes `headers` and `rows` as UTF-8 CSV, publishing the file with a rename.
pub fn publish_csv(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Creating output directory {parent:?}"))?;
    let staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("Creating temporary file in {parent:?}"))?;
    {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(OUTPUT_DELIMITER)
            .quote_style(QuoteStyle::Necessary)
            .double_quote(true);
        let mut writer = builder.from_writer(staged.as_file());
        writer
            .write_record(headers)
            .context("Writing snapshot headers")?;
        for (idx, row) in rows.iter().enumerate() {
            writer
                .write_record(row)
                .with_context(|| format!("Writing snapshot row {}", idx + 2))?;
        }
        writer.flush().context("Flushing snapshot writer")?;
    }
    staged
        .as_file()
        .sync_all()
        .context("Syncing snapshot to disk")?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Publishing snapshot to {path:?}"))?;
    Ok(())
}

/// Writes arbitrary bytes with the same write-then-rename discipline.
pub fn publish_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Creating output directory {parent:?}"))?;
    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("Creating temporary file in {parent:?}"))?;
    staged
        .write_all(bytes)
        .with_context(|| format!("Writing {path:?}"))?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Publishing {path:?}"))?;
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
