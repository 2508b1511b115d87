//! Record parsing and ingestion.
//!
//! Two deliberately different failure policies live here:
//!
//! - **Batch** ([`parse_batch`], [`ingest_file`]): every line is validated on
//!   its own. Invalid lines are logged and skipped, and the caller receives
//!   only the valid records, in file order.
//! - **Single record** ([`parse_single`], [`ingest_body`]): only the first
//!   line is consumed, and any validation failure fails the whole call.
//!
//! Neither path touches the store; callers upsert the returned records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, RosterError};
use crate::format::{
    identifier_from_content_type, identifier_from_path, DelimiterStrategy, DelimiterTable,
};
use crate::models::Record;

/// A line that failed validation during batch parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number within the source.
    pub line_number: usize,
    /// Why the line was rejected.
    pub reason: String,
}

/// Result of batch-parsing a whole source.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Valid records in source order.
    pub records: Vec<Record>,
    /// Lines that were logged and dropped.
    pub skipped: Vec<SkippedLine>,
}

impl BatchOutcome {
    /// Total number of lines read.
    pub fn lines_read(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Parses a single line into a record using `strategy`.
pub fn parse_line(line: &str, strategy: &DelimiterStrategy) -> Result<Record> {
    let fields = strategy.read(line);
    Record::from_fields(&fields)
}

/// Parses every line of `reader`, tolerating individually invalid lines.
///
/// `source` only labels log output. A line that is not valid UTF-8 is
/// skipped like any other invalid line. Only an I/O error while reading
/// aborts the batch.
pub fn parse_batch<R: BufRead>(
    mut reader: R,
    strategy: &DelimiterStrategy,
    source: &str,
) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let parsed = decode_line(&buf, line_number)
            .and_then(|line| parse_line(line, strategy));
        match parsed {
            Ok(record) => outcome.records.push(record),
            Err(err) => {
                warn!(source, line_number, reason = %err, "skipping invalid line");
                outcome.skipped.push(SkippedLine {
                    line_number,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        source,
        format = strategy.identifier(),
        lines = outcome.lines_read(),
        valid = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "batch parsed"
    );
    Ok(outcome)
}

/// Decodes one raw line, dropping the line terminator and, on the first
/// line, a UTF-8 byte order mark.
fn decode_line(raw: &[u8], line_number: usize) -> Result<&str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = std::str::from_utf8(raw).map_err(|err| {
        RosterError::MalformedRecord(format!(
            "line is not valid UTF-8 ({}): [{}]",
            err,
            String::from_utf8_lossy(raw)
        ))
    })?;
    Ok(if line_number == 1 { strip_bom(line) } else { line })
}

fn strip_bom(line: &str) -> &str {
    line.strip_prefix('\u{feff}').unwrap_or(line)
}

/// Parses the first line of `body` into exactly one record.
///
/// Fails fast: a missing line, wrong field count, empty field, or bad date
/// fails the whole call.
pub fn parse_single(body: &str, strategy: &DelimiterStrategy) -> Result<Record> {
    let first_line = body.lines().next().unwrap_or_default();
    parse_line(strip_bom(first_line), strategy)
}

/// Batch-ingests a file.
///
/// The path must exist and be a regular file, and its extension must name a
/// registered format. All three checks happen before any line is read.
pub fn ingest_file(path: &Path, table: &DelimiterTable) -> Result<BatchOutcome> {
    if !path.exists() {
        return Err(RosterError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(RosterError::NotAFile(path.to_path_buf()));
    }

    let abs = absolute(path);
    let identifier = identifier_from_path(&abs);
    let strategy = table.resolve(&identifier)?;
    debug!(path = %abs.display(), format = strategy.identifier(), "ingesting file");

    let file = File::open(&abs)?;
    parse_batch(BufReader::new(file), strategy, &abs.to_string_lossy())
}

/// Single-record ingestion of an HTTP request body.
///
/// The content type is classified before the body is decoded or split, so
/// an undecodable body under a bad content type reports the content type.
pub fn ingest_body(
    content_type: Option<&str>,
    body: &[u8],
    table: &DelimiterTable,
) -> Result<Record> {
    let identifier = identifier_from_content_type(content_type)?;
    let strategy = table.resolve(&identifier)?;
    let body = std::str::from_utf8(body).map_err(|err| {
        RosterError::MalformedRecord(format!("request body is not valid UTF-8 ({})", err))
    })?;
    parse_single(body, strategy)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
