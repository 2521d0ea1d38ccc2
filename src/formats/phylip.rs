//! PHYLIP reader for aligned sequences.
//!
//! Both sequential and interleaved layouts are accepted.
//!
//! ## PHYLIP Format
//!
//! The first line holds the number of sequences and the alignment length:
//! ```text
//!  3 10
//! Seq1      ACGT--GTAC
//! Seq2      TGCATGCATG
//! Seq3      AAAACC-CGG
//! ```
//!
//! In the interleaved layout the first block carries the names and later
//! blocks, separated by blank lines, carry only sequence data in the same
//! order.
//!
//! Names may be the strict 10-character field or any whitespace-delimited
//! word. Every row must reach the declared length.

use log::debug;
use thiserror::Error;

use crate::model::Record;

/// Errors that can occur during PHYLIP parsing.
#[derive(Error, Debug)]
pub enum PhylipError {
    #[error("Empty PHYLIP file")]
    EmptyFile,

    #[error("Invalid header: expected 'ntax nchar' (two integers), got '{0}'")]
    InvalidHeader(String),

    #[error("Invalid sequence count in header: '{0}' is not a valid number")]
    InvalidSequenceCount(String),

    #[error("Invalid sequence length in header: '{0}' is not a valid number")]
    InvalidSequenceLength(String),

    #[error("Expected {expected} sequences but found {found}")]
    SequenceCountMismatch { expected: usize, found: usize },

    #[error("Sequence '{name}' has length {found}, expected {expected}")]
    SequenceLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("No sequence data found after header")]
    NoSequenceData,

    #[error("Expected a sequence name followed by data, got '{0}'")]
    MissingName(String),

    #[error("Unexpected data after the last sequence: '{0}'")]
    UnexpectedData(String),
}

/// Result type for PHYLIP operations.
pub type PhylipResult<T> = Result<T, PhylipError>;

/// Checks if a character can appear in aligned sequence data.
fn is_sequence_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '-' | '.' | '*' | '?')
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_sequence_data(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_sequence_char)
}

/// Splits a named line into `(name, data)`.
///
/// The strict layout (10-character name field) is tried first, then a
/// relaxed whitespace-separated name.
fn split_named_line(line: &str) -> Option<(String, String)> {
    if let (Some(name), Some(rest)) = (line.get(..10), line.get(10..)) {
        let name = name.trim();
        let data = strip_whitespace(rest);
        if !name.is_empty() && !name.contains(char::is_whitespace) && is_sequence_data(&data) {
            return Some((name.to_string(), data));
        }
    }

    let (name, rest) = line.split_once(char::is_whitespace)?;
    let data = strip_whitespace(rest);
    is_sequence_data(&data).then(|| (name.to_string(), data))
}

/// Parses the `ntax nchar` header.
fn parse_header(header: &str) -> PhylipResult<(usize, usize)> {
    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(PhylipError::InvalidHeader(header.to_string()));
    }

    let ntax: usize = parts[0]
        .parse()
        .map_err(|_| PhylipError::InvalidSequenceCount(parts[0].to_string()))?;
    let nchar: usize = parts[1]
        .parse()
        .map_err(|_| PhylipError::InvalidSequenceLength(parts[1].to_string()))?;

    if ntax == 0 {
        return Err(PhylipError::InvalidSequenceCount("0".to_string()));
    }
    Ok((ntax, nchar))
}

/// Reads the sequential layout: each row starts with a named line and
/// continues over unnamed lines until it holds `nchar` residues.
fn read_sequential(lines: &[&str], ntax: usize, nchar: usize) -> PhylipResult<Vec<(String, String)>> {
    let mut rows: Vec<(String, String)> = Vec::with_capacity(ntax);
    let mut lines = lines.iter().filter(|l| !l.is_empty());

    while rows.len() < ntax {
        let Some(line) = lines.next() else { break };
        let (name, mut data) =
            split_named_line(line).ok_or_else(|| PhylipError::MissingName(line.to_string()))?;
        while data.len() < nchar {
            let Some(next) = lines.next() else { break };
            let chunk = strip_whitespace(next);
            if !is_sequence_data(&chunk) {
                return Err(PhylipError::SequenceLengthMismatch {
                    name,
                    expected: nchar,
                    found: data.len(),
                });
            }
            data.push_str(&chunk);
        }
        rows.push((name, data));
    }

    if let Some(extra) = lines.next() {
        return Err(PhylipError::UnexpectedData(extra.to_string()));
    }
    Ok(rows)
}

/// Reads the interleaved layout: the first block names every row, later
/// blocks append to the rows in order.
fn read_interleaved(lines: &[&str], ntax: usize) -> PhylipResult<Vec<(String, String)>> {
    let mut rows: Vec<(String, String)> = Vec::with_capacity(ntax);
    let mut lines = lines.iter();

    while rows.len() < ntax {
        let Some(line) = lines.next() else { break };
        if line.is_empty() {
            continue;
        }
        rows.push(split_named_line(line).ok_or_else(|| PhylipError::MissingName(line.to_string()))?);
    }
    if rows.len() < ntax {
        return Ok(rows);
    }

    // Row receiving the next line of the current block
    let mut cursor = 0;
    for line in lines {
        if line.is_empty() {
            cursor = 0;
            continue;
        }
        // Some writers repeat the names in every block
        let repeated = split_named_line(line).and_then(|(name, data)| {
            rows.iter()
                .position(|(n, _)| *n == name)
                .map(|pos| (pos, data))
        });
        let data = match repeated {
            Some((pos, data)) => {
                cursor = pos;
                data
            }
            None => strip_whitespace(line),
        };
        rows[cursor].1.push_str(&data);
        cursor = (cursor + 1) % ntax;
    }
    Ok(rows)
}

/// True when the first block holds exactly one line per row and more data
/// follows it.
fn looks_interleaved(lines: &[&str], ntax: usize) -> bool {
    let first_block = lines
        .iter()
        .skip_while(|l| l.is_empty())
        .take_while(|l| !l.is_empty())
        .count();
    let total = lines.iter().filter(|l| !l.is_empty()).count();
    first_block == ntax && total > ntax
}

fn check_rows(rows: Vec<(String, String)>, ntax: usize, nchar: usize) -> PhylipResult<Vec<Record>> {
    if rows.is_empty() {
        return Err(PhylipError::NoSequenceData);
    }
    if rows.len() != ntax {
        return Err(PhylipError::SequenceCountMismatch {
            expected: ntax,
            found: rows.len(),
        });
    }
    if let Some((name, data)) = rows.iter().find(|(_, data)| data.len() != nchar) {
        return Err(PhylipError::SequenceLengthMismatch {
            name: name.clone(),
            expected: nchar,
            found: data.len(),
        });
    }

    Ok(rows
        .into_iter()
        .map(|(name, data)| Record::new(name, data))
        .collect())
}

/// Parses PHYLIP content from a string.
///
/// The sequential layout is tried first. When it does not yield `ntax`
/// rows of `nchar` residues the content is read as interleaved.
pub fn parse_phylip_str(content: &str) -> PhylipResult<Vec<Record>> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();
    let header = lines
        .iter()
        .position(|l| !l.is_empty())
        .ok_or(PhylipError::EmptyFile)?;
    let (ntax, nchar) = parse_header(lines[header])?;
    let body = &lines[header + 1..];
    if body.iter().all(|l| l.is_empty()) {
        return Err(PhylipError::NoSequenceData);
    }

    let sequential = read_sequential(body, ntax, nchar).and_then(|rows| check_rows(rows, ntax, nchar));
    match sequential {
        Ok(records) => Ok(records),
        Err(sequential_err) => {
            debug!("Not a sequential PHYLIP layout ({}), trying interleaved", sequential_err);
            read_interleaved(body, ntax)
                .and_then(|rows| check_rows(rows, ntax, nchar))
                .map_err(|interleaved_err| {
                    if looks_interleaved(body, ntax) {
                        interleaved_err
                    } else {
                        sequential_err
                    }
                })
        }
    }
}
