//! FASTA reader for aligned (gapped) sequences.
//!
//! Single-line and multi-line records are accepted. Gap characters are kept
//! verbatim; only whitespace inside sequence lines is dropped.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGT--ACGTACGT...
//! >another_sequence
//! TGCATG--ATGCA...
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::model::Record;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Accumulates records line by line.
#[derive(Default)]
struct FastaBuilder {
    records: Vec<Record>,
    current_id: Option<String>,
    current_seq: Vec<u8>,
}

impl FastaBuilder {
    fn push_line(&mut self, line_number: usize, line: &str) -> FastaResult<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(header) = line.strip_prefix('>') {
            self.finish_record()?;

            // Identifier is everything before the first whitespace
            let id = header.split_whitespace().next().unwrap_or_default();
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }
            self.current_id = Some(id.to_string());
        } else {
            if self.current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }
            self.current_seq
                .extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }
        Ok(())
    }

    fn finish_record(&mut self) -> FastaResult<()> {
        if let Some(id) = self.current_id.take() {
            if self.current_seq.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Sequence '{}' has no residues",
                    id
                )));
            }
            let data = std::mem::take(&mut self.current_seq);
            self.records.push(Record::from_bytes(id, data));
        }
        Ok(())
    }

    fn finish(mut self) -> FastaResult<Vec<Record>> {
        self.finish_record()?;
        if self.records.is_empty() {
            return Err(FastaError::EmptyFile);
        }
        Ok(self.records)
    }
}

/// Parses FASTA content from a reader.
pub fn parse_fasta<R: BufRead>(reader: R) -> FastaResult<Vec<Record>> {
    let mut builder = FastaBuilder::default();
    for (i, line) in reader.lines().enumerate() {
        builder.push_line(i + 1, &line?)?;
    }
    builder.finish()
}

/// Parses FASTA content from a string.
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<Record>> {
    let mut builder = FastaBuilder::default();
    for (i, line) in content.lines().enumerate() {
        builder.push_line(i + 1, line)?;
    }
    builder.finish()
}

/// Parses a FASTA file.
///
/// # Examples
///
/// ```no_run
/// use seqcons::formats::fasta::parse_fasta_file;
///
/// let records = parse_fasta_file("aligned.fasta").unwrap();
/// println!("Loaded {} rows", records.len());
/// ```
pub fn parse_fasta_file<P: AsRef<Path>>(path: P) -> FastaResult<Vec<Record>> {
    let file = File::open(path)?;
    parse_fasta(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fasta() {
        let content = ">seq1\nACGT\n>seq2\nTGCA\n";
        let records = parse_fasta_str(content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].as_str(), "ACGT");
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].as_str(), "TGCA");
    }

    #[test]
    fn test_parse_multiline_gapped_sequence() {
        let content = ">seq1\nAC-T\nTG.A\nAA A\n";
        let records = parse_fasta_str(content).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_str(), "AC-TTG.AAAA");
    }

    #[test]
    fn test_parse_with_description() {
        let content = ">seq1 Escherichia coli lacI\nACGT\n";
        let records = parse_fasta_str(content).unwrap();
        assert_eq!(records[0].id, "seq1");
    }

    #[test]
    fn test_parse_with_empty_lines() {
        let content = ">seq1\nACGT\n\n>seq2\n\nTGCA\n";
        let records = parse_fasta_str(content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].as_str(), "TGCA");
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_fasta_str(""), Err(FastaError::EmptyFile)));
    }

    #[test]
    fn test_sequence_without_header() {
        let content = "ACGT\n>seq1\nTGCA\n";
        assert!(matches!(
            parse_fasta_str(content),
            Err(FastaError::SequenceWithoutHeader(1))
        ));
    }

    #[test]
    fn test_empty_identifier() {
        let content = ">\nACGT\n";
        assert!(matches!(
            parse_fasta_str(content),
            Err(FastaError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_header_without_sequence() {
        let content = ">seq1\n>seq2\nACGT\n";
        assert!(matches!(
            parse_fasta_str(content),
            Err(FastaError::InvalidFormat(msg)) if msg.contains("seq1")
        ));

        let trailing = ">seq1\nACGT\n>seq2\n";
        assert!(matches!(
            parse_fasta_str(trailing),
            Err(FastaError::InvalidFormat(msg)) if msg.contains("seq2")
        ));
    }

    #[test]
    fn test_reader_matches_str() {
        let content = ">a\nAC-G\n>b\nA-CG\n";
        let from_reader = parse_fasta(content.as_bytes()).unwrap();
        assert_eq!(from_reader, parse_fasta_str(content).unwrap());
    }

    #[test]
    fn test_case_preserved() {
        let records = parse_fasta_str(">seq1\nacgt\n").unwrap();
        assert_eq!(records[0].as_str(), "acgt");
    }
}
