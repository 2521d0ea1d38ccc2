//! Readers for already-aligned sequence files.
//!
//! Supports automatic format detection for:
//! - FASTA (.fasta, .fa, .fna, .faa, .fas, .afa, .mfa)
//! - PHYLIP (.phy, .phylip) - sequential and interleaved
//!
//! Format detection priority:
//! 1. Explicit format specification (-f option)
//! 2. File extension
//! 3. Content-based detection
//!
//! Readers return raw gapped [`Record`]s; turning them into an alignment is
//! done by [`crate::pipeline::ingest`].

pub mod fasta;
pub mod phylip;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::model::Record;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Phylip,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::Phylip => write!(f, "PHYLIP"),
        }
    }
}

/// Errors that can occur while reading an alignment file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("Could not determine file format.\n\
             Hint: Use -f/--format to specify the format explicitly:\n  \
             seqcons -f fasta <file>   # FASTA format\n  \
             seqcons -f phylip <file>  # PHYLIP format")]
    UnknownFormat,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),

    #[error("PHYLIP error: {0}")]
    PhylipError(#[from] phylip::PhylipError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Detects format from file extension.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        "fa" | "fas" | "fasta" | "fna" | "faa" | "afa" | "mfa" => Some(FileFormat::Fasta),
        "phy" | "phylip" | "ph" => Some(FileFormat::Phylip),
        _ => None,
    }
}

/// Detects the file format from the first non-empty line.
pub fn detect_format_from_content(content: &str) -> Option<FileFormat> {
    let first = content.lines().map(str::trim).find(|l| !l.is_empty())?;

    if first.starts_with('>') {
        return Some(FileFormat::Fasta);
    }

    // PHYLIP header: "ntax nchar"
    let mut parts = first.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(a), Some(b)) if a.parse::<usize>().is_ok() && b.parse::<usize>().is_ok() => {
            Some(FileFormat::Phylip)
        }
        _ => None,
    }
}

/// Parses content with a specific format.
pub fn parse_content(content: &str, format: FileFormat) -> ParseResult<Vec<Record>> {
    match format {
        FileFormat::Fasta => Ok(fasta::parse_fasta_str(content)?),
        FileFormat::Phylip => Ok(phylip::parse_phylip_str(content)?),
    }
}

/// Reads an alignment file with optional format specification.
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    forced_format: Option<FileFormat>,
) -> ParseResult<Vec<Record>> {
    let content = fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let format = forced_format
        .or_else(|| detect_format_from_extension(&path))
        .or_else(|| detect_format_from_content(&content))
        .ok_or(ParseError::UnknownFormat)?;
    debug!("Reading {} as {}", path.as_ref().display(), format);

    parse_content(&content, format)
}

/// Reads an alignment file, detecting the format automatically.
pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Vec<Record>> {
    parse_file_with_options(path, None)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_detect_fasta() {
        let content = ">seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Fasta));
    }

    #[test]
    fn test_detect_phylip() {
        let content = "  3   10\nseq1      ACGTACGTAC\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Phylip));
    }

    #[test]
    fn test_detect_unknown() {
        let content = "This is not a valid sequence file\n";
        assert_eq!(detect_format_from_content(content), None);
    }

    #[test]
    fn test_detect_with_leading_empty_lines() {
        let content = "\n\n  \n>seq1\nACGT\n";
        assert_eq!(detect_format_from_content(content), Some(FileFormat::Fasta));
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("test.fa"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.FASTA"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.afa"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.phy"), Some(FileFormat::Phylip));
        assert_eq!(detect_format_from_extension("test.txt"), None);
    }

    #[test]
    fn test_parse_file_detects_by_content() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, ">seq1\nAC-T\n>seq2\nACGT\n").unwrap();

        let records = parse_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].as_str(), "AC-T");
    }

    #[test]
    fn test_parse_file_forced_format() {
        let mut file = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
        write!(file, "2 4\nseq1 AC-T\nseq2 ACGT\n").unwrap();

        let records = parse_file_with_options(file.path(), Some(FileFormat::Phylip)).unwrap();
        assert_eq!(records[1].id, "seq2");
    }

    #[test]
    fn test_parse_file_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(parse_file(file.path()), Err(ParseError::EmptyFile)));
    }

    #[test]
    fn test_parse_file_unknown_format() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "hello world\n").unwrap();
        assert!(matches!(parse_file(file.path()), Err(ParseError::UnknownFormat)));
    }
}
