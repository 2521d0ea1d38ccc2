//! Result sinks.
//!
//! - Entropy table: CSV with a `Residue,Entropy` header, 1-based residues
//!   numbered by source-alignment column, `NaN` for degenerate columns.
//! - Logo stacks: JSON, one entry per column with its ordered glyphs.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::entropy::EntropyProfile;
use crate::logo::{Logo, StackedSymbol};

/// Errors that can occur while writing reports.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    IoError(#[from] io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Writes the entropy table to any writer.
pub fn write_entropy_csv<W: Write>(writer: W, profile: &EntropyProfile) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in profile.records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the entropy table to a file, or to stdout when `path` is "-".
pub fn write_entropy_csv_to<P: AsRef<Path>>(path: P, profile: &EntropyProfile) -> ReportResult<()> {
    let path = path.as_ref();
    if path == Path::new("-") {
        let stdout = io::stdout();
        write_entropy_csv(stdout.lock(), profile)
    } else {
        write_entropy_csv(BufWriter::new(File::create(path)?), profile)
    }
}

#[derive(Serialize)]
struct LogoColumnExport<'a> {
    /// 1-based source-alignment column, like the entropy table
    residue: usize,
    degenerate: bool,
    total_height: Option<f64>,
    stack: &'a [StackedSymbol],
}

#[derive(Serialize)]
struct LogoExport<'a> {
    max_entropy: f64,
    columns: Vec<LogoColumnExport<'a>>,
}

/// Writes logo stacks as pretty-printed JSON.
pub fn write_logo_json<W: Write>(writer: W, logo: &Logo) -> ReportResult<()> {
    let first_column = logo.first_column();
    let columns = logo
        .columns()
        .iter()
        .enumerate()
        .map(|(c, column)| match column {
            Ok(column) => LogoColumnExport {
                residue: first_column + c + 1,
                degenerate: false,
                total_height: Some(column.total_height),
                stack: &column.stack,
            },
            Err(_) => LogoColumnExport {
                residue: first_column + c + 1,
                degenerate: true,
                total_height: None,
                stack: &[],
            },
        })
        .collect();

    let export = LogoExport {
        max_entropy: logo.max_entropy(),
        columns,
    };
    let mut writer = writer;
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes logo stacks to a file, or to stdout when `path` is "-".
pub fn write_logo_json_to<P: AsRef<Path>>(path: P, logo: &Logo) -> ReportResult<()> {
    let path = path.as_ref();
    if path == Path::new("-") {
        let stdout = io::stdout();
        write_logo_json(stdout.lock(), logo)
    } else {
        let mut file = BufWriter::new(File::create(path)?);
        write_logo_json(&mut file, logo)?;
        file.flush()?;
        Ok(())
    }
}
