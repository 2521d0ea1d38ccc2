//! End-to-end conservation analysis.
//!
//! Alignment → frequency profile → entropy → logo stacks. Each stage is a
//! pure function of the previous outputs; this module only chains them,
//! times them and reports degenerate columns.
//!
//! Ingestion of raw gapped rows (alphabet choice, case folding, gap
//! characters) also lives here since it is the step every caller shares.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::alphabet::Alphabet;
use crate::entropy::EntropyProfile;
use crate::error::Result;
use crate::instrument::timed;
use crate::logo::Logo;
use crate::model::{Alignment, Record, DEFAULT_GAP_CHARS};
use crate::profile::FrequencyMatrix;

/// Options shared by the analysis stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Process columns on the rayon pool
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// How raw gapped rows are turned into an [`Alignment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Alphabet to encode with; inferred from the residues when `None`
    pub alphabet: Option<Alphabet>,
    /// Bytes treated as gaps
    pub gap_chars: Vec<u8>,
    /// Keep lowercase residues instead of uppercasing them
    pub keep_case: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            alphabet: None,
            gap_chars: DEFAULT_GAP_CHARS.to_vec(),
            keep_case: false,
        }
    }
}

/// Builds an alignment from gapped rows.
pub fn ingest(records: &[Record], options: &IngestOptions) -> Result<Alignment> {
    let folded: Vec<Record>;
    let records = if options.keep_case {
        records
    } else {
        folded = records.iter().map(Record::to_uppercase).collect();
        &folded
    };

    let alphabet = match &options.alphabet {
        Some(alphabet) => alphabet.clone(),
        None => Alphabet::infer(records.iter().map(Record::as_bytes), &options.gap_chars)?,
    };
    debug!("Encoding {} rows with the {} alphabet", records.len(), alphabet.name());

    Alignment::from_gapped(records, Arc::new(alphabet), &options.gap_chars)
}

/// Wall time spent in each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings {
    pub frequencies: Duration,
    pub entropy: Duration,
    pub logo: Duration,
}

/// Everything derived from one alignment.
#[derive(Debug, Clone)]
pub struct ConservationReport {
    pub frequencies: FrequencyMatrix,
    pub entropy: EntropyProfile,
    pub logo: Logo,
    pub timings: StageTimings,
}

impl ConservationReport {
    /// Columns where every sequence is gapped.
    pub fn degenerate_columns(&self) -> Vec<usize> {
        self.entropy.degenerate_columns()
    }
}

/// Runs every stage on an alignment.
///
/// Structural problems were already rejected when the alignment was built,
/// so the only per-column anomaly left is a degenerate column, which is
/// logged and kept in the report.
pub fn analyze(alignment: &Alignment, options: &AnalysisOptions) -> Result<ConservationReport> {
    let frequencies = timed("frequency profile", || FrequencyMatrix::build(alignment, options));
    let entropy = timed("entropy", || EntropyProfile::compute(&frequencies.value, options));
    let logo = timed("logo stacks", || {
        Logo::allocate(&frequencies.value, &entropy.value, options)
    });

    let timings = StageTimings {
        frequencies: frequencies.elapsed,
        entropy: entropy.elapsed,
        logo: logo.elapsed,
    };
    let report = ConservationReport {
        frequencies: frequencies.value,
        entropy: entropy.value,
        logo: logo.value?,
        timings,
    };

    for column in report.degenerate_columns() {
        warn!(
            "Column {} has no non-gap entries",
            report.entropy.residue_number(column)
        );
    }
    Ok(report)
}
