//! Per-column symbol frequency profiles.
//!
//! Counting walks the trace: every non-gap cell contributes one occurrence
//! of the residue it points at. Each row is then divided by its own total,
//! which is the number of non-gap entries in that column, not the number of
//! sequences.
//!
//! A column where every sequence is gapped has a zero total. Its frequency
//! row is filled with NaN and reported through [`FrequencyMatrix::row`] as
//! `DegenerateColumn`; it is never turned into a row of zeros.

use std::sync::Arc;

use log::debug;
use ndarray::{Array2, ArrayView1, Axis};
use rayon::prelude::*;

use crate::alphabet::{Alphabet, Code};
use crate::error::{ConservationError, Result};
use crate::model::{Alignment, GAP};
use crate::pipeline::AnalysisOptions;

/// Occurrence counts and row-normalised frequencies, shape `(columns × N)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMatrix {
    alphabet: Arc<Alphabet>,
    counts: Array2<usize>,
    frequencies: Array2<f64>,
    first_column: usize,
}

/// Counts the residues of one column.
fn count_column(alignment: &Alignment, column: usize, symbols: usize) -> Vec<usize> {
    let mut row = vec![0usize; symbols];
    let sequences = alignment.sequences();
    for (j, &index) in alignment.trace().row(column).iter().enumerate() {
        if index != GAP {
            // Alignment construction guarantees the index is in bounds.
            row[sequences[j].code()[index as usize]] += 1;
        }
    }
    row
}

impl FrequencyMatrix {
    /// Builds the frequency profile of an alignment.
    ///
    /// Columns are independent, so with `options.parallel` they are counted
    /// on the rayon pool. The result is identical either way.
    pub fn build(alignment: &Alignment, options: &AnalysisOptions) -> Self {
        let alphabet = Arc::clone(alignment.alphabet());
        let symbols = alphabet.len();
        let columns = alignment.len();

        let rows: Vec<Vec<usize>> = if options.parallel {
            (0..columns)
                .into_par_iter()
                .map(|c| count_column(alignment, c, symbols))
                .collect()
        } else {
            (0..columns)
                .map(|c| count_column(alignment, c, symbols))
                .collect()
        };

        let counts = Array2::from_shape_fn((columns, symbols), |(c, k)| rows[c][k]);
        debug!(
            "Counted {} columns x {} sequences over {} symbols",
            columns,
            alignment.sequence_count(),
            symbols
        );
        Self::normalize(alphabet, counts, alignment.first_column())
    }

    /// Builds a profile from a precomputed count matrix.
    pub fn from_counts(alphabet: Arc<Alphabet>, counts: Array2<usize>) -> Result<Self> {
        if counts.ncols() != alphabet.len() {
            return Err(ConservationError::AlphabetSizeMismatch {
                expected: alphabet.len(),
                found: counts.ncols(),
            });
        }
        Ok(Self::normalize(alphabet, counts, 0))
    }

    fn normalize(alphabet: Arc<Alphabet>, counts: Array2<usize>, first_column: usize) -> Self {
        let mut frequencies = counts.mapv(|n| n as f64);
        for mut row in frequencies.axis_iter_mut(Axis(0)) {
            let total: f64 = row.sum();
            if total == 0.0 {
                row.fill(f64::NAN);
            } else {
                row.mapv_inplace(|n| n / total);
            }
        }
        Self {
            alphabet,
            counts,
            frequencies,
            first_column,
        }
    }

    fn check_column(&self, column: usize) -> Result<()> {
        if column >= self.n_columns() {
            return Err(ConservationError::ColumnOutOfRange {
                column,
                len: self.n_columns(),
            });
        }
        Ok(())
    }

    /// The alphabet the columns of the matrix are indexed by.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Number of alignment columns.
    pub fn n_columns(&self) -> usize {
        self.counts.nrows()
    }

    /// Source-alignment column of row 0 (non-zero for a column window).
    pub fn first_column(&self) -> usize {
        self.first_column
    }

    /// Raw occurrence counts.
    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    /// The full frequency matrix; degenerate rows hold NaN.
    pub fn frequencies(&self) -> &Array2<f64> {
        &self.frequencies
    }

    /// Number of non-gap entries in a column.
    pub fn occupancy(&self, column: usize) -> Result<usize> {
        self.check_column(column)?;
        Ok(self.counts.row(column).sum())
    }

    /// True when every sequence is gapped at this column.
    ///
    /// # Panics
    ///
    /// Panics if `column >= self.n_columns()`.
    pub fn is_degenerate(&self, column: usize) -> bool {
        self.counts.row(column).sum() == 0
    }

    /// Indices of all-gap columns.
    pub fn degenerate_columns(&self) -> Vec<usize> {
        (0..self.n_columns())
            .filter(|&c| self.is_degenerate(c))
            .collect()
    }

    /// The frequency row of a column.
    ///
    /// Fails with `DegenerateColumn` for an all-gap column and with
    /// `ColumnOutOfRange` past the last column.
    pub fn row(&self, column: usize) -> Result<ArrayView1<'_, f64>> {
        self.check_column(column)?;
        if self.is_degenerate(column) {
            return Err(ConservationError::DegenerateColumn { column });
        }
        Ok(self.frequencies.row(column))
    }

    /// Frequency of one symbol in one column.
    pub fn frequency(&self, column: usize, code: Code) -> Result<f64> {
        if code >= self.alphabet.len() {
            return Err(ConservationError::OutOfRangeSymbolCode {
                code,
                size: self.alphabet.len(),
            });
        }
        Ok(self.row(column)?[code])
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::model::{Record, DEFAULT_GAP_CHARS};

    const TOLERANCE: f64 = 1e-9;

    fn alignment(rows: &[&str]) -> Alignment {
        let records: Vec<Record> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| Record::new(format!("seq{}", i + 1), *r))
            .collect();
        Alignment::from_gapped(&records, Arc::new(Alphabet::dna()), DEFAULT_GAP_CHARS).unwrap()
    }

    #[test]
    fn test_counts_and_frequencies() {
        let aln = alignment(&["AACG", "AATG"]);
        let freq = FrequencyMatrix::build(&aln, &AnalysisOptions::default());

        assert_eq!(freq.counts().row(2).to_vec(), vec![0, 1, 0, 1]);
        assert_eq!(freq.row(0).unwrap().to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(freq.row(2).unwrap().to_vec(), vec![0.0, 0.5, 0.0, 0.5]);
        assert_eq!(freq.frequency(3, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_normalized_by_non_gap_entries() {
        let aln = alignment(&["A-", "AC", "GC"]);
        let freq = FrequencyMatrix::build(&aln, &AnalysisOptions::default());

        assert_eq!(freq.occupancy(1).unwrap(), 2);
        assert_eq!(freq.row(1).unwrap().to_vec(), vec![0.0, 1.0, 0.0, 0.0]);
        let row0 = freq.row(0).unwrap();
        assert!((row0[0] - 2.0 / 3.0).abs() < TOLERANCE);
        assert!((row0[2] - 1.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_rows_sum_to_one() {
        let aln = alignment(&["ACGT-A", "AGGTCA", "TC-TCA", "GCGA-C"]);
        let freq = FrequencyMatrix::build(&aln, &AnalysisOptions::default());
        for c in 0..freq.n_columns() {
            let sum: f64 = freq.row(c).unwrap().sum();
            assert!((sum - 1.0).abs() < TOLERANCE, "column {} sums to {}", c, sum);
        }
    }

    #[test]
    fn test_degenerate_column_flagged() {
        let aln = alignment(&["A-C", "G-C"]);
        let freq = FrequencyMatrix::build(&aln, &AnalysisOptions::default());

        assert_eq!(freq.degenerate_columns(), vec![1]);
        assert!(freq.frequencies().row(1).iter().all(|f| f.is_nan()));
        assert_eq!(
            freq.row(1).unwrap_err(),
            ConservationError::DegenerateColumn { column: 1 }
        );
        assert!(freq.row(0).is_ok());
        assert!(freq.row(2).is_ok());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let aln = alignment(&["ACGTACGT-A", "AGGTCCG-TA", "TC-TCAGGTA"]);
        let parallel = FrequencyMatrix::build(&aln, &AnalysisOptions { parallel: true });
        let sequential = FrequencyMatrix::build(&aln, &AnalysisOptions { parallel: false });
        assert_eq!(parallel.counts(), sequential.counts());
        assert_eq!(parallel.frequencies(), sequential.frequencies());
    }

    #[test]
    fn test_from_counts_shape_check() {
        let alphabet = Arc::new(Alphabet::dna());
        let counts = array![[1usize, 2], [0, 3]];
        assert_eq!(
            FrequencyMatrix::from_counts(alphabet, counts).unwrap_err(),
            ConservationError::AlphabetSizeMismatch {
                expected: 4,
                found: 2
            }
        );
    }

    #[test]
    fn test_column_out_of_range() {
        let aln = alignment(&["AC", "AG"]);
        let freq = FrequencyMatrix::build(&aln, &AnalysisOptions::default());
        let expected = ConservationError::ColumnOutOfRange { column: 2, len: 2 };

        assert_eq!(freq.row(2).unwrap_err(), expected);
        assert_eq!(freq.occupancy(2).unwrap_err(), expected);
        assert_eq!(freq.frequency(2, 0).unwrap_err(), expected);
    }

    #[test]
    fn test_window_keeps_first_column() {
        let aln = alignment(&["ACGTAC", "ACGTTT"]).slice_columns(4..6);
        let freq = FrequencyMatrix::build(&aln, &AnalysisOptions::default());
        assert_eq!(freq.first_column(), 4);
        assert_eq!(freq.n_columns(), 2);
    }

    #[test]
    fn test_frequency_out_of_range_code() {
        let aln = alignment(&["AC"]);
        let freq = FrequencyMatrix::build(&aln, &AnalysisOptions::default());
        assert!(matches!(
            freq.frequency(0, 9),
            Err(ConservationError::OutOfRangeSymbolCode { code: 9, size: 4 })
        ));
    }
}
