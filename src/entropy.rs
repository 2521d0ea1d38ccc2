//! Shannon entropy per alignment column, in bits.
//!
//! `H(c) = -Σ p·log2(p)` over the symbols with `p > 0`. Zero frequencies
//! are skipped explicitly and never reach `log2`. Degenerate columns stay
//! NaN and are surfaced as `DegenerateColumn` by the accessors.

use log::debug;
use ndarray::{Array1, ArrayView1, Axis};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{ConservationError, Result};
use crate::pipeline::AnalysisOptions;
use crate::profile::FrequencyMatrix;

/// Entropy of one frequency row, clamped to `[0, max_entropy]`.
fn column_entropy(row: ArrayView1<f64>, max_entropy: f64) -> f64 {
    if row.iter().any(|f| f.is_nan()) {
        return f64::NAN;
    }
    let entropy = row
        .iter()
        .filter(|&&p| p > 0.0)
        .fold(0.0, |acc, &p| acc - p * p.log2());
    entropy.clamp(0.0, max_entropy)
}

/// One CSV row of the entropy report; `residue` is the 1-based column of
/// the source alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntropyRecord {
    #[serde(rename = "Residue")]
    pub residue: usize,
    #[serde(rename = "Entropy")]
    pub entropy: f64,
}

/// Per-column entropies plus the alphabet's maximum entropy.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyProfile {
    entropies: Array1<f64>,
    max_entropy: f64,
    first_column: usize,
}

impl EntropyProfile {
    /// Computes the entropy of every column of a frequency matrix.
    pub fn compute(frequencies: &FrequencyMatrix, options: &AnalysisOptions) -> Self {
        let max_entropy = frequencies.alphabet().max_entropy();
        let matrix = frequencies.frequencies();

        let values: Vec<f64> = if options.parallel {
            (0..matrix.nrows())
                .into_par_iter()
                .map(|c| column_entropy(matrix.row(c), max_entropy))
                .collect()
        } else {
            matrix
                .axis_iter(Axis(0))
                .map(|row| column_entropy(row, max_entropy))
                .collect()
        };

        debug!(
            "Computed entropy for {} columns (max {:.4} bits)",
            values.len(),
            max_entropy
        );
        Self {
            entropies: Array1::from(values),
            max_entropy,
            first_column: frequencies.first_column(),
        }
    }

    /// `log2(N)` for the alphabet of the profiled alignment.
    pub fn max_entropy(&self) -> f64 {
        self.max_entropy
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entropies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entropies.is_empty()
    }

    /// Raw values; degenerate columns hold NaN.
    pub fn values(&self) -> &Array1<f64> {
        &self.entropies
    }

    /// Source-alignment column of the first value.
    pub fn first_column(&self) -> usize {
        self.first_column
    }

    /// 1-based residue number of a column in the source alignment.
    pub fn residue_number(&self, column: usize) -> usize {
        self.first_column + column + 1
    }

    /// # Panics
    ///
    /// Panics if `column >= self.len()`.
    pub fn is_degenerate(&self, column: usize) -> bool {
        self.entropies[column].is_nan()
    }

    pub fn degenerate_columns(&self) -> Vec<usize> {
        (0..self.len()).filter(|&c| self.is_degenerate(c)).collect()
    }

    /// Entropy of a column.
    pub fn get(&self, column: usize) -> Result<f64> {
        let value = *self
            .entropies
            .get(column)
            .ok_or(ConservationError::ColumnOutOfRange {
                column,
                len: self.len(),
            })?;
        if value.is_nan() {
            return Err(ConservationError::DegenerateColumn { column });
        }
        Ok(value)
    }

    /// `max_entropy - entropy`: the total logo stack height of a column.
    pub fn information_content(&self, column: usize) -> Result<f64> {
        Ok(self.max_entropy - self.get(column)?)
    }

    /// `(Residue, Entropy)` rows numbered by source-alignment column.
    pub fn records(&self) -> Vec<EntropyRecord> {
        self.entropies
            .iter()
            .enumerate()
            .map(|(c, &entropy)| EntropyRecord {
                residue: self.residue_number(c),
                entropy,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ndarray::{array, Array2};

    use super::*;
    use crate::alphabet::Alphabet;

    const TOLERANCE: f64 = 1e-9;

    fn profile_from_counts(counts: Array2<usize>) -> EntropyProfile {
        let freq = FrequencyMatrix::from_counts(Arc::new(Alphabet::dna()), counts).unwrap();
        EntropyProfile::compute(&freq, &AnalysisOptions::default())
    }

    #[test]
    fn test_single_symbol_has_zero_entropy() {
        let profile = profile_from_counts(array![[5, 0, 0, 0]]);
        assert_eq!(profile.get(0).unwrap(), 0.0);
        assert!(profile.get(0).unwrap().is_sign_positive());
    }

    #[test]
    fn test_uniform_column_has_max_entropy() {
        let profile = profile_from_counts(array![[3, 3, 3, 3]]);
        assert!((profile.max_entropy() - 2.0).abs() < TOLERANCE);
        assert!((profile.get(0).unwrap() - 2.0).abs() < TOLERANCE);
        assert!(profile.information_content(0).unwrap().abs() < TOLERANCE);
    }

    #[test]
    fn test_two_equal_symbols_one_bit() {
        let profile = profile_from_counts(array![[0, 1, 0, 1]]);
        assert!((profile.get(0).unwrap() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_entropy_bounds() {
        let profile = profile_from_counts(array![
            [1, 2, 3, 4],
            [7, 1, 0, 0],
            [0, 0, 0, 9],
            [2, 2, 1, 0],
            [1, 1, 1, 1]
        ]);
        for c in 0..profile.len() {
            let h = profile.get(c).unwrap();
            assert!(h >= 0.0 && h <= profile.max_entropy(), "column {}: {}", c, h);
        }
    }

    #[test]
    fn test_skewed_distribution() {
        // p = (0.75, 0.25): H = 0.811278...
        let profile = profile_from_counts(array![[3, 1, 0, 0]]);
        let expected = -(0.75f64 * 0.75f64.log2() + 0.25 * 0.25f64.log2());
        assert!((profile.get(0).unwrap() - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_degenerate_column_propagated() {
        let profile = profile_from_counts(array![[1, 0, 0, 0], [0, 0, 0, 0], [0, 1, 0, 1]]);
        assert_eq!(profile.degenerate_columns(), vec![1]);
        assert_eq!(
            profile.get(1).unwrap_err(),
            ConservationError::DegenerateColumn { column: 1 }
        );
        assert!(profile.information_content(1).is_err());
        assert_eq!(profile.get(0).unwrap(), 0.0);
        assert!((profile.get(2).unwrap() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_column_out_of_range() {
        let profile = profile_from_counts(array![[1, 0, 0, 0]]);
        assert_eq!(
            profile.get(1).unwrap_err(),
            ConservationError::ColumnOutOfRange { column: 1, len: 1 }
        );
        assert!(profile.information_content(5).is_err());
    }

    #[test]
    fn test_records_are_one_based() {
        let profile = profile_from_counts(array![[1, 0, 0, 0], [0, 1, 0, 1]]);
        let records = profile.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].residue, 1);
        assert_eq!(records[1].residue, 2);
        assert!((records[1].entropy - 1.0).abs() < TOLERANCE);
    }
}
