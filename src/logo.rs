//! Sequence-logo stack heights.
//!
//! For every column the stack is `max_entropy - entropy` bits tall and is
//! split between the symbols present in proportion to their frequency.
//! Symbols are stacked from the shortest to the tallest (ties by code), each
//! one starting where the previous one ends, so the dominant symbol sits on
//! top.

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::alphabet::Code;
use crate::entropy::EntropyProfile;
use crate::error::{ConservationError, Result};
use crate::pipeline::AnalysisOptions;
use crate::profile::FrequencyMatrix;

/// One glyph of a logo stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSymbol {
    pub code: Code,
    pub symbol: String,
    pub height: f64,
    /// Height at which this glyph starts
    pub baseline: f64,
}

/// The full stack of one alignment column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoColumn {
    /// 0-based column within the analysed alignment
    pub column: usize,
    /// Information content of the column
    pub total_height: f64,
    /// Glyphs ordered bottom to top
    pub stack: Vec<StackedSymbol>,
}

impl LogoColumn {
    /// Sum of the glyph heights.
    pub fn stacked_height(&self) -> f64 {
        self.stack.iter().map(|s| s.height).sum()
    }
}

/// Logo stacks for a whole alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    max_entropy: f64,
    first_column: usize,
    columns: Vec<Result<LogoColumn>>,
}

impl Logo {
    /// Allocates stack heights for every column.
    ///
    /// Fails only when the two inputs describe different numbers of columns.
    /// A degenerate column yields `Err(DegenerateColumn)` in its own slot.
    pub fn allocate(
        frequencies: &FrequencyMatrix,
        entropy: &EntropyProfile,
        options: &AnalysisOptions,
    ) -> Result<Self> {
        if frequencies.n_columns() != entropy.len() {
            return Err(ConservationError::ProfileShapeMismatch {
                frequencies: frequencies.n_columns(),
                entropies: entropy.len(),
            });
        }

        let columns: Vec<Result<LogoColumn>> = if options.parallel {
            (0..entropy.len())
                .into_par_iter()
                .map(|c| stack_column(frequencies, entropy, c))
                .collect()
        } else {
            (0..entropy.len())
                .map(|c| stack_column(frequencies, entropy, c))
                .collect()
        };

        debug!("Allocated logo stacks for {} columns", columns.len());
        Ok(Self {
            max_entropy: entropy.max_entropy(),
            first_column: entropy.first_column(),
            columns,
        })
    }

    /// Height of a full stack (`log2(N)` bits).
    pub fn max_entropy(&self) -> f64 {
        self.max_entropy
    }

    /// Source-alignment column of the first stack.
    pub fn first_column(&self) -> usize {
        self.first_column
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// One slot per column; degenerate columns hold `Err(DegenerateColumn)`.
    pub fn columns(&self) -> &[Result<LogoColumn>] {
        &self.columns
    }

    /// Stack of one column.
    pub fn column(&self, column: usize) -> Result<&LogoColumn> {
        self.columns
            .get(column)
            .ok_or(ConservationError::ColumnOutOfRange {
                column,
                len: self.columns.len(),
            })?
            .as_ref()
            .map_err(Clone::clone)
    }
}

/// Builds the ordered stack of a single column.
fn stack_column(
    frequencies: &FrequencyMatrix,
    entropy: &EntropyProfile,
    column: usize,
) -> Result<LogoColumn> {
    let total_height = entropy.information_content(column)?;
    let row = frequencies.row(column)?;
    let alphabet = frequencies.alphabet();

    let mut heights: Vec<(Code, f64)> = row
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > 0.0)
        .map(|(code, &f)| (code, total_height * f))
        .collect();
    heights.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut baseline = 0.0;
    let mut stack = Vec::with_capacity(heights.len());
    for (code, height) in heights {
        stack.push(StackedSymbol {
            code,
            symbol: alphabet.decode(code)?.to_string(),
            height,
            baseline,
        });
        baseline += height;
    }

    Ok(LogoColumn {
        column,
        total_height,
        stack,
    })
}
