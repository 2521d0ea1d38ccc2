//! Error taxonomy for conservation analysis.
//!
//! Structural errors (alphabet mismatch, corrupt trace, out-of-range codes)
//! abort the analysis of the whole alignment. `DegenerateColumn` is the only
//! per-column anomaly: it is returned by column accessors and never fails a
//! whole computation. Accessors also reject indices past the last column
//! with `ColumnOutOfRange`.

use thiserror::Error;

/// Errors that can occur while building or analysing an alignment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConservationError {
    #[error("Sequences do not share one alphabet: sequence {sequence} uses {found}, expected {expected}")]
    AlphabetMismatch {
        sequence: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid trace cell at column {column}, sequence {sequence}: index {index} (sequence has {length} residues)")]
    InvalidTraceIndex {
        column: usize,
        sequence: usize,
        index: i64,
        length: usize,
    },

    #[error("Trace for sequence {sequence} is not strictly increasing at column {column}")]
    NonMonotonicTrace { column: usize, sequence: usize },

    #[error("Trace has {found} sequence slots but {expected} sequences were given")]
    TraceShapeMismatch { expected: usize, found: usize },

    #[error("Column {column} has no non-gap entries")]
    DegenerateColumn { column: usize },

    #[error("Column {column} is out of range for {len} columns")]
    ColumnOutOfRange { column: usize, len: usize },

    #[error("Symbol code {code} is out of range for an alphabet of size {size}")]
    OutOfRangeSymbolCode { code: usize, size: usize },

    #[error("Symbol '{symbol}' is not part of the {alphabet} alphabet")]
    UnknownSymbol { symbol: String, alphabet: String },

    #[error("Alphabet must contain at least one symbol")]
    EmptyAlphabet,

    #[error("Symbol '{0}' appears more than once in the alphabet")]
    DuplicateSymbol(String),

    #[error("Gapped row '{id}' has length {found}, expected {expected}")]
    UnequalGappedLength {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("Alignment contains no sequences")]
    EmptyAlignment,

    #[error("Count matrix has {found} symbol columns, alphabet has {expected} symbols")]
    AlphabetSizeMismatch { expected: usize, found: usize },

    #[error("Frequency matrix has {frequencies} columns but the entropy profile has {entropies}")]
    ProfileShapeMismatch { frequencies: usize, entropies: usize },
}

impl ConservationError {
    /// True for the per-column anomaly that must not abort a whole analysis.
    pub fn is_column_local(&self) -> bool {
        matches!(self, ConservationError::DegenerateColumn { .. })
    }
}

/// Result type for conservation operations.
pub type Result<T> = std::result::Result<T, ConservationError>;
