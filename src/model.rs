//! Data model for alignment conservation analysis.
//!
//! This module contains the structures every analysis stage reads:
//! - `Record`: a raw (possibly gapped) row as read from a file
//! - `Sequence`: an encoded, ungapped sequence over a shared alphabet
//! - `Alignment`: sequences plus the column trace that places them
//!
//! The trace is a `(columns × sequences)` integer matrix. Each cell holds
//! the index of the residue occupying that column in that sequence, or
//! [`GAP`]. For any sequence the non-gap indices strictly increase with the
//! column.

use std::ops::Range;
use std::sync::Arc;

use ndarray::{s, Array2, ArrayView1, Axis};

use crate::alphabet::{Alphabet, Code};
use crate::error::{ConservationError, Result};

/// Trace sentinel: this sequence has a gap at this column.
pub const GAP: i64 = -1;

/// Gap characters recognised in gapped text by default.
pub const DEFAULT_GAP_CHARS: &[u8] = b"-.";

/// A raw row with its identifier, as found in an alignment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The identifier (from the header, without '>')
    pub id: String,
    /// Raw bytes, gaps included
    data: Vec<u8>,
}

impl Record {
    /// Creates a record from text.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into().into_bytes(),
        }
    }

    /// Creates a record from raw bytes.
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Returns the length of the row, gaps included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw bytes of the row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Row as text (lossy for non-UTF-8 input).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Returns a copy with ASCII letters uppercased.
    pub fn to_uppercase(&self) -> Self {
        Self {
            id: self.id.clone(),
            data: self.data.to_ascii_uppercase(),
        }
    }
}

/// An ungapped sequence of alphabet codes.
///
/// Immutable once built. The alphabet is shared through an `Arc` so every
/// sequence of an alignment can point at the same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Sequence identifier
    pub id: String,
    alphabet: Arc<Alphabet>,
    code: Vec<Code>,
}

impl Sequence {
    /// Creates a sequence from already-encoded residues.
    pub fn new(id: impl Into<String>, alphabet: Arc<Alphabet>, code: Vec<Code>) -> Result<Self> {
        if let Some(&bad) = code.iter().find(|&&c| c >= alphabet.len()) {
            return Err(ConservationError::OutOfRangeSymbolCode {
                code: bad,
                size: alphabet.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            alphabet,
            code,
        })
    }

    /// Encodes a letter sequence, one symbol per character.
    pub fn from_letters(id: impl Into<String>, alphabet: Arc<Alphabet>, text: &str) -> Result<Self> {
        let code = text
            .chars()
            .map(|c| alphabet.encode_char(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: id.into(),
            alphabet,
            code,
        })
    }

    /// Encodes a sequence of arbitrary tokens.
    pub fn from_tokens<I, S>(id: impl Into<String>, alphabet: Arc<Alphabet>, tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let code = tokens
            .into_iter()
            .map(|t| alphabet.encode(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: id.into(),
            alphabet,
            code,
        })
    }

    /// The alphabet this sequence is encoded with.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Residue codes.
    pub fn code(&self) -> &[Code] {
        &self.code
    }

    /// Returns the number of residues.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the sequence has no residues.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Decodes the sequence back to symbols, concatenated.
    pub fn to_symbols(&self) -> Result<String> {
        self.code.iter().map(|&c| self.alphabet.decode(c)).collect()
    }
}

/// A multiple sequence alignment: owned sequences plus their column trace.
#[derive(Debug, Clone)]
pub struct Alignment {
    sequences: Vec<Sequence>,
    /// Shape `(columns, sequences)`; cells are residue indices or `GAP`
    trace: Array2<i64>,
    /// Column of the source alignment that trace row 0 corresponds to
    first_column: usize,
}

impl Alignment {
    /// Creates an alignment after validating the trace against the sequences.
    ///
    /// Fails fast on any structural problem: empty input, trace width not
    /// matching the sequence count, sequences over different alphabets,
    /// out-of-bounds trace cells or a sequence whose residues are reordered.
    pub fn new(sequences: Vec<Sequence>, trace: Array2<i64>) -> Result<Self> {
        let first = sequences.first().ok_or(ConservationError::EmptyAlignment)?;

        if trace.ncols() != sequences.len() {
            return Err(ConservationError::TraceShapeMismatch {
                expected: sequences.len(),
                found: trace.ncols(),
            });
        }

        let alphabet = first.alphabet();
        for (j, seq) in sequences.iter().enumerate().skip(1) {
            if !Arc::ptr_eq(seq.alphabet(), alphabet) && seq.alphabet() != alphabet {
                return Err(ConservationError::AlphabetMismatch {
                    sequence: j,
                    expected: alphabet.to_string(),
                    found: seq.alphabet().to_string(),
                });
            }
        }

        for (j, (seq, column)) in sequences.iter().zip(trace.axis_iter(Axis(1))).enumerate() {
            Self::validate_trace_column(j, seq, column)?;
        }

        Ok(Self {
            sequences,
            trace,
            first_column: 0,
        })
    }

    /// Checks one sequence's slice of the trace.
    fn validate_trace_column(j: usize, seq: &Sequence, cells: ArrayView1<i64>) -> Result<()> {
        let mut last: Option<i64> = None;
        for (c, &index) in cells.iter().enumerate() {
            if index == GAP {
                continue;
            }
            if index < 0 || index as usize >= seq.len() {
                return Err(ConservationError::InvalidTraceIndex {
                    column: c,
                    sequence: j,
                    index,
                    length: seq.len(),
                });
            }
            if last.is_some_and(|prev| index <= prev) {
                return Err(ConservationError::NonMonotonicTrace {
                    column: c,
                    sequence: j,
                });
            }
            last = Some(index);
        }
        Ok(())
    }

    /// Builds an alignment from equal-length gapped rows.
    ///
    /// Bytes in `gap_chars` become `GAP` cells; every other byte is encoded
    /// with `alphabet` and receives the next residue index of its row.
    pub fn from_gapped(records: &[Record], alphabet: Arc<Alphabet>, gap_chars: &[u8]) -> Result<Self> {
        let first = records.first().ok_or(ConservationError::EmptyAlignment)?;
        let columns = first.len();

        if let Some(bad) = records.iter().find(|r| r.len() != columns) {
            return Err(ConservationError::UnequalGappedLength {
                id: bad.id.clone(),
                expected: columns,
                found: bad.len(),
            });
        }

        let mut trace = Array2::from_elem((columns, records.len()), GAP);
        let mut sequences = Vec::with_capacity(records.len());

        for (j, record) in records.iter().enumerate() {
            let mut code = Vec::with_capacity(columns);
            for (c, &b) in record.as_bytes().iter().enumerate() {
                if gap_chars.contains(&b) {
                    continue;
                }
                trace[[c, j]] = code.len() as i64;
                code.push(alphabet.encode_char(b as char)?);
            }
            sequences.push(Sequence {
                id: record.id.clone(),
                alphabet: Arc::clone(&alphabet),
                code,
            });
        }

        Ok(Self {
            sequences,
            trace,
            first_column: 0,
        })
    }

    /// Renders every sequence back to gapped text.
    ///
    /// Multi-character symbols are concatenated as-is, so this is only
    /// lossless for letter alphabets.
    pub fn gapped_rows(&self, gap: char) -> Result<Vec<Record>> {
        self.sequences
            .iter()
            .zip(self.trace.axis_iter(Axis(1)))
            .map(|(seq, cells)| -> Result<Record> {
                let mut row = String::with_capacity(cells.len());
                for &index in cells.iter() {
                    if index == GAP {
                        row.push(gap);
                    } else {
                        row.push_str(self.alphabet().decode(seq.code[index as usize])?);
                    }
                }
                Ok(Record::new(seq.id.clone(), row))
            })
            .collect()
    }

    /// Restricts the alignment to a window of columns.
    ///
    /// The range is clamped to the alignment length. Sequences are kept
    /// whole so trace indices stay valid, and the window remembers where it
    /// starts so reported residue numbers still refer to the full alignment.
    pub fn slice_columns(&self, range: Range<usize>) -> Self {
        let start = range.start.min(self.len());
        let end = range.end.clamp(start, self.len());
        Self {
            sequences: self.sequences.clone(),
            trace: self.trace.slice(s![start..end, ..]).to_owned(),
            first_column: self.first_column + start,
        }
    }

    /// 0-based column of the source alignment where this one starts.
    ///
    /// Zero unless the alignment was produced by [`Alignment::slice_columns`].
    pub fn first_column(&self) -> usize {
        self.first_column
    }

    /// The alphabet shared by all sequences.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.sequences[0].alphabet()
    }

    /// All sequences, in trace order.
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// The trace matrix.
    pub fn trace(&self) -> &Array2<i64> {
        &self.trace
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.trace.nrows()
    }

    /// Returns true if the alignment has no columns.
    pub fn is_empty(&self) -> bool {
        self.trace.nrows() == 0
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Residue code at a column for one sequence, `None` for a gap or
    /// out-of-bounds position.
    pub fn residue_at(&self, column: usize, sequence: usize) -> Option<Code> {
        let index = *self.trace.get([column, sequence])?;
        if index == GAP {
            return None;
        }
        self.sequences
            .get(sequence)
            .and_then(|seq| seq.code.get(index as usize))
            .copied()
    }
}
