//! # seqcons - Alignment Conservation Statistics
//!
//! Positional conservation statistics for a multiple sequence alignment:
//! symbol frequency profiles, Shannon entropy, information content and the
//! per-symbol stack heights needed to draw a sequence logo.
//!
//! ## Architecture
//!
//! Each analysis stage is a pure function of the previous one:
//! - `alphabet`: symbol ⇄ code bijection
//! - `model`: sequences and the column trace that aligns them
//! - `profile`: per-column symbol frequencies
//! - `entropy`: per-column Shannon entropy in bits
//! - `logo`: ordered, stacked symbol heights per column
//! - `pipeline`: ingestion and the chained analysis
//! - `instrument`: stage timing
//! - `report`: CSV and JSON sinks
//! - `formats`: FASTA and PHYLIP readers for aligned input
//!
//! ## Example
//!
//! ```
//! use seqcons::model::Record;
//! use seqcons::pipeline::{analyze, ingest, AnalysisOptions, IngestOptions};
//!
//! let rows = vec![Record::new("s1", "AACG"), Record::new("s2", "AATG")];
//! let alignment = ingest(&rows, &IngestOptions::default()).unwrap();
//! let report = analyze(&alignment, &AnalysisOptions::default()).unwrap();
//! assert_eq!(report.entropy.get(2).unwrap(), 1.0);
//! ```

pub mod alphabet;
pub mod entropy;
pub mod error;
pub mod formats;
pub mod instrument;
pub mod logo;
pub mod model;
pub mod pipeline;
pub mod profile;
pub mod report;

pub use crate::alphabet::{Alphabet, Code};
pub use crate::entropy::{EntropyProfile, EntropyRecord};
pub use crate::error::{ConservationError, Result};
pub use crate::logo::{Logo, LogoColumn, StackedSymbol};
pub use crate::model::{Alignment, Record, Sequence, GAP};
pub use crate::pipeline::{analyze, ingest, AnalysisOptions, ConservationReport, IngestOptions};
pub use crate::profile::FrequencyMatrix;
