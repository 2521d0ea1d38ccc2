//! Alphabet index: a bijection between symbols and dense integer codes.
//!
//! An alphabet is an ordered set of distinct symbols. Symbols are usually
//! single letters (nucleotides, amino acids) but arbitrary tokens are
//! accepted; frequency and entropy computations never look at the symbol
//! text, only at the codes.
//!
//! Predefined alphabets:
//! - DNA (`ACGT`) and ambiguous DNA (`ACGTRYWSMKHBVDN`)
//! - RNA (`ACGU`)
//! - Protein (`ACDEFGHIKLMNPQRSTVWYBZX*`)

use std::collections::HashMap;
use std::fmt;

use crate::error::{ConservationError, Result};

/// Dense integer code of a symbol, in `[0, alphabet.len())`.
pub type Code = usize;

const DNA: &str = "ACGT";
const AMBIGUOUS_DNA: &str = "ACGTRYWSMKHBVDN";
const RNA: &str = "ACGU";
const PROTEIN: &str = "ACDEFGHIKLMNPQRSTVWYBZX*";

/// An ordered, finite set of symbols with their codes.
#[derive(Debug, Clone)]
pub struct Alphabet {
    /// Display name (e.g. "DNA", "custom")
    name: String,
    /// Symbols in code order
    symbols: Vec<String>,
    /// Reverse lookup
    index: HashMap<String, Code>,
}

impl PartialEq for Alphabet {
    /// Two alphabets are equal when they hold the same symbols in the same
    /// order; the display name is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Alphabet {}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.symbols.join(","))
    }
}

impl Alphabet {
    /// Creates an alphabet from arbitrary tokens.
    ///
    /// Fails if the list is empty or a token is repeated.
    pub fn new<I, S>(name: impl Into<String>, symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        if symbols.is_empty() {
            return Err(ConservationError::EmptyAlphabet);
        }

        let mut index = HashMap::with_capacity(symbols.len());
        for (code, symbol) in symbols.iter().enumerate() {
            if index.insert(symbol.clone(), code).is_some() {
                return Err(ConservationError::DuplicateSymbol(symbol.clone()));
            }
        }

        Ok(Self {
            name: name.into(),
            symbols,
            index,
        })
    }

    /// Creates a letter alphabet, one symbol per character of `letters`.
    pub fn from_letters(name: impl Into<String>, letters: &str) -> Result<Self> {
        Self::new(name, letters.chars().map(String::from))
    }

    /// Builds one of the predefined letter alphabets (known to be valid).
    fn predefined(name: &str, letters: &str) -> Self {
        let symbols: Vec<String> = letters.chars().map(String::from).collect();
        let index = symbols
            .iter()
            .enumerate()
            .map(|(code, s)| (s.clone(), code))
            .collect();
        Self {
            name: name.to_string(),
            symbols,
            index,
        }
    }

    /// Unambiguous DNA: `ACGT`.
    pub fn dna() -> Self {
        Self::predefined("DNA", DNA)
    }

    /// IUPAC nucleotides including ambiguity codes.
    pub fn ambiguous_dna() -> Self {
        Self::predefined("ambiguous DNA", AMBIGUOUS_DNA)
    }

    /// Unambiguous RNA: `ACGU`.
    pub fn rna() -> Self {
        Self::predefined("RNA", RNA)
    }

    /// The 20 standard amino acids plus `B`, `Z`, `X` and stop `*`.
    pub fn protein() -> Self {
        Self::predefined("protein", PROTEIN)
    }

    /// Resolves an alphabet name (`dna`, `ambiguous-dna`, `rna`, `protein`)
    /// or, failing that, treats the argument as a literal list of letters.
    pub fn from_spec(spec: &str) -> Result<Self> {
        match spec.to_lowercase().as_str() {
            "dna" | "nt" | "nucleotide" => Ok(Self::dna()),
            "ambiguous-dna" | "iupac" => Ok(Self::ambiguous_dna()),
            "rna" => Ok(Self::rna()),
            "protein" | "aa" | "amino" => Ok(Self::protein()),
            _ => Self::from_letters("custom", spec),
        }
    }

    /// Picks the smallest predefined alphabet covering every residue.
    ///
    /// Tries DNA, then ambiguous DNA, then protein. Bytes listed in
    /// `gap_chars` are skipped.
    pub fn infer<'a, I>(rows: I, gap_chars: &[u8]) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut seen = [false; 256];
        for row in rows {
            for &b in row {
                seen[b as usize] = true;
            }
        }
        for &g in gap_chars {
            seen[g as usize] = false;
        }

        let present: Vec<u8> = (0..=255u8).filter(|&b| seen[b as usize]).collect();
        let covers = |letters: &str| present.iter().all(|b| letters.as_bytes().contains(b));

        if covers(DNA) {
            return Ok(Self::dna());
        }
        if covers(AMBIGUOUS_DNA) {
            return Ok(Self::ambiguous_dna());
        }
        if covers(PROTEIN) {
            return Ok(Self::protein());
        }

        let offending = present
            .iter()
            .find(|b| !PROTEIN.as_bytes().contains(b))
            .map(|&b| (b as char).to_string())
            .unwrap_or_default();
        Err(ConservationError::UnknownSymbol {
            symbol: offending,
            alphabet: "protein".to_string(),
        })
    }

    /// Display name of the alphabet.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of symbols (N).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed alphabet; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in code order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// True when every symbol is a single character.
    pub fn is_letter(&self) -> bool {
        self.symbols.iter().all(|s| s.chars().count() == 1)
    }

    /// Maps a symbol to its code.
    pub fn encode(&self, symbol: &str) -> Result<Code> {
        self.index
            .get(symbol)
            .copied()
            .ok_or_else(|| ConservationError::UnknownSymbol {
                symbol: symbol.to_string(),
                alphabet: self.name.clone(),
            })
    }

    /// Maps a single character to its code.
    pub fn encode_char(&self, c: char) -> Result<Code> {
        let mut buf = [0u8; 4];
        self.encode(c.encode_utf8(&mut buf))
    }

    /// Maps a code back to its symbol.
    pub fn decode(&self, code: Code) -> Result<&str> {
        self.symbols
            .get(code)
            .map(String::as_str)
            .ok_or(ConservationError::OutOfRangeSymbolCode {
                code,
                size: self.symbols.len(),
            })
    }

    /// Maximum possible Shannon entropy over this alphabet, in bits.
    pub fn max_entropy(&self) -> f64 {
        (self.len() as f64).log2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_inverse() {
        let alphabet = Alphabet::dna();
        for (code, symbol) in ["A", "C", "G", "T"].iter().enumerate() {
            assert_eq!(alphabet.encode(symbol).unwrap(), code);
            assert_eq!(alphabet.decode(code).unwrap(), *symbol);
        }
    }

    #[test]
    fn test_decode_out_of_range() {
        let alphabet = Alphabet::dna();
        assert_eq!(
            alphabet.decode(4),
            Err(ConservationError::OutOfRangeSymbolCode { code: 4, size: 4 })
        );
    }

    #[test]
    fn test_encode_unknown_symbol() {
        let alphabet = Alphabet::dna();
        assert!(matches!(
            alphabet.encode_char('U'),
            Err(ConservationError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        assert_eq!(
            Alphabet::from_letters("bad", "ACGA"),
            Err(ConservationError::DuplicateSymbol("A".to_string()))
        );
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        assert_eq!(
            Alphabet::new("empty", Vec::<String>::new()),
            Err(ConservationError::EmptyAlphabet)
        );
    }

    #[test]
    fn test_token_alphabet() {
        let alphabet = Alphabet::new("states", ["open", "closed", "half"]).unwrap();
        assert!(!alphabet.is_letter());
        assert_eq!(alphabet.encode("half").unwrap(), 2);
        assert_eq!(alphabet.decode(1).unwrap(), "closed");
    }

    #[test]
    fn test_equality_ignores_name() {
        let custom = Alphabet::from_letters("mine", "ACGT").unwrap();
        assert_eq!(custom, Alphabet::dna());
        assert_ne!(Alphabet::dna(), Alphabet::rna());
    }

    #[test]
    fn test_max_entropy() {
        assert!((Alphabet::dna().max_entropy() - 2.0).abs() < 1e-12);
        assert!((Alphabet::protein().max_entropy() - 24f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn test_from_spec() {
        assert_eq!(Alphabet::from_spec("DNA").unwrap(), Alphabet::dna());
        assert_eq!(Alphabet::from_spec("protein").unwrap(), Alphabet::protein());
        let custom = Alphabet::from_spec("XY").unwrap();
        assert_eq!(custom.len(), 2);
        assert_eq!(custom.name(), "custom");
    }

    #[test]
    fn test_infer() {
        let rows: Vec<&[u8]> = vec![&b"AC-GT"[..], &b"AAT.G"[..]];
        assert_eq!(Alphabet::infer(rows, b"-.").unwrap(), Alphabet::dna());

        let rows: Vec<&[u8]> = vec![&b"ACNGT"[..]];
        assert_eq!(Alphabet::infer(rows, b"-").unwrap(), Alphabet::ambiguous_dna());

        let rows: Vec<&[u8]> = vec![&b"MKLV-"[..]];
        assert_eq!(Alphabet::infer(rows, b"-").unwrap(), Alphabet::protein());

        let rows: Vec<&[u8]> = vec![&b"AC1T"[..]];
        assert!(matches!(
            Alphabet::infer(rows, b"-"),
            Err(ConservationError::UnknownSymbol { symbol, .. }) if symbol == "1"
        ));
    }
}
