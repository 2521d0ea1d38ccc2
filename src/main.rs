//! seqcons - Alignment Conservation Statistics
//!
//! Computes per-column Shannon entropy of an aligned sequence file and the
//! stack heights of its sequence logo.
//!
//! ## Usage
//!
//! ```bash
//! seqcons aligned.fasta                      # writes Entropies.csv
//! seqcons -o - aligned.phy                   # entropy table on stdout
//! seqcons --logo logo.json --columns 1-20 aligned.fasta
//! ```
//!
//! ## Supported Formats
//!
//! - FASTA (.fasta, .fa, .fna, .faa, .fas, .afa, .mfa)
//! - PHYLIP (.phy, .phylip)

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::info;

use seqcons::alphabet::Alphabet;
use seqcons::formats::{parse_file_with_options, FileFormat};
use seqcons::instrument::timed;
use seqcons::pipeline::{analyze, ingest, AnalysisOptions, ConservationReport, IngestOptions};
use seqcons::report::{write_entropy_csv_to, write_logo_json_to};

/// File format specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// FASTA format
    Fasta,
    /// PHYLIP format
    Phylip,
    /// Auto-detect from extension and content
    Auto,
}

impl From<FormatArg> for Option<FileFormat> {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Fasta => Some(FileFormat::Fasta),
            FormatArg::Phylip => Some(FileFormat::Phylip),
            FormatArg::Auto => None,
        }
    }
}

/// Parses a 1-based inclusive column range such as "5-20" into a 0-based
/// half-open range.
fn parse_columns(s: &str) -> std::result::Result<Range<usize>, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{}'", s))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start column '{}'", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end column '{}'", end))?;
    if start == 0 || end < start {
        return Err(format!("invalid column range {}-{} (columns are 1-based)", start, end));
    }
    Ok(start - 1..end)
}

/// seqcons - Conservation statistics for multiple sequence alignments
///
/// Reads an aligned FASTA or PHYLIP file, writes the per-column Shannon
/// entropy as a `Residue,Entropy` CSV table and, optionally, the sequence
/// logo stacks as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Aligned sequence file (FASTA or PHYLIP format)
    file: PathBuf,

    /// Force a specific file format (overrides auto-detection)
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    format: FormatArg,

    /// Alphabet: auto, dna, ambiguous-dna, rna, protein, or a literal symbol list (e.g. ACGT)
    #[arg(short = 'a', long = "alphabet", default_value = "auto")]
    alphabet: String,

    /// Characters treated as gaps
    #[arg(long = "gap-chars", default_value = "-.")]
    gap_chars: String,

    /// Keep residue case instead of uppercasing
    #[arg(long = "keep-case")]
    keep_case: bool,

    /// Entropy CSV output. Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = "Entropies.csv")]
    output: PathBuf,

    /// Write sequence logo stacks as JSON to this file ("-" for stdout)
    #[arg(long = "logo")]
    logo: Option<PathBuf>,

    /// Restrict the analysis to a 1-based inclusive column range (e.g. 1-20)
    #[arg(long = "columns", value_parser = parse_columns)]
    columns: Option<Range<usize>>,

    /// Number of worker threads (default: all cores)
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Process columns on a single thread
    #[arg(long = "sequential")]
    sequential: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// Closing line for stderr; nothing when the table went to stdout.
///
/// Degenerate columns are already reported by the analysis log.
fn completion_message(report: &ConservationReport, output: &Path) -> Option<String> {
    (output != Path::new("-")).then(|| {
        format!(
            "Wrote entropy of {} columns to {}",
            report.entropy.len(),
            output.display()
        )
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(threads) = args.threads {
        if threads == 0 {
            anyhow::bail!("Thread count must be at least 1");
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the thread pool")?;
    }

    let alphabet = match args.alphabet.as_str() {
        "auto" => None,
        spec => Some(
            Alphabet::from_spec(spec)
                .with_context(|| format!("Invalid alphabet '{}'", spec))?,
        ),
    };
    let ingest_options = IngestOptions {
        alphabet,
        gap_chars: args.gap_chars.into_bytes(),
        keep_case: args.keep_case,
    };
    let analysis_options = AnalysisOptions {
        parallel: !args.sequential,
    };

    let records = timed("read alignment", || {
        parse_file_with_options(&args.file, args.format.into())
    })
    .into_inner()
    .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut alignment = ingest(&records, &ingest_options)
        .with_context(|| format!("Invalid alignment in {}", args.file.display()))?;
    info!(
        "Loaded {} sequences x {} columns ({} alphabet)",
        alignment.sequence_count(),
        alignment.len(),
        alignment.alphabet().name()
    );

    if let Some(range) = args.columns {
        if range.start >= alignment.len() {
            anyhow::bail!(
                "Column range starts at {} but the alignment has {} columns",
                range.start + 1,
                alignment.len()
            );
        }
        alignment = alignment.slice_columns(range);
    }

    let report = analyze(&alignment, &analysis_options)?;

    write_entropy_csv_to(&args.output, &report.entropy)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    if let Some(logo_path) = &args.logo {
        write_logo_json_to(logo_path, &report.logo)
            .with_context(|| format!("Failed to write {}", logo_path.display()))?;
    }

    if let Some(message) = completion_message(&report, &args.output) {
        eprintln!("{}", message);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns() {
        assert_eq!(parse_columns("1-20").unwrap(), 0..20);
        assert_eq!(parse_columns("5-5").unwrap(), 4..5);
        assert!(parse_columns("0-3").is_err());
        assert!(parse_columns("7-3").is_err());
        assert!(parse_columns("abc").is_err());
    }

    #[test]
    fn test_completion_message() {
        use seqcons::model::Record;

        let rows = vec![Record::new("a", "A-C"), Record::new("b", "G-C")];
        let alignment = ingest(&rows, &IngestOptions::default()).unwrap();
        let report = analyze(&alignment, &AnalysisOptions::default()).unwrap();
        assert_eq!(report.degenerate_columns(), vec![1]);

        assert_eq!(
            completion_message(&report, Path::new("out.csv")).as_deref(),
            Some("Wrote entropy of 3 columns to out.csv")
        );
        assert_eq!(completion_message(&report, Path::new("-")), None);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["seqcons", "-a", "dna", "--columns", "2-4", "-vv", "aln.fa"]);
        assert_eq!(args.alphabet, "dna");
        assert_eq!(args.columns, Some(1..4));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.output, PathBuf::from("Entropies.csv"));
    }
}
