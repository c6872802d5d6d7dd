//! # ccsid-scrub CLI - CCSID-Aware Text Re-Encoder
//!
//! Command-line front for converting text files between CCSID/EBCDIC and
//! Unicode encodings, with line-ending normalization, smart-quote
//! collapse and best-effort CCSID tagging on IBM i.

#[cfg(feature = "cli")]
use std::env;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::process;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use tracing::{debug, error, warn};

#[cfg(feature = "cli")]
use ccsid_scrub::{
    ccsid, ConversionJob, ConversionReport, EbcdicClassifier, Encoding, LineTerminator,
    ReplacementPolicy,
};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// ccsid-scrub: re-encode a text file between character encodings
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "ccsid-scrub")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file
    #[arg(long = "in", value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to <in>.out)
    #[arg(long = "out", value_name = "FILE")]
    output: Option<PathBuf>,

    /// How to handle unconvertible characters (replace or delete)
    #[arg(long, value_name = "OPT", default_value = "delete")]
    opt: String,

    /// Input file CCSID or charset name
    #[arg(long = "in-ccsid", value_name = "CCSID", default_value = "UTF-8")]
    in_ccsid: String,

    /// Output file CCSID or charset name
    #[arg(long = "out-ccsid", value_name = "CCSID", default_value = "UTF-8")]
    out_ccsid: String,

    /// Replacement text to use when replacing
    #[arg(long, value_name = "STRING", default_value = "?")]
    replacement: String,

    /// Replace "smart quotes" with standard quotes
    #[arg(long, overrides_with = "no_smart_quotes")]
    smart_quotes: bool,

    /// Keep smart quotes as they are
    #[arg(long, overrides_with = "smart_quotes")]
    no_smart_quotes: bool,

    /// Line endings to use for the output file (cr, crlf or lf)
    #[arg(long = "line-end", value_name = "END", default_value = "lf")]
    line_end: String,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Long flags that take a value, accepted as `--flag=value` or
/// `--flag value`.
#[cfg(feature = "cli")]
const VALUE_FLAGS: &[&str] = &[
    "--in",
    "--out",
    "--opt",
    "--in-ccsid",
    "--out-ccsid",
    "--replacement",
    "--line-end",
    "--format",
];

#[cfg(feature = "cli")]
const SWITCH_FLAGS: &[&str] = &[
    "--smart-quotes",
    "--no-smart-quotes",
    "--verbose",
    "--help",
    "--version",
];

#[cfg(feature = "cli")]
const SHORT_FLAGS: &[&str] = &["-v", "-h", "-V"];

#[cfg(feature = "cli")]
fn main() {
    let raw: Vec<String> = env::args().collect();
    let verbose = raw
        .iter()
        .any(|arg| arg == "-v" || arg.eq_ignore_ascii_case("--verbose"));
    init_tracing(verbose);

    let (known, unknown) = partition_args(raw);
    for arg in &unknown {
        warn!("argument '{}' unrecognized and will be ignored", arg);
    }

    let cli = match Cli::try_parse_from(&known) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // help goes to a non-zero exit so scripts never mistake
            // usage output for a conversion
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayVersion => 0,
                clap::error::ErrorKind::DisplayHelp => 1,
                _ => 2,
            };
            process::exit(code);
        }
    };

    match run(&cli) {
        Ok(report) => {
            if let Err(err) = print_report(&cli, &report) {
                error!("{err:#}");
                process::exit(1);
            }
        }
        Err(err) => {
            error!("{err:#}");
            debug!("{err:?}");
            process::exit(1);
        }
    }
}

/// Split argv into arguments clap should see and arguments to ignore.
///
/// Long flag names are matched case-insensitively and normalized to
/// lowercase; anything unrecognized is dropped with a warning instead of
/// failing the run.
#[cfg(feature = "cli")]
fn partition_args(raw: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut known = Vec::with_capacity(raw.len());
    let mut unknown = Vec::new();
    let mut args = raw.into_iter();
    known.push(args.next().unwrap_or_else(|| "ccsid-scrub".to_string()));

    let mut expect_value = false;
    for arg in args {
        if expect_value {
            known.push(arg);
            expect_value = false;
            continue;
        }
        if let Some(rest) = arg.strip_prefix("--") {
            let (name, value) = match rest.split_once('=') {
                Some((name, value)) => (name.to_lowercase(), Some(value)),
                None => (rest.to_lowercase(), None),
            };
            let flag = format!("--{name}");
            let takes_value = VALUE_FLAGS.contains(&flag.as_str());
            if takes_value || SWITCH_FLAGS.contains(&flag.as_str()) {
                match value {
                    Some(value) => known.push(format!("{flag}={value}")),
                    None => {
                        expect_value = takes_value;
                        known.push(flag);
                    }
                }
            } else {
                unknown.push(arg);
            }
        } else if SHORT_FLAGS.contains(&arg.as_str()) {
            known.push(arg);
        } else {
            unknown.push(arg);
        }
    }
    (known, unknown)
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn run(cli: &Cli) -> Result<ConversionReport> {
    let job = build_job(cli);
    let classifier = EbcdicClassifier::new();
    ccsid_scrub::convert(&job, &classifier)
        .with_context(|| format!("failed to convert '{}'", job.input.display()))
}

/// Resolve the command line into an immutable job, falling back to the
/// defaults (with an error line) on invalid option values.
#[cfg(feature = "cli")]
fn build_job(cli: &Cli) -> ConversionJob {
    let policy = cli.opt.parse::<ReplacementPolicy>().unwrap_or_else(|msg| {
        error!("{msg}");
        ReplacementPolicy::default()
    });
    let line_end = cli.line_end.parse::<LineTerminator>().unwrap_or_else(|msg| {
        error!("{msg}");
        LineTerminator::default()
    });
    let input_encoding = resolve_or_default(&cli.in_ccsid, "input");
    let output_encoding = resolve_or_default(&cli.out_ccsid, "output");

    let output = cli.output.clone().unwrap_or_else(|| {
        warn!(
            "no output file specified, defaulting to {}.out",
            cli.input.display()
        );
        let mut path = cli.input.clone().into_os_string();
        path.push(".out");
        PathBuf::from(path)
    });

    ConversionJob {
        input: cli.input.clone(),
        output,
        input_encoding,
        output_encoding,
        policy,
        replacement: cli.replacement.clone(),
        line_end,
        smart_quotes: cli.smart_quotes,
    }
}

#[cfg(feature = "cli")]
fn resolve_or_default(token: &str, which: &str) -> Encoding {
    match ccsid::resolve(token) {
        Ok(encoding) => encoding,
        Err(err) => {
            error!("invalid {which} ccsid: {err}");
            Encoding::UTF8
        }
    }
}

#[cfg(feature = "cli")]
fn print_report(cli: &Cli, report: &ConversionReport) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            if cli.verbose {
                eprintln!(
                    "{} lines, {} bytes written{}",
                    report.lines,
                    report.bytes_written,
                    if report.tagged { ", CCSID tagged" } else { "" }
                );
            }
            eprintln!("✓ Conversion completed successfully");
        }
    }
    Ok(())
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("ccsid-scrub")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn unknown_arguments_are_partitioned_out() {
        let (known, unknown) = partition_args(argv(&["--in=a.txt", "--bogus=1", "stray"]));
        assert_eq!(known, vec!["ccsid-scrub", "--in=a.txt"]);
        assert_eq!(unknown, vec!["--bogus=1", "stray"]);
    }

    #[test]
    fn flag_names_are_case_insensitive() {
        let (known, unknown) = partition_args(argv(&["--IN=a.txt", "--Line-End=CRLF"]));
        assert_eq!(known, vec!["ccsid-scrub", "--in=a.txt", "--line-end=CRLF"]);
        assert!(unknown.is_empty());
    }

    #[test]
    fn space_separated_values_stay_with_their_flag() {
        let (known, unknown) = partition_args(argv(&["--in", "a.txt", "--smart-quotes"]));
        assert_eq!(known, vec!["ccsid-scrub", "--in", "a.txt", "--smart-quotes"]);
        assert!(unknown.is_empty());
    }

    #[test]
    fn cli_parses_partitioned_args() {
        let (known, _) = partition_args(argv(&[
            "--in=a.txt",
            "--out-ccsid=37",
            "--opt=replace",
            "--line-end=crlf",
            "--smart-quotes",
        ]));
        let cli = Cli::try_parse_from(&known).unwrap();
        assert_eq!(cli.input, PathBuf::from("a.txt"));
        assert_eq!(cli.out_ccsid, "37");
        assert!(cli.smart_quotes);

        let job = build_job(&cli);
        assert_eq!(job.output, PathBuf::from("a.txt.out"));
        assert_eq!(job.output_encoding, Encoding::EBCDIC_037);
        assert_eq!(job.policy, ReplacementPolicy::Replace);
        assert_eq!(job.line_end, LineTerminator::Crlf);
    }

    #[test]
    fn later_quote_flag_wins() {
        let (known, _) = partition_args(argv(&[
            "--in=a.txt",
            "--smart-quotes",
            "--no-smart-quotes",
        ]));
        let cli = Cli::try_parse_from(&known).unwrap();
        assert!(!cli.smart_quotes);
    }

    #[test]
    fn missing_input_is_a_parse_error() {
        let (known, _) = partition_args(argv(&["--out=b.txt"]));
        assert!(Cli::try_parse_from(&known).is_err());
    }

    #[test]
    fn bad_option_values_fall_back_to_defaults() {
        let (known, _) = partition_args(argv(&[
            "--in=a.txt",
            "--opt=mangle",
            "--line-end=nel",
            "--in-ccsid=klingon-8",
        ]));
        let cli = Cli::try_parse_from(&known).unwrap();
        let job = build_job(&cli);
        assert_eq!(job.policy, ReplacementPolicy::Delete);
        assert_eq!(job.line_end, LineTerminator::Lf);
        assert_eq!(job.input_encoding, Encoding::UTF8);
    }
}
