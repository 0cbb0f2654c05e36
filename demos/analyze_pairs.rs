//! Analyze hypothesis/reference pairs from the command line.
//!
//! `--hyp` and `--ref` take literal text or a path to a text file. With
//! `--lines`, both inputs are split on newlines and compared line by line.
//!
//! ```text
//! cargo run --example analyze_pairs -- --hyp "the cat sat" --ref "the cat sat down" -v
//! cargo run --example analyze_pairs -- --hyp hyp.txt --ref ref.txt --lines -o analysis.jsonl
//! ```
//!
//! Each sample is written as one JSON line; the corpus WER/CER (edits summed
//! over all samples, divided by summed reference length) is printed last.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use editops::{aggregate, pair_lines, AnalysisOptions, Alignment};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Analyze pairs of strings")]
struct Args {
    /// Hypothesis text for alignment (string or text file).
    #[arg(long, default_value = "put an hypothesis here")]
    hyp: String,
    /// Reference text for alignment (string or text file).
    #[arg(long = "ref", default_value = "put a reference here")]
    reference: String,
    /// Split the inputs on newlines for one-to-one analysis.
    #[arg(short, long)]
    lines: bool,
    /// Write the full per-sample analysis here as JSON lines.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print each alignment with its WER/CER.
    #[arg(short, long)]
    verbose: bool,
    /// JSON options document (weights, gram range, markers).
    #[arg(long)]
    options: Option<PathBuf>,
    /// Print the most frequent tokens with their statistics.
    #[arg(long, default_value_t = 0)]
    top: usize,
}

fn read_text(arg: &str) -> Result<String, std::io::Error> {
    if Path::new(arg).is_file() {
        fs::read_to_string(arg)
    } else {
        Ok(arg.to_string())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = match &args.options {
        Some(path) => AnalysisOptions::from_json(&fs::read_to_string(path)?)?,
        None => AnalysisOptions::default(),
    };

    let hyp = read_text(&args.hyp)?;
    let reference = read_text(&args.reference)?;
    let pairs = if args.lines {
        pair_lines(&hyp, &reference)?
    } else {
        vec![(hyp.trim_end_matches('\n'), reference.trim_end_matches('\n'))]
    };

    if args.verbose {
        for &(h, r) in &pairs {
            let a = Alignment::new(h, r, &options);
            println!("{a}\nWER: {:.02}\nCER: {:.02}", a.wer(), a.cer());
        }
    }

    let corpus = aggregate(&pairs, &options);

    if let Some(path) = &args.output {
        let mut out = BufWriter::new(fs::File::create(path)?);
        for a in &corpus.analyses {
            writeln!(out, "{}", a.to_json()?)?;
        }
        out.flush()?;
    }

    for t in corpus.tokens.iter().take(args.top) {
        println!(
            "{:<16} total={:<5} err={:.3} p={} r={} f={}",
            t.token,
            t.total,
            t.error_rate,
            fmt_opt(t.precision),
            fmt_opt(t.recall),
            fmt_opt(t.f_measure),
        );
    }

    println!("{}", "=".repeat(50));
    println!("WER: {}", fmt_pct(corpus.wer));
    println!("CER: {}", fmt_pct(corpus.cer));
    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map_or_else(|| "undefined (empty reference)".to_string(), |v| format!("{v:.02}"))
}
