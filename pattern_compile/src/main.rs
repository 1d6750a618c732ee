use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kanji_lookup::{DirSource, LookupConfig, LookupResult, PatternDatabase};

/// Compiles a directory of reference pattern files into one binary snapshot.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory with strokes-<n>.txt reference files
    #[arg(short, long, default_value = "kanji_lookup/data")]
    patterns: PathBuf,

    #[arg(short, long, default_value = "kanji_lookup/data/patterns.bin")]
    output: PathBuf,

    /// JSON lookup config, for non-default file naming
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn compile(cli: &Cli) -> LookupResult<()> {
    let config = match &cli.config {
        Some(path) => LookupConfig::from_json_file(path)?,
        None => LookupConfig::default(),
    };
    let stroke_counts = DirSource::new(&cli.patterns, &config).stroke_counts()?;
    let db = PatternDatabase::from_dir(&cli.patterns, &config);
    // Any malformed file aborts the whole compilation
    let candidates = db.preload(&stroke_counts)?;
    info!(
        "Parsed {} candidates over {} stroke counts from {}",
        candidates,
        stroke_counts.len(),
        cli.patterns.display()
    );

    let f = File::create(&cli.output)?;
    let mut writer = BufWriter::new(f);
    // Flushes before returning, so a failed final write is reported here
    db.write_snapshot(&mut writer)?;
    info!("Wrote snapshot to {}", cli.output.display());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = compile(&cli) {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
