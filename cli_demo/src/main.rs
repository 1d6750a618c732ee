use clap::Parser;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kanji_lookup::{LookupConfig, LookupResult, Matcher, PatternDatabase, Point, Stroke};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs recorded drawings through the lookup and reports accuracy")]
struct Cli {
    /// Directory with strokes-<n>.txt reference files
    #[arg(short, long, default_value = "kanji_lookup/data")]
    patterns: PathBuf,

    /// Compiled pattern snapshot; takes precedence over --patterns
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// JSON lines, each {"char": ..., "strokes": [[[x, y], ...], ...]}
    #[arg(short, long, default_value = "kanji_lookup/data/inputs.jsonl")]
    inputs: PathBuf,

    /// JSON lookup config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured result limit
    #[arg(short, long)]
    limit: Option<usize>,

    #[arg(long, default_value_t = 1)]
    iters: usize,

    /// Print each input's ranked characters
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Serialize, Deserialize)]
struct Input {
    char: String,
    strokes: Vec<Vec<Vec<i32>>>,
}

fn read_inputs(path: &PathBuf) -> LookupResult<Vec<Input>> {
    let mut res: Vec<Input> = Vec::new();
    let file = File::open(path)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let input: Input = serde_json::from_str(&line)?;
        res.push(input);
    }
    Ok(res)
}

fn get_strokes(raw: &Vec<Vec<Vec<i32>>>) -> Vec<Stroke> {
    let mut strokes: Vec<Stroke> = Vec::with_capacity(raw.len());
    for raw_stroke in raw {
        let mut points: Vec<Point> = Vec::with_capacity(raw_stroke.len());
        for pt in raw_stroke {
            if pt.len() < 2 {
                continue;
            }
            points.push(Point { x: pt[0], y: pt[1] });
        }
        strokes.push(Stroke { points: points });
    }
    strokes
}

fn open_database(cli: &Cli, config: &LookupConfig) -> LookupResult<PatternDatabase> {
    match &cli.snapshot {
        Some(path) => {
            info!("Loading snapshot: {}", path.display());
            PatternDatabase::from_snapshot(File::open(path)?)
        }
        None => {
            info!("Loading reference files from: {}", cli.patterns.display());
            Ok(PatternDatabase::from_dir(&cli.patterns, config))
        }
    }
}

fn run(cli: &Cli) -> LookupResult<()> {
    let mut config = match &cli.config {
        Some(path) => LookupConfig::from_json_file(path)?,
        None => LookupConfig::default(),
    };
    if let Some(limit) = cli.limit {
        config.limit = limit;
    }

    let db = open_database(cli, &config)?;
    let matcher = Matcher::new(&db);

    let inputs = read_inputs(&cli.inputs)?;
    info!("Loaded {} inputs; starting {} cycles of evaluation.", inputs.len(), cli.iters);
    let start = Instant::now();
    let mut guessed = 0;
    let mut total = 0;
    for _ in 0..cli.iters {
        for input in &inputs {
            let strokes = get_strokes(&input.strokes);
            let matches = matcher.lookup(&strokes, config.limit)?;
            total += 1;
            let expected = input.char.chars().next();
            if matches.first().map(|m| m.character) == expected && expected.is_some() {
                guessed += 1;
            }
            if cli.verbose {
                let ranked: Vec<String> = matches.iter().map(|m| format!("{}:{}", m.character, m.cost)).collect();
                println!("{} -> {}", input.char, ranked.join(" "));
            }
        }
    }
    let duration = start.elapsed();
    if total > 0 && guessed < total {
        warn!("{} of {} lookups missed the expected character.", total - guessed, total);
    }
    println!("Finished in {:?}. Correct guesses: {} of {}.", duration, guessed, total);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
