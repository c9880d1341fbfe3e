use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use somnoscore_reader::{
    read_scoring_from_path, ReadOptions, ReadOutcome, ScoreMap, Scoring, SourceFormat, Standard,
};

/// A CLI for normalizing sleep-scoring export files.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read one scoring export and print a stage summary.
    Read {
        file: PathBuf,
        #[command(flatten)]
        options: ReadArgs,
        /// Write the canonical scoring record as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Read every file in a directory with one shared configuration.
    Batch {
        #[arg(short, long)]
        dir: PathBuf,
        #[command(flatten)]
        options: ReadArgs,
    },
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// Source format identifier (zmax, somnomedics, spisop, fasst,
    /// u-sleep-30s, nin, sleeptrip, custom, or an unknown name).
    #[arg(short, long, default_value = "custom")]
    format: String,

    /// Target labeling standard: aasm, rk or custom.
    #[arg(short, long, default_value = "aasm")]
    standard: String,

    /// Score map entries as OLD=NEW pairs (repeatable); required with
    /// --standard custom.
    #[arg(long = "map", value_parser = parse_map_entry)]
    map: Vec<(String, String)>,

    /// Fallback label for raw values missing from the score map.
    #[arg(long, default_value = "?")]
    map_unknown: String,

    /// Column delimiter for delimited-text sources.
    #[arg(long)]
    delimiter: Option<char>,

    /// Number of header rows to skip.
    #[arg(long)]
    header_skip: Option<usize>,

    /// Skip rows up to and including the one whose first column matches.
    #[arg(long)]
    skip_until: Option<String>,

    /// First-column values whose rows are dropped (repeatable).
    #[arg(long)]
    ignore: Vec<String>,

    /// First-column values whose rows are kept (repeatable).
    #[arg(long)]
    select: Vec<String>,

    /// 1-based index of the label column.
    #[arg(long)]
    label_column: Option<usize>,

    /// Enable excluded-epoch tracking.
    #[arg(long)]
    exclusion: bool,

    /// 1-based index of the exclusion column.
    #[arg(long)]
    exclusion_column: Option<usize>,

    /// Values marking an epoch excluded (repeatable).
    #[arg(long = "exclusion-marker")]
    exclusion_markers: Vec<String>,

    /// Seconds per epoch.
    #[arg(long)]
    epoch_length: Option<f64>,

    /// Signed offset in seconds aligning the scoring to the recording.
    #[arg(long)]
    data_offset: Option<f64>,
}

fn parse_map_entry(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(old, new)| (old.to_string(), new.to_string()))
        .ok_or_else(|| format!("expected OLD=NEW, got '{value}'"))
}

fn build_options(args: &ReadArgs) -> Result<ReadOptions> {
    let standard: Standard = args.standard.parse().map_err(anyhow::Error::msg)?;

    let mut builder = ReadOptions::builder()
        .source_format(SourceFormat::from_name(&args.format))
        .standard(standard);

    if !args.map.is_empty() {
        let (old, new): (Vec<String>, Vec<String>) = args.map.iter().cloned().unzip();
        let map = ScoreMap::new(old, new, args.map_unknown.clone())?;
        builder = builder.score_map(map);
    }
    if let Some(delimiter) = args.delimiter {
        if !delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character");
        }
        builder = builder.delimiter(delimiter as u8);
    }
    if let Some(rows) = args.header_skip {
        builder = builder.header_skip(rows);
    }
    if let Some(marker) = &args.skip_until {
        builder = builder.skip_until_marker(marker.clone());
    }
    if !args.ignore.is_empty() {
        builder = builder.ignore_lines(args.ignore.clone());
    }
    if !args.select.is_empty() {
        builder = builder.select_lines(args.select.clone());
    }
    if let Some(column) = args.label_column {
        builder = builder.label_column(column);
    }
    if args.exclusion {
        builder = builder.exclusion_enabled(true);
    }
    if let Some(column) = args.exclusion_column {
        builder = builder.exclusion_column(column);
    }
    if !args.exclusion_markers.is_empty() {
        builder = builder.exclusion_markers(args.exclusion_markers.clone());
    }
    if let Some(seconds) = args.epoch_length {
        builder = builder.epoch_length_s(seconds);
    }
    if let Some(seconds) = args.data_offset {
        builder = builder.data_offset_s(seconds);
    }

    Ok(builder.build())
}

fn report_advisories(outcome: &ReadOutcome) {
    for advisory in &outcome.advisories {
        warn!("{advisory}");
    }
}

fn print_summary(scoring: &Scoring) {
    let mut counts: Vec<(String, usize, usize)> = scoring
        .label_set
        .iter()
        .map(|label| (label.clone(), 0, 0))
        .collect();
    for (label, excluded) in scoring.epochs.iter().zip(&scoring.excluded) {
        if let Some(entry) = counts.iter_mut().find(|(l, _, _)| l == label) {
            entry.1 += 1;
            if *excluded {
                entry.2 += 1;
            }
        }
    }

    let mut table = Table::new();
    table.set_header(["stage", "epochs", "excluded"]);
    for (label, epochs, excluded) in counts {
        table.add_row([label, epochs.to_string(), excluded.to_string()]);
    }
    println!("{table}");
    println!(
        "{} epochs of {}s, standard {}",
        scoring.epoch_count(),
        scoring.epoch_length_s,
        scoring.standard
    );
}

fn handle_read(file: &PathBuf, options: &ReadOptions, json: Option<&PathBuf>) -> Result<()> {
    let outcome = read_scoring_from_path(file, options)
        .with_context(|| format!("failed to read scoring from {}", file.display()))?;
    report_advisories(&outcome);
    print_summary(&outcome.scoring);

    if let Some(out) = json {
        let encoded = serde_json::to_vec_pretty(&outcome.scoring)?;
        std::fs::write(out, encoded)
            .with_context(|| format!("failed to write {}", out.display()))?;
        info!("wrote scoring record to {}", out.display());
    }
    Ok(())
}

fn handle_batch(dir: &PathBuf, options: &ReadOptions) -> Result<()> {
    let pattern = dir.join("*");
    let pattern_str = pattern
        .to_str()
        .context("directory path is not valid UTF-8")?;

    let mut success_count = 0;
    let mut failure_count = 0;

    for entry in glob::glob(pattern_str)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!("could not read path from glob pattern: {err}");
                failure_count += 1;
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        match read_scoring_from_path(&path, options) {
            Ok(outcome) => {
                report_advisories(&outcome);
                info!(
                    "{}: {} epochs, {} excluded",
                    path.display(),
                    outcome.scoring.epoch_count(),
                    outcome.scoring.excluded.iter().filter(|e| **e).count()
                );
                success_count += 1;
            }
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                failure_count += 1;
            }
        }
    }

    info!("batch finished: {success_count} succeeded, {failure_count} failed");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Read {
            file,
            options,
            json,
        } => {
            let options = build_options(&options)?;
            handle_read(&file, &options, json.as_ref())
        }
        Command::Batch { dir, options } => {
            let options = build_options(&options)?;
            handle_batch(&dir, &options)
        }
    }
}
