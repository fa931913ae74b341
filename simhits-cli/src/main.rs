//! simhits CLI - Command-line tool for flattening simulated events.
//!
//! This binary runs the hit flattening step over an event file.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Parser, Subcommand};
use log::warn;
use simhits_core::{
    DataStore, EventFlattening, EventSummary, FieldNames, FlattenedOutput, HitArrayExtractor,
};
use simhits_io::{
    run_events, EventFileReader, FlattenStep, FlattenedFileWriter, RunConfig, StepOutcome,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    SimhitsIo(#[from] simhits_io::Error),

    #[error("Store error: {0}")]
    Store(#[from] simhits_core::StoreError),
}

/// Flatten simulated detector events into per-hit arrays.
#[derive(Parser)]
#[command(name = "simhits")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the flattening step over every event of a file
    Run {
        /// Input event file (JSON lines)
        input: PathBuf,

        /// Write flattened events to this file (.csv or .bin)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of events to process
        #[arg(long)]
        evt_max: Option<usize>,
    },

    /// Show information about an event file
    Info {
        /// Input event file (JSON lines)
        input: PathBuf,
    },
}

/// Output encodings selected by file extension.
#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Csv,
    Binary,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Self::Csv,
            Some("bin" | "dat") => Self::Binary,
            other => {
                warn!(
                    "Unknown extension '{}', defaulting to binary",
                    other.unwrap_or("")
                );
                Self::Binary
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(input: &Path, output: Option<&Path>, evt_max: Option<usize>) -> Result<()> {
    let start = Instant::now();
    let mut buffer = EventFileReader::open(input)?.into_buffer()?;

    let mut writer = match output {
        Some(path) => Some((
            FlattenedFileWriter::create(path)?,
            OutputFormat::from_path(path),
        )),
        None => None,
    };

    let names = FieldNames::default();
    let mut store = DataStore::new();
    let mut failure: Option<CliError> = None;
    let step = FlattenStep::new(HitArrayExtractor::new());
    println!("Extractor: {}", step.extractor().name());

    let stats = run_events(
        &mut buffer,
        &step,
        &mut store,
        &RunConfig::default().with_evt_max(evt_max),
        |result, store| {
            if failure.is_some() {
                return;
            }
            let Ok(StepOutcome::Published { event_id, .. }) = result else {
                return;
            };
            if let Err(e) = report_event(*event_id, store, &names, &mut writer) {
                failure = Some(e);
            }
        },
    );

    if let Some(err) = failure {
        return Err(err);
    }
    if let Some((writer, _)) = writer.as_mut() {
        writer.flush()?;
    }

    println!(
        "Processed {} events in {:.2}s",
        stats.processed,
        start.elapsed().as_secs_f64()
    );
    println!("Published: {}", stats.published);
    println!("Skipped (no hits): {}", stats.skipped);
    println!("Failed: {}", stats.failed);
    println!("Total hits: {}", stats.total_hits);
    Ok(())
}

fn report_event(
    event_id: i32,
    store: &DataStore,
    names: &FieldNames,
    writer: &mut Option<(FlattenedFileWriter, OutputFormat)>,
) -> Result<()> {
    let summary = EventSummary::from_store_with_names(store, names)?;
    println!(
        "Event {}: vertex=({:.3}, {:.3}, {:.3}) edep={:.4} hits={} total_pe={} mean_hittime={}",
        event_id,
        summary.vertex.0,
        summary.vertex.1,
        summary.vertex.2,
        summary.edep,
        summary.n_hits,
        summary.total_pe,
        summary
            .mean_hit_time
            .map_or_else(|| "n/a".to_string(), |t| format!("{t:.3}"))
    );

    if let Some((writer, format)) = writer {
        let output = FlattenedOutput::from_store(store, names)?;
        match format {
            OutputFormat::Csv => writer.write_event_csv(event_id, &output)?,
            OutputFormat::Binary => writer.write_event_binary(event_id, &output)?,
        }
    }
    Ok(())
}

fn info(input: &Path) -> Result<()> {
    let navs = EventFileReader::open(input)?.read_all()?;

    let mut with_payload = 0usize;
    let mut without_hits = 0usize;
    let mut hits = 0usize;
    let mut tracks = 0usize;
    let mut total_pe = 0i64;
    for event in navs
        .iter()
        .filter_map(|nav| nav.sim_header.as_ref().and_then(|h| h.event()))
    {
        with_payload += 1;
        hits += event.hits.len();
        tracks += event.tracks.len();
        total_pe += event.total_npe();
        if event.hits.is_empty() {
            without_hits += 1;
        }
    }

    println!("File: {}", input.display());
    println!("Events: {}", navs.len());
    println!("Events with SimEvent: {}", with_payload);
    println!("Events without hits: {}", without_hits);
    println!("Tracks: {}", tracks);
    println!("Hits: {}", hits);
    println!("Total PE: {}", total_pe);
    if with_payload > 0 {
        println!("Mean hits/event: {:.1}", hits as f64 / with_payload as f64);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            output,
            evt_max,
        } => run(&input, output.as_deref(), evt_max),
        Commands::Info { input } => info(&input),
    }
}
