//! Herdsense CLI - Command-line interface for the herd analytics engine
//!
//! Commands:
//! - classify: train on a labeled CSV and classify an unlabeled one (batch mode)
//! - track: read `lat,long` lines from stdin and emit tracking updates (streaming mode)

use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use herdsense::model::{LogObserver, TrainConfig};
use herdsense::pipeline::HerdProcessor;
use herdsense::{HerdError, ENGINE_VERSION};

/// Herdsense - On-device analytics engine for livestock movement tracking
#[derive(Parser)]
#[command(name = "herdsense")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Classify herd behavior and track animal movement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a labeled CSV and classify an unlabeled one (batch mode)
    Classify {
        /// Labeled training CSV (Latitud,Longitud,Velocidad,Comportamiento)
        #[arg(short, long)]
        train: PathBuf,

        /// Unlabeled CSV to classify
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Training epochs
        #[arg(long, default_value = "200")]
        epochs: usize,

        /// Mini-batch size
        #[arg(long, default_value = "32")]
        batch_size: usize,

        /// Validation split fraction
        #[arg(long, default_value = "0.2")]
        validation_split: f64,
    },

    /// Read `lat,long` lines from stdin and emit tracking updates (streaming mode)
    Track {
        /// Optional labeled training CSV; when given, each coordinate is
        /// also classified
        #[arg(long)]
        train: Option<PathBuf>,

        /// Training epochs when --train is given
        #[arg(long, default_value = "200")]
        epochs: usize,

        /// Flush output after each update
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        flush: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Classify {
            train,
            input,
            output,
            epochs,
            batch_size,
            validation_split,
        } => run_classify(train, input, output, epochs, batch_size, validation_split),
        Commands::Track {
            train,
            epochs,
            flush,
        } => run_track(train, epochs, flush),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_classify(
    train: PathBuf,
    input: PathBuf,
    output: PathBuf,
    epochs: usize,
    batch_size: usize,
    validation_split: f64,
) -> Result<(), HerdError> {
    let config = TrainConfig {
        epochs,
        batch_size,
        validation_split,
        ..TrainConfig::default()
    };

    let report =
        herdsense::classify_csv_files(&train, &input, &config, &mut LogObserver)?;
    let json = serde_json::to_string_pretty(&report)?;

    if output.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}")?;
    } else {
        fs::write(&output, json)?;
    }

    Ok(())
}

fn run_track(train: Option<PathBuf>, epochs: usize, flush: bool) -> Result<(), HerdError> {
    let mut processor = HerdProcessor::new();
    if let Some(train_path) = train {
        let config = TrainConfig {
            epochs,
            ..TrainConfig::default()
        };
        let file = fs::File::open(train_path)?;
        processor.train_from_reader(file, &config, &mut LogObserver)?;
    }

    let mut session = processor.open_session()?;
    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        eprintln!("enter coordinates as lat,long (ctrl-d to end)");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (lat, long) = match trimmed.split_once(',') {
            Some(pair) => pair,
            None => {
                eprintln!("skipping {trimmed:?}: expected lat,long");
                continue;
            }
        };

        // Bad input rejects the single observation; the stream keeps going
        match session.add_tracked_coordinate(lat, long) {
            Ok(update) => {
                for event in &update.events {
                    eprintln!("alert: {}", serde_json::to_string(event)?);
                }
                writeln!(stdout, "{}", serde_json::to_string(&update)?)?;
                if flush {
                    stdout.flush()?;
                }
            }
            Err(HerdError::InvalidInput(field)) => {
                eprintln!("skipping invalid coordinate: {field}");
            }
            Err(other) => return Err(other),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_flush_flag_is_settable() {
        let cli = Cli::try_parse_from(["herdsense", "track"]).unwrap();
        match cli.command {
            Commands::Track { flush, .. } => assert!(flush),
            _ => panic!("expected track command"),
        }

        let cli = Cli::try_parse_from(["herdsense", "track", "--flush", "false"]).unwrap();
        match cli.command {
            Commands::Track { flush, .. } => assert!(!flush),
            _ => panic!("expected track command"),
        }
    }
}
