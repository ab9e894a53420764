//! Runs a text program through the five-stage demo pipeline.
//!
//! ```text
//! lockstep program.txt
//! lockstep program.txt --config pipeline.json --json
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `warn`, so stage lines on stdout
//! are not drowned out).

use anyhow::{Context, Result};
use clap::Parser;
use lockstep::demo::{self, ConsoleObserver, Summary};
use lockstep::PipelineConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lock-step five-stage pipeline demo")]
struct Cli {
    /// Program file, one instruction per line.
    input: PathBuf,

    /// JSON pipeline configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full run report as JSON instead of the summary.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig {
            label: "cpu".into(),
            ..PipelineConfig::default()
        },
    };
    let program = File::open(&cli.input)
        .with_context(|| format!("failed to open program '{}'", cli.input.display()))?;

    let console = ConsoleObserver::stdout();
    let report = demo::pipeline(BufReader::new(program), config)
        .with_observer(&console)
        .run()
        .context("pipeline run failed")?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!();
        println!("{}", Summary::from_report(&report));
    }
    Ok(())
}
