//! Collects large-deviation simulation parameters and runs the simulation
//! binary once per generated argument string, or prepares the R analysis.
//
//  Usage:  largedev_sbm <binary> <disp|nodisp> <parallel|sequentiell|analyse> < params

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn};

use largedev_sbm::collect::{collect_jobs, PromptReader};
use largedev_sbm::dispatch::{DispatchConfig, Dispatcher, Launcher, RunMode};
use largedev_sbm::plan::SweepPlan;

#[derive(Parser, Debug)]
#[command(
    name = "largedev_sbm",
    about = "Collects simulation parameters and dispatches the large-deviation SBM binary."
)]
struct Cli {
    /// Invocation of the simulation binary, run through the shell (unused when analysing)
    binary: String,

    /// `disp` shows prompts and job output; anything else runs quietly
    display: String,

    /// What to do with the collected jobs
    #[arg(value_enum)]
    mode: RunMode,

    /// Read parameters from a TOML plan instead of standard input
    #[arg(long)]
    params: Option<PathBuf>,

    /// Worker threads for parallel mode (default: available processing units)
    #[arg(long)]
    workers: Option<usize>,

    /// Write a CSV manifest of the dispatched jobs
    #[arg(long)]
    manifest: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let display = cli.display == "disp";

    env_logger::Builder::new()
        .filter_level(if display { log::LevelFilter::Info } else { log::LevelFilter::Warn })
        .parse_default_env()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let jobs = match &cli.params {
        Some(path) => SweepPlan::load(path)
            .and_then(SweepPlan::into_jobs)
            .with_context(|| format!("Failed to load parameter plan {}", path.display()))?,
        None => {
            let mut reader = PromptReader::new(io::stdin().lock(), io::stdout(), display);
            collect_jobs(&mut reader).context("Failed to read simulation parameters")?
        }
    };

    let mut config = DispatchConfig { display, ..DispatchConfig::default() };
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    let dispatcher = Dispatcher::new(Launcher::new(cli.binary), config);
    let report = dispatcher.run(cli.mode, &jobs)?;

    if let Some(settings) = &report.settings {
        info!("analysis settings written to {}", settings.display());
    }
    let failures = report.failures();
    if failures > 0 {
        warn!("{failures} of {} jobs did not finish successfully", report.outcomes.len());
    }
    if let Some(path) = &cli.manifest {
        report
            .write_manifest(path)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    }

    println!("\n");
    Ok(())
}
