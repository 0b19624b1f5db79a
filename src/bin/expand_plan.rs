// src/bin/expand_plan.rs - Print the argument strings a TOML plan expands to

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use largedev_sbm::plan::SweepPlan;

#[derive(Parser)]
struct Cli {
    /// TOML parameter plan
    plan: PathBuf,

    /// Print the number of jobs per action selector to stderr
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    let jobs = SweepPlan::load(&args.plan)
        .and_then(SweepPlan::into_jobs)
        .with_context(|| format!("Failed to expand {}", args.plan.display()))?;

    for job in &jobs {
        println!("{job}");
    }

    if args.summary {
        let mut counts = [0usize; 4];
        for job in &jobs {
            counts[job.action.selector() as usize] += 1;
        }
        eprintln!(
            "{} jobs: {} simple sampling, {} Metropolis, {} equilibration, {} Wang-Landau",
            jobs.len(),
            counts[0],
            counts[1],
            counts[2],
            counts[3]
        );
    }
    Ok(())
}
