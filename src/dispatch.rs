// dispatch.rs - Running the simulation binary once per job, or preparing the analysis

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use clap::ValueEnum;
use csv::WriterBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::analysis::prepare_analysis;
use crate::error::Result;
use crate::params::Job;

/// How the collected jobs are consumed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Fixed-size worker pool, completion order unspecified.
    Parallel,
    /// One job after the other, in collection order.
    #[value(name = "sequentiell", alias = "sequential")]
    Sequential,
    /// No simulation; write `settings.R` for the analysis instead.
    #[value(name = "analyse", alias = "analyze")]
    Analyse,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Echo each job's captured output and show progress.
    pub display: bool,
    /// Worker threads in parallel mode.
    pub workers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { display: false, workers: num_cpus::get() }
    }
}

/// Result of one launch. A launch that failed to start has no exit code
/// and carries the reason in `launch_error`.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub index: usize,
    pub arguments: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub launch_error: Option<String>,
}

/// Starts the simulation binary through the platform shell, so the
/// invocation may carry its own arguments or redirections.
#[derive(Debug, Clone)]
pub struct Launcher {
    invocation: String,
}

impl Launcher {
    pub fn new(invocation: impl Into<String>) -> Self {
        Self { invocation: invocation.into() }
    }

    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    fn command(&self) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.invocation);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.invocation);
            cmd
        }
    }

    fn spawn_and_wait(&self, arguments: &str) -> std::io::Result<Output> {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A binary that exits without reading closes the pipe early.
            if let Err(e) = writeln!(stdin, "{arguments}") {
                warn!("could not write arguments to `{}`: {e}", self.invocation);
            }
        }
        child.wait_with_output()
    }

    /// Runs one job to completion. Failures are recorded, never raised.
    pub fn launch(&self, index: usize, job: &Job) -> JobOutcome {
        let arguments = job.argument_string();
        debug!("job {index}: {arguments}");

        match self.spawn_and_wait(&arguments) {
            Ok(output) => {
                if !output.status.success() {
                    warn!("job {index} ({arguments}) exited with {}", output.status);
                }
                JobOutcome {
                    index,
                    arguments,
                    exit_code: output.status.code(),
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    launch_error: None,
                }
            }
            Err(e) => {
                warn!("job {index}: failed to run `{}`: {e}", self.invocation);
                JobOutcome {
                    index,
                    arguments,
                    exit_code: None,
                    success: false,
                    stdout: String::new(),
                    stderr: String::new(),
                    launch_error: Some(e.to_string()),
                }
            }
        }
    }
}

/// What a run produced: per-job outcomes, or the settings script in analyse mode.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<JobOutcome>,
    pub settings: Option<PathBuf>,
}

impl DispatchReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// One CSV row per dispatched job, in submission order.
    pub fn write_manifest(&self, path: &Path) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_path(path)?;
        wtr.write_record(["index", "arguments", "exit_code", "success"])?;
        for o in &self.outcomes {
            wtr.write_record(&[
                o.index.to_string(),
                o.arguments.clone(),
                o.exit_code.map(|c| c.to_string()).unwrap_or_default(),
                o.success.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

pub struct Dispatcher {
    launcher: Launcher,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(launcher: Launcher, config: DispatchConfig) -> Self {
        Self { launcher, config }
    }

    fn progress(&self, len: usize) -> ProgressBar {
        if !self.config.display {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::with_template(" {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]")
        {
            bar.set_style(style);
        }
        bar
    }

    fn finish_job(&self, bar: &ProgressBar, outcome: &JobOutcome) {
        if self.config.display {
            let mut block = format!("[{}] {}\n", outcome.index, outcome.arguments);
            block.push_str(&outcome.stdout);
            block.push_str(&outcome.stderr);
            if let Some(e) = &outcome.launch_error {
                block.push_str(e);
                block.push('\n');
            }
            bar.suspend(|| print!("{block}"));
        }
        bar.inc(1);
    }

    pub fn run(&self, mode: RunMode, jobs: &[Job]) -> Result<DispatchReport> {
        info!("{} jobs, mode {mode:?}, binary `{}`", jobs.len(), self.launcher.invocation());
        match mode {
            RunMode::Analyse => {
                let path = prepare_analysis(jobs)?;
                Ok(DispatchReport { outcomes: Vec::new(), settings: Some(path) })
            }
            RunMode::Sequential => {
                let bar = self.progress(jobs.len());
                let mut outcomes = Vec::with_capacity(jobs.len());
                for (index, job) in jobs.iter().enumerate() {
                    let outcome = self.launcher.launch(index, job);
                    self.finish_job(&bar, &outcome);
                    outcomes.push(outcome);
                }
                bar.finish();
                Ok(DispatchReport { outcomes, settings: None })
            }
            RunMode::Parallel => {
                let workers = self.config.workers.max(1);
                info!("starting pool with {workers} workers");
                let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
                let bar = self.progress(jobs.len());
                // Indexed collect keeps submission order regardless of completion order.
                let outcomes: Vec<JobOutcome> = pool.install(|| {
                    jobs.par_iter()
                        .enumerate()
                        .map(|(index, job)| {
                            let outcome = self.launcher.launch(index, job);
                            self.finish_job(&bar, &outcome);
                            outcome
                        })
                        .collect()
                });
                bar.finish();
                Ok(DispatchReport { outcomes, settings: None })
            }
        }
    }
}
