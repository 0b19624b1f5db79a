// collect.rs - Prompt-driven collection of simulation jobs
//
// The prompt order is fixed; upstream scripts pipe answers in exactly this
// sequence, so reordering prompts breaks existing parameter files.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::str::FromStr;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::multiplier::temperature_sweep;
use crate::params::{parse_field, parse_flag, Action, GraphFamily, GraphSetup, Job};

/// Selector that ends the action loop.
pub const END_OF_ACTIONS: i64 = -1;

/// Supplies answers to prompts. `None` means no more input is available.
pub trait ParameterSource {
    fn next_token(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads whitespace-separated answers from a reader, echoing prompt labels to
/// `out` only in display mode. Input is consumed either way.
pub struct PromptReader<R, W> {
    input: R,
    out: W,
    display: bool,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> PromptReader<R, W> {
    pub fn new(input: R, out: W, display: bool) -> Self {
        Self { input, out, display, pending: VecDeque::new() }
    }
}

impl<R: BufRead, W: Write> ParameterSource for PromptReader<R, W> {
    fn next_token(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.display {
            writeln!(self.out, "{prompt}")?;
            self.out.flush()?;
        }
        let mut line = String::new();
        while self.pending.is_empty() {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }
}

fn required<S: ParameterSource + ?Sized>(
    source: &mut S,
    prompt: &str,
    field: &'static str,
) -> Result<String> {
    source.next_token(prompt)?.ok_or(Error::UnexpectedEof { field })
}

fn read<T: FromStr, S: ParameterSource + ?Sized>(
    source: &mut S,
    prompt: &str,
    field: &'static str,
) -> Result<T> {
    let token = required(source, prompt, field)?;
    parse_field(field, &token)
}

fn read_flag<S: ParameterSource + ?Sized>(
    source: &mut S,
    prompt: &str,
    field: &'static str,
) -> Result<bool> {
    let token = required(source, prompt, field)?;
    parse_flag(field, &token)
}

/// Graph construction parameters, family-specific ones last.
pub fn read_setup<S: ParameterSource + ?Sized>(source: &mut S) -> Result<GraphSetup> {
    let digraph = read_flag(source, "is digraph y/n", "digraph flag")?;
    let loops_allowed = read_flag(source, "are loops allowed y/n", "loops flag")?;
    let directory = required(source, "enter directory", "directory")?;
    let vertices = read(source, "enter the number of vertices of the graph", "vertex count")?;
    let generator = read(source, "enter the number of the generator to use", "generator")?;
    let seed = read(source, "enter a seed for the random number generator", "seed")?;
    let value = read(source, "enter the value to use", "value")?;
    let family_selector: u8 = read(source, "enter the number of graph to use", "graph family")?;

    let family = match family_selector {
        0 => GraphFamily::ErdosRenyi {
            connectivity: read(source, "enter connectivity of the graph", "connectivity")?,
        },
        1 => GraphFamily::StochasticBlock {
            inter_connectivity: read(
                source,
                "enter interblock connectivity of the graph",
                "interblock connectivity",
            )?,
            intra_connectivity: read(
                source,
                "enter intrablock connectivity of the graph",
                "intrablock connectivity",
            )?,
            blocks: read(source, "enter the number of blocks", "number of blocks")?,
        },
        other => {
            return Err(Error::InvalidField { field: "graph family", value: other.to_string() })
        }
    };

    Ok(GraphSetup { digraph, loops_allowed, directory, vertices, generator, seed, value, family })
}

fn read_temperatures<S: ParameterSource + ?Sized>(source: &mut S) -> Result<(f64, f64, f64)> {
    let min = read(source, "enter minimum temperature", "minimum temperature")?;
    let max = read(source, "enter maximum temperature", "maximum temperature")?;
    let step = read(source, "enter temperature step", "temperature step")?;
    Ok((min, max, step))
}

/// Actions for one selector, expanded over temperature sweeps.
fn read_action<S: ParameterSource + ?Sized>(
    source: &mut S,
    selector: i64,
) -> Result<Option<Vec<Action>>> {
    let actions = match selector {
        0 => vec![Action::SimpleSampling {
            samples: read(source, "number of samples", "samples")?,
        }],
        1 => {
            let (min, max, step) = read_temperatures(source)?;
            let samples = read(source, "number of samples", "samples")?;
            let equilibration =
                read(source, "number of steps for equilibration", "equilibration steps")?;
            temperature_sweep(min, max, step)?
                .into_iter()
                .map(|temperature| Action::Metropolis { temperature, samples, equilibration })
                .collect()
        }
        2 => {
            let (min, max, step) = read_temperatures(source)?;
            let samples = read(source, "number of samples", "samples")?;
            temperature_sweep(min, max, step)?
                .into_iter()
                .map(|temperature| Action::Equilibration { temperature, samples })
                .collect()
        }
        3 => vec![Action::WangLandau {
            lower: read(source, "enter lower bound", "lower bound")?,
            upper: read(source, "enter upper bound", "upper bound")?,
            sweeps: read(source, "enter the number of sweeps for the evaluation", "sweeps")?,
            final_modification: read(
                source,
                "enter the final modification factor",
                "final modification factor",
            )?,
        }],
        _ => return Ok(None),
    };
    Ok(Some(actions))
}

/// Runs the whole prompt session: graph setup, then actions until `-1` or
/// end of input. Jobs come back in the order they were requested.
pub fn collect_jobs<S: ParameterSource + ?Sized>(source: &mut S) -> Result<Vec<Job>> {
    let setup = read_setup(source)?;
    let mut jobs = Vec::new();

    loop {
        let Some(token) = source.next_token("which action should be done")? else {
            debug!("input exhausted, closing action selection");
            break;
        };
        let selector: i64 = parse_field("action", &token)?;
        if selector == END_OF_ACTIONS {
            break;
        }
        match read_action(source, selector)? {
            Some(actions) => {
                if actions.is_empty() {
                    warn!("action {selector} produced no jobs (empty temperature sweep)");
                }
                jobs.extend(actions.into_iter().map(|action| Job::new(setup.clone(), action)));
            }
            None => warn!("ignoring unknown action {selector}"),
        }
    }

    debug!("collected {} jobs", jobs.len());
    Ok(jobs)
}
