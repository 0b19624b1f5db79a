// params.rs - Typed simulation parameters and their argument-string encoding
//
// The simulation binary reads one whitespace-delimited line on stdin:
//
//   digraph loops directory vertices generator seed value family <family fields>
//       action <action fields>
//
// Family 0 (Erdős–Rényi) carries one connectivity, family 1 (stochastic block
// model) carries two connectivities and a block count, so the action selector
// lands at field 9 or 11. Only `Job`'s `Display`/`FromStr` know about positions.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Random graph ensemble plus its connectivity parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "family", rename_all = "kebab-case")]
pub enum GraphFamily {
    ErdosRenyi {
        connectivity: f64,
    },
    #[serde(rename = "block-model")]
    StochasticBlock {
        inter_connectivity: f64,
        intra_connectivity: f64,
        blocks: u32,
    },
}

impl GraphFamily {
    pub fn selector(&self) -> u8 {
        match self {
            GraphFamily::ErdosRenyi { .. } => 0,
            GraphFamily::StochasticBlock { .. } => 1,
        }
    }
}

/// Everything needed to construct the graph ensemble; shared by all jobs of a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphSetup {
    pub digraph: bool,
    pub loops_allowed: bool,
    pub directory: String,
    pub vertices: u64,
    pub generator: u32,
    pub seed: u64,
    pub value: f64,
    #[serde(flatten)]
    pub family: GraphFamily,
}

impl GraphSetup {
    /// The directory travels as a single token, so it must not contain whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.directory.is_empty() || self.directory.chars().any(char::is_whitespace) {
            return Err(Error::InvalidField { field: "directory", value: self.directory.clone() });
        }
        Ok(())
    }
}

/// What the simulation binary should do with the graph ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    SimpleSampling { samples: u64 },
    Metropolis { temperature: f64, samples: u64, equilibration: u64 },
    /// Histograms for judging how many steps equilibration takes.
    Equilibration { temperature: f64, samples: u64 },
    WangLandau { lower: i64, upper: i64, sweeps: u64, final_modification: f64 },
}

impl Action {
    pub fn selector(&self) -> u8 {
        match self {
            Action::SimpleSampling { .. } => 0,
            Action::Metropolis { .. } => 1,
            Action::Equilibration { .. } => 2,
            Action::WangLandau { .. } => 3,
        }
    }
}

/// One invocation of the simulation binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub setup: GraphSetup,
    pub action: Action,
}

impl Job {
    pub fn new(setup: GraphSetup, action: Action) -> Self {
        Self { setup, action }
    }

    /// The line written to the binary's stdin.
    pub fn argument_string(&self) -> String {
        self.to_string()
    }
}

fn flag(b: bool) -> &'static str {
    if b { "y" } else { "n" }
}

pub(crate) fn parse_flag(field: &'static str, token: &str) -> Result<bool> {
    match token {
        "y" => Ok(true),
        "n" => Ok(false),
        _ => Err(Error::InvalidField { field, value: token.to_string() }),
    }
}

pub(crate) fn parse_field<T: FromStr>(field: &'static str, token: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::InvalidField { field, value: token.to_string() })
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.setup;
        write!(
            f,
            "{} {} {} {} {} {} {} {}",
            flag(s.digraph),
            flag(s.loops_allowed),
            s.directory,
            s.vertices,
            s.generator,
            s.seed,
            s.value,
            s.family.selector(),
        )?;
        match s.family {
            GraphFamily::ErdosRenyi { connectivity } => write!(f, " {connectivity}")?,
            GraphFamily::StochasticBlock { inter_connectivity, intra_connectivity, blocks } => {
                write!(f, " {inter_connectivity} {intra_connectivity} {blocks}")?
            }
        }
        write!(f, " {}", self.action.selector())?;
        match self.action {
            Action::SimpleSampling { samples } => write!(f, " {samples}"),
            Action::Metropolis { temperature, samples, equilibration } => {
                write!(f, " {temperature} {samples} {equilibration}")
            }
            Action::Equilibration { temperature, samples } => write!(f, " {temperature} {samples}"),
            Action::WangLandau { lower, upper, sweeps, final_modification } => {
                write!(f, " {lower} {upper} {sweeps} {final_modification}")
            }
        }
    }
}

/// Cursor over the tokens of one argument string.
struct Fields<'a> {
    line: &'a str,
    tokens: std::str::SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn next(&mut self, field: &'static str) -> Result<&'a str> {
        self.tokens.next().ok_or_else(|| Error::MalformedArguments {
            line: self.line.to_string(),
            reason: format!("missing {field}"),
        })
    }

    fn parse<T: FromStr>(&mut self, field: &'static str) -> Result<T> {
        let token = self.next(field)?;
        parse_field(field, token)
    }

    fn flag(&mut self, field: &'static str) -> Result<bool> {
        let token = self.next(field)?;
        parse_flag(field, token)
    }
}

impl FromStr for Job {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut fields = Fields { line, tokens: line.split_whitespace() };

        let digraph = fields.flag("digraph flag")?;
        let loops_allowed = fields.flag("loops flag")?;
        let directory = fields.next("directory")?.to_string();
        let vertices = fields.parse("vertex count")?;
        let generator = fields.parse("generator")?;
        let seed = fields.parse("seed")?;
        let value = fields.parse("value")?;
        let family = match fields.next("graph family")? {
            "0" => GraphFamily::ErdosRenyi { connectivity: fields.parse("connectivity")? },
            "1" => GraphFamily::StochasticBlock {
                inter_connectivity: fields.parse("interblock connectivity")?,
                intra_connectivity: fields.parse("intrablock connectivity")?,
                blocks: fields.parse("number of blocks")?,
            },
            other => {
                return Err(Error::InvalidField { field: "graph family", value: other.to_string() })
            }
        };
        let action = match fields.next("action")? {
            "0" => Action::SimpleSampling { samples: fields.parse("samples")? },
            "1" => Action::Metropolis {
                temperature: fields.parse("temperature")?,
                samples: fields.parse("samples")?,
                equilibration: fields.parse("equilibration steps")?,
            },
            "2" => Action::Equilibration {
                temperature: fields.parse("temperature")?,
                samples: fields.parse("samples")?,
            },
            "3" => Action::WangLandau {
                lower: fields.parse("lower bound")?,
                upper: fields.parse("upper bound")?,
                sweeps: fields.parse("sweeps")?,
                final_modification: fields.parse("final modification factor")?,
            },
            other => return Err(Error::InvalidField { field: "action", value: other.to_string() }),
        };

        if let Some(extra) = fields.tokens.next() {
            return Err(Error::MalformedArguments {
                line: line.to_string(),
                reason: format!("unexpected trailing field {extra:?}"),
            });
        }

        let setup = GraphSetup {
            digraph,
            loops_allowed,
            directory,
            vertices,
            generator,
            seed,
            value,
            family,
        };
        Ok(Job { setup, action })
    }
}
