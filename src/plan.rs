// plan.rs - Parameter plans read from TOML instead of interactive prompts
//
//   [graph]
//   digraph = false
//   loops_allowed = false
//   directory = "/data/sbm"
//   vertices = 100
//   generator = 0
//   seed = 42
//   value = 0
//   family = "block-model"
//   inter_connectivity = 0.5
//   intra_connectivity = 2.0
//   blocks = 2
//
//   [[actions]]
//   kind = "metropolis"
//   temperature = { min = -2.0, max = 2.0, step = 0.5 }
//   samples = 1000
//   equilibration = 200

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::multiplier::temperature_sweep;
use crate::params::{Action, GraphSetup, Job};

/// Half-open temperature range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl TemperatureRange {
    pub fn temperatures(&self) -> Result<Vec<f64>> {
        temperature_sweep(self.min, self.max, self.step)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PlannedAction {
    SimpleSampling { samples: u64 },
    Metropolis { temperature: TemperatureRange, samples: u64, equilibration: u64 },
    Equilibration { temperature: TemperatureRange, samples: u64 },
    WangLandau { lower: i64, upper: i64, sweeps: u64, final_modification: f64 },
}

impl PlannedAction {
    fn expand(&self) -> Result<Vec<Action>> {
        Ok(match *self {
            PlannedAction::SimpleSampling { samples } => vec![Action::SimpleSampling { samples }],
            PlannedAction::Metropolis { temperature, samples, equilibration } => temperature
                .temperatures()?
                .into_iter()
                .map(|temperature| Action::Metropolis { temperature, samples, equilibration })
                .collect(),
            PlannedAction::Equilibration { temperature, samples } => temperature
                .temperatures()?
                .into_iter()
                .map(|temperature| Action::Equilibration { temperature, samples })
                .collect(),
            PlannedAction::WangLandau { lower, upper, sweeps, final_modification } => {
                vec![Action::WangLandau { lower, upper, sweeps, final_modification }]
            }
        })
    }
}

/// A whole session's parameters as one document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SweepPlan {
    pub graph: GraphSetup,
    #[serde(default)]
    pub actions: Vec<PlannedAction>,
}

impl SweepPlan {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Same jobs, in the same order, as answering the prompts with these values.
    pub fn into_jobs(self) -> Result<Vec<Job>> {
        self.graph.validate()?;
        let mut jobs = Vec::new();
        for planned in &self.actions {
            for action in planned.expand()? {
                jobs.push(Job::new(self.graph.clone(), action));
            }
        }
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::params::GraphFamily;

    const PLAN: &str = r#"
        [graph]
        digraph = false
        loops_allowed = true
        directory = "/data/sbm"
        vertices = 100
        generator = 0
        seed = 42
        value = 0
        family = "block-model"
        inter_connectivity = 0.5
        intra_connectivity = 2.0
        blocks = 2

        [[actions]]
        kind = "simple-sampling"
        samples = 5000

        [[actions]]
        kind = "metropolis"
        temperature = { min = -1.0, max = 1.0, step = 0.5 }
        samples = 1000
        equilibration = 200

        [[actions]]
        kind = "wang-landau"
        lower = 10
        upper = 60
        sweeps = 1000
        final_modification = 1e-8
    "#;

    #[test]
    fn test_parse_block_model_plan() {
        let plan = SweepPlan::from_toml_str(PLAN).unwrap();
        assert_eq!(
            plan.graph.family,
            GraphFamily::StochasticBlock {
                inter_connectivity: 0.5,
                intra_connectivity: 2.0,
                blocks: 2
            }
        );
        assert!(plan.graph.loops_allowed);
        assert_eq!(plan.actions.len(), 3);
    }

    #[test]
    fn test_plan_expansion_skips_zero_temperature() {
        let jobs = SweepPlan::from_toml_str(PLAN).unwrap().into_jobs().unwrap();
        // 1 simple sampling, -1.0 -0.5 0.5 for Metropolis, 1 Wang-Landau
        assert_eq!(jobs.len(), 5);
        let temps: Vec<f64> = jobs
            .iter()
            .filter_map(|j| match j.action {
                Action::Metropolis { temperature, .. } => Some(temperature),
                _ => None,
            })
            .collect();
        assert_eq!(temps, vec![-1.0, -0.5, 0.5]);
    }

    #[test]
    fn test_erdos_renyi_plan() {
        let text = r#"
            [graph]
            digraph = true
            loops_allowed = false
            directory = "out"
            vertices = 20
            generator = 1
            seed = 3
            value = 0.5
            family = "erdos-renyi"
            connectivity = 0.3
        "#;
        let plan = SweepPlan::from_toml_str(text).unwrap();
        assert_eq!(plan.graph.family, GraphFamily::ErdosRenyi { connectivity: 0.3 });
        assert!(plan.into_jobs().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_family_is_rejected() {
        let text = r#"
            [graph]
            digraph = true
            loops_allowed = false
            directory = "out"
            vertices = 20
            generator = 1
            seed = 3
            value = 0
            family = "barabasi"
        "#;
        assert!(matches!(SweepPlan::from_toml_str(text), Err(Error::Plan(_))));
    }
}
