// analysis.rs - Settings script for the R analysis of a finished sweep
//
// Each run directory holds at most one live `settings.R`. Earlier versions are
// kept as `settings_bak_<n>.R` with the smallest unused `n`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Error, Result};
use crate::params::{Action, Job};

pub const SETTINGS_STEM: &str = "settings";
pub const SETTINGS_EXT: &str = "R";

pub fn settings_path(directory: &Path) -> PathBuf {
    directory.join(format!("{SETTINGS_STEM}.{SETTINGS_EXT}"))
}

pub fn backup_path(directory: &Path, n: u64) -> PathBuf {
    directory.join(format!("{SETTINGS_STEM}_bak_{n}.{SETTINGS_EXT}"))
}

/// Moves an existing settings script out of the way. Returns where it went,
/// or `None` if there was nothing to back up.
pub fn backup(directory: &Path) -> Result<Option<PathBuf>> {
    let current = settings_path(directory);
    if !current.exists() {
        return Ok(None);
    }
    let mut n = 0;
    let target = loop {
        let candidate = backup_path(directory, n);
        if !candidate.exists() {
            break candidate;
        }
        n += 1;
    };
    fs::rename(&current, &target)?;
    info!("backed up {} to {}", current.display(), target.display());
    Ok(Some(target))
}

/// Scalars and tables the R analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub directory: String,
    pub vertices: u64,
    pub graphs: u64,
    /// `(temperature, samples)` per Metropolis run.
    pub metropolis: Vec<(f64, u64)>,
    /// `(lower, upper)` bounds per Wang-Landau run.
    pub wang_landau: Vec<(i64, i64)>,
}

impl AnalysisSettings {
    /// Simple sampling provides directory, vertex and graph counts (the last
    /// simple-sampling job wins). Equilibration checks are not analysed.
    pub fn from_jobs(jobs: &[Job]) -> Result<Self> {
        let mut scalars = None;
        let mut metropolis = Vec::new();
        let mut wang_landau = Vec::new();

        for job in jobs {
            match job.action {
                Action::SimpleSampling { samples } => {
                    scalars = Some((job.setup.directory.clone(), job.setup.vertices, samples));
                }
                Action::Metropolis { temperature, samples, .. } => {
                    metropolis.push((temperature, samples));
                }
                Action::WangLandau { lower, upper, .. } => wang_landau.push((lower, upper)),
                Action::Equilibration { .. } => {}
            }
        }

        let (directory, vertices, graphs) = scalars.ok_or(Error::MissingDirectory)?;
        Ok(Self { directory, vertices, graphs, metropolis, wang_landau })
    }

    pub fn settings_path(&self) -> PathBuf {
        settings_path(Path::new(&self.directory))
    }

    /// Backs up any previous script, then writes this one.
    pub fn write(&self) -> Result<PathBuf> {
        backup(Path::new(&self.directory))?;
        let path = self.settings_path();
        fs::write(&path, self.to_string())?;
        info!(
            "wrote {} ({} Metropolis rows, {} Wang-Landau rows)",
            path.display(),
            self.metropolis.len(),
            self.wang_landau.len()
        );
        Ok(path)
    }
}

fn write_matrix<A: fmt::Display, B: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    rows: &[(A, B)],
) -> fmt::Result {
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(f, "{name} <- matrix(NA, nrow={}, ncol=2)", rows.len())?;
    for (i, (a, b)) in rows.iter().enumerate() {
        writeln!(f, "{name}[{}, 1] <- {a}", i + 1)?;
        writeln!(f, "{name}[{}, 2] <- {b}", i + 1)?;
    }
    Ok(())
}

impl fmt::Display for AnalysisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "directory = \"{}\"", self.directory)?;
        writeln!(f)?;
        writeln!(f, "numberOfVertices = {}", self.vertices)?;
        writeln!(f, "numberOfGraphs = {}", self.graphs)?;
        writeln!(f)?;
        write_matrix(f, "dataMetropolis", &self.metropolis)?;
        writeln!(f)?;
        write_matrix(f, "dataWangLandau", &self.wang_landau)
    }
}

/// Writes the settings script for `jobs`. Without a simple-sampling job
/// nothing is touched on disk.
pub fn prepare_analysis(jobs: &[Job]) -> Result<PathBuf> {
    AnalysisSettings::from_jobs(jobs)?.write()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(line: &str) -> Job {
        line.parse().unwrap()
    }

    #[test]
    fn test_render_with_tables() {
        let jobs = vec![
            job("n n /data 100 1 42 0 0 0.3 1 0.5 1000 200"),
            job("n n /data 100 1 42 0 0 0.3 0 50"),
            job("n n /data 100 1 42 0 0 0.3 2 0.5 1000"),
            job("n n /data 100 1 42 0 0 0.3 1 1.5 1000 200"),
            job("n n /data 100 1 42 0 0 0.3 3 10 60 100 0.000001"),
        ];
        let settings = AnalysisSettings::from_jobs(&jobs).unwrap();
        let expected = "\
directory = \"/data\"

numberOfVertices = 100
numberOfGraphs = 50

dataMetropolis <- matrix(NA, nrow=2, ncol=2)
dataMetropolis[1, 1] <- 0.5
dataMetropolis[1, 2] <- 1000
dataMetropolis[2, 1] <- 1.5
dataMetropolis[2, 2] <- 1000

dataWangLandau <- matrix(NA, nrow=1, ncol=2)
dataWangLandau[1, 1] <- 10
dataWangLandau[1, 2] <- 60
";
        assert_eq!(settings.to_string(), expected);
    }

    #[test]
    fn test_last_simple_sampling_wins() {
        let jobs = vec![
            job("n n /first 100 1 42 0 0 0.3 0 50"),
            job("n n /second 200 1 42 0 1 0.3 0.8 2 0 70"),
        ];
        let settings = AnalysisSettings::from_jobs(&jobs).unwrap();
        assert_eq!(settings.directory, "/second");
        assert_eq!(settings.vertices, 200);
        assert_eq!(settings.graphs, 70);
    }

    #[test]
    fn test_missing_simple_sampling() {
        let jobs = vec![job("n n /data 100 1 42 0 0 0.3 1 0.5 1000 200")];
        assert!(matches!(AnalysisSettings::from_jobs(&jobs), Err(Error::MissingDirectory)));
    }
}
