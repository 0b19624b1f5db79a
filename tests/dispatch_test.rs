//! Dispatch modes against real shell commands.

use std::fs;

use largedev_sbm::dispatch::{DispatchConfig, Dispatcher, Launcher, RunMode};
use largedev_sbm::params::Job;
use largedev_sbm::Error;
use tempfile::tempdir;

fn jobs(n: usize) -> Vec<Job> {
    (0..n)
        .map(|i| format!("n n out 10 0 {i} 0 0 0.5 0 {}", 10 * (i + 1)).parse().unwrap())
        .collect()
}

fn dispatcher(invocation: &str, workers: usize) -> Dispatcher {
    Dispatcher::new(Launcher::new(invocation), DispatchConfig { display: false, workers })
}

#[test]
fn test_default_config_is_quiet_with_workers() {
    let config = DispatchConfig::default();
    assert!(!config.display);
    assert!(config.workers >= 1);
    assert_eq!(Launcher::new("./sim > log").invocation(), "./sim > log");
}

#[cfg(unix)]
#[test]
fn test_default_config_runs_parallel() {
    let dispatcher = Dispatcher::new(Launcher::new("cat"), DispatchConfig::default());
    let report = dispatcher.run(RunMode::Parallel, &jobs(3)).unwrap();
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.failures(), 0);
}

#[cfg(unix)]
#[test]
fn test_sequential_feeds_arguments_on_stdin() {
    let jobs = jobs(3);
    let report = dispatcher("cat", 1).run(RunMode::Sequential, &jobs).unwrap();

    assert_eq!(report.outcomes.len(), 3);
    for (job, outcome) in jobs.iter().zip(&report.outcomes) {
        assert_eq!(outcome.stdout, format!("{}\n", job.argument_string()));
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.success);
    }
    assert_eq!(report.failures(), 0);
    assert!(report.settings.is_none());
}

#[cfg(unix)]
#[test]
fn test_parallel_reports_in_submission_order() {
    let jobs = jobs(12);
    let report = dispatcher("cat", 4).run(RunMode::Parallel, &jobs).unwrap();

    let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, (0..12).collect::<Vec<_>>());
    for (job, outcome) in jobs.iter().zip(&report.outcomes) {
        assert_eq!(outcome.arguments, job.argument_string());
        assert_eq!(outcome.stdout.trim_end(), job.argument_string());
    }
}

#[cfg(unix)]
#[test]
fn test_failing_job_does_not_stop_siblings() {
    // fails only for the job whose seed is 1
    let script = r#"read line; set -- $line; echo "seed $6" >&2; [ "$6" != 1 ]"#;
    let report = dispatcher(script, 2).run(RunMode::Parallel, &jobs(3)).unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.failures(), 1);
    assert!(!report.outcomes[1].success);
    assert_eq!(report.outcomes[1].exit_code, Some(1));
    assert_eq!(report.outcomes[1].stderr, "seed 1\n");
    assert!(report.outcomes[0].success && report.outcomes[2].success);
}

#[cfg(unix)]
#[test]
fn test_binary_ignoring_stdin_still_completes() {
    let report = dispatcher("true", 1).run(RunMode::Sequential, &jobs(2)).unwrap();
    assert_eq!(report.failures(), 0);
}

#[cfg(unix)]
#[test]
fn test_manifest_lists_every_job() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("jobs.csv");
    let report = dispatcher("cat", 2).run(RunMode::Parallel, &jobs(2)).unwrap();
    report.write_manifest(&manifest).unwrap();

    let text = fs::read_to_string(&manifest).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "index,arguments,exit_code,success");
    assert_eq!(lines[1], "0,n n out 10 0 0 0 0 0.5 0 10,0,true");
    assert_eq!(lines[2], "1,n n out 10 0 1 0 0 0.5 0 20,0,true");
}

#[test]
fn test_analyse_mode_writes_settings_without_launching() {
    let dir = tempdir().unwrap();
    let line = format!("n n {} 100 1 42 0.5 0 0.3 0 50", dir.path().display());
    let jobs = vec![line.parse::<Job>().unwrap()];

    let report = dispatcher("definitely-not-a-binary", 1).run(RunMode::Analyse, &jobs).unwrap();

    assert!(report.outcomes.is_empty());
    let path = report.settings.unwrap();
    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("numberOfVertices = 100"));
    assert!(text.contains("numberOfGraphs = 50"));
}

#[test]
fn test_analyse_mode_without_simple_sampling_fails() {
    let jobs = vec!["n n out 10 0 1 0 0 0.5 1 0.5 100 10".parse::<Job>().unwrap()];
    let result = dispatcher("true", 1).run(RunMode::Analyse, &jobs);
    assert!(matches!(result, Err(Error::MissingDirectory)));
}
