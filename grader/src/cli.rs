//! CLI command implementations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::handler::registry::Registry;
use crate::report::summary;
use crate::results::Results;
use crate::review::ConsoleReview;
use crate::rubric::{Rubric, example_rubric};
use crate::run::CheckRunner;
use crate::score::score;

/// Create (or update) the results file for the session described by the
/// config file.
pub fn setup(config_path: &Path, overwrite: bool, update: bool) -> Result<()> {
    let config = SessionConfig::load(config_path)?;

    if config.results.exists() && !overwrite && !update {
        bail!(
            "results file '{}' already exists; use the `-x` option to overwrite or the `-u` option to update",
            config.results.display()
        );
    }
    let rubric = Rubric::load(&config.rubric).context("load rubric")?;
    debug!(rubric = %config.rubric.display(), students = config.students.len(), "rubric loaded");

    let mut results = if overwrite || !config.results.exists() {
        Results::default()
    } else {
        Results::load(&config.results).context("load results")?
    };
    for student in &config.students {
        if update {
            results.update_student(&student.name, &rubric)?;
        } else {
            results.add_student(&student.name, &rubric)?;
        }
    }

    results.dump(&config.results).context("write results")?;
    println!(
        "setup: students={} results={}",
        config.students.len(),
        config.results.display()
    );
    Ok(())
}

/// Write the example rubric file.
pub fn write_example_rubric(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!(
            "rubric file '{}' already exists; remove it or use the `-x` option",
            path.display()
        );
    }
    let contents = serde_yaml::to_string(&example_rubric()).context("serialize rubric")?;
    fs::write(path, contents).with_context(|| format!("write rubric {}", path.display()))?;
    println!("example-rubric: wrote {}", path.display());
    Ok(())
}

/// Run all unresolved checks for every student in the session.
pub fn run_checks(config_path: &Path, force: bool, assignment_root: &Path) -> Result<()> {
    let config = SessionConfig::load(config_path)?;
    if !config.results.exists() {
        bail!("results file '{}' does not exist", config.results.display());
    }
    let mut results = Results::load(&config.results).context("load results")?;

    let registry = Registry::with_builtins();
    let mut review = ConsoleReview;
    let mut runner = CheckRunner::new(&registry, &mut review);

    info!(students = results.students.len(), force, "starting check run");
    for (name, record) in &mut results.students {
        runner
            .run_student(name, record, assignment_root, force)
            .with_context(|| format!("run checks for {name}"))?;
        println!("run: student={name} checks={}", record.checks.len());
    }

    results.dump(&config.results).context("write results")?;
    Ok(())
}

/// Score a results file and print the grading report.
pub fn print_summary(results_path: &Path) -> Result<()> {
    if !results_path.exists() {
        bail!("results file '{}' does not exist", results_path.display());
    }
    let mut results = Results::load(results_path)?;
    let (warnings, errors) = score(&mut results).context("score results")?;

    for line in summary(&results) {
        println!("{line}");
    }
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
    for error in errors {
        eprintln!("error: {error}");
    }
    Ok(())
}
