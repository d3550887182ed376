//! Rubric document: the per-assignment check template.
//!
//! Rubrics are YAML files with a `checks` list. Instantiating a rubric for
//! a student produces the check tree stored in the results document, with
//! every `result` set to pending and `{name}` placeholders in working
//! directories expanded to the student's name.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::check::{CheckNode, CheckResult};
use crate::handler::args::{Context, expand};
use crate::handler::parse;

/// A parsed rubric: ordered check definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Rubric {
    #[serde(default)]
    pub checks: Vec<CheckNode>,
}

impl Rubric {
    /// Load and validate a rubric from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read rubric {}", path.display()))?;
        let rubric: Rubric = serde_yaml::from_str(&contents)
            .with_context(|| format!("parse rubric {}", path.display()))?;
        rubric
            .validate()
            .with_context(|| format!("validate rubric {}", path.display()))?;
        Ok(rubric)
    }

    pub fn parse_str(contents: &str) -> Result<Self> {
        let rubric: Rubric = serde_yaml::from_str(contents).context("parse rubric")?;
        rubric.validate()?;
        Ok(rubric)
    }

    /// Every handler string must parse and every weight must be
    /// non-negative, recursively through secondary checks.
    fn validate(&self) -> Result<()> {
        validate_checks(&self.checks, "checks")
    }

    /// Materialize the rubric's checks for one student.
    pub fn instantiate(&self, student: &str) -> Result<Vec<CheckNode>> {
        let ctx = Context::new().with("name", student);
        instantiate_checks(&self.checks, &ctx)
    }
}

fn validate_checks(checks: &[CheckNode], path: &str) -> Result<()> {
    for (index, check) in checks.iter().enumerate() {
        let check_path = format!("{path}/{index}");
        parse(check.handler_spec())
            .with_context(|| format!("{check_path} has an invalid handler"))?;
        if check.weight < 0.0 {
            anyhow::bail!("{check_path} has a negative weight");
        }
        if let Some(secondary) = &check.secondary_checks
            && let Some(sub_checks) = &secondary.checks
        {
            validate_checks(sub_checks, &format!("{check_path}/secondary_checks/checks"))?;
        }
    }
    Ok(())
}

fn instantiate_checks(checks: &[CheckNode], ctx: &Context) -> Result<Vec<CheckNode>> {
    let mut instantiated = Vec::with_capacity(checks.len());
    for check in checks {
        let mut node = check.clone();
        node.result = Some(CheckResult::Pending);
        node.notes = Vec::new();
        if let Some(dir) = &node.working_directory {
            node.working_directory = Some(
                expand(dir, ctx).with_context(|| format!("working directory '{dir}'"))?,
            );
        }
        if let Some(secondary) = &mut node.secondary_checks
            && let Some(sub_checks) = &secondary.checks
        {
            secondary.checks = Some(instantiate_checks(sub_checks, ctx)?);
        }
        instantiated.push(node);
    }
    Ok(instantiated)
}

/// The example rubric written by `grader example-rubric`.
pub fn example_rubric() -> Rubric {
    let check = |tag: &str, desc: &str, handler: &str| CheckNode {
        tag: tag.to_string(),
        desc: desc.to_string(),
        handler: Some(handler.to_string()),
        working_directory: Some(".".to_string()),
        ..CheckNode::default()
    };
    Rubric {
        checks: vec![
            check(
                "Problem 1",
                "Checking that something is true...",
                "manual",
            ),
            check(
                "Problem 2",
                "Running command to check that something is true...",
                "test -f tmp.txt",
            ),
            check(
                "Problem 3",
                "Running function to check that something is true...",
                "grader.builtins:shell_check(cmd=\"test -f tmp.txt\",cwd=\"{dir}\")",
            ),
        ],
    }
}
