//! Results document: per-student materialization of a rubric.
//!
//! A YAML mapping from student name to a record carrying the instantiated
//! check tree plus the computed `available`/`awarded`/`score` fields
//! written by scoring. Writes are atomic (temp file + rename).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::check::CheckNode;
use crate::rubric::Rubric;

/// One student's grading record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub checks: Vec<CheckNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awarded: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// The full results document: student name → record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Results {
    pub students: BTreeMap<String, StudentRecord>,
}

impl Results {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read results {}", path.display()))?;
        serde_yaml::from_str(&contents).with_context(|| format!("parse results {}", path.display()))
    }

    pub fn parse_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("parse results")
    }

    /// Atomically write the document to disk.
    pub fn dump(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self).context("serialize results yaml")?;
        write_atomic(path, &contents)
    }

    /// Add a student with a fresh instantiation of the rubric.
    ///
    /// Errors if the student already has a record.
    pub fn add_student(&mut self, name: &str, rubric: &Rubric) -> Result<()> {
        if self.students.contains_key(name) {
            bail!("Student '{name}' is already in the grading results.");
        }
        let record = StudentRecord {
            checks: rubric.instantiate(name)?,
            ..StudentRecord::default()
        };
        self.students.insert(name.to_string(), record);
        Ok(())
    }

    /// Bring an existing student's record up to date with the rubric.
    ///
    /// Checks whose tag is not yet in the record are appended with pending
    /// results; existing checks keep their outcomes. A missing student is
    /// added outright.
    pub fn update_student(&mut self, name: &str, rubric: &Rubric) -> Result<()> {
        if !self.students.contains_key(name) {
            return self.add_student(name, rubric);
        }
        let instantiated = rubric.instantiate(name)?;
        let record = self
            .students
            .get_mut(name)
            .expect("student presence checked above");
        for check in instantiated {
            let known = record.checks.iter().any(|existing| existing.tag == check.tag);
            if !known {
                record.checks.push(check);
            }
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("yml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp results {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace results {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckResult;

    const RUBRIC: &str = "
checks:
  - tag: Problem 1
    desc: Check 1
    weight: 1
    handler: manual
  - tag: Problem 2
    desc: Checking that script runs
    weight: 1
    handler: manual
";

    #[test]
    fn add_student_instantiates_the_rubric() {
        let rubric = Rubric::parse_str(RUBRIC).expect("rubric");
        let mut results = Results::default();

        results.add_student("jdoe", &rubric).expect("add jdoe");
        results
            .add_student("rshackleford", &rubric)
            .expect("add rshackleford");

        let jdoe = &results.students["jdoe"];
        assert_eq!(jdoe.checks[0].tag, "Problem 1");
        assert_eq!(jdoe.checks[0].result, Some(CheckResult::Pending));
        let rshackleford = &results.students["rshackleford"];
        assert_eq!(rshackleford.checks[0].result, Some(CheckResult::Pending));
    }

    #[test]
    fn adding_the_same_student_twice_fails() {
        let rubric = Rubric::parse_str(RUBRIC).expect("rubric");
        let mut results = Results::default();
        results.add_student("jdoe", &rubric).expect("add");
        let err = results.add_student("jdoe", &rubric).expect_err("duplicate");
        assert!(err.to_string().contains("already in the grading results"));
    }

    #[test]
    fn update_appends_new_rubric_entries_and_keeps_outcomes() {
        let rubric = Rubric::parse_str(RUBRIC).expect("rubric");
        let mut results = Results::default();
        results.add_student("jdoe", &rubric).expect("add");
        results.students.get_mut("jdoe").expect("jdoe").checks[0].result =
            Some(CheckResult::Pass);

        let updated = Rubric::parse_str(
            "
checks:
  - tag: Problem 1
    handler: manual
  - tag: Problem 2
    handler: manual
  - tag: Problem 3
    handler: test -d tmp.d
",
        )
        .expect("rubric");
        results.update_student("jdoe", &updated).expect("update");

        let jdoe = &results.students["jdoe"];
        assert_eq!(jdoe.checks.len(), 3);
        assert_eq!(jdoe.checks[0].result, Some(CheckResult::Pass));
        assert_eq!(jdoe.checks[2].tag, "Problem 3");
        assert_eq!(jdoe.checks[2].result, Some(CheckResult::Pending));
    }

    #[test]
    fn round_trips_through_yaml() {
        let contents = "
jdoe:
  checks:
    - tag: Problem 1
      result: true
      notes:
        - Looks good
";
        let results = Results::parse_str(contents).expect("parse");
        assert_eq!(
            results.students["jdoe"].checks[0].result,
            Some(CheckResult::Pass)
        );

        let dumped = serde_yaml::to_string(&results).expect("dump");
        let reparsed = Results::parse_str(&dumped).expect("reparse");
        assert_eq!(results, reparsed);
    }

    #[test]
    fn dump_writes_atomically() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("results.yml");
        let rubric = Rubric::parse_str(RUBRIC).expect("rubric");
        let mut results = Results::default();
        results.add_student("jdoe", &rubric).expect("add");

        results.dump(&path).expect("dump");
        let loaded = Results::load(&path).expect("load");
        assert_eq!(loaded, results);
        assert!(!temp.path().join("results.yml.tmp").exists());
    }
}
