//! Grading session configuration.
//!
//! A session config is a YAML file naming the students plus the rubric and
//! results files. Relative file paths are resolved against the config
//! file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Parsed session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub students: Vec<StudentEntry>,
    pub rubric: PathBuf,
    pub results: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentEntry {
    pub name: String,
}

impl SessionConfig {
    /// Load and validate a session config, resolving relative paths
    /// against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let mut config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validate config {}", path.display()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            config.rubric = resolve(parent, &config.rubric);
            config.results = resolve(parent, &config.results);
        }
        Ok(config)
    }

    pub fn parse_str(contents: &str) -> Result<Self> {
        let config: SessionConfig = serde_yaml::from_str(contents).context("parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.students.is_empty() {
            bail!("config needs a non-empty 'students' section");
        }
        for student in &self.students {
            if student.name.trim().is_empty() {
                bail!("student names must be non-empty");
            }
        }
        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_valid_config() {
        let config = SessionConfig::parse_str(
            "
students:
  - name: jdoe
  - name: rshackleford
rubric: HW-01-rubric.yml
results: HW-01-results.yml
",
        )
        .expect("config");
        assert_eq!(config.students.len(), 2);
        assert_eq!(config.students[0].name, "jdoe");
    }

    #[test]
    fn rejects_missing_students() {
        let err = SessionConfig::parse_str(
            "
students: []
rubric: r.yml
results: out.yml
",
        )
        .expect_err("no students");
        assert!(err.to_string().contains("students"));
    }

    #[test]
    fn resolves_paths_against_the_config_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.yml");
        fs::write(
            &path,
            "students:\n  - name: jdoe\nrubric: r.yml\nresults: out.yml\n",
        )
        .expect("write");

        let config = SessionConfig::load(&path).expect("load");
        assert_eq!(config.rubric, temp.path().join("r.yml"));
        assert_eq!(config.results, temp.path().join("out.yml"));
    }
}
