//! Recursive weighted scoring over check trees.
//!
//! For each student, the total available weight is the sum of the weights
//! at the top level of a check list. A passed check earns its full weight;
//! a failed check with secondary checks earns partial credit
//! `weight * secondary_weight * sub_awarded / sub_total`; a pending check
//! earns nothing and produces a warning. Structural problems (a missing
//! `result` field, incomplete `secondary_checks`) abort scoring with an
//! error naming the offending document path.

use thiserror::Error;
use tracing::instrument;

use crate::check::{CheckNode, CheckResult};
use crate::results::Results;

/// Structural defect in a results document discovered during scoring.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("check at {path} does not contain a result")]
    MissingResult { path: String },
    #[error("check at {path} has secondary checks without a weight")]
    MissingSecondaryWeight { path: String },
    #[error("check at {path} has secondary checks without any checks")]
    MissingSecondaryChecks { path: String },
    #[error("check at {path} has secondary checks with zero total weight")]
    ZeroSecondaryTotal { path: String },
    #[error("student '{student}' has no scoreable weight")]
    ZeroTotalWeight { student: String },
}

/// Accumulated totals for one check list.
#[derive(Debug, Default)]
struct Tally {
    total: f64,
    awarded: f64,
    warnings: Vec<String>,
    errors: Vec<String>,
}

/// Score every student in the results document.
///
/// Writes `available`, `awarded`, and `score` onto each student record and
/// returns the collected warnings and non-fatal errors.
#[instrument(skip_all)]
pub fn score(results: &mut Results) -> Result<(Vec<String>, Vec<String>), ScoreError> {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    for (name, record) in &mut results.students {
        let tally = score_list(&record.checks, name, &format!("{name}/checks"))?;
        if tally.total == 0.0 {
            return Err(ScoreError::ZeroTotalWeight {
                student: name.clone(),
            });
        }
        record.available = Some(tally.total);
        record.awarded = Some(tally.awarded);
        record.score = Some(tally.awarded / tally.total);
        warnings.extend(tally.warnings);
        errors.extend(tally.errors);
    }
    Ok((warnings, errors))
}

fn score_list(checks: &[CheckNode], student: &str, path: &str) -> Result<Tally, ScoreError> {
    let mut tally = Tally {
        total: checks.iter().map(|check| check.weight).sum(),
        ..Tally::default()
    };

    for (index, check) in checks.iter().enumerate() {
        let check_path = format!("{path}/{index}");
        match check.result {
            None => {
                return Err(ScoreError::MissingResult { path: check_path });
            }
            Some(CheckResult::Pending) => {
                tally.warnings.push(format!(
                    "{student} has a check that has not been completed ({}); \
                     skipping it, so the computed score may be too low",
                    check.display_name()
                ));
            }
            Some(CheckResult::Pass) => {
                tally.awarded += check.weight;
            }
            Some(CheckResult::Fail) => {
                let Some(secondary) = &check.secondary_checks else {
                    continue;
                };
                let weight = secondary.weight.ok_or_else(|| {
                    ScoreError::MissingSecondaryWeight {
                        path: check_path.clone(),
                    }
                })?;
                let sub_checks = secondary.checks.as_ref().ok_or_else(|| {
                    ScoreError::MissingSecondaryChecks {
                        path: check_path.clone(),
                    }
                })?;
                let sub_path = format!("{check_path}/secondary_checks/checks");
                let sub = score_list(sub_checks, student, &sub_path)?;
                if sub.total == 0.0 {
                    return Err(ScoreError::ZeroSecondaryTotal { path: check_path });
                }
                tally.awarded += check.weight * weight * sub.awarded / sub.total;
                tally.warnings.extend(sub.warnings);
                tally.errors.extend(sub.errors);
            }
        }
    }
    Ok(tally)
}
