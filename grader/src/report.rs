//! Human-readable grading summaries.

use crate::check::{CheckNode, CheckResult};
use crate::results::Results;

/// Render a per-student grading report from a scored results document.
pub fn summary(results: &Results) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, record) in &results.students {
        lines.push(format!("Grading report for '{name}':"));
        checks_summary(&record.checks, "", &mut lines);
        if let Some(score) = record.score {
            lines.push(format!("Score: {:.2}%", score * 100.0));
        }
    }
    lines
}

fn checks_summary(checks: &[CheckNode], prefix: &str, lines: &mut Vec<String>) {
    for check in checks {
        lines.push(format!("{prefix}{}", check.display_name()));
        lines.push(format!("{prefix}  weight: {}", check.weight));
        let label = check.result.map_or("PENDING", CheckResult::label);
        lines.push(format!("{prefix}  result: {label}"));
        for note in &check.notes {
            lines.push(format!("{prefix}  note: {note}"));
        }
        if let Some(secondary) = &check.secondary_checks {
            lines.push(format!("{prefix}  Secondary Checks:"));
            if let Some(weight) = secondary.weight {
                lines.push(format!("{prefix}    weight: {weight}"));
            }
            if let Some(sub_checks) = &secondary.checks {
                checks_summary(sub_checks, &format!("{prefix}    "), lines);
            }
        }
    }
}
