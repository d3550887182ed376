//! Test-only helpers: scripted review responses.

use std::collections::VecDeque;

use anyhow::{Result, bail};

use crate::check::CheckResult;
use crate::review::{ManualReview, ReviewOutcome};

/// Manual review double that replays queued outcomes in order.
#[derive(Debug, Default)]
pub struct ScriptedReview {
    outcomes: VecDeque<ReviewOutcome>,
}

impl ScriptedReview {
    pub fn push(&mut self, result: CheckResult, notes: Vec<String>) {
        self.outcomes.push_back(ReviewOutcome { result, notes });
    }
}

impl ManualReview for ScriptedReview {
    fn review(&mut self, check_name: &str) -> Result<ReviewOutcome> {
        match self.outcomes.pop_front() {
            Some(outcome) => Ok(outcome),
            None => bail!("unexpected manual review of '{check_name}'"),
        }
    }
}
