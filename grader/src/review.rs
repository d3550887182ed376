//! Manual review: the interactive surface for `manual` handlers.
//!
//! The check runner only depends on the [`ManualReview`] trait; the
//! console implementation mirrors the original prompt flow (y/n result,
//! optional notes until `EOF`). Tests use the scripted double from
//! `test_support`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::check::CheckResult;

/// Result of a manual review: a pass/fail decision plus free-form notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub result: CheckResult,
    pub notes: Vec<String>,
}

/// Produces a review outcome for a named check.
pub trait ManualReview {
    fn review(&mut self, check_name: &str) -> Result<ReviewOutcome>;
}

/// Interactive console review on stdin/stdout.
#[derive(Debug, Default)]
pub struct ConsoleReview;

impl ManualReview for ConsoleReview {
    fn review(&mut self, check_name: &str) -> Result<ReviewOutcome> {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let stdout = std::io::stdout();
        let mut output = stdout.lock();
        review_dialog(check_name, &mut input, &mut output)
    }
}

/// Drive the review dialog over explicit reader/writer handles.
fn review_dialog(
    check_name: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<ReviewOutcome> {
    writeln!(output, "{check_name}").context("write prompt")?;

    let result = loop {
        let response = prompt(input, output, "Did this check pass? [y/n] ")?;
        match response.to_lowercase().as_str() {
            "y" | "yes" => break CheckResult::Pass,
            "n" | "no" => break CheckResult::Fail,
            other => {
                writeln!(output, "Unrecognized response '{other}'").context("write prompt")?;
            }
        }
    };

    let mut notes = Vec::new();
    let wants_notes = prompt(input, output, "Notes? [y/n] ")?;
    if wants_notes.to_lowercase().starts_with('y') {
        loop {
            let line = prompt(input, output, "Add note (enter 'EOF' to stop): ")?;
            if line.to_lowercase() == "eof" {
                break;
            }
            notes.push(line);
        }
    }

    Ok(ReviewOutcome { result, notes })
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, text: &str) -> Result<String> {
    write!(output, "{text}").context("write prompt")?;
    output.flush().context("flush prompt")?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("read response")?;
    if read == 0 {
        anyhow::bail!("unexpected end of input during review");
    }
    Ok(line.trim().to_string())
}
