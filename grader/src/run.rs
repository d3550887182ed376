//! Check execution orchestration.
//!
//! Walks a student's check tree in document order, dispatches each
//! unresolved check to its handler, and writes the outcome back into the
//! node. Checks that already have a result are skipped unless forced.
//! Resolution and invocation failures degrade the single check to a
//! pending result with an explanatory note instead of aborting the batch.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::check::{CheckNode, CheckResult};
use crate::handler::args::Context;
use crate::handler::invoker::Invoker;
use crate::handler::parse::{HandlerRef, parse};
use crate::handler::registry::{Payload, Registry};
use crate::handler::shell::{CommandLimits, outcome_notes, run_shell};
use crate::results::StudentRecord;
use crate::review::ManualReview;
use crate::workdir::compose;

/// Runs checks for students against a callable registry and a manual
/// review surface.
pub struct CheckRunner<'a> {
    registry: &'a Registry,
    review: &'a mut dyn ManualReview,
    limits: CommandLimits,
}

impl<'a> CheckRunner<'a> {
    pub fn new(registry: &'a Registry, review: &'a mut dyn ManualReview) -> Self {
        Self {
            registry,
            review,
            limits: CommandLimits::default_limits(),
        }
    }

    pub fn with_limits(mut self, limits: CommandLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Run every unresolved check in the student's record, in document
    /// order, secondary checks included. Mutates results and notes in
    /// place.
    #[instrument(skip_all, fields(student = %name))]
    pub fn run_student(
        &mut self,
        name: &str,
        record: &mut StudentRecord,
        assignment_root: &Path,
        force: bool,
    ) -> Result<()> {
        let base = compose(assignment_root, &[record.working_directory.as_deref()]);
        self.run_list(&mut record.checks, name, &base, force)
    }

    fn run_list(
        &mut self,
        checks: &mut [CheckNode],
        student: &str,
        base: &Path,
        force: bool,
    ) -> Result<()> {
        for check in checks.iter_mut() {
            let dir = compose(base, &[check.working_directory.as_deref()]);
            self.run_check(check, student, &dir, force)?;
            if let Some(secondary) = &mut check.secondary_checks
                && let Some(sub_checks) = &mut secondary.checks
            {
                self.run_list(sub_checks, student, &dir, force)?;
            }
        }
        Ok(())
    }

    fn run_check(
        &mut self,
        check: &mut CheckNode,
        student: &str,
        dir: &Path,
        force: bool,
    ) -> Result<()> {
        let name = check.display_name();
        if !force && !matches!(check.result, None | Some(CheckResult::Pending)) {
            info!(check = %name, "skipping check that already has a result");
            return Ok(());
        }

        let handler = match parse(check.handler_spec()) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(check = %name, %err, "handler did not parse");
                check.result = Some(CheckResult::Pending);
                check.notes = vec![err.to_string()];
                return Ok(());
            }
        };

        match handler {
            HandlerRef::Manual => {
                let outcome = self
                    .review
                    .review(&name)
                    .with_context(|| format!("manual review of {name}"))?;
                check.result = Some(outcome.result);
                check.notes = outcome.notes;
            }
            HandlerRef::Shell { command } => {
                debug!(check = %name, %command, dir = %dir.display(), "running shell check");
                let outcome = run_shell(&command, dir, self.limits)
                    .with_context(|| format!("shell check for {name}"))?;
                check.result = Some(CheckResult::from_passed(outcome.passed));
                check.notes = if outcome.passed {
                    Vec::new()
                } else {
                    outcome_notes(&command, &outcome)
                };
            }
            HandlerRef::Callable {
                module,
                function,
                args,
            } => {
                debug!(check = %name, %module, %function, "running function check");
                let ctx = Context::new()
                    .with("name", student)
                    .with("dir", dir.display().to_string());
                self.run_callable(check, &name, &module, &function, args.as_deref(), &ctx);
            }
        }
        Ok(())
    }

    /// Drive a function handler until it produces a payload with a
    /// `result` key or the sentinel. Intermediate payloads are surfaced
    /// but do not terminate the loop. All invocation failures degrade to a
    /// pending result with the error recorded in the notes.
    fn run_callable(
        &mut self,
        check: &mut CheckNode,
        name: &str,
        module: &str,
        function: &str,
        arg_source: Option<&str>,
        ctx: &Context,
    ) {
        let mut invoker =
            match Invoker::new(self.registry, module, function, arg_source, ctx) {
                Ok(invoker) => invoker,
                Err(err) => {
                    warn!(check = %name, %err, "handler did not resolve");
                    check.result = Some(CheckResult::Pending);
                    check.notes = vec![err.to_string()];
                    return;
                }
            };

        loop {
            match invoker.produce_next() {
                Ok(Some(payload)) if payload.get("result").is_some() => {
                    apply_payload(check, &payload);
                    return;
                }
                Ok(Some(payload)) => {
                    info!(check = %name, %payload, "intermediate handler output");
                }
                Ok(None) => {
                    // Exhausted without ever producing a result.
                    check.result = Some(CheckResult::Pending);
                    check.notes = Vec::new();
                    return;
                }
                Err(err) => {
                    warn!(check = %name, %err, "handler call failed");
                    check.result = Some(CheckResult::Pending);
                    check.notes = vec![err.to_string()];
                    return;
                }
            }
        }
    }
}

/// Write a terminal `{result, notes}` payload into the check node.
fn apply_payload(check: &mut CheckNode, payload: &Payload) {
    check.result = Some(match payload.get("result") {
        Some(Value::Bool(passed)) => CheckResult::from_passed(*passed),
        _ => CheckResult::Pending,
    });
    check.notes = match payload.get("notes") {
        Some(Value::Array(notes)) => notes
            .iter()
            .map(|note| match note {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
}
