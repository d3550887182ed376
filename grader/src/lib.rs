//! Weighted check-based assignment grader.
//!
//! Grades student submissions by running a tree of pass/fail checks and
//! aggregating weighted results into a score. The architecture separates:
//!
//! - **[`handler`]**: check evaluation mechanisms, covering reference
//!   parsing, the callable registry, resumable invocation, and shell
//!   execution.
//! - **[`check`]/[`rubric`]/[`results`]**: the YAML-backed document model,
//!   with per-assignment rubric templates and their per-student
//!   materialization.
//! - **[`score`]**: the recursive weighted scoring algorithm with partial
//!   credit from secondary checks.
//! - **[`run`]**: orchestration that dispatches unresolved checks to their
//!   handlers and writes outcomes back into the results tree.

pub mod check;
pub mod cli;
pub mod config;
pub mod handler;
pub mod logging;
pub mod report;
pub mod results;
pub mod review;
pub mod rubric;
pub mod run;
pub mod score;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workdir;
