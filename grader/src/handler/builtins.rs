//! Builtin check functions available to every rubric.
//!
//! Registered under the `grader.builtins` module.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::handler::args::Args;
use crate::handler::registry::{Payload, Registry};
use crate::handler::shell::{CommandLimits, outcome_notes, run_shell};

/// Register all builtins into the given registry.
pub fn register(registry: &mut Registry) {
    registry.register_single("grader.builtins", "hello_world", hello_world);
    registry.register_generator("grader.builtins", "yield_hello_world", yield_hello_world);
    registry.register_single("grader.builtins", "shell_check", shell_check);
}

fn hello_world(_args: &Args) -> Result<Payload> {
    Ok(json!("Hello World"))
}

fn yield_hello_world(_args: &Args) -> Result<Box<dyn Iterator<Item = Payload>>> {
    Ok(Box::new(
        [json!("Hello"), json!("World")].into_iter(),
    ))
}

/// `shell_check(cmd=…, cwd=…)`: run a shell command and produce a full
/// check payload with the command output as notes.
fn shell_check(args: &Args) -> Result<Payload> {
    let Some(cmd) = args.str_arg("cmd", 0) else {
        bail!("shell_check requires a 'cmd' argument");
    };
    let cwd = args.str_arg("cwd", 1).unwrap_or(".");
    let outcome = run_shell(cmd, Path::new(cwd), CommandLimits::default_limits())
        .with_context(|| format!("shell_check `{cmd}`"))?;
    Ok(json!({
        "result": outcome.passed,
        "notes": outcome_notes(cmd, &outcome),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_check_reports_pass_and_notes() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("tmp.txt"), "").expect("write");
        let source = format!(
            "cmd=\"test -e tmp.txt\",cwd=\"{}\"",
            temp.path().display()
        );
        let args = Args::parse(&source).expect("args");

        let payload = shell_check(&args).expect("shell_check");
        assert_eq!(payload["result"], json!(true));
        assert_eq!(payload["notes"][0], json!("command output:"));
        assert_eq!(
            payload["notes"][1],
            json!("  command `test -e tmp.txt` exited with return code 0")
        );
    }

    #[test]
    fn shell_check_reports_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = format!(
            "cmd=\"test -e tmp2.txt\",cwd=\"{}\"",
            temp.path().display()
        );
        let args = Args::parse(&source).expect("args");

        let payload = shell_check(&args).expect("shell_check");
        assert_eq!(payload["result"], json!(false));
        assert_eq!(
            payload["notes"][1],
            json!("  command `test -e tmp2.txt` exited with return code 1")
        );
    }

    #[test]
    fn shell_check_requires_cmd() {
        let args = Args::parse("").expect("args");
        let err = shell_check(&args).expect_err("missing cmd");
        assert!(err.to_string().contains("cmd"));
    }
}
