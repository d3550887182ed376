//! Resumable invocation of function handlers.
//!
//! An [`Invoker`] binds a resolved callable to its arguments once, then
//! exposes [`Invoker::produce_next`] as the single stepping primitive. At
//! most one execution is live at a time: it is created lazily on the first
//! step, advanced one step per call, and cleared when the underlying
//! sequence is exhausted. A further step after exhaustion restarts the work
//! from the top with the same bound arguments.

use thiserror::Error;

use crate::handler::args::{ArgError, Args, Context, expand};
use crate::handler::registry::{Callable, Payload, Registry, ResolutionError};

/// Failure while resolving, binding, or calling a function handler.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("handler arguments: {0}")]
    Args(#[from] ArgError),
    #[error("handler call failed: {0:#}")]
    Call(#[source] anyhow::Error),
}

enum Execution {
    Idle,
    Running(Box<dyn Iterator<Item = Payload>>),
}

/// A callable bound to its arguments, with at most one in-progress
/// execution.
pub struct Invoker {
    callable: Callable,
    args: Args,
    execution: Execution,
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("callable", &self.callable)
            .field("args", &self.args)
            .field(
                "execution",
                match self.execution {
                    Execution::Idle => &"Idle",
                    Execution::Running(_) => &"Running",
                },
            )
            .finish()
    }
}

impl Invoker {
    /// Resolve `module:function` in the registry and bind its arguments.
    ///
    /// The raw argument source is template-expanded against `ctx` before
    /// being parsed as a literal list; `None` binds zero arguments.
    pub fn new(
        registry: &Registry,
        module: &str,
        function: &str,
        arg_source: Option<&str>,
        ctx: &Context,
    ) -> Result<Self, InvokeError> {
        let callable = registry.resolve(module, function)?.clone();
        let args = match arg_source {
            Some(source) => Args::parse(&expand(source, ctx)?)?,
            None => Args::default(),
        };
        Ok(Self {
            callable,
            args,
            execution: Execution::Idle,
        })
    }

    /// Advance the execution by one step.
    ///
    /// Returns the step's value, or `None` once the sequence is exhausted
    /// (clearing the execution so the next call restarts it). An ordinary
    /// function behaves as a one-element sequence: its value on the first
    /// call, the sentinel on the second.
    pub fn produce_next(&mut self) -> Result<Option<Payload>, InvokeError> {
        if matches!(self.execution, Execution::Idle) {
            self.execution = Execution::Running(self.start()?);
        }
        let Execution::Running(sequence) = &mut self.execution else {
            unreachable!("execution was just started");
        };
        match sequence.next() {
            Some(value) => Ok(Some(value)),
            None => {
                self.execution = Execution::Idle;
                Ok(None)
            }
        }
    }

    fn start(&self) -> Result<Box<dyn Iterator<Item = Payload>>, InvokeError> {
        match &self.callable {
            Callable::Single(f) => {
                let value = f(&self.args).map_err(InvokeError::Call)?;
                Ok(Box::new(std::iter::once(value)))
            }
            Callable::Generator(f) => f(&self.args).map_err(InvokeError::Call),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::with_builtins()
    }

    fn invoker(module: &str, function: &str) -> Invoker {
        Invoker::new(&registry(), module, function, None, &Context::new()).expect("invoker")
    }

    #[test]
    fn ordinary_function_is_a_one_element_sequence() {
        let mut invoker = invoker("grader.builtins", "hello_world");
        assert_eq!(
            invoker.produce_next().expect("step"),
            Some(json!("Hello World"))
        );
        assert_eq!(invoker.produce_next().expect("step"), None);
    }

    #[test]
    fn generator_yields_step_by_step_then_sentinel() {
        let mut invoker = invoker("grader.builtins", "yield_hello_world");
        assert_eq!(invoker.produce_next().expect("step"), Some(json!("Hello")));
        assert_eq!(invoker.produce_next().expect("step"), Some(json!("World")));
        assert_eq!(invoker.produce_next().expect("step"), None);
    }

    #[test]
    fn a_step_after_the_sentinel_restarts_the_execution() {
        let mut invoker = invoker("grader.builtins", "yield_hello_world");
        assert_eq!(invoker.produce_next().expect("step"), Some(json!("Hello")));
        assert_eq!(invoker.produce_next().expect("step"), Some(json!("World")));
        assert_eq!(invoker.produce_next().expect("step"), None);
        assert_eq!(invoker.produce_next().expect("step"), Some(json!("Hello")));
    }

    #[test]
    fn debug_output_names_the_execution_state() {
        let mut invoker = invoker("grader.builtins", "yield_hello_world");
        assert!(format!("{invoker:?}").contains("Idle"));
        invoker.produce_next().expect("step");
        assert!(format!("{invoker:?}").contains("Running"));
    }

    #[test]
    fn unknown_function_fails_to_resolve() {
        let err = Invoker::new(
            &registry(),
            "grader.builtins",
            "nope",
            None,
            &Context::new(),
        )
        .expect_err("resolution");
        assert_eq!(
            err.to_string(),
            "Could not import function 'nope' from module 'grader.builtins'."
        );
    }

    #[test]
    fn arguments_are_expanded_against_the_context() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("tmp.txt"), "").expect("write");
        let ctx = Context::new().with("dir", temp.path().display().to_string());

        let mut invoker = Invoker::new(
            &registry(),
            "grader.builtins",
            "shell_check",
            Some("cmd=\"test -e tmp.txt\",cwd=\"{dir}\""),
            &ctx,
        )
        .expect("invoker");

        let payload = invoker.produce_next().expect("step").expect("payload");
        assert_eq!(payload["result"], json!(true));
    }

    #[test]
    fn missing_context_key_fails_binding() {
        let err = Invoker::new(
            &registry(),
            "grader.builtins",
            "shell_check",
            Some("cmd=\"{missing}\""),
            &Context::new(),
        )
        .expect_err("missing key");
        assert!(matches!(err, InvokeError::Args(_)));
    }
}
