//! Callable registry for function handlers.
//!
//! The original dispatch model imported user-named functions at runtime.
//! Here resolution is a pure lookup: callables register themselves under a
//! `(module, function)` pair at startup, and `resolve` either finds the
//! handle or fails with [`ResolutionError`].

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::handler::args::Args;

/// Value yielded by a function handler.
///
/// A payload carrying a `result` key terminates a check; anything else is
/// an intermediate step surfaced to the caller.
pub type Payload = serde_json::Value;

type SingleFn = Arc<dyn Fn(&Args) -> Result<Payload> + Send + Sync>;
type GeneratorFn = Arc<dyn Fn(&Args) -> Result<Box<dyn Iterator<Item = Payload>>> + Send + Sync>;

/// A registered callable handle.
#[derive(Clone)]
pub enum Callable {
    /// Ordinary function: produces a single value per invocation.
    Single(SingleFn),
    /// Generator: produces a lazy sequence advanced one step at a time.
    Generator(GeneratorFn),
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Single(_) => f.write_str("Callable::Single"),
            Callable::Generator(_) => f.write_str("Callable::Generator"),
        }
    }
}

/// Named module/function pair that could not be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Could not import function '{function}' from module '{module}'.")]
pub struct ResolutionError {
    pub module: String,
    pub function: String,
}

/// Mapping from `(module, function)` names to callable handles.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<(String, String), Callable>,
}

impl Registry {
    /// An empty registry with no callables.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the builtin check functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::handler::builtins::register(&mut registry);
        registry
    }

    /// Register an ordinary function under `module:function`.
    pub fn register_single<F>(&mut self, module: &str, function: &str, f: F)
    where
        F: Fn(&Args) -> Result<Payload> + Send + Sync + 'static,
    {
        self.entries.insert(
            (module.to_string(), function.to_string()),
            Callable::Single(Arc::new(f)),
        );
    }

    /// Register a generator function under `module:function`.
    pub fn register_generator<F>(&mut self, module: &str, function: &str, f: F)
    where
        F: Fn(&Args) -> Result<Box<dyn Iterator<Item = Payload>>> + Send + Sync + 'static,
    {
        self.entries.insert(
            (module.to_string(), function.to_string()),
            Callable::Generator(Arc::new(f)),
        );
    }

    /// Look up a callable by name.
    pub fn resolve(&self, module: &str, function: &str) -> Result<&Callable, ResolutionError> {
        self.entries
            .get(&(module.to_string(), function.to_string()))
            .ok_or_else(|| ResolutionError {
                module: module.to_string(),
                function: function.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_registered_function() {
        let mut registry = Registry::new();
        registry.register_single("hw_01", "problem_1", |_| Ok(json!("ok")));
        let callable = registry.resolve("hw_01", "problem_1").expect("resolve");
        assert!(matches!(callable, Callable::Single(_)));
    }

    #[test]
    fn missing_function_reports_module_and_function() {
        let registry = Registry::new();
        let err = registry.resolve("hw_01", "problem_9").expect_err("miss");
        assert_eq!(
            err.to_string(),
            "Could not import function 'problem_9' from module 'hw_01'."
        );
    }

    #[test]
    fn builtins_are_registered() {
        let registry = Registry::with_builtins();
        assert!(registry.resolve("grader.builtins", "hello_world").is_ok());
        assert!(
            registry
                .resolve("grader.builtins", "yield_hello_world")
                .is_ok()
        );
        assert!(registry.resolve("grader.builtins", "shell_check").is_ok());
    }
}
