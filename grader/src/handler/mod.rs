//! Check handler resolution and invocation.
//!
//! A handler is the mechanism used to evaluate a check: a manual review, a
//! shell command, or a registered function. [`parse`] turns the textual
//! specification into a [`HandlerRef`]; [`Invoker`] drives function
//! handlers through the resumable `produce_next` protocol.

pub mod args;
pub mod builtins;
pub mod invoker;
pub mod parse;
pub mod registry;
pub mod shell;

pub use args::Context;
pub use invoker::{InvokeError, Invoker};
pub use parse::{HandlerRef, ParseError, parse};
pub use registry::{Callable, Payload, Registry, ResolutionError};
pub use shell::CommandLimits;
