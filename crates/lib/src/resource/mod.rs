//! Declarative resources.
//!
//! A resource describes one piece of desired system state. Resources are
//! collected into an ordered list by a recipe and handed to the executor,
//! which converges each one in turn.
//!
//! # Kinds
//!
//! - [`Directory`] - a directory with owner, group and mode
//! - [`File`] - a file with optional content, or the absence of a file
//! - [`Execute`] - a shell command, usually gated by a guard
//! - [`Template`] - a rendered template written to disk
//!
//! # Submodules
//!
//! - [`guard`] - `only_if` / `not_if` predicates evaluated at execution time

pub mod guard;
mod types;

pub use guard::{Guard, Predicate};
pub use types::*;
