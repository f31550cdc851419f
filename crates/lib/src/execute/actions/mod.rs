//! Resource action handlers.
//!
//! One handler per resource kind. Each returns an [`Outcome`] describing what
//! changed, and honours dry-run mode by reporting without mutating.
//!
//! [`Outcome`]: crate::execute::Outcome

pub mod cmd;
pub mod directory;
pub mod file;

pub use cmd::execute_cmd;
pub use directory::converge_directory;
pub use file::{converge_file, write_rendered};
