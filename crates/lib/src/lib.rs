//! idconverge-lib: converge a node to a deployed identity service
//!
//! This crate provides the pieces a run is assembled from:
//! - `Resource`: a named unit of desired state (directory, file, command, template)
//! - `Executor`: applies resources in order with guards and notifications
//! - `IdentityRecipe`: derives the identity-service resources from node and topology data
//! - `Topology`: cluster role, endpoint and database lookups
//! - `TemplateStore`: built-in configuration templates with directory overrides

pub mod consts;
pub mod execute;
pub mod node;
pub mod platform;
pub mod recipe;
pub mod resource;
pub mod template;
pub mod topology;
pub mod util;
