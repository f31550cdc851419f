//! CLI integration tests.

#![cfg(unix)]

mod apply_tests;
mod common;
mod plan_tests;
mod render_tests;
