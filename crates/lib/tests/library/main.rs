//! Integration tests for idconverge-lib.

#![cfg(unix)]

mod common;
mod webserver_tests;
