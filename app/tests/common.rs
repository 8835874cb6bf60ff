//! # appstrap Integration Test Common Helpers
//!
//! File: app/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test files. Each `.rs` file in
//! `app/tests/` (other than this module) is compiled as a separate test
//! crate linked against the `appstrap` library and its demo binary.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;

/// An `assert_cmd::Command` pointing at the compiled demo binary for the
/// current test run.
///
/// ## Panics
/// Panics if the `appstrap-demo` binary cannot be found via
/// `Command::cargo_bin`.
pub fn demo_cmd() -> Command {
    Command::cargo_bin("appstrap-demo").expect("Failed to find appstrap-demo binary for testing")
}
