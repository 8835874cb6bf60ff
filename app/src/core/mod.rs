//! # appstrap Core Infrastructure
//!
//! File: app/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the foundational pieces the bootstrap sequence is
//! built on: the typed error taxonomy, the declarative configuration schema,
//! and the schema-validated configuration store.
//!
//! ## Architecture
//!
//! - `error`: `AppError` and the crate-wide `Result` alias
//! - `schema`: the schema builder DSL, the built-in application schema, and
//!   the YAML-like schema dump
//! - `config`: the layered configuration store (`set` > `set_default` >
//!   schema default) with TOML file overrides
//!
pub mod config;
pub mod error;
pub mod schema;
