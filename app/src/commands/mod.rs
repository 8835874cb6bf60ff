//! # appstrap Command Capabilities
//!
//! File: app/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module defines the two command ecosystems an application can host,
//! and the explicit module index that replaces any global class registry:
//!
//! - **Task sets** (`TaskSet`): one provider contributes several commands,
//!   one per declared task method. Method names are folded to command names
//!   (`helloTest` becomes `hello:test`).
//! - **Console commands** (`ConsoleCommand`): one provider is one command
//!   and declares its own name.
//!
//! The two ecosystems are mutually exclusive within an application run; the
//! fixed choice is carried as the tagged [`Mode`] variant rather than probed
//! at dispatch time.
//!
//! ## Architecture
//!
//! Embedders build a [`ModuleIndex`] once at startup — namespace strings
//! mapped to provider entries — and hand it to the application constructor.
//! Discovery walks a namespace, checks each entry against the expected
//! capability, and appends `RegisteredCommand`s to the application's table.
//!
pub mod discovery;

use crate::core::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Callable body of a single task command.
pub type TaskFn = Arc<dyn Fn(&mut dyn Write) -> Result<()>>;

/// One task declared by a [`TaskSet`]: the method-style name and its body.
/// The registered command name is derived from the method name by the
/// discovery pass.
pub struct Task {
    pub(crate) method: String,
    pub(crate) run: TaskFn,
}

impl Task {
    pub fn new(
        method: impl Into<String>,
        run: impl Fn(&mut dyn Write) -> Result<()> + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            run: Arc::new(run),
        }
    }

    /// The declared method-style name (before folding).
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// A provider that contributes one command per declared task method.
pub trait TaskSet {
    fn tasks(&self) -> Vec<Task>;
}

/// A provider that is itself one command and declares its own name.
pub trait ConsoleCommand {
    /// The command name as invoked on the command line. Discovery fails the
    /// whole call when this is empty.
    fn name(&self) -> String;

    /// One-line description shown in the generated help.
    fn description(&self) -> String {
        String::new()
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()>;
}

/// Which command ecosystem an application is fixed to. Established by the
/// first successful discovery call; mixing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tasks,
    Console,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Tasks => write!(f, "task runner"),
            Mode::Console => write!(f, "console"),
        }
    }
}

/// One registered provider: its type name (used in diagnostics and kept in
/// the contributing-type list) plus the capability handle.
pub struct IndexEntry {
    pub(crate) type_name: String,
    pub(crate) provider: Provider,
}

pub(crate) enum Provider {
    Tasks(Arc<dyn TaskSet>),
    Console(Arc<dyn ConsoleCommand>),
}

/// Explicit namespace-to-providers map, built once at startup and passed to
/// the application constructor.
#[derive(Default)]
pub struct ModuleIndex {
    entries: BTreeMap<String, Vec<IndexEntry>>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task-set provider under `namespace`.
    pub fn register_task_set(
        &mut self,
        namespace: &str,
        type_name: &str,
        set: impl TaskSet + 'static,
    ) {
        self.entries
            .entry(namespace.to_string())
            .or_default()
            .push(IndexEntry {
                type_name: type_name.to_string(),
                provider: Provider::Tasks(Arc::new(set)),
            });
    }

    /// Register a console-command provider under `namespace`.
    pub fn register_console_command(
        &mut self,
        namespace: &str,
        type_name: &str,
        command: impl ConsoleCommand + 'static,
    ) {
        self.entries
            .entry(namespace.to_string())
            .or_default()
            .push(IndexEntry {
                type_name: type_name.to_string(),
                provider: Provider::Console(Arc::new(command)),
            });
    }

    /// The registered namespaces, in sorted order.
    pub fn namespaces(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub(crate) fn entries(&self, namespace: &str) -> &[IndexEntry] {
        self.entries.get(namespace).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One entry of the application's command table.
pub(crate) struct RegisteredCommand {
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) description: String,
    pub(crate) invoke: Invoke,
}

pub(crate) enum Invoke {
    Task(TaskFn),
    Console(Arc<dyn ConsoleCommand>),
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl RegisteredCommand {
    pub(crate) fn execute(&self, out: &mut dyn Write) -> Result<()> {
        match &self.invoke {
            Invoke::Task(run) => run(out),
            Invoke::Console(cmd) => cmd.execute(out),
        }
    }
}
