//! # appstrap
//!
//! Application bootstrap for command-line programs: hierarchical,
//! schema-validated configuration, verbosity resolution from argv, logger
//! construction with console and optional file handlers, explicit command
//! discovery over a module index, and one-shot dispatch through a
//! dynamically built `clap` command tree.
//!
//! ## Overview
//!
//! An application embeds the bootstrap in four steps: build a
//! [`ModuleIndex`] of command providers, construct an [`Application`] over
//! it, discover commands from one or more namespaces, then `finalize()` and
//! `run()`:
//!
//! ```no_run
//! use appstrap::{Application, ModuleIndex, Task, TaskSet};
//! use std::io::Write;
//!
//! struct GreetTasks;
//!
//! impl TaskSet for GreetTasks {
//!     fn tasks(&self) -> Vec<Task> {
//!         vec![Task::new("helloWorld", |out: &mut dyn Write| {
//!             writeln!(out, "Hello world !")?;
//!             Ok(())
//!         })]
//!     }
//! }
//!
//! fn main() -> appstrap::Result<()> {
//!     let mut index = ModuleIndex::new();
//!     index.register_task_set("greet", "GreetTasks", GreetTasks);
//!
//!     let mut app = Application::new(index);
//!     app.set_name("greeter");
//!     app.set_version("1.0.0");
//!     app.find_task_commands("greet")?;
//!     app.finalize()?;
//!     let code = app.run()?;
//!     std::process::exit(code)
//! }
//! ```
//!
//! Two command ecosystems are supported and are mutually exclusive within a
//! run: task sets (one provider, many commands named after its task
//! methods) and console commands (one provider, one self-named command).
//! The global verbosity flags (`-q`, `-v`, `-vv`, `-vvv`, `--verbose[=N]`)
//! are consumed by the bootstrap; everything else passes through to the
//! dispatch layer.
//!

pub mod application;
pub mod commands;
pub mod core;
pub mod logging;
pub mod verbosity;

pub use crate::application::{AppState, Application};
pub use crate::commands::{ConsoleCommand, Mode, ModuleIndex, Task, TaskSet};
pub use crate::core::config::ConfigStore;
pub use crate::core::error::{AppError, Result};
pub use crate::core::schema::{
    application_schema, ConfigSchema, ConfigValue, SchemaBuilder, APPLICATION_NAME,
    APPLICATION_VERSION, LOG_DATE_FORMAT, LOG_DIRECTORY, LOG_FILENAME, LOG_OUTPUT_FORMAT,
};
pub use crate::logging::{
    HandlerSpec, Logger, LoggerBuilder, DEFAULT_DATE_FORMAT, DEFAULT_OUTPUT_FORMAT,
};
pub use crate::verbosity::Verbosity;
