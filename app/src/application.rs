//! # appstrap Application Core
//!
//! File: app/src/application.rs
//!
//! ## Overview
//!
//! The application core orchestrates the bootstrap sequence: it owns the
//! identity (name and version), the module index, the configuration store,
//! the command table, and the built logger, and it carries the one-shot
//! state machine `Created -> Finalized -> Running`.
//!
//! ## Architecture
//!
//! The lifecycle is split in two:
//! - `finalize()` validates readiness: the identity must be set (explicit
//!   setters win over the `application.name`/`application.version`
//!   configuration keys, and the name is checked first), a command mode must
//!   be fixed by a prior discovery call, the configuration is built, the
//!   verbosity is resolved from argv, and the logger is constructed.
//! - `run()` builds the dispatch tree (one `clap` subcommand per registered
//!   command), parses the stripped argv, installs the logger dispatcher for
//!   the duration of the command, and executes it against the owned output
//!   handle.
//!
//! Discovery is mode-exclusive: the first successful `find_task_commands` /
//! `find_console_commands` call fixes the ecosystem, and registering
//! commands of the other kind afterwards fails without touching the command
//! table.
//!
//! The accessors at the bottom (`state`, `mode`, `command_names`, `logger`,
//! ...) are deliberate: observable state for embedders and tests instead of
//! any runtime introspection.
//!
use crate::commands::{discovery, Mode, ModuleIndex, RegisteredCommand};
use crate::core::config::ConfigStore;
use crate::core::error::{AppError, Result};
use crate::core::schema::{
    application_schema, ConfigSchema, APPLICATION_NAME, APPLICATION_VERSION,
};
use crate::logging::{Logger, LoggerBuilder};
use crate::verbosity::{strip_flags, Verbosity};
use anyhow::Context;
use clap::error::ErrorKind;
use std::env;
use std::io::{self, Write};
use tracing::{debug, info};

/// Lifecycle of an application instance. One-shot: nothing leaves `Running`
/// within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Created,
    Finalized,
    Running,
}

/// The application bootstrap: identity, configuration, command table,
/// logger, and one-shot dispatch.
pub struct Application {
    args: Vec<String>,
    output: Box<dyn Write>,
    index: ModuleIndex,
    config: ConfigStore,
    name: Option<String>,
    version: Option<String>,
    mode: Option<Mode>,
    commands: Vec<RegisteredCommand>,
    command_classes: Vec<String>,
    logger: Option<Logger>,
    state: AppState,
}

impl Application {
    /// Create an application over an explicit module index, reading argv
    /// from the environment and writing command output to stdout.
    pub fn new(index: ModuleIndex) -> Self {
        Self {
            args: env::args().collect(),
            output: Box::new(io::stdout()),
            index,
            config: ConfigStore::new(application_schema()),
            name: None,
            version: None,
            mode: None,
            commands: Vec::new(),
            command_classes: Vec::new(),
            logger: None,
            state: AppState::Created,
        }
    }

    /// Replace the arguments (the first element is the program name).
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Replace the command output handle.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    /// Replace the configuration schema (and with it the store).
    pub fn with_schema(mut self, schema: ConfigSchema) -> Self {
        self.config = ConfigStore::new(schema);
        self
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn set_version(&mut self, version: &str) {
        self.version = Some(version.to_string());
    }

    /// Register every task set found under `namespace`. Fixes the mode to
    /// task-runner on first success; fails if the mode is already console.
    pub fn find_task_commands(&mut self, namespace: &str) -> Result<()> {
        self.discover_commands(namespace, Mode::Tasks)
    }

    /// Register every console command found under `namespace`. Fixes the
    /// mode to console on first success; fails if the mode is already
    /// task-runner.
    pub fn find_console_commands(&mut self, namespace: &str) -> Result<()> {
        self.discover_commands(namespace, Mode::Console)
    }

    fn discover_commands(&mut self, namespace: &str, expected: Mode) -> Result<()> {
        if let Some(fixed) = self.mode {
            if fixed != expected {
                return Err(AppError::ModeConflict(format!(
                    "cannot register {expected} commands: application mode is already {fixed}"
                ))
                .into());
            }
        }
        // Staged by the discovery pass: nothing below runs unless the whole
        // namespace validated.
        let staged = discovery::discover(&self.index, namespace, expected, &self.commands)?;
        if staged.is_empty() {
            debug!("namespace '{namespace}' contributed no commands");
            return Ok(());
        }
        for command in &staged {
            if !self.command_classes.contains(&command.type_name) {
                self.command_classes.push(command.type_name.clone());
            }
        }
        debug!(
            "registered {} command(s) from namespace '{namespace}'",
            staged.len()
        );
        self.commands.extend(staged);
        self.mode = Some(expected);
        Ok(())
    }

    /// Validate readiness and build the logger. Requires the identity to be
    /// fully set (setters win over configuration; the name is checked
    /// first) and a fixed command mode. Transitions to `Finalized`.
    pub fn finalize(&mut self) -> Result<()> {
        if self.state == AppState::Running {
            return Err(
                AppError::ModeConflict("application has already run".to_string()).into(),
            );
        }
        let name = match self.name.clone() {
            Some(name) => name,
            None => match self.config.lookup_str(APPLICATION_NAME)? {
                Some(name) => name,
                None => return Err(AppError::NameMissing.into()),
            },
        };
        let version = match self.version.clone() {
            Some(version) => version,
            None => match self.config.lookup_str(APPLICATION_VERSION)? {
                Some(version) => version,
                None => return Err(AppError::VersionMissing.into()),
            },
        };
        let mode = self.mode.ok_or_else(|| {
            AppError::ModeConflict(
                "no commands registered: discover commands before finalize()".to_string(),
            )
        })?;

        if !self.config.is_built() {
            self.config.build()?;
        }
        let verbosity = Verbosity::resolve(&self.args);
        let logger = LoggerBuilder::new(verbosity, &self.config, &name).build()?;

        debug!("application '{name}' {version} finalized in {mode} mode");
        self.name = Some(name);
        self.version = Some(version);
        self.logger = Some(logger);
        self.state = AppState::Finalized;
        Ok(())
    }

    /// Dispatch once into the fixed command ecosystem. Requires `Finalized`;
    /// transitions to `Running` and returns the exit code.
    pub fn run(&mut self) -> Result<i32> {
        if self.state != AppState::Finalized {
            return Err(AppError::ModeConflict(
                "application is not finalized: call finalize() before run()".to_string(),
            )
            .into());
        }
        let name = self.name.clone().unwrap_or_default();
        let version = self.version.clone().unwrap_or_default();

        let mut root = clap::Command::new(name).version(version);
        for command in &self.commands {
            let mut sub = clap::Command::new(command.name.clone());
            if !command.description.is_empty() {
                sub = sub.about(command.description.clone());
            }
            root = root.subcommand(sub);
        }

        let argv = strip_flags(&self.args);
        let matches = match root.clone().try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                        e.print().context("cannot render help output")?;
                        self.state = AppState::Running;
                        Ok(0)
                    }
                    _ => Err(AppError::ArgumentParsing(e.to_string()).into()),
                };
            }
        };

        let code = match matches.subcommand() {
            Some((invoked, _)) => {
                let command = self
                    .commands
                    .iter()
                    .find(|c| c.name == invoked)
                    .ok_or_else(|| {
                        AppError::ArgumentParsing(format!("unknown command '{invoked}'"))
                    })?;
                let output = self.output.as_mut();
                match &self.logger {
                    Some(logger) => {
                        tracing::dispatcher::with_default(logger.dispatch(), || {
                            info!("running command '{}'", command.name);
                            command.execute(output)
                        })?
                    }
                    None => command.execute(output)?,
                }
                0
            }
            None => {
                let help = root.render_help();
                write!(self.output, "{help}").context("cannot write help output")?;
                0
            }
        };
        self.state = AppState::Running;
        Ok(code)
    }

    // --- Observable state ---

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Registered command names, in registration order.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    /// Type names of the providers that contributed commands.
    pub fn command_classes(&self) -> &[String] {
        &self.command_classes
    }
}
