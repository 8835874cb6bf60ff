//! # appstrap Logger Construction
//!
//! File: app/src/logging.rs
//!
//! ## Overview
//!
//! This module builds the application logger from the resolved verbosity and
//! the configuration store. The logger always carries exactly one console
//! handler (a compact `fmt` layer on stderr, filtered at the resolved
//! verbosity, overridable via `RUST_LOG`). When `application.log.directory`
//! is configured, one file handler is added: the directory is created on
//! demand, the file is opened append-only, and records are rendered through
//! a configurable line format.
//!
//! ## Architecture
//!
//! The two handlers are `tracing-subscriber` layers composed onto a
//! registry; the result is held as a `tracing::Dispatch` that the
//! application installs for the duration of command dispatch. Handler
//! descriptors (`HandlerSpec`) are kept alongside the dispatcher as
//! deliberate accessors, so embedders and tests can observe what was built
//! without poking at subscriber internals.
//!
//! Any filesystem failure (directory uncreatable, file unopenable) fails
//! the whole build; no partial logger is ever returned.
//!
//! ## Format tokens
//!
//! The file handler's line format understands `%datetime%`, `%channel%`
//! (the event target), `%level_name%`, and `%message%`. Dates render via
//! `chrono` format strings.
//!
use crate::core::config::ConfigStore;
use crate::core::error::{AppError, Result};
use crate::core::schema::{LOG_DATE_FORMAT, LOG_DIRECTORY, LOG_FILENAME, LOG_OUTPUT_FORMAT};
use crate::verbosity::Verbosity;
use chrono::Local;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{debug, Dispatch, Event, Subscriber};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Line format applied to file log records when none is configured.
pub const DEFAULT_OUTPUT_FORMAT: &str = "[%datetime%] %channel%.%level_name%: %message%\n";
/// Date format applied to `%datetime%` when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Descriptor of one attached handler. The console handler is always
/// present; the file handler exists iff a log directory is configured and
/// writable.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerSpec {
    Console {
        verbosity: Verbosity,
    },
    File {
        path: PathBuf,
        output_format: String,
        date_format: String,
    },
}

/// A fully built logger: the composed dispatcher plus the descriptors of
/// the handlers it carries. Read-only once built.
#[derive(Debug)]
pub struct Logger {
    handlers: Vec<HandlerSpec>,
    dispatch: Dispatch,
}

impl Logger {
    /// The attached handlers, console first.
    pub fn handlers(&self) -> &[HandlerSpec] {
        &self.handlers
    }

    /// The file handler descriptor, when one was attached.
    pub fn file_handler(&self) -> Option<&HandlerSpec> {
        self.handlers
            .iter()
            .find(|h| matches!(h, HandlerSpec::File { .. }))
    }

    /// The composed dispatcher, installed by the application around command
    /// dispatch.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

/// Builds a [`Logger`] from the resolved verbosity and the configuration
/// store.
pub struct LoggerBuilder<'a> {
    verbosity: Verbosity,
    config: &'a ConfigStore,
    app_name: &'a str,
}

impl<'a> LoggerBuilder<'a> {
    pub fn new(verbosity: Verbosity, config: &'a ConfigStore, app_name: &'a str) -> Self {
        Self {
            verbosity,
            config,
            app_name,
        }
    }

    /// Build the logger. Exactly one console handler is attached; a file
    /// handler is added iff `application.log.directory` is set. Directory
    /// creation uses `mkdir -p` semantics; any failure fails the build.
    pub fn build(self) -> Result<Logger> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.verbosity.default_directive()));
        let console = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .with_filter(env_filter);
        let mut handlers = vec![HandlerSpec::Console {
            verbosity: self.verbosity,
        }];

        let file_layer = match self.config.lookup_str(LOG_DIRECTORY)? {
            Some(directory) => {
                let directory = PathBuf::from(shellexpand::tilde(&directory).into_owned());
                if directory.exists() && !directory.is_dir() {
                    return Err(AppError::LoggerBuild(format!(
                        "log path '{}' exists and is not a directory",
                        directory.display()
                    ))
                    .into());
                }
                fs::create_dir_all(&directory).map_err(|e| {
                    AppError::LoggerBuild(format!(
                        "cannot create log directory '{}': {e}",
                        directory.display()
                    ))
                })?;

                let filename = self
                    .config
                    .lookup_str(LOG_FILENAME)?
                    .unwrap_or_else(|| format!("{}.log", self.app_name));
                let path = directory.join(&filename);
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|e| {
                        AppError::LoggerBuild(format!(
                            "cannot open log file '{}': {e}",
                            path.display()
                        ))
                    })?;

                let output_format = self
                    .config
                    .lookup_str(LOG_OUTPUT_FORMAT)?
                    .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string());
                let date_format = self
                    .config
                    .lookup_str(LOG_DATE_FORMAT)?
                    .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
                probe_date_format(&date_format)?;

                debug!("file log handler attached at {}", path.display());
                handlers.push(HandlerSpec::File {
                    path,
                    output_format: output_format.clone(),
                    date_format: date_format.clone(),
                });
                // The file handler records every level; the console filter
                // alone tracks the verbosity flags.
                Some(
                    tracing_subscriber::fmt::layer()
                        .event_format(LineFormat {
                            output_format,
                            date_format,
                        })
                        .with_ansi(false)
                        .with_writer(Arc::new(file))
                        .with_filter(LevelFilter::TRACE),
                )
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry().with(console).with(file_layer);
        Ok(Logger {
            handlers,
            dispatch: Dispatch::new(subscriber),
        })
    }
}

/// Reject date formats chrono cannot render before they reach the handler.
fn probe_date_format(date_format: &str) -> Result<()> {
    let mut probe = String::new();
    if write!(probe, "{}", Local::now().format(date_format)).is_err() {
        return Err(
            AppError::LoggerBuild(format!("invalid log date format '{date_format}'")).into(),
        );
    }
    Ok(())
}

/// Renders one record through the configured line format.
struct LineFormat {
    output_format: String,
    date_format: String,
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut message = String::new();
        event.record(&mut MessageVisitor { buf: &mut message });

        let mut datetime = String::new();
        // The format was probed at build time; an empty timestamp is the
        // fallback if the clock renders badly anyway.
        if write!(datetime, "{}", Local::now().format(&self.date_format)).is_err() {
            datetime.clear();
        }

        let line = self
            .output_format
            .replace("%datetime%", &datetime)
            .replace("%channel%", event.metadata().target())
            .replace("%level_name%", &event.metadata().level().to_string())
            .replace("%message%", &message);
        writer.write_str(&line)?;
        if !line.ends_with('\n') {
            writer.write_str("\n")?;
        }
        Ok(())
    }
}

/// Extracts the `message` field of an event into a plain string.
struct MessageVisitor<'a> {
    buf: &'a mut String,
}

impl Visit for MessageVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.buf.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.buf, "{value:?}");
        }
    }
}
