//! # appstrap Error Types
//!
//! File: app/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout the bootstrap library.
//! Every failure surfaces synchronously to the immediate caller as a typed
//! error; nothing is swallowed and nothing is retried.
//!
//! ## Architecture
//!
//! The error system consists of two components:
//! - `AppError`: a custom error enum using `thiserror` for the specific
//!   failure conditions of the bootstrap sequence
//! - `Result<T>`: a type alias for `anyhow::Result<T>` so call sites can add
//!   context freely while callers still discriminate via `downcast_ref`
//!
//! The variants cover the distinct failure domains:
//! - identity errors (name or version missing at finalize time)
//! - mode conflicts (mixing the two command ecosystems, or running an
//!   application that was never finalized)
//! - command discovery failures (capability mismatch, empty or duplicate
//!   command names)
//! - logger construction failures (directory uncreatable or unwritable)
//! - configuration and schema violations
//!
//! ## Examples
//!
//! Discriminating on the error type at the embedding layer:
//!
//! ```text
//! match app.finalize() {
//!     Ok(()) => {}
//!     Err(e) if matches!(e.downcast_ref::<AppError>(), Some(AppError::NameMissing)) => {
//!         app.set_name("fallback");
//!         app.finalize()?;
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
use thiserror::Error;

/// Typed failure conditions of the application bootstrap sequence.
#[derive(Error, Debug)]
pub enum AppError {
    /// The application name was neither set explicitly nor present in the
    /// configuration when `finalize()` ran. Recoverable: set a name and retry.
    #[error("Application name missing")]
    NameMissing,

    /// The application version was missing at `finalize()` time.
    /// Recoverable: set a version and retry.
    #[error("Version missing")]
    VersionMissing,

    /// The two command ecosystems were mixed, or the application was run or
    /// finalized without a fixed mode. Fatal for this application instance.
    #[error("Application mode error: {0}")]
    ModeConflict(String),

    /// A registered module failed its capability check or yielded an invalid
    /// command name. Fatal for the discovery call that hit it.
    #[error("Command discovery failed: {0}")]
    Discovery(String),

    /// The configured log directory could not be created or the log file
    /// could not be opened. No partial logger is ever returned.
    #[error("Logger build failed: {0}")]
    LoggerBuild(String),

    /// A value violated the configuration schema (unknown key, wrong type,
    /// out-of-bounds integer).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The schema definition itself was malformed. Raised when the schema is
    /// finished, never when it is used.
    #[error("Invalid schema: {0}")]
    Schema(String),

    /// Dispatch-level argument parsing failed (for example an unknown
    /// command name on the command line).
    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;
