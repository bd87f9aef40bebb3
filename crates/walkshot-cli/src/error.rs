//! Error handling for the walkshot CLI.
//!
//! Two layers: [`ConfigError`] for everything that can go wrong before a
//! browser exists, and [`CliError`] as the top-level type handed to the
//! process boundary, where [`to_miette`] renders it. Walkthrough failures
//! arrive as [`CliError::WalkFailed`] carrying the step that broke, so the
//! exit message names how far the run got.

use std::path::PathBuf;
use thiserror::Error;
use walkshot_browser::BrowserError;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A browser operation failed outside the walkthrough proper.
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// The walkthrough ran and failed at a specific step.
    #[error("walkthrough failed at step '{step}': {source}")]
    WalkFailed {
        /// Name of the failing step
        step: &'static str,
        /// The underlying browser error
        #[source]
        source: BrowserError,
    },

    /// I/O errors from file system operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
///
/// Each variant carries enough context to fix the value it complains
/// about, with a hint where one is actionable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}\n\nHint: create it or drop the --config flag", .0.display())]
    NotFound(PathBuf),

    /// The merged configuration could not be deserialized.
    #[error("invalid configuration: {message}\n\nHint: {hint}")]
    Invalid {
        /// What the extractor rejected
        message: String,
        /// How to fix it
        hint: String,
    },

    /// The base URL is missing or not an http(s) URL.
    #[error("'{value}' is not a usable base URL\n\nHint: use an absolute http(s) URL such as http://localhost:5173/Recalla/")]
    InvalidBaseUrl {
        /// The rejected value
        value: String,
    },

    /// A required string field was left empty.
    #[error("'{field}' must not be empty")]
    EmptyField {
        /// Name of the offending field
        field: &'static str,
    },

    /// A duration field was set to zero.
    #[error("'{field}' must be greater than zero")]
    ZeroDuration {
        /// Name of the offending field
        field: &'static str,
    },

    /// The settle tuning can never succeed within its own timeout.
    #[error("settle cannot observe {stable_samples} samples every {sample_interval_ms}ms within {timeout_ms}ms\n\nHint: raise settle.timeout_ms or lower settle.stable_samples")]
    SettleUnsatisfiable {
        /// Required consecutive samples
        stable_samples: u32,
        /// Interval between samples
        sample_interval_ms: u64,
        /// The cap that makes the combination impossible
        timeout_ms: u64,
    },

    /// I/O error while reading configuration.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`CliError`] as the default error.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Renders a [`CliError`] as a miette report for the process boundary.
pub fn to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::WalkFailed { step, source } => miette::miette!(
            "walkthrough failed at step '{step}': {source}\n\n\
             Hint: the last progress line above shows how far the run got; \
             no screenshot was written"
        ),
        other => miette::miette!("{other}"),
    }
}
