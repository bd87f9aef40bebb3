//! Error types for browser automation.
//!
//! Failure modes are kept distinct so callers can tell a browser that never
//! started apart from a landmark that never appeared: launch failures,
//! navigation failures, wait timeouts, script failures, and capture failures
//! each get their own variant with context.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while driving the browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The Chrome process could not be started.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the failure
        reason: String,
        /// Underlying error, when one exists
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The Chrome DevTools Protocol connection was rejected or dropped.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation did not complete.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Why the navigation failed
        reason: String,
    },

    /// A wait condition was not satisfied before its deadline.
    #[error("wait for {condition} timed out after {timeout:?}")]
    WaitTimeout {
        /// Description of the condition that never held
        condition: String,
        /// The deadline that expired
        timeout: Duration,
    },

    /// In-page JavaScript failed to run, or its result did not deserialize.
    #[error("script evaluation failed: {0}")]
    ScriptFailed(String),

    /// No element matched the requested description.
    #[error("no element matching {description}")]
    ElementNotFound {
        /// What was being looked for (text, role and label, selector)
        description: String,
    },

    /// The screenshot could not be captured or written to disk.
    #[error("failed to write screenshot to '{}': {reason}", path.display())]
    ScreenshotFailed {
        /// Destination path of the capture
        path: PathBuf,
        /// Why the capture or write failed
        reason: String,
    },

    /// An operation was attempted on a closed browser instance.
    #[error("browser instance is already closed")]
    AlreadyClosed,

    /// Errors surfaced by chromiumoxide itself.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// Generic I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;
