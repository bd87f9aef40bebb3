//! Page console capture.
//!
//! The walkthrough does not assert on console output, but errors the page
//! logs while being driven are valuable context when a run fails, so every
//! page accumulates its console messages for the final report.
//!
//! Messages are stored in an `Arc<Mutex<Vec<_>>>` rather than a channel:
//! they are queried after the fact, ordering must be preserved, and the
//! volume is small.

use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Severity of a console message, mirroring the JavaScript console methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsoleLevel {
    /// `console.log()`
    Log,
    /// `console.info()`
    Info,
    /// `console.warn()`
    Warning,
    /// `console.error()`
    Error,
    /// `console.debug()`
    Debug,
    /// Catch-all for other console APIs
    Other,
}

impl ConsoleLevel {
    /// True for error-level messages.
    pub fn is_error(&self) -> bool {
        matches!(self, ConsoleLevel::Error)
    }
}

impl From<&EventConsoleApiCalled> for ConsoleLevel {
    fn from(event: &EventConsoleApiCalled) -> Self {
        use chromiumoxide::cdp::js_protocol::runtime::ConsoleApiCalledType;

        match event.r#type {
            ConsoleApiCalledType::Log => ConsoleLevel::Log,
            ConsoleApiCalledType::Info => ConsoleLevel::Info,
            ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
            ConsoleApiCalledType::Error => ConsoleLevel::Error,
            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
            _ => ConsoleLevel::Other,
        }
    }
}

/// A captured console message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// Severity level.
    pub level: ConsoleLevel,

    /// Formatted message text; multiple arguments are joined with spaces.
    pub text: String,

    /// Source location when available (e.g. "app.js:42:10").
    pub source: Option<String>,
}

impl ConsoleMessage {
    /// Creates a message with no source location.
    pub fn new(level: ConsoleLevel, text: String) -> Self {
        Self {
            level,
            text,
            source: None,
        }
    }
}

/// Thread-safe console message accumulator.
///
/// Cheaply cloneable; the CDP event listener pushes into one clone while
/// the walkthrough queries another.
#[derive(Debug, Clone, Default)]
pub struct ConsoleCapture {
    messages: Arc<Mutex<Vec<ConsoleMessage>>>,
}

impl ConsoleCapture {
    /// Creates a new, empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message in arrival order.
    ///
    /// A poisoned mutex means something already panicked while holding the
    /// lock; the message is dropped rather than compounding the panic.
    pub(crate) fn push(&self, message: ConsoleMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }

    /// Snapshot of every captured message.
    pub fn messages(&self) -> Vec<ConsoleMessage> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// All error-level messages.
    pub fn errors(&self) -> Vec<ConsoleMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.level.is_error())
            .collect()
    }

    /// Number of error-level messages, without cloning the buffer.
    pub fn error_count(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|m| m.level.is_error())
            .count()
    }

    /// True if any error-level message was captured.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Total number of captured messages.
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// True if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Converts a CDP console event into a [`ConsoleMessage`].
///
/// Arguments are formatted individually and joined with spaces; non-string
/// values render as `<object>`. The first stack frame, when present,
/// becomes the source location.
pub(crate) fn parse_console_event(event: &EventConsoleApiCalled) -> ConsoleMessage {
    let level = ConsoleLevel::from(event);

    let text = event
        .args
        .iter()
        .map(|arg| {
            arg.value
                .as_ref()
                .and_then(|v| v.as_str())
                .unwrap_or("<object>")
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut message = ConsoleMessage::new(level, text);

    if let Some(stack_trace) = &event.stack_trace {
        if let Some(frame) = stack_trace.call_frames.first() {
            message.source = Some(format!(
                "{}:{}:{}",
                frame.url, frame.line_number, frame.column_number
            ));
        }
    }

    message
}
