//! # walkshot-browser
//!
//! Headless Chrome automation primitives for scripted UI walkthroughs.
//!
//! This crate wraps chromiumoxide with the operations a walkthrough needs:
//! launching (and reliably releasing) the browser process, navigating pages,
//! waiting on landmark text and CSS selectors, clicking elements located by
//! visible text or by role and label, settling on DOM quiescence before a
//! capture, and writing full-page screenshots to disk. Console output from
//! the page is accumulated as diagnostic context.
//!
//! ## Architecture
//!
//! - **Browser**: owns the Chrome process lifecycle
//! - **Page**: a tab with navigation, waits, interaction, and capture
//! - **WaitConfig / Quiescence**: bounded polling strategies
//! - **ConsoleCapture**: thread-safe accumulation of page console messages
//!
//! All waits are bounded; a condition that never holds surfaces as
//! [`BrowserError::WaitTimeout`] rather than hanging the run.
//!
//! ## Example
//!
//! ```ignore
//! use walkshot_browser::{Browser, LaunchOptions, WaitConfig};
//!
//! let browser = Browser::launch(LaunchOptions::default()).await?;
//! let page = browser.new_page().await?;
//! page.navigate("http://localhost:5173/Recalla/").await?;
//! page.wait_for_text("Recalla", WaitConfig::default()).await?;
//! page.screenshot_to("verification/home.png".as_ref()).await?;
//! browser.close().await?;
//! ```
//!
//! Integration tests require an installed Chrome/Chromium and are marked
//! `#[ignore]`; run them with `cargo test -- --ignored`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod browser;
pub mod console;
pub mod error;
pub mod page;
pub mod wait;

pub use browser::{Browser, LaunchOptions};
pub use console::{ConsoleCapture, ConsoleLevel, ConsoleMessage};
pub use error::{BrowserError, Result};
pub use page::Page;
pub use wait::{Quiescence, WaitConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
