//! Walkshot CLI - drives a web application's UI flow in a browser and
//! captures a screenshot for visual confirmation.
//!
//! The walkthrough itself is a fixed, sequential script: open the home
//! page, wait for its landmark, start the flow (clicking the call-to-action
//! or falling back to direct navigation), wait for the topic listing, click
//! play, wait for the game view, settle, capture. What this crate adds
//! around it:
//!
//! - [`config`] - every endpoint, landmark, and timing value as a named,
//!   validated field, loaded in layers (defaults, TOML file, environment,
//!   CLI flags)
//! - [`walkthrough`] - the step sequence with a tagged outcome report and
//!   guaranteed browser release on every exit path
//! - [`cli`] - the clap argument surface
//! - [`logger`] - tracing setup
//! - [`error`] - error types and miette conversion for the process boundary

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod walkthrough;

pub use config::{SettleConfig, WalkConfig};
pub use error::{CliError, ConfigError, Result};
pub use walkthrough::{StartBranch, Step, StepRecord, WalkOutcome, WalkReport, Walkthrough};
