//! Command-line interface definition.
//!
//! There is a single action (run the walkthrough), so there are no
//! subcommands: flags either tune logging or override configuration
//! values. Anything not exposed as a flag can still be set through
//! `walkshot.toml` or `WALKSHOT_*` environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Walk a web app's UI flow in headless Chrome and capture a screenshot
#[derive(Parser, Debug)]
#[command(
    name = "walkshot",
    version,
    about = "Walk a web app's UI flow in headless Chrome and capture a screenshot",
    long_about = "Walkshot drives a browser through a fixed UI flow of a locally running\n\
                  web application (home page, start flow, topic selection, game view) and\n\
                  writes a full-page screenshot for visual confirmation. Configuration is\n\
                  layered: built-in defaults, walkshot.toml, WALKSHOT_* environment\n\
                  variables, then these flags."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to a configuration file
    ///
    /// Defaults to walkshot.toml in the current directory when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root URL of the application under test
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Where to write the screenshot (overwritten on each run)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub visible: bool,
}
