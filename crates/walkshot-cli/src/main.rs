//! Walkshot - walks a web app's UI flow in a browser and captures a
//! screenshot for visual confirmation.
//!
//! Entry point: parse arguments, initialize logging, load and validate the
//! configuration, run the walkthrough once, and map its outcome to the
//! exit code.

use clap::Parser;
use miette::Result;
use tracing::info;
use walkshot_cli::error::{to_miette, CliError};
use walkshot_cli::walkthrough::{WalkOutcome, Walkthrough};
use walkshot_cli::{cli, config, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init(args.verbose, args.quiet, args.no_color);

    let config = config::WalkConfig::load(&args).map_err(|e| to_miette(e.into()))?;

    let report = Walkthrough::new(config).run().await;

    match report.outcome {
        WalkOutcome::Completed { screenshot } => {
            info!(
                steps = report.steps.len(),
                console_errors = report.console_errors,
                duration = ?report.duration,
                "walkthrough completed; screenshot at {}",
                screenshot.display()
            );
            Ok(())
        }
        WalkOutcome::Failed { step, error } => Err(to_miette(CliError::WalkFailed {
            step: step.name(),
            source: error,
        })),
    }
}
