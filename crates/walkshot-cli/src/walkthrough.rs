//! The fixed walkthrough sequence and its outcome report.
//!
//! One invocation is one run: launch, open the home page, wait for its
//! landmark, start the flow, wait for the topic listing, click play, wait
//! for the game view, settle, capture, close. Every step strictly follows
//! the previous one; there is no retry and no parallelism.
//!
//! Failures do not unwind. [`Walkthrough::run`] folds whatever happened
//! into a [`WalkReport`] with a tagged [`WalkOutcome`], and the browser is
//! released before the report is returned on every path.

use crate::config::WalkConfig;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use walkshot_browser::{Browser, BrowserError, LaunchOptions, Page};

/// One step of the walkthrough, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Launch the browser process.
    Launch,
    /// Open a tab and navigate to the application root.
    OpenHome,
    /// Wait for the home page landmark text.
    AwaitAppLandmark,
    /// Click the call-to-action, or fall back to direct navigation.
    StartFlow,
    /// Wait for the topic listing landmark text.
    AwaitTopics,
    /// Click the first play button by role and label.
    ClickPlay,
    /// Wait for the game view's structural marker.
    AwaitGameView,
    /// Wait for the DOM to stop changing.
    Settle,
    /// Capture and write the screenshot.
    Screenshot,
}

impl Step {
    /// Stable name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Step::Launch => "launch browser",
            Step::OpenHome => "open home page",
            Step::AwaitAppLandmark => "await app landmark",
            Step::StartFlow => "start flow",
            Step::AwaitTopics => "await topic listing",
            Step::ClickPlay => "click play",
            Step::AwaitGameView => "await game view",
            Step::Settle => "settle",
            Step::Screenshot => "capture screenshot",
        }
    }
}

/// Which of the two start paths actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBranch {
    /// The call-to-action was present and clicked.
    ClickedStart,
    /// The call-to-action was absent; navigated directly to the start path.
    DirectNavigation,
}

/// Timing record for a completed step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// The step that completed.
    pub step: Step,
    /// How long it took.
    pub duration: Duration,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum WalkOutcome {
    /// Every step ran; the screenshot is on disk.
    Completed {
        /// Where the screenshot was written.
        screenshot: PathBuf,
    },
    /// A step failed. No screenshot was produced.
    Failed {
        /// The step that failed.
        step: Step,
        /// What went wrong.
        error: BrowserError,
    },
}

/// Everything a caller needs to know about one run.
#[derive(Debug)]
pub struct WalkReport {
    /// Completed or failed, with detail.
    pub outcome: WalkOutcome,
    /// Steps that completed, in order, with timings.
    pub steps: Vec<StepRecord>,
    /// The start branch taken, once the run got that far.
    pub start_branch: Option<StartBranch>,
    /// Error-level console messages the page logged during the run.
    pub console_errors: usize,
    /// Wall-clock duration of the whole run.
    pub duration: Duration,
}

impl WalkReport {
    /// True when the run reached the screenshot.
    pub fn completed(&self) -> bool {
        matches!(self.outcome, WalkOutcome::Completed { .. })
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match &self.outcome {
            WalkOutcome::Completed { screenshot } => format!(
                "walkthrough completed in {:.1?}: {} steps, screenshot at {}",
                self.duration,
                self.steps.len(),
                screenshot.display()
            ),
            WalkOutcome::Failed { step, error } => format!(
                "walkthrough failed at '{}' after {:.1?}: {error}",
                step.name(),
                self.duration
            ),
        }
    }
}

/// Runs the fixed UI walkthrough described by a [`WalkConfig`].
pub struct Walkthrough {
    config: WalkConfig,
}

impl Walkthrough {
    /// Creates a runner for a validated configuration.
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// Executes the walkthrough once.
    ///
    /// Never panics and never propagates a raw error: the outcome, the
    /// failing step if any, and per-step timings come back in the report.
    /// The browser is closed before this returns, whichever way it went.
    pub async fn run(&self) -> WalkReport {
        let started = Instant::now();
        let mut steps = Vec::new();
        let mut start_branch = None;

        info!("launching browser");
        let launch_started = Instant::now();
        let options = LaunchOptions {
            headless: self.config.headless,
            window_size: self.config.window_size,
            ..LaunchOptions::default()
        };

        let browser = match Browser::launch(options).await {
            Ok(browser) => {
                steps.push(StepRecord {
                    step: Step::Launch,
                    duration: launch_started.elapsed(),
                });
                browser
            }
            Err(error) => {
                return WalkReport {
                    outcome: WalkOutcome::Failed {
                        step: Step::Launch,
                        error,
                    },
                    steps,
                    start_branch,
                    console_errors: 0,
                    duration: started.elapsed(),
                };
            }
        };

        let page = match browser.new_page().await {
            Ok(page) => page,
            Err(error) => {
                if let Err(e) = browser.close().await {
                    warn!("browser close failed: {e}");
                }
                return WalkReport {
                    outcome: WalkOutcome::Failed {
                        step: Step::OpenHome,
                        error,
                    },
                    steps,
                    start_branch,
                    console_errors: 0,
                    duration: started.elapsed(),
                };
            }
        };

        let result = self.drive(&page, &mut steps, &mut start_branch).await;

        let console_errors = page.console().error_count();
        if console_errors > 0 {
            warn!(console_errors, "page logged errors during the walkthrough");
        }

        if let Err(e) = browser.close().await {
            warn!("browser close failed: {e}");
        }

        let outcome = match result {
            Ok(screenshot) => WalkOutcome::Completed { screenshot },
            Err((step, error)) => WalkOutcome::Failed { step, error },
        };

        WalkReport {
            outcome,
            steps,
            start_branch,
            console_errors,
            duration: started.elapsed(),
        }
    }

    /// The step sequence proper. Returns the screenshot path, or the step
    /// that failed together with its error.
    async fn drive(
        &self,
        page: &Page,
        steps: &mut Vec<StepRecord>,
        start_branch: &mut Option<StartBranch>,
    ) -> Result<PathBuf, (Step, BrowserError)> {
        let cfg = &self.config;
        let wait = cfg.landmark_wait();

        info!(url = %cfg.base_url, "opening home page");
        run_step(Step::OpenHome, steps, page.navigate(&cfg.base_url)).await?;

        info!(landmark = %cfg.app_landmark, "waiting for home page");
        run_step(
            Step::AwaitAppLandmark,
            steps,
            page.wait_for_text(&cfg.app_landmark, wait),
        )
        .await?;

        // The call-to-action may legitimately be absent; direct navigation
        // to the start path is the expected alternate route, not an error.
        // Whether that route actually worked is checked by the topic
        // landmark wait right after.
        let step_started = Instant::now();
        let matches = page
            .count_by_text(&cfg.start_button)
            .await
            .map_err(|e| (Step::StartFlow, e))?;
        if matches > 0 {
            info!(button = %cfg.start_button, "clicking start");
            page.click_by_text(&cfg.start_button)
                .await
                .map_err(|e| (Step::StartFlow, e))?;
            *start_branch = Some(StartBranch::ClickedStart);
        } else {
            let url = cfg.url_for(&cfg.start_path);
            info!(%url, "start button not found, navigating directly");
            page.navigate(&url).await.map_err(|e| (Step::StartFlow, e))?;
            *start_branch = Some(StartBranch::DirectNavigation);
        }
        steps.push(StepRecord {
            step: Step::StartFlow,
            duration: step_started.elapsed(),
        });

        info!(landmark = %cfg.topic_landmark, "waiting for topics");
        run_step(
            Step::AwaitTopics,
            steps,
            page.wait_for_text(&cfg.topic_landmark, wait),
        )
        .await?;

        info!(label = %cfg.play_label, "clicking play");
        run_step(
            Step::ClickPlay,
            steps,
            page.click_by_role("button", &cfg.play_label),
        )
        .await?;

        info!(marker = %cfg.game_marker, "waiting for game view");
        run_step(
            Step::AwaitGameView,
            steps,
            page.wait_for_selector(&cfg.game_marker, wait),
        )
        .await?;

        info!("waiting for animations to settle");
        run_step(Step::Settle, steps, page.settle(cfg.settle.quiescence())).await?;

        info!(path = %cfg.screenshot.display(), "capturing screenshot");
        run_step(Step::Screenshot, steps, page.screenshot_to(&cfg.screenshot)).await?;

        Ok(cfg.screenshot.clone())
    }
}

/// Times one step, recording it on success and tagging the error with the
/// step on failure.
async fn run_step<T>(
    step: Step,
    steps: &mut Vec<StepRecord>,
    op: impl Future<Output = walkshot_browser::Result<T>>,
) -> Result<T, (Step, BrowserError)> {
    let started = Instant::now();
    match op.await {
        Ok(value) => {
            steps.push(StepRecord {
                step,
                duration: started.elapsed(),
            });
            Ok(value)
        }
        Err(error) => Err((step, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STEPS: [Step; 9] = [
        Step::Launch,
        Step::OpenHome,
        Step::AwaitAppLandmark,
        Step::StartFlow,
        Step::AwaitTopics,
        Step::ClickPlay,
        Step::AwaitGameView,
        Step::Settle,
        Step::Screenshot,
    ];

    #[test]
    fn step_names_are_distinct_and_non_empty() {
        for (i, a) in ALL_STEPS.iter().enumerate() {
            assert!(!a.name().is_empty());
            for b in &ALL_STEPS[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn completed_report_summary() {
        let report = WalkReport {
            outcome: WalkOutcome::Completed {
                screenshot: PathBuf::from("verification/game_screenshot.png"),
            },
            steps: vec![StepRecord {
                step: Step::Launch,
                duration: Duration::from_millis(500),
            }],
            start_branch: Some(StartBranch::ClickedStart),
            console_errors: 0,
            duration: Duration::from_secs(4),
        };

        assert!(report.completed());
        let summary = report.summary();
        assert!(summary.contains("completed"));
        assert!(summary.contains("verification/game_screenshot.png"));
    }

    #[test]
    fn failed_report_summary_names_the_step() {
        let report = WalkReport {
            outcome: WalkOutcome::Failed {
                step: Step::AwaitTopics,
                error: BrowserError::WaitTimeout {
                    condition: "text 'German Words'".to_string(),
                    timeout: Duration::from_secs(10),
                },
            },
            steps: Vec::new(),
            start_branch: Some(StartBranch::DirectNavigation),
            console_errors: 2,
            duration: Duration::from_secs(11),
        };

        assert!(!report.completed());
        let summary = report.summary();
        assert!(summary.contains("await topic listing"));
        assert!(summary.contains("German Words"));
    }

    #[tokio::test]
    async fn run_step_records_success_with_timing() {
        let mut steps = Vec::new();
        let result = run_step(Step::Settle, &mut steps, async { Ok(7u32) }).await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step, Step::Settle);
    }

    #[tokio::test]
    async fn run_step_tags_failures_with_the_step() {
        let mut steps = Vec::new();
        let result: Result<(), _> = run_step(Step::ClickPlay, &mut steps, async {
            Err(BrowserError::ElementNotFound {
                description: "role 'button' with label 'Play'".to_string(),
            })
        })
        .await;

        let (step, error) = result.unwrap_err();
        assert_eq!(step, Step::ClickPlay);
        assert!(matches!(error, BrowserError::ElementNotFound { .. }));
        assert!(steps.is_empty(), "failed steps are not recorded as done");
    }
}
