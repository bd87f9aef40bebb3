//! Walkthrough configuration.
//!
//! Every value the walkthrough depends on lives here as a named field:
//! the application URL and its landmark texts, the wait and settle
//! timings, and the screenshot destination. Loading is layered with
//! figment, lowest to highest precedence: built-in defaults, an optional
//! TOML file, `WALKSHOT_*` environment variables, CLI flags. The merged
//! result is validated before a browser is ever launched.

use crate::cli::Cli;
use crate::error::ConfigError;
use figment::providers::{Env, Format as _, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkshot_browser::{Quiescence, WaitConfig};

/// Settle (DOM quiescence) tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Consecutive identical DOM samples required.
    pub stable_samples: u32,

    /// Milliseconds between samples.
    pub sample_interval_ms: u64,

    /// Hard cap on the settle wait, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            stable_samples: 5,
            sample_interval_ms: 200,
            timeout_ms: 5_000,
        }
    }
}

impl SettleConfig {
    /// The quiescence condition this tuning describes.
    pub fn quiescence(&self) -> Quiescence {
        Quiescence {
            stable_samples: self.stable_samples,
            sample_interval: Duration::from_millis(self.sample_interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Complete description of one walkthrough run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Root URL of the application under test.
    pub base_url: String,

    /// Path navigated to directly when the start button is absent.
    pub start_path: String,

    /// Text that marks the home page as loaded.
    pub app_landmark: String,

    /// Visible text of the call-to-action that begins the flow.
    pub start_button: String,

    /// Text that marks the topic listing as loaded.
    pub topic_landmark: String,

    /// Accessible label of the button that enters the game view.
    pub play_label: String,

    /// CSS selector that marks the game view as rendered.
    pub game_marker: String,

    /// Ceiling for each landmark wait, in milliseconds.
    pub landmark_timeout_ms: u64,

    /// Interval between wait polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// Settle tuning.
    pub settle: SettleConfig,

    /// Where the screenshot is written. Overwritten on each run.
    pub screenshot: PathBuf,

    /// Run Chrome without a visible window.
    pub headless: bool,

    /// Browser window size in pixels.
    pub window_size: (u32, u32),
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173/Recalla/".to_string(),
            start_path: "welcome".to_string(),
            app_landmark: "Recalla".to_string(),
            start_button: "Start Learning".to_string(),
            topic_landmark: "German Words".to_string(),
            play_label: "Play".to_string(),
            game_marker: ".grid".to_string(),
            landmark_timeout_ms: 10_000,
            poll_interval_ms: 100,
            settle: SettleConfig::default(),
            screenshot: PathBuf::from("verification/game_screenshot.png"),
            headless: true,
            window_size: (1280, 720),
        }
    }
}

impl WalkConfig {
    /// Loads configuration with layered precedence:
    /// defaults < file < environment < CLI flags.
    ///
    /// A `--config` path that does not exist is an error; the implicit
    /// `walkshot.toml` is only read when present.
    pub fn load(args: &Cli) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let config_file = args.config.clone().or_else(|| {
            let default_path = Path::new("walkshot.toml");
            default_path.exists().then(|| default_path.to_path_buf())
        });

        if let Some(path) = config_file {
            if args.config.is_some() && !path.exists() {
                return Err(ConfigError::NotFound(path));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("WALKSHOT_").split("__"));

        let mut config: Self = figment.extract().map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
            hint: "check walkshot.toml syntax and field types".to_string(),
        })?;

        // CLI flags win over every other layer.
        if let Some(url) = &args.base_url {
            config.base_url = url.clone();
        }
        if let Some(output) = &args.output {
            config.screenshot = output.clone();
        }
        if args.visible {
            config.headless = false;
        }

        config.validate()?;
        Ok(config)
    }

    /// Joins a path onto the base URL without doubling slashes.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Wait parameters shared by every landmark wait.
    pub fn landmark_wait(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.landmark_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.base_url.clone(),
            });
        }

        for (field, value) in [
            ("start_path", &self.start_path),
            ("app_landmark", &self.app_landmark),
            ("start_button", &self.start_button),
            ("topic_landmark", &self.topic_landmark),
            ("play_label", &self.play_label),
            ("game_marker", &self.game_marker),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField { field });
            }
        }

        if self.landmark_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "landmark_timeout_ms",
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "poll_interval_ms",
            });
        }

        if self.settle.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "settle.sample_interval_ms",
            });
        }
        if !self.settle.quiescence().is_satisfiable() {
            return Err(ConfigError::SettleUnsatisfiable {
                stable_samples: self.settle.stable_samples,
                sample_interval_ms: self.settle.sample_interval_ms,
                timeout_ms: self.settle.timeout_ms,
            });
        }

        if self.screenshot.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "screenshot",
            });
        }

        if self.window_size.0 == 0 || self.window_size.1 == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "window_size",
            });
        }

        Ok(())
    }
}
