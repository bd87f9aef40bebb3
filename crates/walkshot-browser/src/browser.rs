//! Browser process lifecycle.
//!
//! [`Browser`] owns the Chrome child process for the duration of a run.
//! `close()` shuts it down gracefully; if `close()` is never reached (a
//! panic, an early return), dropping the handle still kills the process
//! through chromiumoxide's own Drop, so no run leaks a browser.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Options for launching Chrome.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window (default: true).
    pub headless: bool,

    /// Window size in pixels (default: 1280x720).
    pub window_size: (u32, u32),

    /// Extra Chrome arguments appended after the defaults.
    pub args: Vec<String>,

    /// Explicit Chrome executable path (None = auto-detect).
    pub chrome_path: Option<String>,
}

impl LaunchOptions {
    /// Defaults suitable for headless runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the browser window. Handy for watching a walkthrough live.
    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets a custom window size.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    fn to_cdp_config(&self) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();

        if self.headless {
            config = config.arg("--headless");
        }

        config = config.arg(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));

        // A unique profile dir keeps concurrent launches from fighting over
        // Chrome's ProcessSingleton lock.
        let user_data_dir = std::env::temp_dir().join(format!("walkshot-{}", uuid::Uuid::new_v4()));
        config = config.arg(format!("--user-data-dir={}", user_data_dir.display()));

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid launch options: {e}"),
            source: None,
        })
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            // --no-sandbox and --disable-dev-shm-usage keep Chrome usable in
            // containers, where user namespaces and /dev/shm are restricted.
            window_size: (1280, 720),
            args: vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

/// A running Chrome instance.
///
/// The only shared resource in a walkthrough: exclusively owned by the
/// runner for the run's lifetime, never reused across invocations.
pub struct Browser {
    inner: Arc<Mutex<Option<CdpBrowser>>>,
}

impl Browser {
    /// Launches Chrome and starts driving its CDP event loop.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::LaunchFailed`] if Chrome is missing, not
    /// executable, or exits during startup.
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        debug!(?options, "launching browser");

        let config = options.to_cdp_config()?;

        let (browser, mut handler) =
            CdpBrowser::launch(config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to start Chrome".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide requires something to pump the handler stream,
        // otherwise no CDP traffic moves.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {e}");
                }
            }
        });

        debug!("browser launched");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
        })
    }

    /// Opens a fresh tab.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::AlreadyClosed`] after `close()`.
    pub async fn new_page(&self) -> Result<Page> {
        let guard = self.inner.lock().await;

        let browser = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Page::new(page))
    }

    /// Shuts the browser down gracefully.
    ///
    /// Prefer this over relying on Drop: Drop cannot await and falls back
    /// to killing the process.
    pub async fn close(self) -> Result<()> {
        let mut guard = self.inner.lock().await;

        if let Some(mut browser) = guard.take() {
            debug!("closing browser");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// True once `close()` has run.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        // Drop cannot await. If the browser was never closed, dropping the
        // inner chromiumoxide Browser kills the child process, so the run
        // still releases Chrome on panic or early-return paths.
        if let Ok(guard) = self.inner.try_lock() {
            if guard.is_some() {
                warn!("browser dropped without close(); killing the Chrome process");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_build_a_config() {
        assert!(LaunchOptions::default().to_cdp_config().is_ok());
    }

    #[test]
    fn visible_disables_headless() {
        let options = LaunchOptions::new().visible();
        assert!(!options.headless);
        assert!(options.to_cdp_config().is_ok());
    }

    #[test]
    fn window_size_is_applied() {
        let options = LaunchOptions::new().with_window_size(800, 600);
        assert_eq!(options.window_size, (800, 600));
    }

    #[tokio::test]
    #[ignore] // Requires Chrome to be installed
    async fn launch_and_close() {
        let browser = Browser::launch(LaunchOptions::default())
            .await
            .expect("failed to launch browser");

        assert!(!browser.is_closed().await);

        browser.close().await.expect("failed to close browser");
    }

    #[tokio::test]
    #[ignore]
    async fn create_page_and_navigate() {
        let browser = Browser::launch(LaunchOptions::default())
            .await
            .expect("failed to launch");

        let page = browser.new_page().await.expect("failed to create page");

        page.navigate("about:blank")
            .await
            .expect("failed to navigate");

        browser.close().await.expect("failed to close");
    }
}
