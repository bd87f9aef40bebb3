//! Page-level operations: navigation, waits, interaction, capture.
//!
//! [`Page`] wraps a chromiumoxide tab and exposes the operations a
//! walkthrough is built from. Elements are located the way a user would
//! describe them: by visible text, or by role and accessible label.
//! Locator values are JSON-encoded before being spliced into the generated
//! scripts, so text like `'); alert(1); ('` stays data.

use crate::console::{parse_console_event, ConsoleCapture};
use crate::error::{BrowserError, Result};
use crate::wait::{wait_for_result, wait_for_stable, Quiescence, WaitConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// A browser tab.
#[derive(Debug)]
pub struct Page {
    inner: Arc<CdpPage>,
    console: ConsoleCapture,
    console_task: JoinHandle<()>,
}

impl Page {
    /// Wraps a chromiumoxide page and starts console capture.
    ///
    /// Called by [`crate::Browser::new_page`]; not constructed directly.
    pub(crate) fn new(page: CdpPage) -> Self {
        let console = ConsoleCapture::new();
        let console_clone = console.clone();
        let page_arc = Arc::new(page);

        let page_for_task = page_arc.clone();
        let console_task = tokio::spawn(async move {
            if let Ok(mut events) = page_for_task
                .event_listener::<EventConsoleApiCalled>()
                .await
            {
                while let Some(event) = events.next().await {
                    console_clone.push(parse_console_event(&event));
                }
            }
        });

        Self {
            inner: page_arc,
            console,
            console_task,
        }
    }

    /// Console messages captured so far on this page.
    pub fn console(&self) -> &ConsoleCapture {
        &self.console
    }

    /// Navigates to an absolute URL and waits for the document to be ready.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.wait_for_load(WaitConfig::default()).await
    }

    /// Waits until `document.readyState` reports "complete".
    ///
    /// `navigate()` calls this automatically; call it yourself only after
    /// triggering navigation from script.
    pub async fn wait_for_load(&self, wait: WaitConfig) -> Result<()> {
        wait_for_result(
            || {
                let page = self.inner.clone();
                async move {
                    let result = page
                        .evaluate("document.readyState")
                        .await
                        .map_err(|e| BrowserError::ScriptFailed(e.to_string()))?;

                    Ok(result
                        .value()
                        .and_then(|v| v.as_str())
                        .is_some_and(|s| s == "complete"))
                }
            },
            wait,
            "document ready",
        )
        .await
    }

    /// Runs JavaScript in the page and deserializes its result.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::ScriptFailed(e.to_string()))
    }

    /// Waits until a CSS selector matches something in the DOM.
    pub async fn wait_for_selector(&self, selector: &str, wait: WaitConfig) -> Result<()> {
        let script = selector_probe_script(selector)?;

        wait_for_result(
            || {
                let page = self.inner.clone();
                let script = script.clone();
                async move {
                    let result = page
                        .evaluate(script.as_str())
                        .await
                        .map_err(|e| BrowserError::ScriptFailed(e.to_string()))?;

                    Ok(result
                        .value()
                        .and_then(serde_json::Value::as_bool)
                        .unwrap_or(false))
                }
            },
            wait,
            &format!("selector '{selector}'"),
        )
        .await
    }

    /// Waits until an element whose visible text contains `text` exists.
    ///
    /// The landmark-text synchronization primitive: a view counts as loaded
    /// once its landmark text has rendered.
    pub async fn wait_for_text(&self, text: &str, wait: WaitConfig) -> Result<()> {
        let script = text_count_script(text)?;

        wait_for_result(
            || {
                let page = self.inner.clone();
                let script = script.clone();
                async move {
                    let result = page
                        .evaluate(script.as_str())
                        .await
                        .map_err(|e| BrowserError::ScriptFailed(e.to_string()))?;

                    Ok(result
                        .value()
                        .and_then(serde_json::Value::as_u64)
                        .unwrap_or(0)
                        > 0)
                }
            },
            wait,
            &format!("text '{text}'"),
        )
        .await
    }

    /// Counts elements whose visible text contains `text`.
    ///
    /// Only the innermost matching element of each subtree is counted, so a
    /// heading does not also count its section, body, and html ancestors.
    pub async fn count_by_text(&self, text: &str) -> Result<u64> {
        let script = text_count_script(text)?;
        self.evaluate(&script).await
    }

    /// Clicks the first element whose visible text contains `text`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::ElementNotFound`] when nothing matches.
    pub async fn click_by_text(&self, text: &str) -> Result<()> {
        let script = text_click_script(text)?;
        let clicked: bool = self.evaluate(&script).await?;

        if clicked {
            debug!(%text, "clicked element by text");
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                description: format!("text '{text}'"),
            })
        }
    }

    /// Clicks the first element matching a role and accessible label.
    ///
    /// Candidates are native elements of that name plus `[role=...]`
    /// annotations; the label matches `aria-label` or trimmed visible text.
    /// When several match, the first in document order is clicked.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::ElementNotFound`] when nothing matches.
    pub async fn click_by_role(&self, role: &str, label: &str) -> Result<()> {
        let script = role_click_script(role, label)?;
        let clicked: bool = self.evaluate(&script).await?;

        if clicked {
            debug!(%role, %label, "clicked element by role and label");
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                description: format!("role '{role}' with label '{label}'"),
            })
        }
    }

    /// Waits for the DOM to stop changing.
    ///
    /// Samples a cheap fingerprint (element count plus body scroll height)
    /// and returns once it has held steady for the configured run of
    /// samples. Bounded by the quiescence timeout, so a page that animates
    /// forever still terminates the wait.
    pub async fn settle(&self, quiescence: Quiescence) -> Result<()> {
        wait_for_stable(
            || {
                let page = self.inner.clone();
                async move {
                    let result = page
                        .evaluate(FINGERPRINT_JS)
                        .await
                        .map_err(|e| BrowserError::ScriptFailed(e.to_string()))?;

                    result
                        .into_value::<DomFingerprint>()
                        .map_err(|e| BrowserError::ScriptFailed(e.to_string()))
                }
            },
            quiescence,
            "DOM quiescence",
        )
        .await
    }

    /// Captures a full-page PNG and writes it to `path`.
    ///
    /// Parent directories are created as needed; an existing file is
    /// overwritten.
    pub async fn screenshot_to(&self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        let bytes = self
            .inner
            .screenshot(params)
            .await
            .map_err(|e| BrowserError::ScreenshotFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    BrowserError::ScreenshotFailed {
                        path: path.to_path_buf(),
                        reason: format!("creating '{}': {e}", parent.display()),
                    }
                })?;
            }
        }

        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| BrowserError::ScreenshotFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), bytes = bytes.len(), "screenshot written");
        Ok(())
    }

    /// Current page URL.
    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Current page title.
    pub async fn title(&self) -> Result<String> {
        self.evaluate("document.title").await
    }

    /// Closes the tab.
    ///
    /// The console listener holds a clone of the page handle; it is aborted
    /// first so the tab can usually be closed cleanly. If a clone is still
    /// alive the close is left to the browser's own shutdown.
    pub async fn close(self) -> Result<()> {
        self.console_task.abort();

        match Arc::try_unwrap(self.inner) {
            Ok(page) => {
                page.close().await.map_err(BrowserError::ChromiumOxide)?;
                Ok(())
            }
            Err(_still_shared) => {
                debug!("page handle still shared; deferring close to browser shutdown");
                Ok(())
            }
        }
    }
}

/// DOM snapshot used by [`Page::settle`]. Two identical fingerprints in a
/// row do not prove the page is idle, but a run of them is a good proxy
/// for "animations have finished".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
struct DomFingerprint {
    nodes: u64,
    height: i64,
}

const FINGERPRINT_JS: &str = "(() => ({ nodes: document.getElementsByTagName('*').length, \
     height: document.body ? document.body.scrollHeight : 0 }))()";

/// JSON-encodes a string for safe splicing into generated JavaScript.
fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| BrowserError::ScriptFailed(e.to_string()))
}

fn selector_probe_script(selector: &str) -> Result<String> {
    let escaped = js_string(selector)?;
    Ok(format!("!!document.querySelector({escaped})"))
}

/// Innermost-match filter: an element matches when its text contains the
/// needle and no child element does, i.e. the smallest element actually
/// showing the text. Keeps html/body/section ancestors out of the count.
fn text_count_script(text: &str) -> Result<String> {
    let needle = js_string(text)?;
    Ok(format!(
        "(() => {{ const needle = {needle}; \
         return Array.from(document.querySelectorAll('*')).filter((el) => \
         el.textContent.includes(needle) && \
         !Array.from(el.children).some((c) => c.textContent.includes(needle))).length; }})()"
    ))
}

fn text_click_script(text: &str) -> Result<String> {
    let needle = js_string(text)?;
    Ok(format!(
        "(() => {{ const needle = {needle}; \
         const matches = Array.from(document.querySelectorAll('*')).filter((el) => \
         el.textContent.includes(needle) && \
         !Array.from(el.children).some((c) => c.textContent.includes(needle))); \
         if (matches.length === 0) return false; \
         matches[0].click(); return true; }})()"
    ))
}

fn role_click_script(role: &str, label: &str) -> Result<String> {
    // The role is spliced into a CSS selector, so it must stay a plain
    // word; the label goes through JSON encoding like all other text.
    if role.is_empty() || !role.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(BrowserError::ScriptFailed(format!(
            "invalid role name '{role}'"
        )));
    }

    // querySelectorAll yields document order, so named[0] is the first
    // match in the document.
    let label = js_string(label)?;
    Ok(format!(
        "(() => {{ const label = {label}; \
         const candidates = Array.from(document.querySelectorAll('{role}, [role=\"{role}\"]')); \
         const named = candidates.filter((el) => \
         (el.getAttribute('aria-label') || el.textContent).trim() === label); \
         if (named.length === 0) return false; \
         named[0].click(); return true; }})()"
    ))
}
