//! Integration tests for walkshot-browser.
//!
//! These tests require Chrome/Chromium to be installed and are marked
//! #[ignore] by default. Run with: cargo test -p walkshot-browser -- --ignored
//!
//! Pages are served as data: URLs, so no application server is needed. The
//! fixture mimics the flow the runner drives: a home view with a landmark
//! and a start button, a topic listing, and a grid-based game view.

use std::time::Duration;
use walkshot_browser::{Browser, LaunchOptions, Quiescence, WaitConfig};

/// Home page with the full flow wired up behind click handlers.
fn walkthrough_page() -> String {
    r##"
    <!DOCTYPE html>
    <html>
    <head><title>Recalla</title></head>
    <body>
        <h1>Recalla</h1>
        <button id="start">Start Learning</button>

        <section id="topics" hidden>
            <h2>German Words</h2>
            <div class="topic-card">
                <button id="play-first">Play</button>
            </div>
            <div class="topic-card">
                <button id="play-second">Play</button>
            </div>
        </section>

        <div id="game" class="grid" hidden></div>

        <script>
            document.getElementById('start').addEventListener('click', () => {
                document.getElementById('topics').hidden = false;
            });
            document.getElementById('play-first').addEventListener('click', () => {
                window.__clicked = 'first';
                document.getElementById('game').hidden = false;
            });
            document.getElementById('play-second').addEventListener('click', () => {
                window.__clicked = 'second';
            });
        </script>
    </body>
    </html>
    "##
    .to_string()
}

/// Home page with no call-to-action, for the fallback branch.
fn page_without_start_button() -> String {
    r#"
    <!DOCTYPE html>
    <html>
    <head><title>Recalla</title></head>
    <body><h1>Recalla</h1></body>
    </html>
    "#
    .to_string()
}

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

fn short_wait() -> WaitConfig {
    WaitConfig::new(Duration::from_millis(500), Duration::from_millis(50))
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn wait_for_text_finds_landmark() {
    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(&walkthrough_page()))
        .await
        .expect("failed to navigate");

    page.wait_for_text("Recalla", WaitConfig::default())
        .await
        .expect("landmark text should appear");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn wait_for_text_times_out_when_absent() {
    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(&walkthrough_page()))
        .await
        .expect("failed to navigate");

    let result = page.wait_for_text("No Such Landmark", short_wait()).await;

    assert!(
        matches!(
            result,
            Err(walkshot_browser::BrowserError::WaitTimeout { .. })
        ),
        "waiting for absent text should time out"
    );

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn click_by_text_advances_the_flow() {
    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(&walkthrough_page()))
        .await
        .expect("failed to navigate");

    let count = page
        .count_by_text("Start Learning")
        .await
        .expect("failed to count");
    assert!(count > 0, "start button should be present");

    page.click_by_text("Start Learning")
        .await
        .expect("failed to click start");

    page.wait_for_text("German Words", WaitConfig::default())
        .await
        .expect("topic listing should appear after clicking start");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn count_by_text_is_zero_when_button_is_absent() {
    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(&page_without_start_button()))
        .await
        .expect("failed to navigate");

    let count = page
        .count_by_text("Start Learning")
        .await
        .expect("failed to count");
    assert_eq!(count, 0, "absent button should count zero");

    // The fallback branch hinges on this: zero matches is not an error.
    let result = page.click_by_text("Start Learning").await;
    assert!(matches!(
        result,
        Err(walkshot_browser::BrowserError::ElementNotFound { .. })
    ));

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn click_by_role_prefers_first_match_in_document_order() {
    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(&walkthrough_page()))
        .await
        .expect("failed to navigate");

    page.click_by_text("Start Learning")
        .await
        .expect("failed to click start");

    page.click_by_role("button", "Play")
        .await
        .expect("failed to click play");

    let clicked: String = page
        .evaluate("window.__clicked || ''")
        .await
        .expect("failed to read click marker");
    assert_eq!(clicked, "first", "the first Play button must win");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn wait_for_selector_sees_the_grid_after_play() {
    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(&walkthrough_page()))
        .await
        .expect("failed to navigate");

    page.click_by_text("Start Learning")
        .await
        .expect("failed to click start");
    page.click_by_role("button", "Play")
        .await
        .expect("failed to click play");

    page.wait_for_selector(".grid:not([hidden])", WaitConfig::default())
        .await
        .expect("grid should be revealed");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn settle_returns_once_mutations_stop() {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <body>
        <div id="list"></div>
        <script>
            let added = 0;
            const timer = setInterval(() => {
                const el = document.createElement('p');
                el.textContent = 'row ' + added;
                document.getElementById('list').appendChild(el);
                if (++added >= 8) clearInterval(timer);
            }, 50);
        </script>
    </body>
    </html>
    "#;

    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(html)).await.expect("failed to navigate");

    let quiescence = Quiescence {
        stable_samples: 3,
        sample_interval: Duration::from_millis(100),
        timeout: Duration::from_secs(5),
    };
    page.settle(quiescence).await.expect("page should settle");

    // All eight rows must exist once the fingerprint is stable.
    let rows: u64 = page
        .evaluate("document.querySelectorAll('#list p').length")
        .await
        .expect("failed to count rows");
    assert_eq!(rows, 8);

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn settle_times_out_on_a_page_that_never_stops() {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <body>
        <div id="list"></div>
        <script>
            setInterval(() => {
                document.getElementById('list').appendChild(document.createElement('p'));
            }, 30);
        </script>
    </body>
    </html>
    "#;

    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(html)).await.expect("failed to navigate");

    let quiescence = Quiescence {
        stable_samples: 5,
        sample_interval: Duration::from_millis(100),
        timeout: Duration::from_millis(600),
    };
    let result = page.settle(quiescence).await;

    assert!(matches!(
        result,
        Err(walkshot_browser::BrowserError::WaitTimeout { .. })
    ));

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn screenshot_writes_png_and_overwrites() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("verification").join("shot.png");

    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(&walkthrough_page()))
        .await
        .expect("failed to navigate");

    // Parent dir does not exist yet; screenshot_to must create it.
    page.screenshot_to(&path).await.expect("first capture");

    let first = std::fs::read(&path).expect("screenshot should exist");
    assert!(!first.is_empty());
    assert_eq!(&first[0..4], &[0x89, 0x50, 0x4E, 0x47], "PNG magic bytes");

    // A second run replaces the file instead of adding a sibling.
    page.screenshot_to(&path).await.expect("second capture");

    let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .expect("failed to list dir")
        .collect();
    assert_eq!(entries.len(), 1, "re-capturing must overwrite, not append");

    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn console_errors_are_captured_for_diagnostics() {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <body>
        <h1>Recalla</h1>
        <script>
            console.log("booting");
            console.error("backend unreachable");
        </script>
    </body>
    </html>
    "#;

    let browser = Browser::launch(LaunchOptions::default())
        .await
        .expect("failed to launch");
    let page = browser.new_page().await.expect("failed to create page");

    page.navigate(&data_url(html)).await.expect("failed to navigate");

    tokio::time::sleep(Duration::from_millis(500)).await;

    let console = page.console();
    assert!(console.has_errors(), "the page error should be captured");
    assert!(console
        .errors()
        .iter()
        .any(|m| m.text.contains("backend unreachable")));

    browser.close().await.expect("failed to close");
}
