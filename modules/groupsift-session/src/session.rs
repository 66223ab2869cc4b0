use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{Result, SessionError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A live Chrome session. Owns the browser process, the CDP event pump, and
/// a single page; the page is the capability every scrape operation works
/// through, and it is only valid while this struct is alive.
pub struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl Session {
    /// Launch Chrome and open a blank page. The session mimics a regular
    /// desktop browser (fixed viewport, pl-PL locale UA) — the target site
    /// serves automation-flagged sessions a different, unusable markup.
    pub async fn launch(headless: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(1280, 800)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-sandbox")
            .arg("--lang=pl-PL")
            .arg(format!("--user-agent={USER_AGENT}"));
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(SessionError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Browser(format!("Browser launch failed: {e}")))?;

        // Drain CDP events for the life of the browser.
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser.new_page("about:blank").await?;
        info!(headless, "Chrome session launched");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate the session's page, tolerating slow loads. Returns an error
    /// only when the navigation itself is rejected; an unready page is the
    /// caller's problem to wait out.
    pub async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(SessionError::Browser(format!("Navigation to {url} failed: {e}"))),
            Err(_) => Err(SessionError::Browser(format!(
                "Navigation to {url} timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }

    /// Close the browser and stop the event pump.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Browser close error");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Browser wait error");
        }
        self.handler_task.abort();
    }
}
