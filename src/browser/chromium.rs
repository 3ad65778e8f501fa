//! Chrome DevTools backend.
//!
//! Each launched session gets its own Chrome process and a throwaway
//! `--user-data-dir`, so sessions running in parallel never share profile
//! state. The CDP handler stream is driven on a tokio task for the lifetime
//! of the session.

use super::{Driver, Page, Session, WaitFor};
use crate::core::{Mode, ScraperError, ScraperResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page as ChromePage;
use futures::StreamExt;
use log::{debug, info, trace, warn};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    args: Vec<String>,
    chrome_path: Option<String>,
}

impl Default for ChromiumDriver {
    fn default() -> Self {
        Self {
            args: vec!["--start-maximized".to_string()],
            chrome_path: None,
        }
    }
}

impl ChromiumDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chrome_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    fn browser_config(&self, mode: Mode) -> ScraperResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder();

        if !mode.is_headless() {
            builder = builder.with_head();
        }

        let user_data_dir =
            std::env::temp_dir().join(format!("opensea-scraper-{}", Uuid::new_v4()));
        builder = builder.user_data_dir(user_data_dir);

        for arg in &self.args {
            builder = builder.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path.clone());
        }

        builder
            .build()
            .map_err(|e| ScraperError::Browser(format!("invalid browser configuration: {e}")))
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn launch(&self, mode: Mode) -> ScraperResult<Box<dyn Session>> {
        info!("Launching Chrome ({} mode)", mode);
        let config = self.browser_config(mode)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::Browser(format!("failed to launch Chrome: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::Browser(e.to_string()))?;
        debug!("Chrome session ready");

        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(browser),
            page: ChromiumPage { inner: page },
            handler_task,
        }))
    }

    fn box_clone(&self) -> Box<dyn Driver> {
        Box::new(self.clone())
    }
}

pub struct ChromiumSession {
    browser: Mutex<Browser>,
    page: ChromiumPage,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl Session for ChromiumSession {
    fn page(&self) -> &dyn Page {
        &self.page
    }

    async fn close(self: Box<Self>) -> ScraperResult<()> {
        let ChromiumSession {
            browser,
            page,
            handler_task,
        } = *self;
        drop(page);

        let mut browser = browser.into_inner();
        let closed = browser
            .close()
            .await
            .map_err(|e| ScraperError::Browser(format!("failed to close Chrome: {e}")));
        if let Err(e) = browser.wait().await {
            debug!("Chrome process wait failed: {}", e);
        }
        handler_task.abort();
        closed.map(|_| ())
    }

    fn detach(self: Box<Self>) {
        let ChromiumSession {
            browser,
            page,
            handler_task,
        } = *self;
        drop(page);
        drop(handler_task);
        // Dropping the browser would kill the process.
        std::mem::forget(browser);
    }
}

#[derive(Clone)]
pub struct ChromiumPage {
    inner: ChromePage,
}

/// Expression that is `true` while `selector` matches a rendered element.
fn visibility_probe(selector: &str) -> ScraperResult<String> {
    let quoted = serde_json::to_string(selector)?;
    Ok(format!(
        r#"(() => {{
  const el = document.querySelector({quoted});
  if (!el) return false;
  const style = window.getComputedStyle(el);
  const rect = el.getBoundingClientRect();
  return style.display !== "none" && style.visibility !== "hidden" && (rect.width > 0 || rect.height > 0);
}})()"#
    ))
}

#[async_trait]
impl Page for ChromiumPage {
    async fn navigate(&self, url: &Url) -> ScraperResult<()> {
        debug!("Navigating to {}", url);
        self.inner
            .goto(url.as_str())
            .await
            .map_err(|e| ScraperError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, condition: WaitFor) -> ScraperResult<()> {
        let probe = visibility_probe(selector)?;
        loop {
            // Challenge pages reload the document, which makes a probe fail mid-flight.
            match self.evaluate(&probe).await {
                Ok(value) => {
                    let visible = value.as_bool().unwrap_or(false);
                    match (condition, visible) {
                        (WaitFor::Visible, true) | (WaitFor::Hidden, false) => return Ok(()),
                        _ => {}
                    }
                }
                Err(e) => trace!("Probe for {} failed: {}", selector, e),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn evaluate(&self, expression: &str) -> ScraperResult<Value> {
        let result = self
            .inner
            .evaluate(expression)
            .await
            .map_err(|e| ScraperError::Script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn click(&self, selector: &str) -> ScraperResult<()> {
        let element = self
            .inner
            .find_element(selector)
            .await
            .map_err(|_| ScraperError::NotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| ScraperError::Browser(format!("click on {selector} failed: {e}")))?;
        Ok(())
    }

    async fn install_script(&self, source: &str) -> ScraperResult<()> {
        self.evaluate(source).await.map(|_| ())
    }

    async fn content(&self) -> ScraperResult<String> {
        self.inner
            .content()
            .await
            .map_err(|e| ScraperError::Browser(e.to_string()))
    }

    async fn scroll_by(&self, dy: f64) -> ScraperResult<()> {
        self.evaluate(&format!("window.scrollBy(0, {dy})"))
            .await
            .map(|_| ())
    }

    async fn scroll_offset(&self) -> ScraperResult<f64> {
        self.evaluate("document.documentElement.scrollTop")
            .await?
            .as_f64()
            .ok_or_else(|| ScraperError::Script("scrollTop is not a number".to_string()))
    }
}
