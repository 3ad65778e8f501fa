use crate::core::{Mode, ScraperResult};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitFor {
    Visible,
    /// Absent from the DOM or not rendered.
    Hidden,
}

/// A rendered browser tab.
///
/// `wait_for_selector` polls until its condition holds and has no deadline of
/// its own; callers wrap it in a timeout.
#[async_trait]
pub trait Page: Send + Sync {
    async fn navigate(&self, url: &Url) -> ScraperResult<()>;
    async fn wait_for_selector(&self, selector: &str, condition: WaitFor) -> ScraperResult<()>;
    async fn evaluate(&self, expression: &str) -> ScraperResult<Value>;
    /// Fails with `NotFound` when no element matches.
    async fn click(&self, selector: &str) -> ScraperResult<()>;
    async fn install_script(&self, source: &str) -> ScraperResult<()>;
    async fn content(&self) -> ScraperResult<String>;
    async fn scroll_by(&self, dy: f64) -> ScraperResult<()>;
    async fn scroll_offset(&self) -> ScraperResult<f64>;
}

/// One browser owned exclusively by one operation.
#[async_trait]
pub trait Session: Send + Sync {
    fn page(&self) -> &dyn Page;
    async fn close(self: Box<Self>) -> ScraperResult<()>;
    /// Gives up ownership without tearing the browser down.
    fn detach(self: Box<Self>);
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn launch(&self, mode: Mode) -> ScraperResult<Box<dyn Session>>;
    fn box_clone(&self) -> Box<dyn Driver>;
}
