//! Scripted in-memory browser for tests.
//!
//! A `MockPage` replays virtual pages made of scroll frames. Every
//! `scroll_by` advances to the next frame of the current virtual page and
//! sticks on the last one, so the scroll offset stops changing once the
//! frames run out. `click` moves to the next virtual page or fails with
//! `NotFound` when there is none.

use super::{Driver, Page, Session, WaitFor};
use crate::core::{Mode, ScraperError, ScraperResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Page state after one scroll tick.
#[derive(Debug, Clone)]
pub struct MockFrame {
    pub offset: f64,
    /// Returned by any expression without a canned response.
    pub items: Value,
}

impl MockFrame {
    pub fn new(offset: f64, items: Value) -> Self {
        Self { offset, items }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPageScript {
    pub html: String,
    pub responses: HashMap<String, Value>,
    pub pages: Vec<Vec<MockFrame>>,
    /// Selectors whose wait never resolves.
    pub stuck_selectors: HashSet<String>,
}

impl MockPageScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    pub fn with_response(mut self, expression: impl Into<String>, value: Value) -> Self {
        self.responses.insert(expression.into(), value);
        self
    }

    pub fn with_page(mut self, frames: Vec<MockFrame>) -> Self {
        self.pages.push(frames);
        self
    }

    pub fn with_stuck_selector(mut self, selector: impl Into<String>) -> Self {
        self.stuck_selectors.insert(selector.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Navigate(String),
    Wait(String, WaitFor),
    Evaluate(String),
    Click(String),
    InstallScript,
    Content,
    ScrollBy(f64),
    ScrollOffset,
}

#[derive(Debug, Default)]
struct Cursor {
    page: usize,
    frame: Option<usize>,
}

#[derive(Debug)]
pub struct MockPage {
    script: MockPageScript,
    cursor: Mutex<Cursor>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockPage {
    pub fn new(script: MockPageScript) -> Self {
        Self {
            script,
            cursor: Mutex::new(Cursor::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn current_page(&self) -> usize {
        self.cursor.lock().page
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }

    fn current_frame(&self) -> Option<MockFrame> {
        let cursor = self.cursor.lock();
        let frames = self.script.pages.get(cursor.page)?;
        frames.get(cursor.frame.unwrap_or(0)).cloned()
    }
}

#[async_trait]
impl Page for MockPage {
    async fn navigate(&self, url: &Url) -> ScraperResult<()> {
        self.record(MockCall::Navigate(url.to_string()));
        *self.cursor.lock() = Cursor::default();
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, condition: WaitFor) -> ScraperResult<()> {
        self.record(MockCall::Wait(selector.to_string(), condition));
        if self.script.stuck_selectors.contains(selector) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> ScraperResult<Value> {
        self.record(MockCall::Evaluate(expression.to_string()));
        if let Some(value) = self.script.responses.get(expression) {
            return Ok(value.clone());
        }
        Ok(self
            .current_frame()
            .map(|frame| frame.items)
            .unwrap_or(Value::Null))
    }

    async fn click(&self, selector: &str) -> ScraperResult<()> {
        self.record(MockCall::Click(selector.to_string()));
        let mut cursor = self.cursor.lock();
        if cursor.page + 1 >= self.script.pages.len() {
            return Err(ScraperError::NotFound(selector.to_string()));
        }
        cursor.page += 1;
        cursor.frame = None;
        Ok(())
    }

    async fn install_script(&self, _source: &str) -> ScraperResult<()> {
        self.record(MockCall::InstallScript);
        Ok(())
    }

    async fn content(&self) -> ScraperResult<String> {
        self.record(MockCall::Content);
        Ok(self.script.html.clone())
    }

    async fn scroll_by(&self, dy: f64) -> ScraperResult<()> {
        self.record(MockCall::ScrollBy(dy));
        let mut cursor = self.cursor.lock();
        let last = self
            .script
            .pages
            .get(cursor.page)
            .map(|frames| frames.len().saturating_sub(1))
            .unwrap_or(0);
        cursor.frame = Some(match cursor.frame {
            None => 0,
            Some(frame) => (frame + 1).min(last),
        });
        Ok(())
    }

    async fn scroll_offset(&self) -> ScraperResult<f64> {
        self.record(MockCall::ScrollOffset);
        Ok(self.current_frame().map(|frame| frame.offset).unwrap_or(0.0))
    }
}

struct MockSession {
    page: Arc<MockPage>,
    closed: Arc<AtomicUsize>,
    detached: Arc<AtomicUsize>,
}

#[async_trait]
impl Session for MockSession {
    fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    async fn close(self: Box<Self>) -> ScraperResult<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn detach(self: Box<Self>) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }
}

/// Launches a fresh `MockPage` per session and keeps every one for inspection.
#[derive(Clone)]
pub struct MockDriver {
    script: Arc<MockPageScript>,
    pages: Arc<Mutex<Vec<Arc<MockPage>>>>,
    modes: Arc<Mutex<Vec<Mode>>>,
    closed: Arc<AtomicUsize>,
    detached: Arc<AtomicUsize>,
}

impl MockDriver {
    pub fn new(script: MockPageScript) -> Self {
        Self {
            script: Arc::new(script),
            pages: Arc::new(Mutex::new(Vec::new())),
            modes: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
            detached: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn pages(&self) -> Vec<Arc<MockPage>> {
        self.pages.lock().clone()
    }

    pub fn launched_modes(&self) -> Vec<Mode> {
        self.modes.lock().clone()
    }

    pub fn closed_sessions(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn detached_sessions(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn launch(&self, mode: Mode) -> ScraperResult<Box<dyn Session>> {
        let page = Arc::new(MockPage::new((*self.script).clone()));
        self.pages.lock().push(Arc::clone(&page));
        self.modes.lock().push(mode);
        Ok(Box::new(MockSession {
            page,
            closed: Arc::clone(&self.closed),
            detached: Arc::clone(&self.detached),
        }))
    }

    fn box_clone(&self) -> Box<dyn Driver> {
        Box::new(self.clone())
    }
}
