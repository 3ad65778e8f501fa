use super::{Mode, ScraperResult};
use crate::browser::{Driver, Page, Session};
use log::{debug, info, warn};

/// A launched session that is released exactly once, through `release`.
///
/// Headless sessions are closed whatever the operation's outcome; debug
/// sessions are detached so the window stays open for inspection. A guard
/// dropped before `release` (a cancelled operation) still detaches in debug
/// mode; headless browsers are then killed by the backend's own drop.
pub struct SessionGuard {
    session: Option<Box<dyn Session>>,
    mode: Mode,
}

impl SessionGuard {
    pub async fn acquire(driver: &dyn Driver, mode: Mode) -> ScraperResult<Self> {
        let session = driver.launch(mode).await?;
        Ok(Self {
            session: Some(session),
            mode,
        })
    }

    pub fn page(&self) -> &dyn Page {
        match &self.session {
            Some(session) => session.page(),
            None => unreachable!("session is only taken by release"),
        }
    }

    pub async fn release<T>(mut self, result: ScraperResult<T>) -> ScraperResult<T> {
        let Some(session) = self.session.take() else {
            return result;
        };
        if self.mode.auto_teardown() {
            match session.close().await {
                Ok(()) => debug!("Browser session closed"),
                Err(e) => warn!("Failed to close browser session: {}", e),
            }
        } else {
            info!("Debug mode: leaving browser session open");
            session.detach();
        }
        result
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if self.mode.auto_teardown() {
            // No async close from Drop; the backend kills the browser on drop.
            warn!("Browser session dropped without release, forcing shutdown");
            drop(session);
        } else {
            warn!("Debug operation cancelled, leaving browser session open");
            session.detach();
        }
    }
}
