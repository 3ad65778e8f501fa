use super::{ScraperConfig, ScraperError, ScraperResult};
use crate::browser::{Page, WaitFor};
use log::{debug, info};
use std::time::Duration;

/// Waits out the anti-bot interstitial before anything reads the page.
#[derive(Debug, Clone)]
pub struct ChallengeGate {
    selector: String,
    timeout: Duration,
}

impl ChallengeGate {
    pub fn new(selector: impl Into<String>, timeout: Duration) -> Self {
        Self {
            selector: selector.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.challenge_selector.clone(), config.challenge_timeout)
    }

    /// Returns once the challenge element is gone or hidden.
    pub async fn await_clearance(&self, page: &dyn Page) -> ScraperResult<()> {
        info!("...🚧 waiting for challenge to resolve");
        bounded_wait(page, &self.selector, WaitFor::Hidden, self.timeout).await?;
        debug!("Challenge {} cleared", self.selector);
        Ok(())
    }
}

pub(crate) async fn bounded_wait(
    page: &dyn Page,
    selector: &str,
    condition: WaitFor,
    timeout: Duration,
) -> ScraperResult<()> {
    match tokio::time::timeout(timeout, page.wait_for_selector(selector, condition)).await {
        Ok(result) => result,
        Err(_) => {
            let what = match condition {
                WaitFor::Visible => format!("`{selector}` to appear"),
                WaitFor::Hidden => format!("`{selector}` to disappear"),
            };
            Err(ScraperError::timeout(what, timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock_page::{MockCall, MockPageScript};
    use crate::browser::MockPage;

    #[tokio::test]
    async fn test_clears_when_challenge_hides() {
        let page = MockPage::new(MockPageScript::new());
        let gate = ChallengeGate::new(".cf-browser-verification", Duration::from_secs(1));

        gate.await_clearance(&page).await.unwrap();
        assert_eq!(
            page.calls(),
            vec![MockCall::Wait(
                ".cf-browser-verification".to_string(),
                WaitFor::Hidden
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_challenge_times_out() {
        let page = MockPage::new(
            MockPageScript::new().with_stuck_selector(".cf-browser-verification"),
        );
        let gate = ChallengeGate::new(".cf-browser-verification", Duration::from_secs(60));

        let err = gate.await_clearance(&page).await.unwrap_err();
        match err {
            ScraperError::Timeout { what, after } => {
                assert!(what.contains(".cf-browser-verification"));
                assert_eq!(after, Duration::from_secs(60));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
