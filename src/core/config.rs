use super::{ScraperError, ScraperResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://opensea.io";
const COLLECTION_QUERY: &str =
    "search[sortAscending]=true&search[sortBy]=PRICE&search[toggles][0]=BUY_NOW";
const RANKINGS_QUERY: &str = "sortBy=total_volume";

/// How a browser session is run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// No visible window; the session is closed when the operation ends.
    #[default]
    Headless,
    /// Visible window; the session is left open for inspection.
    Debug,
}

impl Mode {
    pub fn is_headless(self) -> bool {
        matches!(self, Mode::Headless)
    }

    pub fn auto_teardown(self) -> bool {
        matches!(self, Mode::Headless)
    }
}

impl FromStr for Mode {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headless" => Ok(Mode::Headless),
            "debug" => Ok(Mode::Debug),
            other => Err(ScraperError::InvalidArgument(format!(
                "unknown mode `{other}`, expected `headless` or `debug`"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Headless => f.write_str("headless"),
            Mode::Debug => f.write_str("debug"),
        }
    }
}

/// Bounds and pacing of the scroll-and-collect loop.
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// Pixels scrolled per tick.
    pub step: f64,
    pub tick_interval: Duration,
    pub max_ticks: usize,
    pub max_duration: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step: 50.0,
            tick_interval: Duration::from_millis(5),
            max_ticks: 20_000,
            max_duration: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub challenge_selector: String,
    pub challenge_timeout: Duration,
    pub next_page_selector: String,
    pub item_image_selector: String,
    pub selector_timeout: Duration,
    pub scroll: ScrollConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            challenge_selector: ".cf-browser-verification".to_string(),
            challenge_timeout: Duration::from_secs(60),
            next_page_selector: "[value=arrow_forward_ios]".to_string(),
            item_image_selector: ".Image--image".to_string(),
            selector_timeout: Duration::from_secs(30),
            scroll: ScrollConfig::default(),
        }
    }
}

impl ScraperConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_challenge_timeout(mut self, timeout: Duration) -> Self {
        self.challenge_timeout = timeout;
        self
    }

    pub fn with_selector_timeout(mut self, timeout: Duration) -> Self {
        self.selector_timeout = timeout;
        self
    }

    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    /// Listing page of a collection sorted by ascending "buy now" price.
    pub fn collection_url(&self, slug: &str) -> ScraperResult<Url> {
        validate_slug(slug)?;
        let url = format!("{}/collection/{}?{}", self.base(), slug, COLLECTION_QUERY);
        Ok(Url::parse(&url)?)
    }

    /// Rankings table sorted by total volume.
    pub fn rankings_url(&self) -> ScraperResult<Url> {
        let url = format!("{}/rankings?{}", self.base(), RANKINGS_QUERY);
        Ok(Url::parse(&url)?)
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn validate_slug(slug: &str) -> ScraperResult<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ScraperError::InvalidArgument(format!(
            "invalid collection slug `{slug}`"
        )))
    }
}
