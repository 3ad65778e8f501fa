use super::collector::PaginatedCollector;
use super::session::SessionGuard;
use super::{ChallengeGate, Clock, Mode, ScraperConfig, ScraperError, ScraperResult, TokioClock};
use crate::browser::{Driver, Page};
use crate::items::{Currency, ListingItem, OfferSet, PriceRecord};
use crate::parser::{
    CardPriceParser, OffersRoutine, RankingsRoutine, StateScan, WIRED_RECORDS_EXPRESSION,
};
use crate::stats::StatsTracker;
use log::{debug, info};
use std::sync::Arc;
use url::Url;

/// Entry point for every scraping operation.
///
/// Each call launches its own browser session through the driver and
/// releases it before returning, so clones of one scraper can run
/// operations concurrently without sharing page state.
pub struct OpenseaScraper {
    driver: Box<dyn Driver>,
    config: ScraperConfig,
    clock: Arc<dyn Clock>,
    stats: Arc<StatsTracker>,
}

impl Clone for OpenseaScraper {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.box_clone(),
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl OpenseaScraper {
    pub fn new(driver: Box<dyn Driver>) -> Self {
        info!("Initializing scraper");
        Self {
            driver,
            config: ScraperConfig::default(),
            clock: Arc::new(TokioClock),
            stats: Arc::new(StatsTracker::new()),
        }
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Lowest "buy now" ETH price shown on the collection's listing cards.
    pub async fn floor_price(&self, slug: &str, mode: Mode) -> ScraperResult<Option<PriceRecord>> {
        let url = self.config.collection_url(slug)?;
        self.floor_price_by_url(&url, mode).await
    }

    /// Like [`floor_price`](Self::floor_price) for a caller-built listing URL.
    pub async fn floor_price_by_url(
        &self,
        url: &Url,
        mode: Mode,
    ) -> ScraperResult<Option<PriceRecord>> {
        info!("=== floor_price({}) ===", url);
        let session = SessionGuard::acquire(self.driver.as_ref(), mode).await?;
        let result = self.scan_cards(session.page(), url).await;
        self.finish_operation(session, result).await
    }

    /// Up to 32 listed ETH prices read from the page's embedded state.
    pub async fn floor_prices(
        &self,
        slug: &str,
        mode: Mode,
    ) -> ScraperResult<Option<Vec<PriceRecord>>> {
        let url = self.config.collection_url(slug)?;
        info!("=== floor_prices({}) ===", slug);
        let session = SessionGuard::acquire(self.driver.as_ref(), mode).await?;
        let result = self.scan_state(session.page(), &url).await;
        self.finish_operation(session, result).await
    }

    /// Collections from the rankings table, `n_pages` pages of ~100 each, ordered by rank.
    pub async fn rankings(&self, n_pages: usize, mode: Mode) -> ScraperResult<Vec<ListingItem>> {
        if n_pages == 0 {
            return Err(ScraperError::InvalidArgument(
                "at least one page must be requested".to_string(),
            ));
        }
        let url = self.config.rankings_url()?;
        info!(
            "=== rankings() ===\n...fetching {} pages (= top {} collections)",
            n_pages,
            n_pages.saturating_mul(100)
        );

        let session = SessionGuard::acquire(self.driver.as_ref(), mode).await?;
        let collector = PaginatedCollector::new(
            &self.config,
            RankingsRoutine::new(),
            self.clock.as_ref(),
            &self.stats,
        );
        let result = collector.collect(session.page(), &url, n_pages).await;
        self.finish_operation(session, result).await
    }

    /// The cheapest `result_size` offers of a collection.
    pub async fn offers(&self, slug: &str, result_size: usize, mode: Mode) -> ScraperResult<OfferSet> {
        let url = self.config.collection_url(slug)?;
        self.offers_by_url(&url, result_size, mode).await
    }

    pub async fn offers_by_url(
        &self,
        url: &Url,
        result_size: usize,
        mode: Mode,
    ) -> ScraperResult<OfferSet> {
        if result_size == 0 {
            return Err(ScraperError::InvalidArgument(
                "result size must be at least 1".to_string(),
            ));
        }
        info!("=== offers({}, {}) ===", url, result_size);

        let session = SessionGuard::acquire(self.driver.as_ref(), mode).await?;
        let collector = PaginatedCollector::new(
            &self.config,
            OffersRoutine::new(result_size),
            self.clock.as_ref(),
            &self.stats,
        );
        let result = collector.collect(session.page(), url, 1).await.map(|offers| {
            let total = offers.len();
            OfferSet {
                offers: offers.into_iter().take(result_size).collect(),
                total,
            }
        });
        self.finish_operation(session, result).await
    }

    async fn scan_cards(&self, page: &dyn Page, url: &Url) -> ScraperResult<Option<PriceRecord>> {
        self.open(page, url).await?;
        let html = page.content().await?;

        let parser = CardPriceParser::new(Currency::Eth)?;
        let scan = parser.scan(&html);
        self.stats.record_cards_skipped(scan.skipped());

        let floor = scan.floor(parser.currency());
        match &floor {
            Some(price) => info!("Floor price: {}", price),
            None => info!("No {} floor price listed", parser.currency()),
        }
        Ok(floor)
    }

    async fn scan_state(
        &self,
        page: &dyn Page,
        url: &Url,
    ) -> ScraperResult<Option<Vec<PriceRecord>>> {
        self.open(page, url).await?;
        let store = page.evaluate(WIRED_RECORDS_EXPRESSION).await?;
        let prices = StateScan::new(Currency::Eth).price_distribution(&store);
        debug!(
            "Embedded state yielded {} prices",
            prices.as_ref().map_or(0, Vec::len)
        );
        Ok(prices)
    }

    async fn open(&self, page: &dyn Page, url: &Url) -> ScraperResult<()> {
        info!("...opening url: {}", url);
        page.navigate(url).await?;
        ChallengeGate::from_config(&self.config)
            .await_clearance(page)
            .await
    }

    async fn finish_operation<T>(
        &self,
        session: SessionGuard,
        result: ScraperResult<T>,
    ) -> ScraperResult<T> {
        self.stats.record_operation(result.is_ok());
        session.release(result).await
    }
}
