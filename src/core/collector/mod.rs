mod dict;
mod scroll;


pub use dict::CollectionDict;
pub use scroll::{ScrollLoop, ScrollState};

use super::gate::bounded_wait;
use super::{ChallengeGate, Clock, ScraperConfig, ScraperError, ScraperResult};
use crate::browser::{Page, WaitFor};
use crate::parser::ExtractionRoutine;
use crate::stats::StatsTracker;
use log::{debug, info, warn};
use url::Url;

/// Drives infinite scroll plus "next page" navigation over a ranked list.
///
/// Any navigation, wait or click failure aborts the run and discards what was
/// collected so far.
pub struct PaginatedCollector<'a, R: ExtractionRoutine> {
    config: &'a ScraperConfig,
    routine: R,
    clock: &'a dyn Clock,
    stats: &'a StatsTracker,
}

impl<'a, R: ExtractionRoutine> PaginatedCollector<'a, R> {
    pub fn new(
        config: &'a ScraperConfig,
        routine: R,
        clock: &'a dyn Clock,
        stats: &'a StatsTracker,
    ) -> Self {
        Self {
            config,
            routine,
            clock,
            stats,
        }
    }

    /// Collects `n_pages` virtual pages and returns the routine's final sequence.
    pub async fn collect(
        &self,
        page: &dyn Page,
        url: &Url,
        n_pages: usize,
    ) -> ScraperResult<Vec<R::Item>> {
        let dict = self.accumulate(page, url, n_pages).await?;
        if dict.is_empty() {
            warn!("No {} items found on {}", self.routine.name(), url);
        }
        let collected = dict.len();
        let items = self.routine.finalize(dict.into_values());
        self.stats
            .record_filtered(collected.saturating_sub(items.len()));

        info!(
            "...🥳 DONE. Total {} fetched: {} ({} kept)",
            self.routine.name(),
            collected,
            items.len()
        );
        Ok(items)
    }

    pub async fn accumulate(
        &self,
        page: &dyn Page,
        url: &Url,
        n_pages: usize,
    ) -> ScraperResult<CollectionDict<R::Item>> {
        if n_pages == 0 {
            return Err(ScraperError::InvalidArgument(
                "at least one page must be requested".to_string(),
            ));
        }

        info!("...opening url: {}", url);
        page.navigate(url).await?;
        ChallengeGate::from_config(self.config)
            .await_clearance(page)
            .await?;

        if let Some(script) = self.routine.helper_script() {
            debug!("...exposing {} helper functions", self.routine.name());
            page.install_script(script).await?;
        }

        let scroll = ScrollLoop::new(&self.config.scroll, &self.routine, self.clock, self.stats);
        let mut dict = CollectionDict::new();

        info!("...scrolling to bottom and fetching {}", self.routine.name());
        self.stats.record_page();
        scroll.run(page, &mut dict).await?;

        for page_number in 2..=n_pages {
            if self.limit_reached(&dict) {
                debug!("Limit reached, not advancing past page {}", page_number - 1);
                break;
            }

            page.click(&self.config.next_page_selector).await?;
            bounded_wait(
                page,
                &self.config.item_image_selector,
                WaitFor::Visible,
                self.config.selector_timeout,
            )
            .await?;

            info!(
                "...scrolling page {}/{}. Items fetched so far: {}",
                page_number,
                n_pages,
                dict.len()
            );
            self.stats.record_page();
            scroll.run(page, &mut dict).await?;
        }

        Ok(dict)
    }

    fn limit_reached(&self, dict: &CollectionDict<R::Item>) -> bool {
        self.routine
            .limit()
            .is_some_and(|limit| dict.len() >= limit)
    }
}
