use chrono::{DateTime, Utc};
use log::info;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub operations: usize,
    pub failed_operations: usize,
    pub pages_visited: usize,
    pub scroll_ticks: usize,
    pub timed_out_loops: usize,
    pub items_collected: usize,
    pub duplicates_merged: usize,
    pub items_filtered: usize,
    pub items_skipped: usize,
    pub cards_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats {
                start_time: Utc::now(),
                end_time: None,
                operations: 0,
                failed_operations: 0,
                pages_visited: 0,
                scroll_ticks: 0,
                timed_out_loops: 0,
                items_collected: 0,
                duplicates_merged: 0,
                items_filtered: 0,
                items_skipped: 0,
                cards_skipped: 0,
            })),
        }
    }

    pub fn record_operation(&self, succeeded: bool) {
        let mut stats = self.stats.write();
        stats.operations += 1;
        if !succeeded {
            stats.failed_operations += 1;
        }
    }

    pub fn record_page(&self) {
        self.stats.write().pages_visited += 1;
    }

    pub fn record_tick(&self) {
        self.stats.write().scroll_ticks += 1;
    }

    pub fn record_timeout(&self) {
        self.stats.write().timed_out_loops += 1;
    }

    pub fn record_items(&self, inserted: usize, merged: usize) {
        let mut stats = self.stats.write();
        stats.items_collected += inserted;
        stats.duplicates_merged += merged;
    }

    pub fn record_filtered(&self, count: usize) {
        self.stats.write().items_filtered += count;
    }

    pub fn record_skipped(&self, count: usize) {
        self.stats.write().items_skipped += count;
    }

    pub fn record_cards_skipped(&self, count: usize) {
        self.stats.write().cards_skipped += count;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn log_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        info!("Scraping statistics:");
        info!("  Duration: {} seconds", duration.num_seconds());
        info!(
            "  Operations: {} ({} failed)",
            stats.operations, stats.failed_operations
        );
        info!(
            "  Pages visited: {}, scroll ticks: {}, timed-out loops: {}",
            stats.pages_visited, stats.scroll_ticks, stats.timed_out_loops
        );
        info!(
            "  Items collected: {}, duplicates merged: {}, filtered: {}, skipped: {}",
            stats.items_collected, stats.duplicates_merged, stats.items_filtered, stats.items_skipped
        );
        if stats.cards_skipped > 0 {
            info!("  Price cards skipped: {}", stats.cards_skipped);
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate_across_clones() {
        let tracker = StatsTracker::new();
        let clone = tracker.clone();

        tracker.record_operation(true);
        clone.record_operation(false);
        clone.record_items(3, 2);
        tracker.record_tick();
        tracker.finish();

        let stats = tracker.get_stats();
        assert_eq!(stats.operations, 2);
        assert_eq!(stats.failed_operations, 1);
        assert_eq!(stats.items_collected, 3);
        assert_eq!(stats.duplicates_merged, 2);
        assert_eq!(stats.scroll_ticks, 1);
        assert!(stats.end_time.is_some());
    }
}
