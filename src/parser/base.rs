use crate::ScraperResult;
use serde_json::Value;

/// In-page extraction used by the scroll-and-collect loop.
///
/// After every scroll step the collector evaluates `tick_expression` and
/// expects an array of raw records back. Each record is converted with
/// `parse_item` and stored under `key`; records that fail to parse or have
/// no key are skipped.
pub trait ExtractionRoutine: Send + Sync {
    type Item: Send;

    fn name(&self) -> &str;

    /// Installed once after the challenge clears.
    fn helper_script(&self) -> Option<&str> {
        None
    }

    fn tick_expression(&self) -> &str;

    fn parse_item(&self, raw: Value) -> ScraperResult<Self::Item>;

    fn key(&self, item: &Self::Item) -> Option<String>;

    /// Folds a re-observed item into the one already held under its key.
    fn merge(&self, existing: &mut Self::Item, incoming: Self::Item) {
        *existing = incoming;
    }

    /// Stop scrolling once this many distinct items are held.
    fn limit(&self) -> Option<usize> {
        None
    }

    /// Turns the accumulated items into the final sequence.
    fn finalize(&self, items: Vec<Self::Item>) -> Vec<Self::Item> {
        items
    }
}
