use crate::items::ListingItem;
use crate::parser::ExtractionRoutine;
use crate::ScraperResult;
use serde_json::Value;

const HELPER_SCRIPT: &str = r#"(function () {
  const ns = (window.__openseaScraper = window.__openseaScraper || {});
  ns.fetchCollections = function () {
    const rows = document.querySelectorAll('[role="table"] a[href^="/collection/"]');
    return Array.prototype.slice.call(rows).map(function (row) {
      const href = row.getAttribute("href") || "";
      const slug = href.replace("/collection/", "").split(/[?#/]/)[0];
      const cells = row.querySelectorAll('[role="cell"]');
      const rankText = cells.length > 0 ? cells[0].textContent : "";
      const nameNode = row.querySelector('[class*="Ranking--collection-name"], [role="cell"] span div');
      const logo = row.querySelector("img.Image--image, img");
      return {
        slug: slug,
        rank: parseInt((rankText || "").replace(/[^0-9]/g, ""), 10) || 0,
        name: nameNode ? nameNode.textContent.trim() : "",
        logo: logo ? logo.getAttribute("src") || null : null,
        volume: cells.length > 1 ? cells[1].textContent.trim() : null,
      };
    });
  };
})();"#;

const TICK_EXPRESSION: &str = r#"(window.__openseaScraper && window.__openseaScraper.fetchCollections)
  ? window.__openseaScraper.fetchCollections()
  : []"#;

/// Rows of the rankings table, keyed by collection slug.
#[derive(Debug, Clone, Default)]
pub struct RankingsRoutine;

impl RankingsRoutine {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionRoutine for RankingsRoutine {
    type Item = ListingItem;

    fn name(&self) -> &str {
        "rankings"
    }

    fn helper_script(&self) -> Option<&str> {
        Some(HELPER_SCRIPT)
    }

    fn tick_expression(&self) -> &str {
        TICK_EXPRESSION
    }

    fn parse_item(&self, raw: Value) -> ScraperResult<ListingItem> {
        Ok(serde_json::from_value(raw)?)
    }

    fn key(&self, item: &ListingItem) -> Option<String> {
        item.slug.clone().filter(|slug| !slug.is_empty())
    }

    /// A complete row is never replaced by a partially rendered one.
    fn merge(&self, existing: &mut ListingItem, incoming: ListingItem) {
        if incoming.is_complete() || !existing.is_complete() {
            *existing = incoming;
        }
    }

    fn finalize(&self, items: Vec<ListingItem>) -> Vec<ListingItem> {
        let mut items: Vec<ListingItem> = items.into_iter().filter(|item| item.is_complete()).collect();
        items.sort_by_key(|item| item.rank);
        items
    }
}
