use crate::items::{Currency, Offer, PriceRecord};
use crate::parser::{parse_amount, ExtractionRoutine};
use crate::{ScraperError, ScraperResult};
use log::trace;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;

const HELPER_SCRIPT: &str = r#"(function () {
  const ns = (window.__openseaScraper = window.__openseaScraper || {});
  ns.fetchOffers = function () {
    const cards = document.querySelectorAll("a.Asset--anchor");
    return Array.prototype.slice.call(cards).map(function (card) {
      const href = card.getAttribute("href") || "";
      const parts = href.split("?")[0].split("/").filter(Boolean);
      const name = card.querySelector('[class*="AssetCardFooter--name"]');
      const image = card.querySelector("img.Image--image");
      const price = card.querySelector(".AssetCardFooter--price-amount");
      const amount = price ? price.querySelector(".Price--amount") : null;
      return {
        name: name ? name.textContent.trim() : "",
        tokenId: parts.length > 0 ? parts[parts.length - 1] : "",
        imageUrl: image ? image.getAttribute("src") : null,
        offerUrl: href ? new URL(href, window.location.origin).href : null,
        priceText: amount ? amount.textContent : null,
        hasEthMarker: !!(price && price.querySelector(".Price--eth-icon")),
      };
    });
  };
})();"#;

const TICK_EXPRESSION: &str = r#"(window.__openseaScraper && window.__openseaScraper.fetchOffers)
  ? window.__openseaScraper.fetchOffers()
  : []"#;

/// Raw asset card as reported by the in-page helper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferCard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token_id: String,
    pub image_url: Option<String>,
    pub offer_url: Option<String>,
    pub price_text: Option<String>,
    #[serde(default)]
    pub has_eth_marker: bool,
}

impl OfferCard {
    /// Same policy as the card price scan: unmarked or unparsable means no price.
    pub fn price(&self, currency: Currency) -> Option<PriceRecord> {
        let marked = match currency {
            Currency::Eth => self.has_eth_marker,
        };
        if !marked {
            return None;
        }
        let text = self.price_text.as_deref()?;
        match parse_amount(text) {
            Ok(amount) => PriceRecord::new(amount, currency),
            Err(e) => {
                trace!("Offer {} has no usable price: {}", self.token_id, e);
                None
            }
        }
    }
}

/// Asset cards of a collection page, keyed by token id.
#[derive(Debug, Clone)]
pub struct OffersRoutine {
    result_size: usize,
    currency: Currency,
}

impl OffersRoutine {
    pub fn new(result_size: usize) -> Self {
        Self {
            result_size,
            currency: Currency::Eth,
        }
    }
}

impl ExtractionRoutine for OffersRoutine {
    type Item = Offer;

    fn name(&self) -> &str {
        "offers"
    }

    fn helper_script(&self) -> Option<&str> {
        Some(HELPER_SCRIPT)
    }

    fn tick_expression(&self) -> &str {
        TICK_EXPRESSION
    }

    fn parse_item(&self, raw: Value) -> ScraperResult<Offer> {
        let card: OfferCard = serde_json::from_value(raw)?;
        if card.token_id.is_empty() {
            return Err(ScraperError::MalformedData(format!(
                "card `{}` has no token id",
                card.name
            )));
        }
        let floor_price = card.price(self.currency);
        Ok(Offer {
            name: card.name,
            token_id: card.token_id,
            image_url: card.image_url,
            offer_url: card.offer_url,
            floor_price,
        })
    }

    fn key(&self, item: &Offer) -> Option<String> {
        Some(item.token_id.clone())
    }

    fn limit(&self) -> Option<usize> {
        Some(self.result_size)
    }

    /// Cheapest first, unpriced cards last.
    fn finalize(&self, mut items: Vec<Offer>) -> Vec<Offer> {
        items.sort_by(|a, b| match (&a.floor_price, &b.floor_price) {
            (Some(a), Some(b)) => a.amount.total_cmp(&b.amount),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.token_id.cmp(&b.token_id),
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(token_id: &str, price: Option<&str>, eth: bool) -> Value {
        json!({
            "name": format!("Item #{token_id}"),
            "tokenId": token_id,
            "imageUrl": null,
            "offerUrl": format!("https://opensea.io/assets/0xabc/{token_id}"),
            "priceText": price,
            "hasEthMarker": eth,
        })
    }

    #[test]
    fn test_price_uses_card_policy() {
        let routine = OffersRoutine::new(10);

        let offer = routine.parse_item(raw("1", Some("0,42"), true)).unwrap();
        assert_eq!(offer.floor_price, PriceRecord::new(0.42, Currency::Eth));

        let unmarked = routine.parse_item(raw("2", Some("0,42"), false)).unwrap();
        assert_eq!(unmarked.floor_price, None);

        let garbage = routine.parse_item(raw("3", Some("--"), true)).unwrap();
        assert_eq!(garbage.floor_price, None);
    }

    #[test]
    fn test_missing_token_id_is_malformed() {
        let routine = OffersRoutine::new(10);
        let err = routine.parse_item(raw("", Some("1"), true)).unwrap_err();
        assert!(matches!(err, ScraperError::MalformedData(_)));
    }

    #[test]
    fn test_finalize_orders_by_price_unpriced_last() {
        let routine = OffersRoutine::new(10);
        let offers = vec![
            routine.parse_item(raw("7", None, false)).unwrap(),
            routine.parse_item(raw("8", Some("2"), true)).unwrap(),
            routine.parse_item(raw("9", Some("0,5"), true)).unwrap(),
        ];

        let ids: Vec<String> = routine
            .finalize(offers)
            .into_iter()
            .map(|o| o.token_id)
            .collect();
        assert_eq!(ids, vec!["9", "8", "7"]);
    }
}
