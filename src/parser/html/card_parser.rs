use crate::items::{Currency, PriceRecord};
use crate::parser::parse_amount;
use crate::{ScraperError, ScraperResult};
use log::{debug, trace};
use scraper::{ElementRef, Html, Selector};

pub const CARD_PRICE_SELECTOR: &str = ".Asset--anchor .AssetCardFooter--price-amount";
pub const AMOUNT_SELECTOR: &str = ".Price--amount";

/// Amounts found on listing cards, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardScan {
    pub amounts: Vec<f64>,
    /// Cards priced in another currency.
    pub foreign: usize,
    pub malformed: usize,
}

impl CardScan {
    /// Render order is not price order, so the floor is an explicit minimum.
    pub fn floor(&self, currency: Currency) -> Option<PriceRecord> {
        self.amounts
            .iter()
            .copied()
            .min_by(|a, b| a.total_cmp(b))
            .and_then(|amount| PriceRecord::new(amount, currency))
    }

    pub fn skipped(&self) -> usize {
        self.foreign + self.malformed
    }
}

/// Reads listing-card prices out of a rendered collection page.
pub struct CardPriceParser {
    currency: Currency,
    card: Selector,
    marker: Selector,
    amount: Selector,
}

fn selector(css: &str) -> ScraperResult<Selector> {
    Selector::parse(css)
        .map_err(|e| ScraperError::InvalidArgument(format!("invalid selector {css}: {e:?}")))
}

impl CardPriceParser {
    pub fn new(currency: Currency) -> ScraperResult<Self> {
        Ok(Self {
            currency,
            card: selector(CARD_PRICE_SELECTOR)?,
            marker: selector(currency.marker_selector())?,
            amount: selector(AMOUNT_SELECTOR)?,
        })
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn scan(&self, html: &str) -> CardScan {
        let document = Html::parse_document(html);
        let mut scan = CardScan::default();

        for card in document.select(&self.card) {
            match self.card_amount(card) {
                Ok(Some(amount)) => {
                    trace!("Card amount: {} {}", amount, self.currency);
                    scan.amounts.push(amount);
                }
                Ok(None) => scan.foreign += 1,
                Err(e) => {
                    debug!("Skipping price card: {}", e);
                    scan.malformed += 1;
                }
            }
        }

        debug!(
            "Scanned {} {} card prices ({} foreign, {} malformed)",
            scan.amounts.len(),
            self.currency,
            scan.foreign,
            scan.malformed
        );
        scan
    }

    pub fn floor_price(&self, html: &str) -> Option<PriceRecord> {
        self.scan(html).floor(self.currency)
    }

    fn card_amount(&self, card: ElementRef) -> ScraperResult<Option<f64>> {
        if card.select(&self.marker).next().is_none() {
            return Ok(None);
        }
        let text: String = card
            .select(&self.amount)
            .next()
            .ok_or_else(|| ScraperError::MalformedData("card has no amount element".to_string()))?
            .text()
            .collect();
        parse_amount(&text).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn card(amount: &str, marker: Option<&str>) -> String {
        let icon = marker
            .map(|class| format!(r#"<img class="{class}" src="eth.svg">"#))
            .unwrap_or_default();
        format!(
            r#"<a class="Asset--anchor" href="/assets/0xabc/1">
                 <div class="AssetCardFooter--price-amount">
                   <div class="Price--main">{icon}<div class="Price--amount">{amount}</div></div>
                 </div>
               </a>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            "<html><body><div class=\"AssetsSearchView--assets\">{}</div></body></html>",
            cards.concat()
        )
    }

    fn eth(amount: &str) -> String {
        card(amount, Some("Price--eth-icon"))
    }

    #[test]
    fn test_floor_is_minimum_after_separator_normalization() {
        let html = page(&[eth("1,5"), eth("0,9"), eth("2,0")]);
        let parser = CardPriceParser::new(Currency::Eth).unwrap();

        let floor = parser.floor_price(&html).unwrap();
        assert_eq!(floor, PriceRecord::new(0.9, Currency::Eth).unwrap());
    }

    #[test]
    fn test_mixed_separators_and_unsorted_render_order() {
        let amounts = ["3.25", "0,75", "1.1", "0.8", "10,0"];
        let html = page(&amounts.iter().map(|a| eth(a)).collect::<Vec<_>>());
        let parser = CardPriceParser::new(Currency::Eth).unwrap();

        let scan = parser.scan(&html);
        assert_eq!(scan.amounts, vec![3.25, 0.75, 1.1, 0.8, 10.0]);
        assert_eq!(scan.floor(Currency::Eth).unwrap().amount, 0.75);
    }

    #[test]
    fn test_cards_without_currency_marker_are_ignored() {
        let html = page(&[
            card("0,01", Some("Price--weth-icon")),
            card("0,02", None),
            eth("4,2"),
        ]);
        let parser = CardPriceParser::new(Currency::Eth).unwrap();

        let scan = parser.scan(&html);
        assert_eq!(scan.amounts, vec![4.2]);
        assert_eq!(scan.foreign, 2);
        assert_eq!(parser.floor_price(&html).unwrap().amount, 4.2);
    }

    #[test]
    fn test_malformed_card_does_not_abort_batch() {
        let html = page(&[eth("n/a"), eth(""), eth("0,5")]);
        let parser = CardPriceParser::new(Currency::Eth).unwrap();

        let scan = parser.scan(&html);
        assert_eq!(scan.amounts, vec![0.5]);
        assert_eq!(scan.malformed, 2);
        assert_eq!(scan.skipped(), 2);
    }

    #[test]
    fn test_no_qualifying_cards_is_no_record() {
        let parser = CardPriceParser::new(Currency::Eth).unwrap();

        assert_eq!(parser.floor_price(&page(&[])), None);
        assert_eq!(parser.floor_price(&page(&[card("1,0", None)])), None);
        assert_eq!(parser.floor_price(&page(&[eth("0"), eth("0,0")])), None);
    }

    #[derive(Debug, Clone)]
    enum GeneratedCard {
        Eth { cents: u32, comma: bool },
        Foreign { cents: u32 },
        Malformed,
    }

    impl GeneratedCard {
        fn text(cents: u32, comma: bool) -> String {
            let sep = if comma { ',' } else { '.' };
            format!("{}{}{:02}", cents / 100, sep, cents % 100)
        }

        fn html(&self) -> String {
            match self {
                GeneratedCard::Eth { cents, comma } => eth(&Self::text(*cents, *comma)),
                GeneratedCard::Foreign { cents } => {
                    card(&Self::text(*cents, false), Some("Price--weth-icon"))
                }
                GeneratedCard::Malformed => eth("n/a"),
            }
        }
    }

    fn generated_card() -> impl Strategy<Value = GeneratedCard> {
        prop_oneof![
            3 => (1u32..10_000_000, any::<bool>())
                .prop_map(|(cents, comma)| GeneratedCard::Eth { cents, comma }),
            1 => (1u32..10_000_000).prop_map(|cents| GeneratedCard::Foreign { cents }),
            1 => Just(GeneratedCard::Malformed),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_floor_is_minimum_of_normalized_eth_amounts(
            cards in prop::collection::vec(generated_card(), 0..24)
        ) {
            let parser = CardPriceParser::new(Currency::Eth).unwrap();
            let html = page(&cards.iter().map(GeneratedCard::html).collect::<Vec<_>>());

            let expected = cards
                .iter()
                .filter_map(|card| match card {
                    GeneratedCard::Eth { cents, comma } => {
                        GeneratedCard::text(*cents, *comma).replace(',', ".").parse::<f64>().ok()
                    }
                    _ => None,
                })
                .min_by(|a, b| a.total_cmp(b));

            let scan = parser.scan(&html);
            prop_assert_eq!(scan.floor(Currency::Eth).map(|p| p.amount), expected);

            let foreign = cards.iter().filter(|c| matches!(c, GeneratedCard::Foreign { .. })).count();
            let malformed = cards.iter().filter(|c| matches!(c, GeneratedCard::Malformed)).count();
            prop_assert_eq!(scan.foreign, foreign);
            prop_assert_eq!(scan.malformed, malformed);
        }
    }
}
