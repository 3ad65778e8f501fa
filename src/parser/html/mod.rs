mod card_parser;

pub use card_parser::{CardPriceParser, CardScan, AMOUNT_SELECTOR, CARD_PRICE_SELECTOR};
