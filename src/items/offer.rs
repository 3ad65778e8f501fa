use super::PriceRecord;
use serde::{Deserialize, Serialize};

/// A "buy now" listing card from a collection page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub name: String,
    pub token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_url: Option<String>,
    pub floor_price: Option<PriceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSet {
    pub offers: Vec<Offer>,
    /// Distinct offers seen while scrolling, before truncation.
    pub total: usize,
}
